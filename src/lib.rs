pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod routing;
pub mod session;
pub mod views;
