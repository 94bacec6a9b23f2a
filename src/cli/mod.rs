pub mod commands;
pub mod shell;
pub mod table;
