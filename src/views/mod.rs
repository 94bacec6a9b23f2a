//! Text renditions of the pages. Each view owns its own state, performs its fetches
//! through `ProductApi`, and renders to a `String`; none of them touch durable storage.

pub mod admin;
pub mod guest;
pub mod home;
pub mod nav;
pub mod register;
pub mod signin;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::api::ProductStatus;

pub use admin::AdminDashboard;
pub use guest::{GuestDashboard, GuestRow};
pub use home::HomeView;
pub use nav::{NavLink, NavMenu};
pub use register::RegisterView;
pub use signin::SignInView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Success,
    Error,
}

/// One-line message shown above a form after a submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub kind: FlashKind,
    pub text: String,
}

impl Flash {
    pub fn success(text: impl Into<String>) -> Self { Self { kind: FlashKind::Success, text: text.into() } }
    pub fn error(text: impl Into<String>) -> Self { Self { kind: FlashKind::Error, text: text.into() } }

    pub fn render(&self) -> String {
        match self.kind {
            FlashKind::Success => format!("\x1b[32mSuccess:\x1b[0m {}", self.text),
            FlashKind::Error => format!("\x1b[31mError:\x1b[0m {}", self.text),
        }
    }
}

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static email regex"));

pub(crate) fn is_email(s: &str) -> bool { EMAIL_RE.is_match(s.trim()) }

/// Uppercase status label colored the way the dashboards show it.
pub fn status_badge(status: ProductStatus) -> String {
    let color = match status {
        ProductStatus::Approved => "32",
        ProductStatus::Rejected => "31",
        ProductStatus::Pending => "33",
    };
    format!("\x1b[{}m{}\x1b[0m", color, status.as_wire().to_uppercase())
}

pub(crate) fn format_amount(amount: f64) -> String { format!("{:.2}", amount) }
