use tracing::{info, warn};

use super::is_email;
use crate::api::ProductApi;
use crate::routing::View;
use crate::session::{Credential, Role, SessionStore};

#[derive(Debug, Default)]
pub struct SignInView {
    error: Option<String>,
    notice: Option<String>,
}

impl SignInView {
    /// Fresh page carrying a message from the previous view (e.g. after registering).
    pub fn with_notice(notice: impl Into<String>) -> Self { Self { error: None, notice: Some(notice.into()) } }

    pub fn error(&self) -> Option<&str> { self.error.as_deref() }

    /// Exchange credentials with the backend and hand the result to the session store.
    /// Returns the dashboard to open next: admins go to the admin view, everyone else
    /// to their own requests.
    pub async fn submit<A: ProductApi>(&mut self, api: &A, store: &SessionStore, email: &str, password: &str) -> Option<View> {
        self.error = None;
        self.notice = None;
        if !is_email(email) {
            self.error = Some("enter a valid email address".to_string());
            return None;
        }
        if password.is_empty() {
            self.error = Some("password is required".to_string());
            return None;
        }
        let resp = match api.sign_in(email.trim(), password).await {
            Ok(r) => r,
            Err(e) => {
                self.error = Some(e.message().to_string());
                return None;
            }
        };
        let (credential, role) = match (Credential::new(resp.token), Role::new(resp.role)) {
            (Ok(c), Ok(r)) => (c, r),
            _ => {
                warn!(target: "productdesk", "sign-in response is missing the token or role");
                self.error = Some("the server returned an incomplete session".to_string());
                return None;
            }
        };
        let next = if role.is_admin() { View::AdminDashboard } else { View::GuestDashboard };
        info!(target: "productdesk", role = %role, "signed in");
        store.login(credential, role);
        Some(next)
    }

    pub fn render(&self) -> String {
        let mut out = Vec::new();
        if let Some(n) = &self.notice { out.push(format!("\x1b[32m{}\x1b[0m", n)); }
        if let Some(e) = &self.error { out.push(format!("\x1b[31m{}\x1b[0m", e)); }
        out.push("Sign in:".to_string());
        out.push("  login <email> <password>".to_string());
        out.push("No account yet? go /register".to_string());
        out.join("\n")
    }
}
