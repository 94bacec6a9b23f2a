use super::is_email;
use crate::api::{ProductApi, RegisterRequest};

#[derive(Debug, Default)]
pub struct RegisterView {
    error: Option<String>,
}

impl RegisterView {
    pub fn error(&self) -> Option<&str> { self.error.as_deref() }

    /// Returns true once the backend created the account.
    pub async fn submit<A: ProductApi>(&mut self, api: &A, req: &RegisterRequest) -> bool {
        self.error = None;
        if req.username.trim().is_empty() {
            self.error = Some("username is required".to_string());
            return false;
        }
        if !is_email(&req.email) {
            self.error = Some("enter a valid email address".to_string());
            return false;
        }
        if req.password.is_empty() {
            self.error = Some("password is required".to_string());
            return false;
        }
        match api.register(req).await {
            Ok(()) => true,
            Err(e) => {
                self.error = Some(e.message().to_string());
                false
            }
        }
    }

    pub fn render(&self) -> String {
        let mut out = Vec::new();
        if let Some(e) = &self.error { out.push(format!("\x1b[31m{}\x1b[0m", e)); }
        out.push("Create account:".to_string());
        out.push("  register <username> <email> <password>".to_string());
        out.push("Already registered? go /login".to_string());
        out.join("\n")
    }
}
