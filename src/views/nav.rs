use crate::routing::View;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavLink {
    pub label: &'static str,
    pub view: View,
}

/// Menu derived from the session on every render; it holds no state of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavMenu {
    pub links: Vec<NavLink>,
    pub role: Option<String>,
    pub can_sign_out: bool,
}

impl NavMenu {
    pub fn for_session(session: &Session) -> Self {
        let home = NavLink { label: "Home", view: View::Home };
        match session.role() {
            None => Self {
                links: vec![home, NavLink { label: "Sign in", view: View::SignIn }],
                role: None,
                can_sign_out: false,
            },
            Some(role) => {
                let dashboard = if role.is_admin() {
                    NavLink { label: "Admin dashboard", view: View::AdminDashboard }
                } else {
                    NavLink { label: "My requests", view: View::GuestDashboard }
                };
                Self { links: vec![home, dashboard], role: Some(role.to_string()), can_sign_out: true }
            }
        }
    }

    pub fn render(&self) -> String {
        let mut parts: Vec<String> = self.links.iter().map(|l| format!("{} ({})", l.label, l.view.path())).collect();
        if let Some(role) = &self.role { parts.push(format!("role: {}", role)); }
        if self.can_sign_out { parts.push("Sign out (logout)".to_string()); }
        format!("\x1b[1mProduct requests\x1b[0m | {}", parts.join(" · "))
    }
}
