use tracing::debug;

use super::guard::{decide, Decision};
use super::policy::RoutePolicy;
use crate::error::{AppError, AppResult};
use crate::session::{Role, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Home,
    SignIn,
    Register,
    GuestDashboard,
    AdminDashboard,
}

impl View {
    pub fn path(self) -> &'static str {
        match self {
            View::Home => "/",
            View::SignIn => "/login",
            View::Register => "/register",
            View::GuestDashboard => "/guest",
            View::AdminDashboard => "/admin",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            View::Home => "Home",
            View::SignIn => "Sign in",
            View::Register => "Create account",
            View::GuestDashboard => "My requests",
            View::AdminDashboard => "Admin dashboard",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Route {
    pub path: &'static str,
    pub view: View,
    pub policy: RoutePolicy,
}

/// Result of one navigation attempt. When `decision` is a redirect, `view` is the
/// redirect target and the requested view was not opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub requested: String,
    pub decision: Decision,
    pub view: View,
}

impl Navigation {
    pub fn redirected(&self) -> bool { self.decision != Decision::Allow }
}

/// Fixed path → view → policy table. Built once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl Default for RouteTable {
    fn default() -> Self { Self::standard() }
}

impl RouteTable {
    pub fn standard() -> Self {
        let routes = vec![
            Route { path: View::Home.path(), view: View::Home, policy: RoutePolicy::Public },
            Route { path: View::SignIn.path(), view: View::SignIn, policy: RoutePolicy::Public },
            Route { path: View::Register.path(), view: View::Register, policy: RoutePolicy::Public },
            Route { path: View::GuestDashboard.path(), view: View::GuestDashboard, policy: RoutePolicy::AuthOnly },
            Route { path: View::AdminDashboard.path(), view: View::AdminDashboard, policy: RoutePolicy::RoleOnly(Role::admin()) },
        ];
        Self { routes }
    }

    pub fn routes(&self) -> &[Route] { &self.routes }

    pub fn route(&self, path: &str) -> Option<&Route> {
        let p = normalize_path(path);
        self.routes.iter().find(|r| r.path == p)
    }

    /// Run the guard for `path` against `session`. Evaluated fresh on every call.
    pub fn resolve(&self, path: &str, session: &Session) -> AppResult<Navigation> {
        let requested = normalize_path(path);
        let route = self
            .routes
            .iter()
            .find(|r| r.path == requested)
            .ok_or_else(|| AppError::not_found("no_route".to_string(), format!("no view at {}", requested)))?;
        let decision = decide(session, &route.policy);
        let view = match decision {
            Decision::Allow => route.view,
            Decision::RedirectToSignIn => View::SignIn,
            Decision::RedirectToDefault => View::Home,
        };
        debug!(target: "productdesk", path = %requested, ?decision, "navigation");
        Ok(Navigation { requested, decision, view })
    }
}

/// `" admin/ "` → `"/admin"`, `""` → `"/"`.
pub fn normalize_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/').to_ascii_lowercase();
    format!("/{}", trimmed)
}
