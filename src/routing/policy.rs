use crate::session::Role;

/// Protection requirement attached to a view when the route table is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutePolicy {
    Public,
    AuthOnly,
    RoleOnly(Role),
}

impl RoutePolicy {
    /// Build a policy from the legacy `(requires_auth, required_role)` pair.
    /// A required role always implies authentication.
    pub fn from_flags(requires_auth: bool, required_role: Option<Role>) -> Self {
        match (requires_auth, required_role) {
            (_, Some(role)) => RoutePolicy::RoleOnly(role),
            (true, None) => RoutePolicy::AuthOnly,
            (false, None) => RoutePolicy::Public,
        }
    }

    pub fn requires_auth(&self) -> bool { !matches!(self, RoutePolicy::Public) }

    pub fn required_role(&self) -> Option<&Role> {
        match self {
            RoutePolicy::RoleOnly(role) => Some(role),
            _ => None,
        }
    }
}
