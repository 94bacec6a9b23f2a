use super::policy::RoutePolicy;
use crate::session::Session;

/// Outcome of evaluating a route policy against the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RedirectToSignIn,
    RedirectToDefault,
}

/// Decide whether `session` may open a view protected by `policy`. First match wins:
/// public views are always allowed, a missing credential goes to sign-in, a role
/// mismatch goes to the default view.
pub fn decide(session: &Session, policy: &RoutePolicy) -> Decision {
    if !policy.requires_auth() {
        return Decision::Allow;
    }
    let Some(_) = session.credential() else {
        return Decision::RedirectToSignIn;
    };
    match policy.required_role() {
        Some(required) if session.role() != Some(required) => Decision::RedirectToDefault,
        _ => Decision::Allow,
    }
}
