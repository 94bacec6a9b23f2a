use std::fmt::{self, Display, Formatter};

use parking_lot::RwLock;
use tracing::{debug, error, warn};

use super::storage::{DurableStorage, StorageError, ROLE_KEY, TOKEN_KEY};
use crate::error::{AppError, AppResult};

/// Opaque bearer token issued by the backend. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(raw: impl Into<String>) -> AppResult<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(AppError::user("empty_credential", "credential must not be empty"));
        }
        Ok(Self(raw))
    }

    /// Raw token, for the Authorization header and the storage mirror only.
    pub fn expose(&self) -> &str { &self.0 }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result { f.write_str("Credential(***)") }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Role(String);

impl Role {
    pub const ADMIN: &'static str = "admin";

    /// Kept exactly as the backend sent it; only a blank label is refused.
    pub fn new(raw: impl Into<String>) -> AppResult<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(AppError::user("empty_role", "role must not be empty"));
        }
        Ok(Self(raw))
    }

    pub fn admin() -> Self { Self(Self::ADMIN.to_string()) }

    pub fn as_str(&self) -> &str { &self.0 }

    pub fn is_admin(&self) -> bool { self.0 == Self::ADMIN }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// Either nobody is signed in, or a credential and its role are held together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated { credential: Credential, role: Role },
}

impl Session {
    pub fn credential(&self) -> Option<&Credential> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated { credential, .. } => Some(credential),
        }
    }

    pub fn role(&self) -> Option<&Role> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated { role, .. } => Some(role),
        }
    }

    pub fn is_authenticated(&self) -> bool { matches!(self, Session::Authenticated { .. }) }
}

/// Single owner of the session. Views and the route table receive it by reference
/// (usually through an `Arc`) and never touch durable storage themselves.
pub struct SessionStore {
    storage: Box<dyn DurableStorage>,
    state: RwLock<Session>,
}

impl SessionStore {
    /// Seed the session from durable storage. Missing, partial, empty or unreadable
    /// entries all yield `Session::Anonymous`.
    pub fn initialize(storage: impl DurableStorage + 'static) -> Self {
        let session = match load(&storage) {
            Ok(s) => s,
            Err(e) => {
                warn!(target: "productdesk", "session storage unreadable, starting signed out: {}", e);
                Session::Anonymous
            }
        };
        debug!(target: "productdesk", authenticated = session.is_authenticated(), "session initialized");
        Self { storage: Box::new(storage), state: RwLock::new(session) }
    }

    /// Persist then publish a fresh session. Replaces any current session wholesale.
    pub fn login(&self, credential: Credential, role: Role) {
        if let Err(e) = self.storage.set_many(&[(TOKEN_KEY, credential.expose()), (ROLE_KEY, role.as_str())]) {
            warn!(target: "productdesk", "could not persist session, it will not survive a restart: {}", e);
        }
        debug!(target: "productdesk", role = %role, "session login");
        *self.state.write() = Session::Authenticated { credential, role };
    }

    /// Clear storage and memory. Safe to call when already signed out. Memory is
    /// always cleared; the return value is false when the durable copy could not be
    /// removed, in which case the next start would sign the user back in.
    pub fn logout(&self) -> bool {
        let cleared = match self.storage.remove_many(&[TOKEN_KEY, ROLE_KEY]) {
            Ok(()) => true,
            Err(e) => {
                error!(target: "productdesk", "could not clear persisted session, it will be restored on the next start: {}", e);
                false
            }
        };
        let mut state = self.state.write();
        if state.is_authenticated() { debug!(target: "productdesk", "session logout"); }
        *state = Session::Anonymous;
        cleared
    }

    pub fn current(&self) -> Session { self.state.read().clone() }
}

fn load(storage: &dyn DurableStorage) -> Result<Session, StorageError> {
    let token = storage.get(TOKEN_KEY)?;
    let role = storage.get(ROLE_KEY)?;
    let (Some(token), Some(role)) = (token, role) else {
        return Ok(Session::Anonymous);
    };
    match (Credential::new(token), Role::new(role)) {
        (Ok(credential), Ok(role)) => Ok(Session::Authenticated { credential, role }),
        _ => Ok(Session::Anonymous),
    }
}
