//! Client-side session: the (credential, role) pair and its durable mirror.
//! Keep the public surface thin; storage backends and the store live in sub-modules.

mod storage;
mod store;

pub use storage::{DurableStorage, FileStorage, MemoryStorage, StorageError, TOKEN_KEY, ROLE_KEY};
pub use store::{Credential, Role, Session, SessionStore};
