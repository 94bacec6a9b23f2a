//! Route protection: per-view policies, the guard decision and the fixed route table.

mod guard;
mod policy;
mod routes;

pub use guard::{decide, Decision};
pub use policy::RoutePolicy;
pub use routes::{normalize_path, Navigation, Route, RouteTable, View};
