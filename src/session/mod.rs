//! Admin session: login, logout, startup restore and token persistence.

pub mod persist;
pub mod store;

pub use persist::*;
pub use store::*;
