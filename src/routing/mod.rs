//! Route table, history and the admin route guard.

pub mod guard;
pub mod navigator;
pub mod routes;

pub use guard::*;
pub use navigator::*;
pub use routes::*;
