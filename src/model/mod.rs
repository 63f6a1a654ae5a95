//! Pure data structures shared by the session, CRUD and routing layers.

pub mod contact;
pub mod item;
pub mod session;
pub mod status;

pub use contact::*;
pub use item::*;
pub use session::*;
pub use status::*;
