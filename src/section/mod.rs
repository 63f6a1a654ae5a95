//! Section descriptors: what each dashboard tab manages and how it is edited.

pub mod descriptor;
pub mod registry;
pub mod schema;

pub use descriptor::*;
pub use registry::{find, sections};
pub use schema::*;
