//! Route-level loading overlay.

pub mod coordinator;

pub use coordinator::*;
