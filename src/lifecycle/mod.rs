//! Application wiring and process-level setup.

pub mod app;
pub mod tracing;

pub use app::{PortfolioApp, StartupError, Visit};
pub use self::tracing::setup_tracing;
