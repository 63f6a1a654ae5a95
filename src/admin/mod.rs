//! The admin area: login page and dashboard.

pub mod dashboard;
pub mod login;

pub use dashboard::Dashboard;
pub use login::{LoginError, LoginForm};
