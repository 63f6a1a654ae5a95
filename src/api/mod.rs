//! REST access: the resource client, the shared bearer credentials, the
//! contact form client and a mock for tests.

pub mod client;
pub mod contact;
pub mod credentials;
pub mod mock;

pub use client::*;
pub use contact::*;
pub use credentials::*;
pub use mock::{ApiCall, MockApi};
