//! The CRUD manager: one actor per dashboard section.
//!
//! See [`actor`] for the processing rules and [`handle`] for the client side.

pub mod actor;
pub mod handle;
pub mod status;

pub use actor::*;
pub use handle::*;
pub use status::StatusBoard;

use std::time::Duration;

use tokio::task::JoinHandle;

use crate::api::{HeaderSource, ResourceApi};
use crate::section::Section;

const BUFFER_SIZE: usize = 16;

/// Starts a manager for `section` on the current runtime.
///
/// The task ends once every [`SectionHandle`] clone has been dropped.
pub fn spawn<A, H>(
    section: Section,
    api: A,
    headers: H,
    status_duration: Duration,
) -> (SectionHandle, JoinHandle<()>)
where
    A: ResourceApi,
    H: HeaderSource,
{
    let (actor, handle) = SectionActor::new(section, api, BUFFER_SIZE, status_duration);
    let task = tokio::spawn(actor.run(headers));
    (handle, task)
}
