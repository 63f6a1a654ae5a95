use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, instrument};

use super::actor::{EditorState, ManagerError, SectionRequest, SectionView};
use crate::model::{Item, StatusMessage};
use crate::section::Section;

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this?";

/// Asks the user to confirm a destructive action.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// What happened to a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The user declined; nothing was sent.
    Cancelled,
}

/// A cloneable handle to one section's manager.
///
/// Mutating calls go through the actor's queue. State is read from the
/// published [`SectionView`] and status channel.
#[derive(Clone)]
pub struct SectionHandle {
    section: Section,
    sender: mpsc::Sender<SectionRequest>,
    view: watch::Receiver<SectionView>,
    status: watch::Receiver<Option<StatusMessage>>,
}

impl SectionHandle {
    pub(crate) fn new(
        section: Section,
        sender: mpsc::Sender<SectionRequest>,
        view: watch::Receiver<SectionView>,
        status: watch::Receiver<Option<StatusMessage>>,
    ) -> Self {
        Self {
            section,
            sender,
            view,
            status,
        }
    }

    pub fn section(&self) -> &Section {
        &self.section
    }

    /// Refetches the section. Failures surface as a status message and an
    /// empty list, not as an error.
    #[instrument(skip(self), fields(section = %self.section.key))]
    pub async fn load(&self) -> Result<(), ManagerError> {
        self.request(|respond_to| SectionRequest::Load { respond_to }).await
    }

    /// Opens an empty editor. Not available for singletons.
    #[instrument(skip(self), fields(section = %self.section.key))]
    pub async fn start_create(&self) -> Result<EditorState, ManagerError> {
        self.request(|respond_to| SectionRequest::StartCreate { respond_to })
            .await
    }

    /// Opens the editor on a copy of `item`.
    #[instrument(skip(self, item), fields(section = %self.section.key))]
    pub async fn start_edit(&self, item: &Item) -> Result<EditorState, ManagerError> {
        debug!(id = ?item.id(), "start_edit called");
        let item = item.clone();
        self.request(|respond_to| SectionRequest::StartEdit { item, respond_to })
            .await
    }

    #[instrument(skip(self), fields(section = %self.section.key))]
    pub async fn cancel_edit(&self) -> Result<(), ManagerError> {
        self.request(|respond_to| SectionRequest::CancelEdit { respond_to })
            .await
    }

    /// Submits the editor. Creates when the editor was opened empty, updates
    /// otherwise; either way the section is refetched afterwards.
    #[instrument(skip(self, values), fields(section = %self.section.key))]
    pub async fn save(&self, values: Item) -> Result<(), ManagerError> {
        debug!(?values, "save called");
        self.request(|respond_to| SectionRequest::Save { values, respond_to })
            .await
    }

    /// Deletes `id` after `confirm` agrees. Declining sends nothing.
    #[instrument(skip(self, confirm), fields(section = %self.section.key))]
    pub async fn delete(
        &self,
        id: &str,
        confirm: &impl Confirm,
    ) -> Result<DeleteOutcome, ManagerError> {
        if !confirm.confirm(DELETE_PROMPT) {
            debug!("Delete cancelled");
            return Ok(DeleteOutcome::Cancelled);
        }
        let id = id.to_string();
        self.request(|respond_to| SectionRequest::Delete { id, respond_to })
            .await?;
        Ok(DeleteOutcome::Deleted)
    }

    /// Latest published view.
    pub fn view(&self) -> SectionView {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SectionView> {
        self.view.clone()
    }

    /// The visible status message, if any.
    pub fn status(&self) -> Option<StatusMessage> {
        self.status.borrow().clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<Option<StatusMessage>> {
        self.status.clone()
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<T, ManagerError>>) -> SectionRequest,
    ) -> Result<T, ManagerError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| ManagerError::Closed)?;
        response.await.map_err(|_| ManagerError::Dropped)?
    }
}
