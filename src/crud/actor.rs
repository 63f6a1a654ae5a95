//! # Section Manager
//!
//! The generic controller that binds one [`Section`] to list, create, edit and
//! delete.
//!
//! ## Key Types
//!
//! - [`SectionActor`]: owns the section's view state and processes requests.
//! - [`SectionRequest`]: the messages a [`SectionHandle`] sends it.
//! - [`SectionView`]: what a dashboard panel renders.
//! - [`ManagerError`]: why a request did not go through.
//!
//! ## Concurrency Model
//!
//! Each actor runs in its own Tokio task and processes its requests one at a
//! time, so two submits from the same panel can never race each other against
//! the server: the second one only starts after the first has finished and
//! reloaded. A successful save also closes the editor, which makes a queued
//! duplicate submit fail with [`ManagerError::NoOpenEditor`] without sending
//! anything.
//!
//! The collection is never patched locally. Every successful mutation is
//! followed by a fresh `load`, so `items` only ever reflects the last
//! successful server read.

use std::time::Duration;

use serde_json::Value;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use super::handle::SectionHandle;
use super::status::{self, StatusBoard};
use crate::api::{HeaderSource, ResourceApi, UpdateTarget};
use crate::error::{RequestError, ValidationError};
use crate::model::Item;
use crate::section::{Section, SectionShape};

/// Errors returned by [`SectionHandle`] operations.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ManagerError {
    #[error("Section manager closed")]
    Closed,
    #[error("Section manager dropped response channel")]
    Dropped,
    #[error("No editor is open")]
    NoOpenEditor,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Request(#[from] RequestError),
}

/// Type alias for the one-shot response channel used by the actor.
pub type Response<T> = oneshot::Sender<Result<T, ManagerError>>;

/// The item currently being edited.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    /// Identifier of the item being edited; `None` for a new item.
    pub target_id: Option<String>,
    /// Working copy bound to the form. Updated with the last submitted values
    /// so a failed save never loses the user's edits.
    pub draft: Item,
}

impl EditorState {
    pub fn is_new(&self) -> bool {
        self.target_id.is_none()
    }
}

/// Everything a panel needs to render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionView {
    pub items: Vec<Item>,
    /// A load is in flight.
    pub busy: bool,
    /// A save is in flight; the submit control should be disabled.
    pub saving: bool,
    pub editor: Option<EditorState>,
}

/// Internal message type sent to the actor.
#[derive(Debug)]
pub enum SectionRequest {
    Load {
        respond_to: Response<()>,
    },
    StartCreate {
        respond_to: Response<EditorState>,
    },
    StartEdit {
        item: Item,
        respond_to: Response<EditorState>,
    },
    CancelEdit {
        respond_to: Response<()>,
    },
    Save {
        values: Item,
        respond_to: Response<()>,
    },
    Delete {
        id: String,
        respond_to: Response<()>,
    },
}

/// The actor that manages one section.
pub struct SectionActor<A: ResourceApi> {
    section: Section,
    api: A,
    receiver: mpsc::Receiver<SectionRequest>,
    view: watch::Sender<SectionView>,
    status: StatusBoard,
}

impl<A: ResourceApi> SectionActor<A> {
    pub fn new(
        section: Section,
        api: A,
        buffer_size: usize,
        status_duration: Duration,
    ) -> (Self, SectionHandle) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (view, view_rx) = watch::channel(SectionView::default());
        let status = StatusBoard::new(status_duration);
        let handle = SectionHandle::new(section.clone(), sender, view_rx, status.subscribe());
        let actor = Self {
            section,
            api,
            receiver,
            view,
            status,
        };
        (actor, handle)
    }

    /// Runs the event loop until every handle is dropped.
    ///
    /// `headers` is asked for fresh headers on every request, so a login or
    /// logout elsewhere is picked up immediately.
    pub async fn run<H: HeaderSource>(mut self, headers: H) {
        let section = self.section.key.clone();
        info!(section = %section, "Section manager started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                SectionRequest::Load { respond_to } => {
                    self.load(&headers).await;
                    let _ = respond_to.send(Ok(()));
                }
                SectionRequest::StartCreate { respond_to } => {
                    let result = match self.section.shape {
                        SectionShape::Singleton => Err(ValidationError::Unsupported(format!(
                            "{} can only be edited",
                            self.section.label
                        ))
                        .into()),
                        SectionShape::Collection => {
                            let draft = self.section.editor.bind(&Item::new());
                            Ok(self.open_editor(None, draft))
                        }
                    };
                    let _ = respond_to.send(result);
                }
                SectionRequest::StartEdit { item, respond_to } => {
                    debug!(section = %section, id = ?item.id(), "StartEdit");
                    let draft = self.section.editor.bind(&item);
                    let _ = respond_to.send(Ok(self.open_editor(item.id(), draft)));
                }
                SectionRequest::CancelEdit { respond_to } => {
                    self.view.send_modify(|v| v.editor = None);
                    let _ = respond_to.send(Ok(()));
                }
                SectionRequest::Save { values, respond_to } => {
                    let result = self.save(values, &headers).await;
                    let _ = respond_to.send(result);
                }
                SectionRequest::Delete { id, respond_to } => {
                    let result = self.delete(&id, &headers).await;
                    let _ = respond_to.send(result);
                }
            }
        }

        info!(section = %section, "Section manager shut down");
    }

    // Opening an editor replaces any open one; unsaved changes are discarded.
    fn open_editor(&mut self, target_id: Option<String>, draft: Item) -> EditorState {
        let editor = EditorState { target_id, draft };
        self.view.send_modify(|v| v.editor = Some(editor.clone()));
        editor
    }

    async fn load<H: HeaderSource>(&mut self, headers: &H) {
        let section = self.section.key.as_str();
        self.view.send_modify(|v| v.busy = true);

        let result = self
            .api
            .list(&self.section.endpoint, Some(&headers.headers()))
            .await
            .and_then(|body| items_from(self.section.shape, body));

        match result {
            Ok(items) => {
                info!(section, count = items.len(), "Loaded");
                self.view.send_modify(|v| {
                    v.items = items;
                    v.busy = false;
                });
            }
            Err(e) => {
                warn!(section, error = %e, "Load failed");
                self.view.send_modify(|v| {
                    v.items.clear();
                    v.busy = false;
                });
                self.status.error(status::FETCH_FAILED);
            }
        }
    }

    async fn save<H: HeaderSource>(&mut self, values: Item, headers: &H) -> Result<(), ManagerError> {
        let section = self.section.key.as_str();
        let Some(editor) = self.view.borrow().editor.clone() else {
            warn!(section, "Save without an open editor");
            return Err(ManagerError::NoOpenEditor);
        };
        self.view.send_modify(|v| {
            if let Some(open) = v.editor.as_mut() {
                open.draft = values.clone();
            }
        });

        let body = match self.section.editor.prepare(values) {
            Ok(body) => body.without_metadata(),
            Err(e) => {
                warn!(section, error = %e, "Validation failed");
                self.status.error(e.to_string());
                return Err(e.into());
            }
        };
        debug!(section, ?body, "Save");

        self.view.send_modify(|v| v.saving = true);
        let endpoint = self.section.endpoint.as_str();
        let request_headers = headers.headers();
        let result = match self.section.shape {
            SectionShape::Singleton => {
                self.api
                    .update(endpoint, UpdateTarget::Singleton, &body, Some(&request_headers))
                    .await
            }
            SectionShape::Collection => match editor.target_id.as_deref() {
                Some(id) => {
                    self.api
                        .update(endpoint, UpdateTarget::Item(id), &body, Some(&request_headers))
                        .await
                }
                None => self.api.create(endpoint, &body, Some(&request_headers)).await,
            },
        };
        self.view.send_modify(|v| v.saving = false);

        match result {
            Ok(_) => {
                info!(section, id = ?editor.target_id, "Saved");
                self.view.send_modify(|v| v.editor = None);
                self.status.success(status::SAVED);
                self.load(headers).await;
                Ok(())
            }
            Err(e) => {
                warn!(section, id = ?editor.target_id, error = %e, "Save failed");
                self.status.error(status::SAVE_FAILED);
                Err(e.into())
            }
        }
    }

    async fn delete<H: HeaderSource>(&mut self, id: &str, headers: &H) -> Result<(), ManagerError> {
        let section = self.section.key.as_str();
        if let SectionShape::Singleton = self.section.shape {
            return Err(ValidationError::Unsupported(format!(
                "{} cannot be deleted",
                self.section.label
            ))
            .into());
        }

        debug!(section, id, "Delete");
        let request_headers = headers.headers();
        match self.api.remove(&self.section.endpoint, id, Some(&request_headers)).await {
            Ok(()) => {
                info!(section, id, "Deleted");
                self.status.success(status::DELETED);
                self.load(headers).await;
                Ok(())
            }
            Err(e) => {
                warn!(section, id, error = %e, "Delete failed");
                self.status.error(status::DELETE_FAILED);
                Err(e.into())
            }
        }
    }
}

/// Collections expect an array (or nothing); singletons wrap their object, or
/// an empty one when the server has none yet.
fn items_from(shape: SectionShape, body: Value) -> Result<Vec<Item>, RequestError> {
    match (shape, body) {
        (SectionShape::Collection, Value::Array(values)) => Ok(values
            .into_iter()
            .filter_map(|v| {
                let item = Item::from_value(v);
                if item.is_none() {
                    warn!("Skipping non-object entry in collection");
                }
                item
            })
            .collect()),
        (SectionShape::Collection, Value::Null) => Ok(Vec::new()),
        (SectionShape::Singleton, Value::Object(map)) => Ok(vec![Item::from(map)]),
        (SectionShape::Singleton, Value::Null) => Ok(vec![Item::new()]),
        (_, other) => Err(RequestError::malformed(200, format!("unexpected {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn collection_bodies() {
        let items = items_from(SectionShape::Collection, json!([{"_id": "1"}, 3, {"_id": "2"}])).unwrap();
        assert_eq!(items.len(), 2);
        assert!(items_from(SectionShape::Collection, Value::Null).unwrap().is_empty());
        assert!(items_from(SectionShape::Collection, json!({"_id": "1"})).is_err());
    }

    #[test]
    fn singleton_bodies() {
        let items = items_from(SectionShape::Singleton, json!({"hero": {}})).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items_from(SectionShape::Singleton, Value::Null).unwrap(), vec![Item::new()]);
        assert!(items_from(SectionShape::Singleton, json!([])).is_err());
    }
}
