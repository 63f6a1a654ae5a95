use std::fmt;
use std::sync::Arc;

use super::schema::Editor;

/// Whether a section holds many records or exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionShape {
    /// List, create, edit and delete by id.
    Collection,
    /// One server-side record, edit-only, updated without an id segment.
    Singleton,
}

/// Static description of one manageable resource type.
#[derive(Clone)]
pub struct Section {
    pub key: String,
    pub label: String,
    /// Path relative to the API base, e.g. `/api/projects`.
    pub endpoint: String,
    pub shape: SectionShape,
    pub editor: Arc<dyn Editor>,
}

impl Section {
    pub fn collection(
        key: impl Into<String>,
        label: impl Into<String>,
        endpoint: impl Into<String>,
        editor: impl Editor,
    ) -> Self {
        Self::new(key, label, endpoint, SectionShape::Collection, editor)
    }

    pub fn singleton(
        key: impl Into<String>,
        label: impl Into<String>,
        endpoint: impl Into<String>,
        editor: impl Editor,
    ) -> Self {
        Self::new(key, label, endpoint, SectionShape::Singleton, editor)
    }

    fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        endpoint: impl Into<String>,
        shape: SectionShape,
        editor: impl Editor,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            endpoint: endpoint.into(),
            shape,
            editor: Arc::new(editor),
        }
    }

    pub fn is_singleton(&self) -> bool {
        matches!(self.shape, SectionShape::Singleton)
    }
}

impl fmt::Debug for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Section")
            .field("key", &self.key)
            .field("endpoint", &self.endpoint)
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}
