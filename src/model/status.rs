use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

/// Transient feedback shown after a section operation.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
    pub expires_at: Instant,
}

impl StatusMessage {
    pub fn is_error(&self) -> bool {
        self.kind == StatusKind::Error
    }
}
