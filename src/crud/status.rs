use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::model::{StatusKind, StatusMessage};

pub const SAVED: &str = "Saved successfully!";
pub const DELETED: &str = "Deleted successfully!";
pub const SAVE_FAILED: &str = "Failed to save data";
pub const DELETE_FAILED: &str = "Failed to delete data";
pub const FETCH_FAILED: &str = "Failed to fetch data";

/// At most one visible status message, cleared after a fixed duration.
///
/// Posting a new message replaces the current one and restarts the expiry
/// timer. Dropping the board cancels any pending expiry.
pub struct StatusBoard {
    tx: Arc<watch::Sender<Option<StatusMessage>>>,
    duration: Duration,
    expiry: Option<JoinHandle<()>>,
}

impl StatusBoard {
    pub fn new(duration: Duration) -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            tx: Arc::new(tx),
            duration,
            expiry: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<StatusMessage>> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> Option<StatusMessage> {
        self.tx.borrow().clone()
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.post(text.into(), StatusKind::Success);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.post(text.into(), StatusKind::Error);
    }

    fn post(&mut self, text: String, kind: StatusKind) {
        self.cancel_expiry();
        self.tx.send_replace(Some(StatusMessage {
            text,
            kind,
            expires_at: Instant::now() + self.duration,
        }));

        let tx = self.tx.clone();
        let duration = self.duration;
        self.expiry = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            tx.send_replace(None);
        }));
    }

    fn cancel_expiry(&mut self) {
        if let Some(handle) = self.expiry.take() {
            handle.abort();
        }
    }
}

impl Drop for StatusBoard {
    fn drop(&mut self) {
        self.cancel_expiry();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn message_clears_after_duration() {
        let mut board = StatusBoard::new(Duration::from_millis(3000));
        board.success(SAVED);
        assert_eq!(board.current().unwrap().text, SAVED);

        tokio::time::sleep(Duration::from_millis(2999)).await;
        assert!(board.current().is_some());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(board.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn newer_message_supersedes_and_restarts_timer() {
        let mut board = StatusBoard::new(Duration::from_millis(3000));
        board.success(SAVED);
        tokio::time::sleep(Duration::from_millis(2000)).await;

        board.error(DELETE_FAILED);
        let current = board.current().unwrap();
        assert_eq!(current.text, DELETE_FAILED);
        assert!(current.is_error());

        // The first message's timer would have fired here.
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(board.current().unwrap().text, DELETE_FAILED);

        tokio::time::sleep(Duration::from_millis(1600)).await;
        assert!(board.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_board_cancels_expiry() {
        let mut board = StatusBoard::new(Duration::from_millis(100));
        let rx = board.subscribe();
        board.success(SAVED);
        drop(board);

        tokio::time::sleep(Duration::from_millis(200)).await;
        // No timer fired after teardown, so the last value is still the message.
        assert!(rx.borrow().is_some());
    }
}
