//! In-process attendance notifications.
//!
//! Screens that show attendance state subscribe here instead of listening on
//! a shared socket. The bus is cloned into whatever needs to publish.

use attend_core::AttendanceRecord;
use chrono::{DateTime, FixedOffset};
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub enum AttendanceEvent {
    CheckedIn {
        branch_id: String,
        at: DateTime<FixedOffset>,
    },
    CheckedOut {
        branch_id: String,
        at: DateTime<FixedOffset>,
    },
    RecordRefreshed(Option<AttendanceRecord>),
}

#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AttendanceEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AttendanceEvent> {
        self.sender.subscribe()
    }

    /// Sends `event` to current subscribers. Having none is not an error.
    pub fn publish(&self, event: AttendanceEvent) {
        if let Err(broadcast::error::SendError(event)) = self.sender.send(event) {
            tracing::trace!(?event, "no attendance subscribers");
        }
    }
}
