//! Broadcast of sync lifecycle events

use fieldsync_domain::constants::EVENT_CHANNEL_CAPACITY;
use fieldsync_domain::SyncEvent;
use tokio::sync::broadcast;
use tracing::trace;

/// Fan-out of [`SyncEvent`]s to any number of subscribers.
///
/// Emitting never blocks and never fails. Subscribers that fall more than the
/// channel capacity behind observe `RecvError::Lagged` and skip ahead.
#[derive(Debug, Clone)]
pub struct ProgressEmitter {
    sender: broadcast::Sender<SyncEvent>,
}

impl ProgressEmitter {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.sender.subscribe()
    }

    pub fn emit(&self, event: SyncEvent) {
        let kind = event.kind();
        if self.sender.send(event).is_err() {
            trace!(kind, "No subscribers for sync event");
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ProgressEmitter {
    fn default() -> Self {
        Self::new(EVENT_CHANNEL_CAPACITY)
    }
}
