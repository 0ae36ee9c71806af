//! Update notification stream
//!
//! The host boundary publishes one [`UpdateEvent`] per change; the exporter
//! is the single consumer.

use export_core::{ExportConfig, ExportError, Result, TableSnapshot};
use tokio::sync::mpsc;

/// One host notification with the config that was current when it fired
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateEvent {
    pub snapshot: TableSnapshot,
    pub config: ExportConfig,
    pub page_id: String,
}

/// Create a bounded update stream
pub fn update_channel(capacity: usize) -> (UpdatePublisher, UpdateStream) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (UpdatePublisher { tx }, UpdateStream { rx })
}

#[derive(Clone)]
pub struct UpdatePublisher {
    tx: mpsc::Sender<UpdateEvent>,
}

impl UpdatePublisher {
    /// Waits for queue space. Fails once the consumer is gone.
    pub async fn publish(&self, event: UpdateEvent) -> Result<()> {
        self.tx
            .send(event)
            .await
            .map_err(|_| ExportError::Unavailable("update stream closed".into()))
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

pub struct UpdateStream {
    rx: mpsc::Receiver<UpdateEvent>,
}

impl UpdateStream {
    /// Next event, or `None` when every publisher has been dropped
    pub async fn next(&mut self) -> Option<UpdateEvent> {
        self.rx.recv().await
    }
}
