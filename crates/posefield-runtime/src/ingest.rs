//! Sensor ingestion channel.
//!
//! The sensor boundary is a push source with no ordering or delivery
//! guarantee. Instead of a raw callback mutating shared state, updates flow
//! through a bounded [`tokio::sync::mpsc`] channel: [`SensorTx`] stamps each
//! update into a [`SensorEvent`] envelope (id + receive time) at the
//! boundary, and a spawned task drains the queue and merges into the shared
//! [`DeviceRegistry`] under its lock. Merges are therefore atomic with
//! respect to frame reads; a frame never observes a half-written record.

use posefield_types::{FieldError, SensorEvent, SensorUpdate};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::{SharedRegistry, lock_registry};

/// Default channel capacity (number of buffered updates before the boundary
/// starts dropping).
pub const DEFAULT_CAPACITY: usize = 256;

/// Sending half of the ingestion channel. Clone freely; all clones feed the
/// same merge task.
#[derive(Clone, Debug)]
pub struct SensorTx {
    tx: mpsc::Sender<SensorEvent>,
}

impl SensorTx {
    /// Queue an update, waiting for capacity if the channel is full.
    ///
    /// The receive timestamp is stamped here, before any queueing delay can
    /// accumulate.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::Channel`] when the merge task has shut down.
    pub async fn send(&self, update: SensorUpdate) -> Result<(), FieldError> {
        let event = SensorEvent::now(update);
        self.tx
            .send(event)
            .await
            .map_err(|e| FieldError::Channel(format!("merge task gone: {e}")))
    }

    /// Queue an update without waiting. A full channel drops the update
    /// silently: the boundary has no delivery guarantee, and a dropped
    /// packet is indistinguishable from one the radio never delivered.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::Channel`] only when the merge task has shut
    /// down; a full channel is not an error.
    pub fn try_send(&self, update: SensorUpdate) -> Result<(), FieldError> {
        let event = SensorEvent::now(update);
        match self.tx.try_send(event) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(event)) => {
                debug!(device_id = %event.update.device_id, "ingest queue full, dropping update");
                Ok(())
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                Err(FieldError::Channel("merge task gone".to_string()))
            }
        }
    }
}

/// Spawn the merge task and return the sending half plus its join handle.
///
/// The task runs until every [`SensorTx`] clone has been dropped, then
/// drains the remaining queue and exits.
pub fn ingest_channel(registry: SharedRegistry, capacity: usize) -> (SensorTx, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<SensorEvent>(capacity);

    let handle = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let now_ms = event.received_at.timestamp_millis();
            lock_registry(&registry).merge_at(&event.update, now_ms);
            debug!(
                event_id = %event.id,
                device_id = %event.update.device_id,
                now_ms,
                "merged sensor update"
            );
        }
        debug!("ingest channel closed, merge task exiting");
    });

    (SensorTx { tx }, handle)
}
