//! Adapter common utility functions

use std::sync::Arc;

use async_channel::{Sender, TrySendError};
use contracts::InputEvent;
use tracing::{trace, warn};

use crate::config::{DropPolicy, IngestionMetrics};

/// Send event, handling backpressure policy
///
/// Returns `false` once the receiving side is gone.
#[inline]
pub fn send_event(
    tx: &Sender<InputEvent>,
    event: InputEvent,
    metrics: &Arc<IngestionMetrics>,
    source_name: &str,
    drop_policy: DropPolicy,
) -> bool {
    let open = match drop_policy {
        DropPolicy::DropNewest => match tx.try_send(event) {
            Ok(()) => {
                trace!(source = %source_name, "event sent");
                true
            }
            Err(TrySendError::Full(_)) => {
                metrics.record_dropped();
                trace!(source = %source_name, "event dropped (newest)");
                true
            }
            Err(TrySendError::Closed(_)) => {
                warn!(source = %source_name, "channel closed");
                false
            }
        },
        DropPolicy::DropOldest => match tx.force_send(event) {
            Ok(None) => {
                trace!(source = %source_name, "event sent");
                true
            }
            Ok(Some(_displaced)) => {
                metrics.record_dropped();
                trace!(source = %source_name, "event dropped (oldest)");
                true
            }
            Err(_) => {
                warn!(source = %source_name, "channel closed");
                false
            }
        },
    };
    metrics.update_queue_len(tx.len());
    open
}
