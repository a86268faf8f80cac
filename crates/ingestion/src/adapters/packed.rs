//! Packed stereo message adapter

use std::sync::Arc;

use contracts::{InputEvent, SyncGroup, TopicConfig};
use tracing::trace;

use crate::adapter::{InputAdapter, event_kind};
use crate::config::IngestionMetrics;
use crate::error::{IngestionError, Result};

/// One packed message per event; no correlation needed
#[derive(Debug, Default)]
pub struct PackedMessageAdapter {
    metrics: Arc<IngestionMetrics>,
}

impl PackedMessageAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metrics(metrics: Arc<IngestionMetrics>) -> Self {
        Self { metrics }
    }

    pub fn metrics(&self) -> &Arc<IngestionMetrics> {
        &self.metrics
    }
}

impl InputAdapter for PackedMessageAdapter {
    fn name(&self) -> &'static str {
        "packed"
    }

    fn accept(&mut self, event: InputEvent) -> Result<Option<SyncGroup>> {
        let message = match event {
            InputEvent::Packed(message) => message,
            other => {
                self.metrics.record_rejected();
                return Err(IngestionError::UnexpectedEvent {
                    adapter: self.name(),
                    received: event_kind(&other),
                });
            }
        };

        self.metrics.record_received();
        self.metrics.record_group();
        trace!(
            frame = %message.header.frame_id,
            stamp = %message.header.stamp,
            "packed stereo message unpacked"
        );
        Ok(Some(SyncGroup::from(*message)))
    }

    fn describe(&self, topics: &TopicConfig) -> String {
        format!("packed stereo:\n   {}", topics.rgbd)
    }
}
