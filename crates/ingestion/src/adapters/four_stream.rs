//! Four-stream adapter: independent image/calibration channels correlated
//! by the frame synchronizer.

use std::sync::Arc;

use contracts::{InputEvent, SyncGroup, SyncSettings, TopicConfig};
use sync_engine::{FrameSynchronizer, SynchronizerStats};
use tracing::{debug, trace};

use crate::adapter::{InputAdapter, event_kind};
use crate::config::IngestionMetrics;
use crate::error::{IngestionError, Result};

/// Four independent channels in, correlated groups out
#[derive(Debug)]
pub struct FourStreamAdapter {
    synchronizer: FrameSynchronizer,
    metrics: Arc<IngestionMetrics>,
}

impl FourStreamAdapter {
    pub fn new(settings: SyncSettings) -> Self {
        Self::with_metrics(settings, Arc::new(IngestionMetrics::new()))
    }

    pub fn with_metrics(settings: SyncSettings, metrics: Arc<IngestionMetrics>) -> Self {
        Self {
            synchronizer: FrameSynchronizer::new(settings),
            metrics,
        }
    }

    pub fn synchronizer(&self) -> &FrameSynchronizer {
        &self.synchronizer
    }

    pub fn metrics(&self) -> &Arc<IngestionMetrics> {
        &self.metrics
    }
}

impl InputAdapter for FourStreamAdapter {
    fn name(&self) -> &'static str {
        "four_stream"
    }

    fn accept(&mut self, event: InputEvent) -> Result<Option<SyncGroup>> {
        let message = match event {
            InputEvent::Stream(message) => message,
            other => {
                self.metrics.record_rejected();
                return Err(IngestionError::UnexpectedEvent {
                    adapter: self.name(),
                    received: event_kind(&other),
                });
            }
        };

        let channel = message.channel();
        self.metrics.record_received();
        observability::record_message_received(channel);
        trace!(channel = %channel, stamp = %message.stamp(), "stream message accepted");

        let group = self.synchronizer.push(message);
        self.synchronizer.record_queue_depths();
        if let Some(group) = &group {
            self.metrics.record_group();
            debug!(
                stamp = %group.resolved_stamp(),
                skew_ns = group.image_skew_nanos(),
                "stereo group correlated"
            );
        }
        Ok(group)
    }

    fn reconfigure(&mut self, settings: SyncSettings) {
        self.synchronizer.reconfigure(settings);
    }

    fn sync_stats(&self) -> Option<SynchronizerStats> {
        Some(self.synchronizer.stats())
    }

    fn describe(&self, topics: &TopicConfig) -> String {
        let settings = self.synchronizer.settings();
        let mut text = format!(
            "{} sync (queue_size={}",
            settings.policy.as_str(),
            settings.queue_size
        );
        if let Some(max_interval) = settings.max_interval {
            text.push_str(&format!(", max_interval={:.3}s", max_interval.as_secs_f64()));
        }
        text.push_str(&format!(
            "):\n   {}\n   {}\n   {}\n   {}",
            topics.left_image, topics.right_image, topics.left_info, topics.right_info
        ));
        text
    }
}
