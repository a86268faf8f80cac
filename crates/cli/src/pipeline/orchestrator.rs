//! Pipeline orchestrator - coordinates all components.
//!
//! Synthetic rig -> front end -> dispatcher -> sinks. The front end is owned
//! by the run loop task; frames leave it through a [`ChannelHandoff`].

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use calibration::StaticTransformTree;
use contracts::{FrameHandoff, IngestBlueprint};
use dispatcher::ChannelHandoff;
use frontend::StereoFrontend;
use ingestion::{BackpressureConfig, DropPolicy, IngestionMetrics, MockStereoRig, RigMode};
use observability::FrameMetricsAggregator;
use tracing::{info, warn};

use super::PipelineStats;
use crate::error::CliError;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub blueprint: IngestBlueprint,

    /// Stop after this many emitted frames (None = unlimited)
    pub max_frames: Option<u64>,

    /// Pipeline timeout (None = no timeout)
    pub timeout: Option<Duration>,

    /// Capacity of the rig channel and the dispatcher queue
    pub buffer_size: usize,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,

    /// Seed of the synthetic rig
    pub seed: u64,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run until the rig is exhausted, a limit is reached or `shutdown`
    /// resolves; sinks are drained before returning.
    pub async fn run_until<F>(self, shutdown: F) -> Result<PipelineStats>
    where
        F: Future<Output = ()>,
    {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        let transforms = StaticTransformTree::from_configs(&blueprint.transforms);
        info!(frames = transforms.len(), "Static transform tree loaded");
        let mut frontend = StereoFrontend::new(blueprint.frontend.clone(), transforms);

        // Dispatcher
        let (mut handoff, frames_rx) = ChannelHandoff::channel(self.config.buffer_size);
        if blueprint.sinks.is_empty() {
            warn!("No sinks configured - emitted frames will only be counted");
        }
        let dispatcher = dispatcher::create_dispatcher(blueprint.sinks.clone(), frames_rx)
            .context("Failed to create dispatcher")?;
        let dispatcher_handle = dispatcher.spawn();

        // Synthetic rig
        let mode = if blueprint.frontend.subscribe_rgbd {
            RigMode::Packed
        } else {
            RigMode::FourStream
        };
        let rig_metrics = Arc::new(IngestionMetrics::new());
        let rig = MockStereoRig::new(blueprint.source.clone(), mode).with_seed(self.config.seed);
        let events = rig
            .start(
                BackpressureConfig::new(self.config.buffer_size, DropPolicy::DropOldest),
                Some(Arc::clone(&rig_metrics)),
            )
            .map_err(|e| CliError::pipeline_setup(e.to_string()))?;

        info!(
            mode = ?mode,
            max_frames = ?self.config.max_frames,
            timeout = ?self.config.timeout,
            "Pipeline running"
        );

        let mut aggregator = FrameMetricsAggregator::new();
        let tick = (frontend.config().watchdog_period() / 2).max(Duration::from_millis(10));
        let mut watchdog_tick = tokio::time::interval(tick);
        let deadline = async {
            match self.config.timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(deadline);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    warn!("Received shutdown signal, stopping pipeline...");
                    break;
                }
                _ = &mut deadline => {
                    warn!(timeout = ?self.config.timeout, "Pipeline timed out");
                    break;
                }
                event = events.recv() => {
                    let Ok(event) = event else {
                        info!("Rig exhausted");
                        break;
                    };
                    let dropped_before = frontend.stats().frames_dropped;
                    match frontend.process(event) {
                        Some(frame) => {
                            aggregator.update(&frame);
                            handoff.hand_off(frame);

                            if self
                                .config
                                .max_frames
                                .is_some_and(|max| frontend.stats().frames_emitted >= max)
                            {
                                info!(frames = frontend.stats().frames_emitted, "Reached max frames limit");
                                break;
                            }
                        }
                        None if frontend.stats().frames_dropped > dropped_before => {
                            if let Some(reason) = frontend.last_drop_reason() {
                                aggregator.record_drop(reason);
                            }
                        }
                        None => {}
                    }
                }
                _ = watchdog_tick.tick() => {
                    frontend.check_inputs(Instant::now());
                }
            }
        }

        info!("Shutting down pipeline...");
        rig.stop();
        drop(events);

        let handoff_dropped = handoff.dropped();
        drop(handoff);
        let sinks = match tokio::time::timeout(Duration::from_secs(5), dispatcher_handle).await {
            Ok(Ok(sinks)) => sinks,
            Ok(Err(e)) => {
                warn!(error = %e, "Dispatcher task failed");
                Vec::new()
            }
            Err(_) => {
                warn!("Dispatcher did not drain within 5s");
                Vec::new()
            }
        };

        let stats = PipelineStats {
            frontend: frontend.stats(),
            sync: frontend.sync_stats(),
            ingestion: Some(rig_metrics.snapshot()),
            frames: aggregator.summary(),
            handoff_dropped,
            watchdog_warnings: frontend.watchdog_warnings(),
            sinks,
            duration: start_time.elapsed(),
        };

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            fps = format!("{:.2}", stats.fps()),
            "Pipeline shutdown complete"
        );

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Location, SinkConfig, SinkType, StaticTransformConfig};
    use std::collections::HashMap;

    fn blueprint() -> IngestBlueprint {
        let mut blueprint = IngestBlueprint::default();
        blueprint.transforms.push(StaticTransformConfig {
            parent: "base_link".into(),
            child: "left_camera".into(),
            location: Location {
                x: 0.1,
                y: 0.0,
                z: 1.2,
            },
            rotation: Default::default(),
        });
        blueprint.source.rate_hz = 200.0;
        blueprint.source.width = 16;
        blueprint.source.height = 8;
        blueprint
    }

    fn config(blueprint: IngestBlueprint) -> PipelineConfig {
        PipelineConfig {
            blueprint,
            max_frames: None,
            timeout: Some(Duration::from_secs(10)),
            buffer_size: 64,
            metrics_port: None,
            seed: 7,
        }
    }

    #[tokio::test]
    async fn test_runs_until_rig_exhausted() {
        let mut bp = blueprint();
        bp.source.max_events = Some(5);

        let stats = Pipeline::new(config(bp))
            .run_until(std::future::pending())
            .await
            .unwrap();

        assert_eq!(stats.frontend.frames_emitted, 5);
        assert_eq!(stats.frames.total_frames, 5);
        assert_eq!(stats.sync.unwrap().groups_emitted, 5);
        assert!((stats.frames.baseline_m.mean - 0.12).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_packed_run_stops_at_max_frames() {
        let dir = tempfile::tempdir().unwrap();
        let mut bp = blueprint();
        bp.frontend.subscribe_rgbd = true;
        bp.sinks.push(SinkConfig {
            name: "disk".into(),
            sink_type: SinkType::File,
            queue_capacity: 16,
            params: HashMap::from([("base_path".into(), dir.path().display().to_string())]),
        });

        let mut cfg = config(bp);
        cfg.max_frames = Some(3);
        let stats = Pipeline::new(cfg)
            .run_until(std::future::pending())
            .await
            .unwrap();

        assert_eq!(stats.frontend.frames_emitted, 3);
        assert!(stats.sync.is_none());
        assert_eq!(stats.sinks.len(), 1);
        assert_eq!(stats.sinks[0].1.written, 3);
        assert!(dir.path().join("left/000002.png").exists());
    }

    #[tokio::test]
    async fn test_drop_reasons_reach_summary() {
        let mut bp = blueprint();
        bp.transforms.clear();
        bp.source.max_events = Some(4);

        let stats = Pipeline::new(config(bp))
            .run_until(std::future::pending())
            .await
            .unwrap();

        assert_eq!(stats.frontend.frames_emitted, 0);
        assert_eq!(stats.frames.total_dropped, 4);
        assert_eq!(
            stats.frames.dropped_by_reason.get("missing_reference_transform"),
            Some(&4)
        );
    }

    #[tokio::test]
    async fn test_shutdown_signal_stops_run() {
        let stats = Pipeline::new(config(blueprint()))
            .run_until(async {})
            .await
            .unwrap();
        assert_eq!(stats.frontend.frames_emitted, 0);
    }
}
