//! Unified stereo front end.
//!
//! One owner for every per-event stage: input adapter (and its
//! synchronizer), encoding check, reference transform, calibration,
//! normalization and emission. Each event is handled completely inside a
//! single call; a failure drops that event only.

use std::collections::HashMap;
use std::time::Instant;

use calibration::StereoCalibrationResolver;
use contracts::{
    FrameError, FrameHandoff, FrontendConfig, InputEvent, SensorFrame, SyncGroup, SyncPolicy,
    SyncSettings, TransformResolver,
};
use imaging::{EncodingValidator, ImageNormalizer};
use ingestion::{FourStreamAdapter, InputAdapter, PackedMessageAdapter};
use sync_engine::SynchronizerStats;
use tracing::{debug, error, info, instrument, warn};

use crate::emitter::FrameEmitter;
use crate::params::enforce_visual_registration;
use crate::watchdog::InputWatchdog;

/// Event counters of one front end
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrontendStats {
    /// Input events offered to `process`
    pub events: u64,
    /// Events refused by the input adapter
    pub rejected_events: u64,
    /// Correlated groups
    pub groups: u64,
    pub frames_emitted: u64,
    pub frames_dropped: u64,
    /// Groups acknowledged while paused
    pub paused_drops: u64,
}

/// Stereo ingestion front end, generic over the transform collaborator
pub struct StereoFrontend<R> {
    config: FrontendConfig,
    adapter: Box<dyn InputAdapter>,
    validator: EncodingValidator,
    resolver: StereoCalibrationResolver,
    normalizer: ImageNormalizer,
    emitter: FrameEmitter,
    transforms: R,
    watchdog: InputWatchdog,
    odometry_parameters: HashMap<String, String>,
    paused: bool,
    stats: FrontendStats,
    last_drop: Option<&'static str>,
}

impl<R: TransformResolver> StereoFrontend<R> {
    /// Build with the adapter selected by `subscribe_rgbd`
    pub fn new(config: FrontendConfig, transforms: R) -> Self {
        let adapter: Box<dyn InputAdapter> = if config.subscribe_rgbd {
            Box::new(PackedMessageAdapter::new())
        } else {
            Box::new(FourStreamAdapter::new(config.sync_settings()))
        };
        Self::with_adapter(config, adapter, transforms)
    }

    pub fn with_adapter(
        config: FrontendConfig,
        adapter: Box<dyn InputAdapter>,
        transforms: R,
    ) -> Self {
        let mut odometry_parameters = config.odometry_parameters.clone();
        enforce_visual_registration(&mut odometry_parameters);

        let frontend = Self {
            validator: EncodingValidator::new(),
            resolver: StereoCalibrationResolver::new(),
            normalizer: ImageNormalizer::new(config.keep_color),
            emitter: FrameEmitter::new(config.frame_id.as_str()),
            watchdog: InputWatchdog::new(config.watchdog_period(), Instant::now()),
            odometry_parameters,
            adapter,
            transforms,
            paused: false,
            stats: FrontendStats::default(),
            last_drop: None,
            config,
        };

        info!(
            frame_id = %frontend.config.frame_id,
            approx_sync = frontend.config.approx_sync,
            queue_size = frontend.config.queue_size,
            subscribe_rgbd = frontend.config.subscribe_rgbd,
            keep_color = frontend.config.keep_color,
            already_rectified = frontend.config.already_rectified,
            "stereo front end created"
        );
        info!("{}", frontend.subscription_summary());
        frontend
    }

    /// Offer one input event; returns the frame when the event completes a
    /// correlated group and survives every check
    pub fn process(&mut self, event: InputEvent) -> Option<SensorFrame> {
        self.stats.events += 1;

        let group = match self.adapter.accept(event) {
            Ok(Some(group)) => group,
            Ok(None) => return None,
            Err(e) => {
                self.stats.rejected_events += 1;
                warn!(adapter = self.adapter.name(), error = %e, "input event rejected");
                return None;
            }
        };

        self.stats.groups += 1;
        self.watchdog.feed(Instant::now());

        if self.paused {
            self.stats.paused_drops += 1;
            debug!(stamp = %group.resolved_stamp(), "paused, stereo event dropped");
            return None;
        }

        match self.process_group(group) {
            Ok(frame) => {
                self.stats.frames_emitted += 1;
                observability::record_frame_emitted(&frame);
                Some(frame)
            }
            Err(e) => {
                self.stats.frames_dropped += 1;
                self.last_drop = Some(e.reason());
                observability::record_frame_dropped(e.reason());
                match &e {
                    FrameError::EmptyImagePayload { .. }
                    | FrameError::MissingReferenceTransform { .. } => {
                        warn!(reason = e.reason(), error = %e, "stereo event dropped");
                    }
                    _ => error!(reason = e.reason(), error = %e, "stereo event dropped"),
                }
                None
            }
        }
    }

    /// Turn one correlated group into a frame
    ///
    /// # Errors
    /// Any [`FrameError`]; nothing is emitted in that case
    #[instrument(
        level = "debug",
        name = "frontend_process_group",
        skip_all,
        fields(stamp = %group.resolved_stamp())
    )]
    pub fn process_group(&mut self, group: SyncGroup) -> Result<SensorFrame, FrameError> {
        let (left_encoding, right_encoding) = self
            .validator
            .validate_pair(&group.left_image, &group.right_image)?;

        let local_transform = self.emitter.local_transform(&group, &self.transforms)?;

        self.validator.check_payload(
            (&group.left_image, left_encoding),
            (&group.right_image, right_encoding),
        )?;

        let calibration = self.resolver.resolve(
            &group.left_info,
            &group.right_info,
            local_transform,
            self.config.already_rectified,
            &self.transforms,
        )?;

        let empty_payload = |_| FrameError::EmptyImagePayload {
            left_bytes: group.left_image.data.len(),
            right_bytes: group.right_image.data.len(),
        };
        let left = self
            .normalizer
            .normalize_left(&group.left_image, left_encoding)
            .map_err(empty_payload)?;
        let right = self
            .normalizer
            .normalize_right(&group.right_image, right_encoding)
            .map_err(empty_payload)?;

        observability::record_stamp_skew(group.image_skew_nanos());
        let frame = self.emitter.emit(&group, calibration, left, right);
        debug!(
            seq = frame.seq,
            baseline = frame.calibration.baseline,
            "sensor frame emitted"
        );
        Ok(frame)
    }

    /// Process and hand any produced frame downstream; `true` if one was
    pub fn dispatch<H: FrameHandoff + ?Sized>(
        &mut self,
        event: InputEvent,
        handoff: &mut H,
    ) -> bool {
        match self.process(event) {
            Some(frame) => {
                handoff.hand_off(frame);
                true
            }
            None => false,
        }
    }

    /// Stop emitting; correlated events are still counted
    pub fn pause(&mut self) {
        if !self.paused {
            info!("stereo front end paused");
        }
        self.paused = true;
    }

    pub fn resume(&mut self) {
        if self.paused {
            info!("stereo front end resumed");
        }
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Rebuild the synchronizer, discarding unmatched messages
    pub fn reconfigure(&mut self, settings: SyncSettings) {
        self.config.approx_sync = settings.policy == SyncPolicy::Approximate;
        self.config.queue_size = settings.queue_size;
        self.config.approx_sync_max_interval = settings
            .max_interval
            .map_or(0.0, |interval| interval.as_secs_f64());
        self.adapter.reconfigure(settings);
    }

    /// Warn if no correlated event arrived for the watchdog period;
    /// returns whether a warning was issued
    pub fn check_inputs(&mut self, now: Instant) -> bool {
        if !self.watchdog.check(now) {
            return false;
        }
        let hint = if self.config.subscribe_rgbd {
            "the packed stereo topic is not being published"
        } else if self.config.approx_sync {
            "topics are not published or their stamps are too far apart for approx_sync"
        } else {
            "with approx_sync=false all four topics must carry exactly the same stamp; \
             consider approx_sync=true if the cameras are not hardware synchronized"
        };
        warn!(
            period_s = self.watchdog.period().as_secs_f64(),
            received_any = self.watchdog.received_any(),
            "did not receive data since {:.1} s, {}{}",
            self.watchdog.period().as_secs_f64(),
            hint,
            self.subscription_summary()
        );
        true
    }

    /// Human readable list of subscribed topics and sync mode
    pub fn subscription_summary(&self) -> String {
        format!(
            "\nstereo front end subscribed to ({}):\n{}",
            self.adapter.name(),
            self.adapter.describe(&self.config.topics)
        )
    }

    pub fn config(&self) -> &FrontendConfig {
        &self.config
    }

    /// Parameters for the pose estimator, with visual registration enforced
    pub fn odometry_parameters(&self) -> &HashMap<String, String> {
        &self.odometry_parameters
    }

    pub fn stats(&self) -> FrontendStats {
        self.stats
    }

    /// Reason of the most recent dropped group
    pub fn last_drop_reason(&self) -> Option<&'static str> {
        self.last_drop
    }

    /// "No data" warnings issued so far
    pub fn watchdog_warnings(&self) -> u64 {
        self.watchdog.warnings()
    }

    pub fn sync_stats(&self) -> Option<SynchronizerStats> {
        self.adapter.sync_stats()
    }

    pub fn resolver(&self) -> &StereoCalibrationResolver {
        &self.resolver
    }

    pub fn emitter(&self) -> &FrameEmitter {
        &self.emitter
    }

    pub fn transforms(&self) -> &R {
        &self.transforms
    }
}
