//! Stereo front end configuration
//!
//! Shared by the config loader, the synchronizer and the frontend itself.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use validator::Validate;

/// Registration strategy parameter the downstream odometry must run with
pub const REG_STRATEGY_KEY: &str = "Reg/Strategy";

/// Only visual registration is meaningful for a stereo front end
pub const REG_STRATEGY_VISUAL: &str = "0";

/// Correlation policy of the four-stream synchronizer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPolicy {
    /// All four stamps must be identical
    #[default]
    Exact,
    /// Closest-stamp matching
    Approximate,
}

impl SyncPolicy {
    pub const fn as_str(self) -> &'static str {
        match self {
            SyncPolicy::Exact => "exact",
            SyncPolicy::Approximate => "approximate",
        }
    }
}

/// Everything needed to (re)build a synchronizer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncSettings {
    pub policy: SyncPolicy,

    /// Per-channel queue depth (>= 1)
    pub queue_size: usize,

    /// Approximate policy only: reject groups whose stamps spread wider
    pub max_interval: Option<Duration>,
}

impl SyncSettings {
    pub fn exact(queue_size: usize) -> Self {
        Self {
            policy: SyncPolicy::Exact,
            queue_size,
            max_interval: None,
        }
    }

    pub fn approximate(queue_size: usize) -> Self {
        Self {
            policy: SyncPolicy::Approximate,
            queue_size,
            max_interval: None,
        }
    }

    pub fn with_max_interval(mut self, max_interval: Duration) -> Self {
        self.max_interval = Some(max_interval);
        self
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self::exact(default_queue_size())
    }
}

/// Input topic names (informational, used in the subscription summary)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TopicConfig {
    #[validate(length(min = 1))]
    #[serde(default = "default_left_image")]
    pub left_image: String,

    #[validate(length(min = 1))]
    #[serde(default = "default_right_image")]
    pub right_image: String,

    #[validate(length(min = 1))]
    #[serde(default = "default_left_info")]
    pub left_info: String,

    #[validate(length(min = 1))]
    #[serde(default = "default_right_info")]
    pub right_info: String,

    #[validate(length(min = 1))]
    #[serde(default = "default_rgbd")]
    pub rgbd: String,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            left_image: default_left_image(),
            right_image: default_right_image(),
            left_info: default_left_info(),
            right_info: default_right_info(),
            rgbd: default_rgbd(),
        }
    }
}

fn default_left_image() -> String {
    "left/image_rect".to_string()
}

fn default_right_image() -> String {
    "right/image_rect".to_string()
}

fn default_left_info() -> String {
    "left/camera_info".to_string()
}

fn default_right_info() -> String {
    "right/camera_info".to_string()
}

fn default_rgbd() -> String {
    "rgbd_image".to_string()
}

/// Front end options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct FrontendConfig {
    /// Reference frame every emitted frame is expressed in
    #[validate(length(min = 1))]
    #[serde(default = "default_frame_id")]
    pub frame_id: String,

    /// Closest-stamp matching instead of exact matching
    #[serde(default)]
    pub approx_sync: bool,

    /// Seconds, 0 = unbounded
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub approx_sync_max_interval: f64,

    /// Per-channel queue depth
    #[validate(range(min = 1))]
    #[serde(default = "default_queue_size")]
    pub queue_size: usize,

    /// Consume packed stereo messages instead of four streams
    #[serde(default)]
    pub subscribe_rgbd: bool,

    /// Keep the left image in color (bgr8) when possible
    #[serde(default)]
    pub keep_color: bool,

    #[serde(default = "default_true")]
    pub already_rectified: bool,

    /// Seconds without a correlated event before warning
    #[validate(range(exclusive_min = 0.0))]
    #[serde(default = "default_watchdog_period")]
    pub watchdog_period_s: f64,

    #[validate(nested)]
    #[serde(default)]
    pub topics: TopicConfig,

    /// Parameters forwarded to the odometry engine
    #[serde(default)]
    pub odometry_parameters: HashMap<String, String>,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            frame_id: default_frame_id(),
            approx_sync: false,
            approx_sync_max_interval: 0.0,
            queue_size: default_queue_size(),
            subscribe_rgbd: false,
            keep_color: false,
            already_rectified: true,
            watchdog_period_s: default_watchdog_period(),
            topics: TopicConfig::default(),
            odometry_parameters: HashMap::new(),
        }
    }
}

impl FrontendConfig {
    pub fn sync_policy(&self) -> SyncPolicy {
        if self.approx_sync {
            SyncPolicy::Approximate
        } else {
            SyncPolicy::Exact
        }
    }

    /// Synchronizer settings derived from the options
    pub fn sync_settings(&self) -> SyncSettings {
        let max_interval = if self.approx_sync && self.approx_sync_max_interval > 0.0 {
            Duration::try_from_secs_f64(self.approx_sync_max_interval).ok()
        } else {
            None
        };

        SyncSettings {
            policy: self.sync_policy(),
            queue_size: self.queue_size.max(1),
            max_interval,
        }
    }

    pub fn watchdog_period(&self) -> Duration {
        Duration::try_from_secs_f64(self.watchdog_period_s)
            .unwrap_or_else(|_| Duration::from_secs_f64(default_watchdog_period()))
    }
}

fn default_frame_id() -> String {
    "base_link".to_string()
}

fn default_queue_size() -> usize {
    5
}

fn default_true() -> bool {
    true
}

fn default_watchdog_period() -> f64 {
    5.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = FrontendConfig::default();
        assert_eq!(cfg.frame_id, "base_link");
        assert_eq!(cfg.queue_size, 5);
        assert!(cfg.already_rectified);
        assert!(!cfg.approx_sync);
        assert_eq!(cfg.sync_settings(), SyncSettings::exact(5));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let cfg: FrontendConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, FrontendConfig::default());
    }

    #[test]
    fn test_max_interval_only_for_approximate() {
        let mut cfg = FrontendConfig {
            approx_sync_max_interval: 0.02,
            ..Default::default()
        };
        assert_eq!(cfg.sync_settings().max_interval, None);

        cfg.approx_sync = true;
        let settings = cfg.sync_settings();
        assert_eq!(settings.policy, SyncPolicy::Approximate);
        let max = settings.max_interval.unwrap();
        assert!((max.as_secs_f64() - 0.02).abs() < 1e-9);
    }

    #[test]
    fn test_zero_queue_rejected() {
        let cfg = FrontendConfig {
            queue_size: 0,
            ..Default::default()
        };
        let errors = cfg.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("queue_size"));
    }

    #[test]
    fn test_empty_topic_rejected() {
        let mut cfg = FrontendConfig::default();
        cfg.topics.left_info.clear();
        assert!(cfg.validate().is_err());
    }
}
