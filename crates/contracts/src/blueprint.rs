//! IngestBlueprint - Config Loader output
//!
//! Describes a complete ingest setup: front end options, static transform
//! tree, input source and output routing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{FrontendConfig, RigidTransform};

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete ingest configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestBlueprint {
    #[serde(default)]
    pub version: ConfigVersion,

    /// Front end options
    #[serde(default)]
    pub frontend: FrontendConfig,

    /// Static parent -> child transforms
    #[serde(default)]
    pub transforms: Vec<StaticTransformConfig>,

    /// Synthetic input source
    #[serde(default)]
    pub source: SourceConfig,

    /// Output routing
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

/// One edge of the static transform tree: pose of `child` in `parent`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticTransformConfig {
    pub parent: String,

    pub child: String,

    /// Unit: metres
    #[serde(default)]
    pub location: Location,

    /// Unit: degrees
    #[serde(default)]
    pub rotation: Rotation,
}

impl StaticTransformConfig {
    pub fn to_rigid_transform(&self) -> RigidTransform {
        RigidTransform::from_xyz_rpy(
            self.location.x,
            self.location.y,
            self.location.z,
            self.rotation.roll.to_radians(),
            self.rotation.pitch.to_radians(),
            self.rotation.yaw.to_radians(),
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

/// Synthetic stereo rig used by the CLI and tests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_left_frame")]
    pub left_frame: String,

    #[serde(default = "default_right_frame")]
    pub right_frame: String,

    /// Header frame of packed messages
    #[serde(default = "default_packed_frame")]
    pub packed_frame: String,

    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    /// Declared pixel encoding of both images
    #[serde(default = "default_encoding")]
    pub encoding: String,

    /// Focal length in pixels
    #[serde(default = "default_focal")]
    pub focal_px: f64,

    /// Metres, written into the right camera's offset term
    #[serde(default = "default_baseline")]
    pub baseline_m: f64,

    #[serde(default = "default_rate_hz")]
    pub rate_hz: f64,

    /// Max random stamp offset of the right stream (ms)
    #[serde(default)]
    pub jitter_ms: f64,

    /// Stop after this many events (unbounded when absent)
    #[serde(default)]
    pub max_events: Option<u64>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            left_frame: default_left_frame(),
            right_frame: default_right_frame(),
            packed_frame: default_packed_frame(),
            width: default_width(),
            height: default_height(),
            encoding: default_encoding(),
            focal_px: default_focal(),
            baseline_m: default_baseline(),
            rate_hz: default_rate_hz(),
            jitter_ms: 0.0,
            max_events: None,
        }
    }
}

fn default_left_frame() -> String {
    "left_camera".to_string()
}

fn default_right_frame() -> String {
    "right_camera".to_string()
}

fn default_packed_frame() -> String {
    "stereo_camera".to_string()
}

fn default_width() -> u32 {
    64
}

fn default_height() -> u32 {
    48
}

fn default_encoding() -> String {
    "mono8".to_string()
}

fn default_focal() -> f64 {
    50.0
}

fn default_baseline() -> f64 {
    0.12
}

fn default_rate_hz() -> f64 {
    20.0
}

/// Sink output config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink name
    pub name: String,

    /// Sink type
    pub sink_type: SinkType,

    /// Queue capacity
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Type-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_queue_capacity() -> usize {
    100
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// Log output
    Log,
    /// Per-frame files on disk
    File,
}
