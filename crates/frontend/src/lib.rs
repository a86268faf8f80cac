//! # Frontend
//!
//! Stereo ingestion front end: turns correlated left/right images and
//! calibration records into one [`SensorFrame`] per event.
//!
//! ```ignore
//! use calibration::StaticTransformTree;
//! use contracts::FrontendConfig;
//! use frontend::StereoFrontend;
//!
//! let mut frontend = StereoFrontend::new(FrontendConfig::default(), tree);
//! for event in events {
//!     if let Some(frame) = frontend.process(event) {
//!         // hand to the pose estimator
//!     }
//! }
//! ```

mod emitter;
mod params;
mod pipeline;
mod watchdog;

pub use emitter::FrameEmitter;
pub use params::enforce_visual_registration;
pub use pipeline::{FrontendStats, StereoFrontend};
pub use watchdog::InputWatchdog;

pub use contracts::{FrameHandoff, SensorFrame};
