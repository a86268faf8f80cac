//! # Sync Engine
//!
//! Four-stream stereo input synchronizer.
//!
//! Responsibilities:
//! - Correlate left/right images with left/right calibration messages
//! - Exact (identical stamps) and approximate (nearest stamps) policies
//! - Bounded queue per channel, oldest dropped when full
//! - Emit `SyncGroup`
//!
//! ## Example
//!
//! ```ignore
//! use sync_engine::{FrameSynchronizer, SyncSettings};
//!
//! let mut sync = FrameSynchronizer::new(SyncSettings::approximate(5));
//!
//! // Push messages as they arrive
//! if let Some(group) = sync.push(message) {
//!     // Handle correlated stereo event
//! }
//! ```

mod approximate;
mod buffer;
mod engine;
mod exact;
mod tuple;

pub use buffer::{ChannelBuffer, PushOutcome};
pub use engine::{FrameSynchronizer, SynchronizerStats};

// Re-export contracts types
pub use contracts::{StreamChannel, StreamMessage, SyncGroup, SyncPolicy, SyncSettings};
