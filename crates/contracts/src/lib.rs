//! # Contracts
//!
//! Frozen interface contracts, defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Message stamps are integer nanoseconds ([`Timestamp`]), compared exactly
//! - An emitted frame carries the later of its two image stamps

mod blueprint;
mod camera;
mod error;
mod frame;
mod frame_id;
mod frontend_config;
mod image;
mod sink;
mod stream;
mod time;
mod transform;

pub use blueprint::*;
pub use camera::*;
pub use error::*;
pub use frame::*;
pub use frame_id::FrameId;
pub use frontend_config::*;
pub use image::*;
pub use sink::*;
pub use stream::*;
pub use time::*;
pub use transform::*;
