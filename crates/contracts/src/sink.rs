//! Output interfaces of the front end
//!
//! Frames leave the front end through a synchronous [`FrameHandoff`]; the
//! dispatcher side consumes them through asynchronous [`DataSink`]s.

use crate::{ContractError, SensorFrame};

/// Downstream collaborator receiving emitted frames, called once per frame
///
/// Runs on the front end's thread; implementations must not block.
pub trait FrameHandoff {
    fn hand_off(&mut self, frame: SensorFrame);
}

impl FrameHandoff for Vec<SensorFrame> {
    fn hand_off(&mut self, frame: SensorFrame) {
        self.push(frame);
    }
}

/// Frame consumer driven by the dispatcher
#[trait_variant::make(DataSink: Send)]
pub trait LocalDataSink {
    /// Used in logs and metric labels
    fn name(&self) -> &str;

    /// # Errors
    /// Write failure with the sink's context; the frame is lost for this
    /// sink only
    async fn write(&mut self, frame: &SensorFrame) -> Result<(), ContractError>;

    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Flush and release resources; no writes follow
    async fn close(&mut self) -> Result<(), ContractError>;
}

