//! Bridge from the synchronous frontend to the dispatcher task

use contracts::{FrameHandoff, SensorFrame};
use tokio::sync::mpsc;
use tracing::warn;

/// [`FrameHandoff`] that queues frames for a running [`Dispatcher`](crate::Dispatcher).
///
/// Never blocks the caller: a full queue drops the frame.
#[derive(Debug, Clone)]
pub struct ChannelHandoff {
    tx: mpsc::Sender<SensorFrame>,
    dropped: u64,
}

impl ChannelHandoff {
    pub fn new(tx: mpsc::Sender<SensorFrame>) -> Self {
        Self { tx, dropped: 0 }
    }

    /// Channel pair sized `capacity`
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<SensorFrame>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(tx), rx)
    }

    /// Frames lost because the dispatcher queue was full or closed
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl FrameHandoff for ChannelHandoff {
    fn hand_off(&mut self, frame: SensorFrame) {
        if let Err(e) = self.tx.try_send(frame) {
            self.dropped += 1;
            let (reason, seq) = match &e {
                mpsc::error::TrySendError::Full(f) => ("full", f.seq),
                mpsc::error::TrySendError::Closed(f) => ("closed", f.seq),
            };
            warn!(seq, reason, "dispatcher queue rejected frame");
        }
    }
}
