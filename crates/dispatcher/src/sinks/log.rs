//! LogSink - one tracing line per frame (or per `every` frames)

use std::collections::HashMap;

use contracts::{ContractError, DataSink, SensorFrame};
use tracing::{debug, info, instrument};

/// Sink that logs frame summaries for inspection
pub struct LogSink {
    name: String,
    /// Log every n-th frame; the rest only count
    every: u64,
    received: u64,
    unrectified: u64,
}

impl LogSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            every: 1,
            received: 0,
            unrectified: 0,
        }
    }

    /// Reads `every` (default 1; 0 is treated as 1)
    pub fn from_params(name: impl Into<String>, params: &HashMap<String, String>) -> Self {
        let every = params
            .get("every")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(1)
            .max(1);
        Self {
            every,
            ..Self::new(name)
        }
    }

    pub fn received(&self) -> u64 {
        self.received
    }

    fn log_frame_summary(&self, frame: &SensorFrame) {
        info!(
            sink = %self.name,
            seq = frame.seq,
            stamp = %frame.stamp,
            frame_id = %frame.frame_id,
            sensor_frame_id = %frame.sensor_frame_id,
            baseline = frame.calibration.baseline,
            rectified = frame.calibration.rectified,
            left = ?frame.left.encoding,
            right = ?frame.right.encoding,
            size = %format_args!("{}x{}", frame.left.width, frame.left.height),
            "SensorFrame received"
        );
    }
}

impl DataSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_write",
        skip(self, frame),
        fields(sink = %self.name, seq = frame.seq)
    )]
    async fn write(&mut self, frame: &SensorFrame) -> Result<(), ContractError> {
        if (self.received % self.every) == 0 {
            self.log_frame_summary(frame);
        } else {
            debug!(seq = frame.seq, "frame counted");
        }
        self.received += 1;
        if !frame.calibration.rectified {
            self.unrectified += 1;
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(
            sink = %self.name,
            frames = self.received,
            unrectified = self.unrectified,
            "LogSink closed"
        );
        Ok(())
    }
}
