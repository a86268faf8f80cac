//! # Dispatcher
//!
//! 立体帧分发模块。
//!
//! 负责：
//! - 消费前端输出的 `SensorFrame`
//! - Fan-out 到多个 sinks（日志 / 文件）
//! - 隔离慢 sink，不阻塞前端处理

pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod handoff;
pub mod metrics;
pub mod sinks;

pub use contracts::{DataSink, SensorFrame};
pub use dispatcher::{create_dispatcher, Dispatcher, DispatcherBuilder, DispatcherConfig};
pub use error::DispatcherError;
pub use handle::SinkHandle;
pub use handoff::ChannelHandoff;
pub use metrics::{SinkMetrics, SinkSnapshot};
pub use sinks::{FileSink, FileSinkConfig, LogSink};

#[cfg(test)]
pub(crate) mod testing {
    use contracts::{
        CameraIntrinsics, NormalizedEncoding, NormalizedImage, RigidTransform, SensorFrame,
        StereoCalibration, Timestamp,
    };

    /// 2x2 frame: bgr8 left, mono8 right
    pub fn frame(seq: u64) -> SensorFrame {
        SensorFrame {
            seq,
            stamp: Timestamp::from_nanos(1_000_000_000 + seq * 50_000_000),
            frame_id: "base_link".into(),
            sensor_frame_id: "left_camera".into(),
            left: NormalizedImage {
                width: 2,
                height: 2,
                encoding: NormalizedEncoding::Bgr8,
                data: vec![0, 0, 255, 0, 255, 0, 255, 0, 0, 10, 20, 30].into(),
            },
            right: NormalizedImage {
                width: 2,
                height: 2,
                encoding: NormalizedEncoding::Mono8,
                data: vec![0, 64, 128, 255].into(),
            },
            calibration: StereoCalibration::rectified(
                CameraIntrinsics::new(500.0, 500.0, 1.0, 1.0, 2, 2),
                0.12,
                RigidTransform::from_translation(0.0, 0.0, 1.0),
            ),
        }
    }
}
