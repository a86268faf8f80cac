//! Mock 立体相机
//!
//! 用于无真实传输层环境的测试与演示。按固定频率生成左右图像及标定消息，
//! 可选择四路独立输出或打包输出。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_channel::Receiver;
use bytes::Bytes;
use contracts::{
    CameraInfo, CameraIntrinsics, Header, ImageEncoding, InputEvent, PackedStereoMessage,
    RawImageMessage, SourceConfig, StreamMessage, Timestamp,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::adapters::common::send_event;
use crate::config::{BackpressureConfig, IngestionMetrics};
use crate::error::{IngestionError, Result};

/// 生成的第一帧时间戳 (1 s)
const FIRST_STAMP_NANOS: u64 = 1_000_000_000;

/// 右图相对左图的水平像素位移
const MOCK_DISPARITY_PX: u32 = 4;

const SOURCE_NAME: &str = "mock_stereo_rig";

/// 输出形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RigMode {
    /// 四路独立消息 (左图、右图、左标定、右标定)
    #[default]
    FourStream,
    /// 每个事件一条打包消息
    Packed,
}

/// 确定性事件生成器
///
/// 相同的配置与种子总是生成相同的事件序列。
#[derive(Debug)]
pub struct StereoEventGenerator {
    config: SourceConfig,
    layout: ImageEncoding,
    period_nanos: u64,
    jitter_nanos: u64,
    rng: StdRng,
    tick: u64,
}

impl StereoEventGenerator {
    pub fn new(config: SourceConfig, seed: u64) -> Self {
        // 未知编码仍按 mono8 布局生成，交由下游拒绝
        let layout = ImageEncoding::from_name(&config.encoding).unwrap_or(ImageEncoding::Mono8);
        let period_nanos = if config.rate_hz.is_finite() && config.rate_hz > 0.0 {
            (1e9 / config.rate_hz).round() as u64
        } else {
            0
        };
        let jitter_nanos = (config.jitter_ms.max(0.0) * 1e6).round() as u64;
        Self {
            config,
            layout,
            period_nanos,
            jitter_nanos,
            rng: StdRng::seed_from_u64(seed),
            tick: 0,
        }
    }

    /// 已生成的事件数
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    /// 下一个事件的四路消息，按 左图、右图、左标定、右标定 顺序
    pub fn next_four_stream(&mut self) -> [InputEvent; 4] {
        let (left_image, right_image, left_info, right_info) = self.next_parts();
        [
            StreamMessage::LeftImage(left_image).into(),
            StreamMessage::RightImage(right_image).into(),
            StreamMessage::LeftInfo(left_info).into(),
            StreamMessage::RightInfo(right_info).into(),
        ]
    }

    /// 下一个事件的打包消息，头部使用左图时间戳
    pub fn next_packed(&mut self) -> InputEvent {
        let (left_image, right_image, left_info, right_info) = self.next_parts();
        PackedStereoMessage {
            header: Header::new(
                left_image.header.stamp,
                self.config.packed_frame.as_str(),
            ),
            left_image,
            right_image,
            left_info,
            right_info,
        }
        .into()
    }

    /// 按模式生成下一个事件
    pub fn next_events(&mut self, mode: RigMode) -> Vec<InputEvent> {
        match mode {
            RigMode::FourStream => self.next_four_stream().into(),
            RigMode::Packed => vec![self.next_packed()],
        }
    }

    fn next_parts(&mut self) -> (RawImageMessage, RawImageMessage, CameraInfo, CameraInfo) {
        let left_stamp =
            Timestamp::from_nanos(FIRST_STAMP_NANOS + self.tick * self.period_nanos);
        let right_stamp = if self.jitter_nanos > 0 {
            Timestamp::from_nanos(
                left_stamp.as_nanos() + self.rng.random_range(0..=self.jitter_nanos),
            )
        } else {
            left_stamp
        };
        let phase = (self.tick % 256) as u32;
        self.tick += 1;

        let left_header = Header::new(left_stamp, self.config.left_frame.as_str());
        let right_header = Header::new(right_stamp, self.config.right_frame.as_str());

        let left_image = self.image(left_header.clone(), phase, 0);
        let right_image = self.image(right_header.clone(), phase, MOCK_DISPARITY_PX);

        let left_intrinsics = self.intrinsics();
        let right_intrinsics =
            left_intrinsics.with_tx(-self.config.focal_px * self.config.baseline_m);

        (
            left_image,
            right_image,
            CameraInfo::new(left_header, left_intrinsics),
            CameraInfo::new(right_header, right_intrinsics),
        )
    }

    fn intrinsics(&self) -> CameraIntrinsics {
        let width = self.config.width;
        let height = self.config.height;
        let focal_px = self.config.focal_px;
        CameraIntrinsics::new(
            focal_px,
            focal_px,
            f64::from(width) / 2.0,
            f64::from(height) / 2.0,
            width,
            height,
        )
    }

    /// 斜向渐变图，`shift` 模拟视差
    fn image(&self, header: Header, phase: u32, shift: u32) -> RawImageMessage {
        let width = self.config.width;
        let height = self.config.height;
        let bpp = self.layout.bytes_per_pixel() as usize;

        let mut data = Vec::with_capacity(width as usize * height as usize * bpp);
        for y in 0..height {
            for x in 0..width {
                let value = ((x + shift + y * 2 + phase) % 256) as u8;
                data.extend(std::iter::repeat_n(value, bpp));
            }
        }

        RawImageMessage {
            header,
            width,
            height,
            encoding: self.config.encoding.clone(),
            is_bigendian: false,
            step: width * bpp as u32,
            data: Bytes::from(data),
        }
    }
}

/// Mock 立体相机源
pub struct MockStereoRig {
    config: SourceConfig,
    mode: RigMode,
    seed: u64,
    running: Arc<AtomicBool>,
}

impl MockStereoRig {
    pub fn new(config: SourceConfig, mode: RigMode) -> Self {
        Self {
            config,
            mode,
            seed: 0,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 设置随机种子 (仅影响右图时间抖动)
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn mode(&self) -> RigMode {
        self.mode
    }

    /// 启动生成任务，返回事件接收端
    ///
    /// 达到 `max_events` 或调用 [`MockStereoRig::stop`] 后发送端关闭。
    ///
    /// # Errors
    /// 频率不可用或源已在运行时返回错误
    pub fn start(
        &self,
        backpressure: BackpressureConfig,
        metrics: Option<Arc<IngestionMetrics>>,
    ) -> Result<Receiver<InputEvent>> {
        if !self.config.rate_hz.is_finite() || self.config.rate_hz <= 0.0 {
            return Err(IngestionError::InvalidSource {
                message: format!("rate_hz must be positive, got {}", self.config.rate_hz),
            });
        }
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(IngestionError::AlreadyRunning {
                source_name: SOURCE_NAME.to_string(),
            });
        }

        let (tx, rx) = async_channel::bounded(backpressure.channel_capacity.max(1));
        let metrics = metrics.unwrap_or_else(|| Arc::new(IngestionMetrics::new()));
        let running = self.running.clone();
        let mode = self.mode;
        let max_events = self.config.max_events;
        let interval = Duration::from_secs_f64(1.0 / self.config.rate_hz);
        let mut generator = StereoEventGenerator::new(self.config.clone(), self.seed);

        tokio::spawn(async move {
            debug!(
                source = SOURCE_NAME,
                mode = ?mode,
                interval_ms = interval.as_secs_f64() * 1000.0,
                "mock stereo rig started"
            );

            'outer: while running.load(Ordering::Relaxed) {
                if max_events.is_some_and(|max| generator.ticks() >= max) {
                    break;
                }
                for event in generator.next_events(mode) {
                    if !send_event(&tx, event, &metrics, SOURCE_NAME, backpressure.drop_policy) {
                        break 'outer;
                    }
                }
                trace!(source = SOURCE_NAME, tick = generator.ticks(), "mock event sent");
                tokio::time::sleep(interval).await;
            }

            running.store(false, Ordering::SeqCst);
            debug!(
                source = SOURCE_NAME,
                events = generator.ticks(),
                "mock stereo rig stopped"
            );
        });

        Ok(rx)
    }

    /// 停止生成
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// 检查是否正在运行
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DropPolicy;

    fn config() -> SourceConfig {
        SourceConfig {
            width: 8,
            height: 4,
            rate_hz: 1000.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_generator_four_stream_order_and_calibration() {
        let mut generator = StereoEventGenerator::new(config(), 7);
        let events = generator.next_four_stream();

        let InputEvent::Stream(StreamMessage::LeftImage(left)) = &events[0] else {
            panic!("expected left image first");
        };
        assert_eq!(left.header.frame_id, "left_camera");
        assert_eq!(left.data.len(), 32);
        assert_eq!(left.header.stamp, Timestamp::from_nanos(FIRST_STAMP_NANOS));

        let InputEvent::Stream(StreamMessage::RightInfo(info)) = &events[3] else {
            panic!("expected right info last");
        };
        // 50 px focal, 0.12 m baseline
        assert!((info.intrinsics.tx + 6.0).abs() < 1e-9);
        assert_eq!(info.intrinsics.cx, 4.0);
    }

    #[test]
    fn test_generator_is_deterministic() {
        let cfg = SourceConfig {
            jitter_ms: 3.0,
            ..config()
        };
        let mut a = StereoEventGenerator::new(cfg.clone(), 42);
        let mut b = StereoEventGenerator::new(cfg, 42);
        for _ in 0..10 {
            assert_eq!(a.next_four_stream(), b.next_four_stream());
        }
    }

    #[test]
    fn test_jitter_stays_in_range() {
        let cfg = SourceConfig {
            jitter_ms: 2.0,
            ..config()
        };
        let mut generator = StereoEventGenerator::new(cfg, 1);
        for _ in 0..50 {
            let events = generator.next_four_stream();
            let (InputEvent::Stream(left), InputEvent::Stream(right)) = (&events[0], &events[1])
            else {
                panic!("expected stream events");
            };
            let skew = right.stamp().as_nanos() - left.stamp().as_nanos();
            assert!(skew <= 2_000_000);
        }
    }

    #[test]
    fn test_packed_header_uses_packed_frame() {
        let mut generator = StereoEventGenerator::new(config(), 0);
        generator.next_packed();
        let InputEvent::Packed(message) = generator.next_packed() else {
            panic!("expected packed event");
        };
        assert_eq!(message.header.frame_id, "stereo_camera");
        assert_eq!(message.header.stamp, message.left_image.header.stamp);
        assert_eq!(generator.ticks(), 2);
    }

    #[test]
    fn test_mono16_layout() {
        let cfg = SourceConfig {
            encoding: "mono16".to_string(),
            ..config()
        };
        let mut generator = StereoEventGenerator::new(cfg, 0);
        let InputEvent::Packed(message) = generator.next_packed() else {
            panic!("expected packed event");
        };
        assert_eq!(message.left_image.step, 16);
        assert_eq!(message.left_image.data.len(), 64);
    }

    #[tokio::test]
    async fn test_rig_stops_after_max_events() {
        let cfg = SourceConfig {
            max_events: Some(3),
            ..config()
        };
        let rig = MockStereoRig::new(cfg, RigMode::Packed);
        let rx = rig
            .start(BackpressureConfig::new(16, DropPolicy::DropNewest), None)
            .unwrap();

        let mut received = 0;
        while rx.recv().await.is_ok() {
            received += 1;
        }
        assert_eq!(received, 3);
        assert!(!rig.is_running());
    }

    #[tokio::test]
    async fn test_rig_rejects_second_start() {
        let rig = MockStereoRig::new(config(), RigMode::FourStream);
        let rx = rig.start(BackpressureConfig::default(), None).unwrap();
        let err = rig.start(BackpressureConfig::default(), None).unwrap_err();
        assert!(matches!(err, IngestionError::AlreadyRunning { .. }));

        assert!(matches!(
            rx.recv().await.unwrap(),
            InputEvent::Stream(StreamMessage::LeftImage(_))
        ));
        rig.stop();
    }

    #[test]
    fn test_rig_rejects_zero_rate() {
        let cfg = SourceConfig {
            rate_hz: 0.0,
            ..config()
        };
        let rig = MockStereoRig::new(cfg, RigMode::FourStream);
        let err = rig.start(BackpressureConfig::default(), None).unwrap_err();
        assert!(matches!(err, IngestionError::InvalidSource { .. }));
    }
}
