//! 立体前端指标收集模块
//!
//! 记录同步、丢帧、基线与时间戳偏差等运行指标。

use std::collections::HashMap;

use contracts::{SensorFrame, StreamChannel, SyncPolicy};
use metrics::{
    counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit,
};

/// 向已安装的导出器登记指标说明
pub fn describe_metrics() {
    describe_counter!(
        "stereo_frames_emitted_total",
        Unit::Count,
        "Sensor frames produced by the front end"
    );
    describe_counter!(
        "stereo_frames_dropped_total",
        Unit::Count,
        "Correlated events dropped, by reason"
    );
    describe_gauge!("stereo_last_frame_seq", "Sequence number of the last emitted frame");
    describe_histogram!("stereo_baseline_m", "Resolved stereo baseline in metres");
    describe_histogram!(
        "stereo_stamp_skew_ms",
        Unit::Milliseconds,
        "Left/right image stamp difference of emitted frames"
    );
    describe_counter!(
        "stereo_calibration_warnings_total",
        Unit::Count,
        "Calibration anomalies, counted on every occurrence"
    );
    describe_counter!(
        "stereo_sync_groups_total",
        Unit::Count,
        "Groups formed by the synchronizer"
    );
    describe_counter!(
        "stereo_sync_dropped_total",
        Unit::Count,
        "Messages discarded by the synchronizer, by channel"
    );
    describe_counter!(
        "stereo_messages_received_total",
        Unit::Count,
        "Stream messages offered to the synchronizer, by channel"
    );
    describe_gauge!("stereo_sync_queue_depth", "Pending messages per synchronizer channel");
    describe_counter!(
        "stereo_frames_dispatched_total",
        Unit::Count,
        "Frames written by sinks, by status"
    );
}

/// 记录一帧输出
///
/// 每次产生 SensorFrame 时调用。
pub fn record_frame_emitted(frame: &SensorFrame) {
    counter!("stereo_frames_emitted_total").increment(1);

    // 序号 (用于检测跳帧)
    gauge!("stereo_last_frame_seq").set(frame.seq as f64);

    histogram!("stereo_baseline_m").record(frame.calibration.baseline);

    let rectified = if frame.calibration.rectified {
        "true"
    } else {
        "false"
    };
    counter!("stereo_frames_by_rectification_total", "rectified" => rectified).increment(1);
}

/// 记录一次丢帧及原因
pub fn record_frame_dropped(reason: &'static str) {
    counter!("stereo_frames_dropped_total", "reason" => reason).increment(1);
}

/// 记录左右图像时间戳偏差
pub fn record_stamp_skew(skew_nanos: u64) {
    histogram!("stereo_stamp_skew_ms").record(skew_nanos as f64 / 1_000_000.0);
}

/// 记录标定告警 (每次出现都计数，日志只打印一次)
pub fn record_calibration_warning(kind: &'static str) {
    counter!("stereo_calibration_warnings_total", "kind" => kind).increment(1);
}

/// 记录同步器输出的一组消息
pub fn record_sync_group(policy: SyncPolicy) {
    counter!("stereo_sync_groups_total", "policy" => policy.as_str()).increment(1);
}

/// 记录同步器丢弃的消息
pub fn record_sync_dropped(channel: StreamChannel, count: u64) {
    if count == 0 {
        return;
    }
    counter!("stereo_sync_dropped_total", "channel" => channel.as_str()).increment(count);
}

/// 记录消息接收
pub fn record_message_received(channel: StreamChannel) {
    counter!("stereo_messages_received_total", "channel" => channel.as_str()).increment(1);
}

/// 记录同步队列深度
pub fn record_queue_depth(channel: StreamChannel, depth: usize) {
    gauge!("stereo_sync_queue_depth", "channel" => channel.as_str()).set(depth as f64);
}

/// 记录帧分发
pub fn record_frame_dispatched(sink_name: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "stereo_frames_dispatched_total",
        "sink" => sink_name.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// 输出帧指标聚合器
///
/// 在内存中聚合指标，便于统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct FrameMetricsAggregator {
    /// 输出帧数
    pub total_frames: u64,

    /// 丢帧总数
    pub total_dropped: u64,

    /// 序号跳变次数
    pub sequence_gaps: u64,

    /// 未校正帧数
    pub unrectified_frames: u64,

    /// 基线统计 (米)
    pub baseline_stats: RunningStats,

    /// 相邻帧间隔统计 (毫秒)
    pub interval_stats: RunningStats,

    /// 各原因丢帧次数
    pub dropped_by_reason: HashMap<String, u64>,

    last_seq: Option<u64>,
    last_stamp_nanos: Option<u64>,
}

impl FrameMetricsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新输出帧统计
    pub fn update(&mut self, frame: &SensorFrame) {
        self.total_frames += 1;

        if let Some(last) = self.last_seq {
            if frame.seq != last + 1 {
                self.sequence_gaps += 1;
            }
        }
        self.last_seq = Some(frame.seq);

        let stamp = frame.stamp.as_nanos();
        if let Some(last) = self.last_stamp_nanos {
            self.interval_stats
                .push(stamp.saturating_sub(last) as f64 / 1_000_000.0);
        }
        self.last_stamp_nanos = Some(stamp);

        if !frame.calibration.rectified {
            self.unrectified_frames += 1;
        }
        self.baseline_stats.push(frame.calibration.baseline);
    }

    /// 更新丢帧统计
    pub fn record_drop(&mut self, reason: &str) {
        self.total_dropped += 1;
        *self
            .dropped_by_reason
            .entry(reason.to_string())
            .or_insert(0) += 1;
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        let attempts = self.total_frames + self.total_dropped;
        MetricsSummary {
            total_frames: self.total_frames,
            total_dropped: self.total_dropped,
            sequence_gaps: self.sequence_gaps,
            unrectified_frames: self.unrectified_frames,
            drop_rate: if attempts > 0 {
                self.total_dropped as f64 / attempts as f64 * 100.0
            } else {
                0.0
            },
            baseline_m: StatsSummary::from(&self.baseline_stats),
            frame_interval_ms: StatsSummary::from(&self.interval_stats),
            dropped_by_reason: self.dropped_by_reason.clone(),
        }
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_frames: u64,
    pub total_dropped: u64,
    pub sequence_gaps: u64,
    pub unrectified_frames: u64,
    pub drop_rate: f64,
    pub baseline_m: StatsSummary,
    pub frame_interval_ms: StatsSummary,
    pub dropped_by_reason: HashMap<String, u64>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Stereo Frame Summary ===")?;
        writeln!(f, "Emitted frames: {}", self.total_frames)?;
        writeln!(
            f,
            "Dropped events: {} ({:.2}%)",
            self.total_dropped, self.drop_rate
        )?;
        writeln!(f, "Sequence gaps: {}", self.sequence_gaps)?;
        writeln!(f, "Unrectified frames: {}", self.unrectified_frames)?;
        writeln!(f, "Baseline (m): {}", self.baseline_m)?;
        writeln!(f, "Frame interval (ms): {}", self.frame_interval_ms)?;

        if !self.dropped_by_reason.is_empty() {
            writeln!(f, "Drops by reason:")?;
            let mut reasons: Vec<_> = self.dropped_by_reason.iter().collect();
            reasons.sort();
            for (reason, count) in reasons {
                writeln!(f, "  {}: {}", reason, count)?;
            }
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
