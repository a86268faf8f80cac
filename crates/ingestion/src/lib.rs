//! # Ingestion
//!
//! 立体输入接入模块。
//!
//! 负责：
//! - 两种输入形式 (四路独立消息 / 打包消息) 统一为 `SyncGroup`
//! - 四路输入经 `FrameSynchronizer` 关联
//! - 背压管理与丢弃策略
//! - Mock 立体相机 (无真实传输层时使用)
//!
//! ## 使用示例
//!
//! ```ignore
//! use ingestion::{BackpressureConfig, FourStreamAdapter, InputAdapter, MockStereoRig, RigMode};
//! use contracts::{SourceConfig, SyncSettings};
//!
//! let rig = MockStereoRig::new(SourceConfig::default(), RigMode::FourStream);
//! let rx = rig.start(BackpressureConfig::default(), None)?;
//!
//! let mut adapter = FourStreamAdapter::new(SyncSettings::approximate(5));
//! while let Ok(event) = rx.recv().await {
//!     if let Some(group) = adapter.accept(event)? {
//!         // 交给前端处理
//!     }
//! }
//! ```

mod adapter;
pub mod adapters;
mod config;
mod error;
mod mock;

// Re-exports
pub use adapter::InputAdapter;
pub use adapters::{FourStreamAdapter, PackedMessageAdapter};
pub use config::{BackpressureConfig, DropPolicy, IngestionMetrics, MetricsSnapshot};
pub use contracts::{InputEvent, SyncGroup};
pub use error::{IngestionError, Result};
pub use mock::{MockStereoRig, RigMode, StereoEventGenerator};
pub use sync_engine::SynchronizerStats;
