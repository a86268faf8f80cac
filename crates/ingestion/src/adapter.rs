//! 输入适配器 trait

use contracts::{InputEvent, SyncGroup, SyncSettings, TopicConfig};
use sync_engine::SynchronizerStats;

use crate::error::Result;

/// 输入适配器 trait
///
/// 两种输入方式都产出相同的 `SyncGroup`：
/// 1. 四路独立消息，经同步器关联
/// 2. 打包的立体消息，直接拆包
pub trait InputAdapter: Send {
    /// 适配器名称 (用于日志/指标)
    fn name(&self) -> &'static str;

    /// 接收一个输入事件，关联完成时返回 `SyncGroup`
    ///
    /// # Errors
    /// 事件类型与适配器不符时返回 `UnexpectedEvent`
    fn accept(&mut self, event: InputEvent) -> Result<Option<SyncGroup>>;

    /// 重建同步状态，丢弃未匹配的消息
    fn reconfigure(&mut self, _settings: SyncSettings) {}

    /// 同步器统计 (无同步器时为 None)
    fn sync_stats(&self) -> Option<SynchronizerStats> {
        None
    }

    /// 订阅说明 (人类可读)
    fn describe(&self, topics: &TopicConfig) -> String;
}

/// 事件类型名称
pub(crate) fn event_kind(event: &InputEvent) -> &'static str {
    match event {
        InputEvent::Stream(_) => "four-stream",
        InputEvent::Packed(_) => "packed",
    }
}
