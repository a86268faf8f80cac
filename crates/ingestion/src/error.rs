//! Ingestion 错误类型

use thiserror::Error;

/// Ingestion 错误
#[derive(Debug, Error)]
pub enum IngestionError {
    /// 输入事件与适配器类型不符
    #[error("{adapter} adapter cannot accept {received} events")]
    UnexpectedEvent {
        /// 适配器名称
        adapter: &'static str,
        /// 收到的事件类型
        received: &'static str,
    },

    /// 通道已关闭
    #[error("channel closed for source {source_name}")]
    ChannelClosed {
        /// 输入源名称
        source_name: String,
    },

    /// 输入源已在运行
    #[error("source {source_name} is already running")]
    AlreadyRunning {
        /// 输入源名称
        source_name: String,
    },

    /// 输入源配置不可用
    #[error("invalid source configuration: {message}")]
    InvalidSource {
        /// 错误消息
        message: String,
    },
}

/// Ingestion Result 类型别名
pub type Result<T> = std::result::Result<T, IngestionError>;
