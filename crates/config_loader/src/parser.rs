//! 配置解析模块
//!
//! TOML 为主，JSON 可选；解析错误附带行号，便于定位。

use contracts::{ContractError, IngestBlueprint};

/// 配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML 格式 (推荐)
    Toml,
    /// JSON 格式
    Json,
}

impl ConfigFormat {
    /// 从文件扩展名推断格式
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// 无扩展名时按内容判断：以 `{` 开头视为 JSON
    pub fn sniff(content: &str) -> Self {
        if content.trim_start().starts_with('{') {
            Self::Json
        } else {
            Self::Toml
        }
    }
}

/// 字节偏移对应的行号 (从 1 开始)
fn line_of(content: &str, offset: usize) -> usize {
    content
        .get(..offset)
        .map_or(1, |prefix| prefix.matches('\n').count() + 1)
}

/// 根据格式解析配置
pub fn parse(content: &str, format: ConfigFormat) -> Result<IngestBlueprint, ContractError> {
    match format {
        ConfigFormat::Toml => toml::from_str(content).map_err(|e| {
            let location = e
                .span()
                .map(|span| format!(" (line {})", line_of(content, span.start)))
                .unwrap_or_default();
            ContractError::ConfigParse {
                message: format!("TOML parse error{location}: {}", e.message()),
                source: Some(Box::new(e)),
            }
        }),
        ConfigFormat::Json => serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
            message: format!("JSON parse error (line {}): {e}", e.line()),
            source: Some(Box::new(e)),
        }),
    }
}
