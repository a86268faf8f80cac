//! 配置校验模块
//!
//! 校验规则：
//! - frontend 数值范围 (validator derive)
//! - 静态变换树：frame 非空、child 不重复、无环
//! - 输入源参数合法
//! - sink 名称非空且唯一

use std::collections::{HashMap, HashSet};

use contracts::{ContractError, IngestBlueprint};
use validator::Validate;

/// 校验 IngestBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &IngestBlueprint) -> Result<(), ContractError> {
    validate_frontend(blueprint)?;
    validate_transforms(blueprint)?;
    validate_source(blueprint)?;
    validate_sinks(blueprint)?;
    Ok(())
}

/// 校验 frontend 选项
fn validate_frontend(blueprint: &IngestBlueprint) -> Result<(), ContractError> {
    blueprint.frontend.validate().map_err(|errors| {
        let field = errors
            .field_errors()
            .keys()
            .next()
            .map(|key| format!("frontend.{key}"))
            .unwrap_or_else(|| "frontend".to_string());
        ContractError::config_validation(field, errors.to_string())
    })
}

/// 校验静态变换树
fn validate_transforms(blueprint: &IngestBlueprint) -> Result<(), ContractError> {
    let mut parents: HashMap<&str, &str> = HashMap::new();

    for (idx, edge) in blueprint.transforms.iter().enumerate() {
        if edge.parent.is_empty() || edge.child.is_empty() {
            return Err(ContractError::config_validation(
                format!("transforms[{idx}]"),
                "parent and child frame ids cannot be empty",
            ));
        }
        if edge.parent == edge.child {
            return Err(ContractError::config_validation(
                format!("transforms[{idx}]"),
                format!("frame '{}' cannot be its own parent", edge.child),
            ));
        }
        if parents
            .insert(edge.child.as_str(), edge.parent.as_str())
            .is_some()
        {
            return Err(ContractError::config_validation(
                format!("transforms[child={}]", edge.child),
                "duplicate child frame, each frame has at most one parent",
            ));
        }
    }

    // 沿父链向上走，回到起点即为环
    for start in parents.keys() {
        let mut visited = HashSet::from([*start]);
        let mut current = *start;
        while let Some(parent) = parents.get(current) {
            if !visited.insert(*parent) {
                return Err(ContractError::config_validation(
                    format!("transforms[child={start}]"),
                    format!("transform cycle through frame '{parent}'"),
                ));
            }
            current = *parent;
        }
    }

    Ok(())
}

/// 校验输入源参数
fn validate_source(blueprint: &IngestBlueprint) -> Result<(), ContractError> {
    let source = &blueprint.source;

    if source.left_frame.is_empty() || source.right_frame.is_empty() {
        return Err(ContractError::config_validation(
            "source.left_frame / source.right_frame",
            "camera frame ids cannot be empty",
        ));
    }
    if source.left_frame == source.right_frame {
        return Err(ContractError::config_validation(
            "source.right_frame",
            format!(
                "left and right cameras must use distinct frames, both are '{}'",
                source.left_frame
            ),
        ));
    }
    if source.width == 0 || source.height == 0 {
        return Err(ContractError::config_validation(
            "source.width / source.height",
            format!(
                "image size must be > 0, got {}x{}",
                source.width, source.height
            ),
        ));
    }
    if !source.rate_hz.is_finite() || source.rate_hz <= 0.0 {
        return Err(ContractError::config_validation(
            "source.rate_hz",
            format!("rate_hz must be > 0, got {}", source.rate_hz),
        ));
    }
    if source.jitter_ms < 0.0 {
        return Err(ContractError::config_validation(
            "source.jitter_ms",
            format!("jitter_ms must be >= 0, got {}", source.jitter_ms),
        ));
    }

    Ok(())
}

/// 校验 sink 配置
fn validate_sinks(blueprint: &IngestBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("sinks[{}].name", idx),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(sink.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
        if sink.queue_capacity == 0 {
            return Err(ContractError::config_validation(
                format!("sinks[{}].queue_capacity", sink.name),
                "queue_capacity must be > 0",
            ));
        }
    }
    Ok(())
}
