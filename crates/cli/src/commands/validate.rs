//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::IngestBlueprint;
use serde::Serialize;
use tracing::info;

use super::checks::config_warnings;
use crate::cli::ValidateArgs;
use crate::error::load_blueprint;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    frame_id: String,
    sync: &'static str,
    input: &'static str,
    transform_count: usize,
    sink_count: usize,
}

impl From<&IngestBlueprint> for ConfigSummary {
    fn from(blueprint: &IngestBlueprint) -> Self {
        let frontend = &blueprint.frontend;
        Self {
            version: format!("{:?}", blueprint.version),
            frame_id: frontend.frame_id.clone(),
            sync: frontend.sync_policy().as_str(),
            input: if frontend.subscribe_rgbd {
                "packed"
            } else {
                "four_stream"
            },
            transform_count: blueprint.transforms.len(),
            sink_count: blueprint.sinks.len(),
        }
    }
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{json}");
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    match load_blueprint(&args.config) {
        Ok(blueprint) => ValidationResult {
            valid: true,
            config_path,
            error: None,
            warnings: config_warnings(&blueprint),
            summary: Some(ConfigSummary::from(&blueprint)),
        },
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: Vec::new(),
            summary: None,
        },
    }
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Reference frame: {}", summary.frame_id);
            println!("  Sync: {} ({})", summary.sync, summary.input);
            println!("  Static transforms: {}", summary.transform_count);
            println!("  Sinks: {}", summary.sink_count);
        }

        if !result.warnings.is_empty() {
            println!("\n⚠ Warnings:");
            for warning in &result.warnings {
                println!("  - {warning}");
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn args(config: PathBuf) -> ValidateArgs {
        ValidateArgs {
            config,
            json: true,
        }
    }

    #[test]
    fn test_valid_config_summary() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[frontend]\napprox_sync = true\nsubscribe_rgbd = true\n\n\
             [[sinks]]\nname = \"log\"\nsink_type = \"log\""
        )
        .unwrap();

        let result = validate_config(&args(file.path().to_path_buf()));
        assert!(result.valid);
        let summary = result.summary.unwrap();
        assert_eq!(summary.sync, "approximate");
        assert_eq!(summary.input, "packed");
        assert_eq!(summary.sink_count, 1);
        // default frames have no transform between them
        assert!(result.warnings.iter().any(|w| w.contains("No transform")));
    }

    #[test]
    fn test_missing_file_is_invalid() {
        let result = validate_config(&args(PathBuf::from("/nonexistent/config.toml")));
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("not found"));
        assert!(run_validate(&args(PathBuf::from("/nonexistent/config.toml"))).is_err());
    }
}
