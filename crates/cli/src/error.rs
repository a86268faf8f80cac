//! Error types for CLI operations.

use std::path::{Path, PathBuf};

use contracts::{ContractError, IngestBlueprint};
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {}", path.display())]
    ConfigNotFound { path: PathBuf },

    /// Configuration could not be parsed or validated
    #[error("Invalid configuration {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: ContractError,
    },

    /// Pipeline could not be started
    #[error("Pipeline setup failed: {message}")]
    PipelineSetup { message: String },
}

impl CliError {
    pub fn pipeline_setup(message: impl Into<String>) -> Self {
        Self::PipelineSetup {
            message: message.into(),
        }
    }
}

/// Load and validate a configuration file
pub fn load_blueprint(path: &Path) -> Result<IngestBlueprint, CliError> {
    if !path.exists() {
        return Err(CliError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }
    config_loader::ConfigLoader::load_from_path(path).map_err(|source| CliError::Config {
        path: path.to_path_buf(),
        source,
    })
}
