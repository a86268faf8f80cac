//! # Config Loader
//!
//! Reads the ingest blueprint (front end options, static transforms, rig
//! source, sinks) from TOML or JSON and rejects configurations the front
//! end cannot run with.
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let blueprint = ConfigLoader::load_from_path(Path::new("stereo.toml")).unwrap();
//! println!("Reference frame: {}", blueprint.frontend.frame_id);
//! ```

mod parser;
mod validator;

pub use contracts::IngestBlueprint;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;

/// Configuration loader
///
/// Stateless entry points; every load runs the semantic checks, so a
/// returned blueprint is always usable by the front end.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from a `.toml` or `.json` file; without an extension the
    /// format is guessed from the content
    ///
    /// # Errors
    /// Unreadable file, unknown extension, parse or validation failure
    pub fn load_from_path(path: &Path) -> Result<IngestBlueprint, ContractError> {
        let content = std::fs::read_to_string(path)?;
        let format = match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) => ConfigFormat::from_extension(ext).ok_or_else(|| {
                ContractError::config_parse(format!("unsupported config format: .{ext}"))
            })?,
            None => ConfigFormat::sniff(&content),
        };
        Self::load_from_str(&content, format)
    }

    /// Load from in-memory text
    ///
    /// # Errors
    /// Parse or validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<IngestBlueprint, ContractError> {
        let blueprint = parser::parse(content, format)?;
        Self::validate(&blueprint)?;
        Ok(blueprint)
    }

    /// Re-run the semantic checks, e.g. after command line overrides
    pub fn validate(blueprint: &IngestBlueprint) -> Result<(), ContractError> {
        validator::validate(blueprint)
    }

    pub fn to_toml(blueprint: &IngestBlueprint) -> Result<String, ContractError> {
        toml::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    pub fn to_json(blueprint: &IngestBlueprint) -> Result<String, ContractError> {
        serde_json::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::SinkType;
    use std::io::Write;

    const MINIMAL_TOML: &str = r#"
[frontend]
frame_id = "base_link"
approx_sync = true
approx_sync_max_interval = 0.02
queue_size = 10
keep_color = true

[frontend.odometry_parameters]
"Vis/MaxFeatures" = "600"

[[transforms]]
parent = "base_link"
child = "left_camera"
location = { x = 0.2, y = 0.06, z = 1.1 }
rotation = { roll = -90.0, pitch = 0.0, yaw = -90.0 }

[[transforms]]
parent = "left_camera"
child = "right_camera"
location = { x = 0.12, y = 0.0, z = 0.0 }

[source]
width = 32
height = 24
jitter_ms = 3.0

[[sinks]]
name = "log_sink"
sink_type = "log"
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.frontend.frame_id, "base_link");
        assert_eq!(bp.frontend.queue_size, 10);
        assert_eq!(
            bp.frontend.odometry_parameters.get("Vis/MaxFeatures"),
            Some(&"600".to_string())
        );
        assert_eq!(bp.transforms.len(), 2);
        assert_eq!(bp.source.width, 32);
        assert_eq!(bp.sinks[0].sink_type, SinkType::Log);
    }

    #[test]
    fn test_round_trip_toml() {
        let bp = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(bp.frontend, bp2.frontend);
        assert_eq!(bp.transforms.len(), bp2.transforms.len());
        assert_eq!(bp.transforms[1].child, bp2.transforms[1].child);
    }

    #[test]
    fn test_round_trip_json() {
        let bp = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(bp.frontend, bp2.frontend);
        assert_eq!(bp.source.jitter_ms, bp2.source.jitter_ms);
    }

    #[test]
    fn test_load_from_path_detects_format() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(MINIMAL_TOML.as_bytes()).unwrap();
        let bp = ConfigLoader::load_from_path(file.path()).unwrap();
        assert!(bp.frontend.approx_sync);
    }

    #[test]
    fn test_extensionless_json_is_sniffed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo");
        let json = ConfigLoader::to_json(&IngestBlueprint::default()).unwrap();
        std::fs::write(&path, json).unwrap();

        let bp = ConfigLoader::load_from_path(&path).unwrap();
        assert_eq!(bp.frontend.frame_id, "base_link");
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        let err = ConfigLoader::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }

    #[test]
    fn test_validate_catches_overrides() {
        let mut bp = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        assert!(ConfigLoader::validate(&bp).is_ok());

        bp.source.rate_hz = 0.0;
        let err = ConfigLoader::validate(&bp).unwrap_err().to_string();
        assert!(err.contains("rate_hz"), "got: {err}");
    }

    #[test]
    fn test_validation_runs_after_parse() {
        // Transform cycle should fail validation
        let content = r#"
[[transforms]]
parent = "base_link"
child = "left_camera"

[[transforms]]
parent = "left_camera"
child = "base_link"
"#;
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("cycle"));
    }
}
