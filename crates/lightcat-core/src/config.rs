//! TOML configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{CoreError, Result};
use crate::features::CapabilityTaxonomy;
use crate::logging::LogConfig;

/// Top level configuration, every section optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightcatConfig {
    pub logging: LogConfig,
    pub taxonomy: TaxonomyConfig,
    pub export: ExportSettings,
}

impl LightcatConfig {
    /// Read a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| CoreError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CoreError::Config(e.to_string()))
    }
}

/// Where capability kinds come from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxonomyConfig {
    /// Schema properties document; the built-in list is used when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_path: Option<PathBuf>,
}

impl TaxonomyConfig {
    pub fn load_taxonomy(&self) -> Result<CapabilityTaxonomy> {
        match &self.schema_path {
            Some(path) => {
                let json = std::fs::read_to_string(path)?;
                CapabilityTaxonomy::from_schema_json(&json)
            }
            None => Ok(CapabilityTaxonomy::builtin()),
        }
    }
}

/// Batch export settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub output_dir: PathBuf,
    /// Keys of the export plugins to run
    pub plugins: Vec<String>,
    /// Export fixtures on the rayon thread pool
    pub parallel: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("out"),
            plugins: vec!["dmxcontrol3".to_string()],
            parallel: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = LightcatConfig::from_toml_str("").unwrap();
        assert_eq!(config, LightcatConfig::default());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.export.plugins, vec!["dmxcontrol3"]);
        assert!(config.export.parallel);
    }

    #[test]
    fn test_partial_sections() {
        let config = LightcatConfig::from_toml_str(
            r#"
            [logging]
            level = "debug"
            file_output = true

            [export]
            output_dir = "build/ddf"
            parallel = false
            "#,
        )
        .unwrap();

        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.file_output);
        assert_eq!(config.logging.max_files, 10);
        assert_eq!(config.export.output_dir, PathBuf::from("build/ddf"));
        assert!(!config.export.parallel);
        assert_eq!(config.export.plugins, vec!["dmxcontrol3"]);
    }

    #[test]
    fn test_invalid_toml_is_a_config_error() {
        let err = LightcatConfig::from_toml_str("[export\nparallel = 1").unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn test_load_and_taxonomy_from_schema() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("capability.json");
        std::fs::write(&schema, r#"{ "capabilityTypes": { "Pan": {}, "Tilt": {} } }"#).unwrap();

        let config_path = dir.path().join("lightcat.toml");
        std::fs::write(
            &config_path,
            format!("[taxonomy]\nschema_path = {:?}\n", schema.display().to_string()),
        )
        .unwrap();

        let config = LightcatConfig::load(&config_path).unwrap();
        let taxonomy = config.taxonomy.load_taxonomy().unwrap();
        assert_eq!(taxonomy.kinds(), &["Pan", "Tilt"]);
    }

    #[test]
    fn test_builtin_taxonomy_without_schema() {
        let taxonomy = TaxonomyConfig::default().load_taxonomy().unwrap();
        assert!(taxonomy.contains("Intensity"));
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let config = LightcatConfig::default();
        let text = config.to_toml_string().unwrap();
        assert_eq!(LightcatConfig::from_toml_str(&text).unwrap(), config);
    }
}
