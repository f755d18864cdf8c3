// ============================================================
// CONFIGURATION
// ============================================================
// Layered settings: defaults, then an optional TOML file, then TABPROBE_* env vars

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;

use crate::domain::error::{MetadataError, Result};
use crate::domain::metadata::MetadataConfig;
use crate::infrastructure::encoding::Candidate;

pub const ENV_PREFIX: &str = "TABPROBE_";

#[derive(Debug, Default)]
pub struct ConfigService {
    file: Option<PathBuf>,
    inline_toml: Option<String>,
}

impl ConfigService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge settings from a TOML file; a missing file is skipped
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Merge settings from a TOML document held in memory
    pub fn with_toml(mut self, toml: impl Into<String>) -> Self {
        self.inline_toml = Some(toml.into());
        self
    }

    pub fn figment(&self) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(MetadataConfig::default()));
        if let Some(path) = &self.file {
            figment = figment.merge(Toml::file(path));
        }
        if let Some(toml) = &self.inline_toml {
            figment = figment.merge(Toml::string(toml));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Extract and validate the configuration
    pub fn load(&self) -> Result<MetadataConfig> {
        let config: MetadataConfig = self
            .figment()
            .extract()
            .map_err(|e| MetadataError::InvalidConfig(e.to_string()))?;
        check(&config)?;
        Ok(config)
    }
}

/// Validate ranges and the fallback encoding label
pub fn check(config: &MetadataConfig) -> Result<()> {
    config.validate().map_err(MetadataError::InvalidConfig)?;
    if Candidate::from_label(&config.fallback_encoding).is_none() {
        return Err(MetadataError::InvalidConfig(format!(
            "unknown fallback_encoding '{}'",
            config.fallback_encoding
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_support::write_file;

    #[test]
    fn test_defaults_without_sources() {
        let config = ConfigService::new().load().unwrap();
        assert_eq!(config.sample_cap, 100);
        assert_eq!(config.fallback_encoding, "utf-8");
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let config = ConfigService::new()
            .with_toml("sample_cap = 25\nfallback_encoding = \"latin1\"\ncompute_checksum = true")
            .load()
            .unwrap();
        assert_eq!(config.sample_cap, 25);
        assert_eq!(config.fallback_encoding, "latin1");
        assert!(config.compute_checksum);
        assert!((config.confidence_threshold - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_file_layer_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "tabprobe.toml", b"detection_sample_bytes = 2048\n");

        let config = ConfigService::new().with_file(&path).load().unwrap();
        assert_eq!(config.detection_sample_bytes, 2048);

        let config = ConfigService::new()
            .with_file(dir.path().join("absent.toml"))
            .load()
            .unwrap();
        assert_eq!(config.detection_sample_bytes, 10 * 1024);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = ConfigService::new()
            .with_toml("confidence_threshold = 3.0")
            .load()
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_CONFIG");

        let err = ConfigService::new()
            .with_toml("fallback_encoding = \"klingon\"")
            .load()
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_CONFIG");

        let err = ConfigService::new()
            .with_toml("sample_cap = \"many\"")
            .load()
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_CONFIG");
    }
}
