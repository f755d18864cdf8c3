// ============================================================
// METADATA CONFIGURATION
// ============================================================
// Tunables for sampling, encoding detection and advisories

use serde::{Deserialize, Serialize};

/// Default number of data rows read for preview and inference
pub const DEFAULT_SAMPLE_CAP: usize = 100;

/// Process-level configuration for metadata extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// Maximum data rows sampled per request (default: 100)
    pub sample_cap: usize,

    /// Encoding label used when detection is untrusted (default: "utf-8")
    pub fallback_encoding: String,

    /// Guesses below this confidence are discarded (default: 0.7)
    pub confidence_threshold: f32,

    /// Leading bytes fed to the encoding detector (default: 10 KiB)
    pub detection_sample_bytes: usize,

    /// Reject files larger than this many bytes; unlimited when unset
    pub max_file_size: Option<u64>,

    /// Hash the whole file with SHA-256 (costs one extra pass)
    pub compute_checksum: bool,

    /// Files above this size get a chunked-read advisory (default: 10 MiB)
    pub large_file_threshold: u64,

    /// Columns whose sampled null share exceeds this ratio get an advisory (default: 0.5)
    pub high_null_ratio: f32,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            sample_cap: DEFAULT_SAMPLE_CAP,
            fallback_encoding: "utf-8".to_string(),
            confidence_threshold: 0.7,
            detection_sample_bytes: 10 * 1024,
            max_file_size: None,
            compute_checksum: false,
            large_file_threshold: 10 * 1024 * 1024,
            high_null_ratio: 0.5,
        }
    }
}

impl MetadataConfig {
    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err("confidence_threshold must be between 0.0 and 1.0".to_string());
        }
        if self.detection_sample_bytes == 0 {
            return Err("detection_sample_bytes must be > 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.high_null_ratio) {
            return Err("high_null_ratio must be between 0.0 and 1.0".to_string());
        }
        if self.fallback_encoding.trim().is_empty() {
            return Err("fallback_encoding must not be empty".to_string());
        }
        if self.max_file_size == Some(0) {
            return Err("max_file_size must be > 0 when set".to_string());
        }
        Ok(())
    }

    /// Per-request options seeded from this configuration
    pub fn options(&self) -> MetadataOptions {
        MetadataOptions {
            sample_cap: self.sample_cap,
            fallback_encoding: self.fallback_encoding.clone(),
            sheet: None,
            delimiter: None,
        }
    }
}

/// Per-request parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataOptions {
    pub sample_cap: usize,
    pub fallback_encoding: String,

    /// Workbook sheet to measure; the first sheet when unset
    pub sheet: Option<String>,

    /// Field delimiter override for delimited text
    pub delimiter: Option<u8>,
}

impl Default for MetadataOptions {
    fn default() -> Self {
        MetadataConfig::default().options()
    }
}

impl MetadataOptions {
    pub fn with_sample_cap(mut self, sample_cap: usize) -> Self {
        self.sample_cap = sample_cap;
        self
    }

    pub fn with_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = Some(sheet.into());
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn with_fallback_encoding(mut self, label: impl Into<String>) -> Self {
        self.fallback_encoding = label.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = MetadataConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.options().sample_cap, 100);
        assert_eq!(config.options().fallback_encoding, "utf-8");
    }

    #[test]
    fn test_validate_rejects_out_of_range_threshold() {
        let config = MetadataConfig {
            confidence_threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = MetadataConfig {
            detection_sample_bytes: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
