// ============================================================
// METADATA RECORD
// ============================================================
// Descriptive result handed back to the caller of one request

use super::{EncodingGuess, FileFormat, SampleResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Filesystem facts about the source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileFacts {
    /// Absolute path when it could be resolved, otherwise as given
    pub path: String,
    pub name: String,
    pub extension: Option<String>,
    pub size_bytes: u64,
    pub modified: Option<DateTime<Utc>>,

    /// Hex SHA-256 of the whole file, only when checksums are enabled
    pub checksum_sha256: Option<String>,
}

/// Extent of one workbook sheet as reported by its dimension metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetInfo {
    pub name: String,

    /// Data rows below the header row
    pub total_rows: u64,

    pub total_columns: u32,

    /// Whether at least one row below the header exists
    pub has_data: bool,
}

/// Metadata of one tabular source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub file: FileFacts,

    pub format: FileFormat,

    /// Field delimiter for delimited text, rendered as a string ("," or "\t")
    pub delimiter: Option<String>,

    /// Detector output; UTF-8 with zero confidence when untrusted
    pub encoding: EncodingGuess,

    /// Encoding the text was actually decoded with
    pub decoded_as: String,

    /// All sheets of a workbook; empty for delimited text
    pub sheets: Vec<SheetInfo>,

    /// Sheet that was measured and sampled
    pub sheet: Option<String>,

    #[serde(flatten)]
    pub sample: SampleResult,

    pub column_count: usize,

    /// Processing hints (high-null columns, large files, several sheets)
    pub advisories: Vec<String>,
}

impl Metadata {
    pub fn total_rows(&self) -> u64 {
        self.sample.total_rows
    }

    pub fn sample_rows(&self) -> usize {
        self.sample.sample_rows
    }

    /// Get human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "Metadata for {} ({}, {} bytes):\n\
             - Encoding: {} ({:.2})\n\
             - Total rows: {}\n\
             - Sample rows: {}\n\
             - Columns: {}",
            self.file.name,
            self.format,
            self.file.size_bytes,
            self.encoding.name,
            self.encoding.confidence,
            self.sample.total_rows,
            self.sample.sample_rows,
            self.column_count
        )
    }
}
