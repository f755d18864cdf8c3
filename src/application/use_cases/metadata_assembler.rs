// ============================================================
// METADATA ASSEMBLER USE CASE
// ============================================================
// Orchestrate encoding detection, row counting, and column inference

use std::path::Path;
use std::time::Instant;

use crate::application::use_cases::column_inference::ColumnAnalyzer;
use crate::application::use_cases::row_count_estimator::count_and_sample;
use crate::domain::error::{MetadataError, Result};
use crate::domain::metadata::{
    ColumnDescriptor, EncodingGuess, FileFacts, Metadata, MetadataConfig, MetadataOptions, SheetInfo,
};
use crate::infrastructure::checksum::sha256_hex_file;
use crate::infrastructure::encoding::{Candidate, EncodingDetector};
use crate::infrastructure::file_handle::FileHandle;
use crate::shared::log_buffer::{add_log, LogBuffer};

const LOG_SOURCE: &str = "Metadata";

/// Sampled magnitudes above this suggest scaling the column
const LARGE_VALUE_THRESHOLD: f64 = 1e6;

/// Metadata assembly use case
pub struct MetadataAssembler {
    config: MetadataConfig,
    detector: EncodingDetector,
    analyzer: ColumnAnalyzer,
}

impl Default for MetadataAssembler {
    fn default() -> Self {
        Self::new(MetadataConfig::default())
    }
}

impl MetadataAssembler {
    pub fn new(config: MetadataConfig) -> Self {
        Self {
            detector: EncodingDetector::from_config(&config),
            analyzer: ColumnAnalyzer::new(),
            config,
        }
    }

    /// Build the metadata record for `path`
    ///
    /// Either every part of the record is populated or an error is returned.
    pub fn assemble(&self, path: &Path, options: &MetadataOptions, logs: &LogBuffer) -> Result<Metadata> {
        let start = Instant::now();
        add_log(logs, "INFO", LOG_SOURCE, &format!("Reading metadata for {}", path.display()));

        let result = self.assemble_inner(path, options, logs);
        let elapsed_ms = start.elapsed().as_millis();
        match &result {
            Ok(metadata) => add_log(
                logs,
                "INFO",
                LOG_SOURCE,
                &format!(
                    "{}: {} rows, {} sampled, {} columns (elapsed_ms={})",
                    metadata.file.name,
                    metadata.total_rows(),
                    metadata.sample_rows(),
                    metadata.column_count,
                    elapsed_ms
                ),
            ),
            Err(err) => add_log(
                logs,
                "ERROR",
                LOG_SOURCE,
                &format!("{} failed: {} (elapsed_ms={})", path.display(), err, elapsed_ms),
            ),
        }
        result
    }

    fn assemble_inner(&self, path: &Path, options: &MetadataOptions, logs: &LogBuffer) -> Result<Metadata> {
        let handle = FileHandle::open(path, self.config.max_file_size)?;
        let format = handle.format();

        let (encoding, decode_as) = if format.is_workbook() {
            (EncodingGuess::new("UTF-8", 1.0), Candidate::utf8())
        } else {
            let guess = self.detector.detect_file(handle.path(), logs);
            let candidate = resolve_encoding(&guess, &options.fallback_encoding)?;
            (guess, candidate)
        };

        let batch = count_and_sample(&handle, decode_as, options, logs)?;
        let columns = self.analyzer.infer_columns(&batch.headers, &batch.rows);

        let mut file = handle.facts();
        if self.config.compute_checksum {
            file.checksum_sha256 = Some(sha256_hex_file(handle.path())?);
        }

        let advisories = self.advisories(&file, &batch.sheets, &columns, batch.sample_rows());
        let delimiter = batch.delimiter.map(delimiter_label);
        let sheets = batch.sheets.clone();
        let sheet = batch.sheet.clone();
        let column_count = columns.len();

        Ok(Metadata {
            file,
            format,
            delimiter,
            encoding,
            decoded_as: decode_as.name().to_string(),
            sheets,
            sheet,
            sample: batch.into_result(columns),
            column_count,
            advisories,
        })
    }

    fn advisories(
        &self,
        file: &FileFacts,
        sheets: &[SheetInfo],
        columns: &[ColumnDescriptor],
        sample_rows: usize,
    ) -> Vec<String> {
        let mut advisories = Vec::new();

        if sample_rows > 0 {
            let sparse: Vec<&str> = columns
                .iter()
                .filter(|c| c.null_percentage / 100.0 > self.config.high_null_ratio)
                .map(|c| c.name.as_str())
                .collect();
            if !sparse.is_empty() {
                advisories.push(format!(
                    "Columns with more than {:.0}% missing values in the sample: {}",
                    self.config.high_null_ratio * 100.0,
                    sparse.join(", ")
                ));
            }
        }

        let constant: Vec<&str> = columns
            .iter()
            .filter(|c| c.distinct_count == 1)
            .map(|c| c.name.as_str())
            .collect();
        if !constant.is_empty() {
            advisories.push(format!(
                "Columns with a single distinct value in the sample: {}",
                constant.join(", ")
            ));
        }

        let large_values: Vec<&str> = columns
            .iter()
            .filter(|c| {
                c.stats
                    .map(|stats| stats.magnitude() > LARGE_VALUE_THRESHOLD)
                    .unwrap_or(false)
            })
            .map(|c| c.name.as_str())
            .collect();
        if !large_values.is_empty() {
            advisories.push(format!(
                "Large numeric values detected, consider scaling: {}",
                large_values.join(", ")
            ));
        }

        if file.size_bytes > self.config.large_file_threshold {
            advisories.push(format!(
                "Large file ({:.1} MiB): consider reading in chunks or selecting a column range",
                file.size_bytes as f64 / (1024.0 * 1024.0)
            ));
        }

        if sheets.len() > 1 {
            advisories.push(format!(
                "Workbook has {} sheets: specify the sheet to process",
                sheets.len()
            ));
        }

        advisories
    }
}

/// Trusted guess, else the caller's fallback label
fn resolve_encoding(guess: &EncodingGuess, fallback: &str) -> Result<Candidate> {
    if !guess.is_fallback() {
        if let Some(candidate) = Candidate::from_label(&guess.name) {
            return Ok(candidate);
        }
    }
    Candidate::from_label(fallback)
        .ok_or_else(|| MetadataError::InvalidConfig(format!("unknown fallback encoding '{}'", fallback)))
}

fn delimiter_label(delimiter: u8) -> String {
    match delimiter {
        b'\t' => "\\t".to_string(),
        other => char::from(other).to_string(),
    }
}
