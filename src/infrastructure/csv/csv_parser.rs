// ============================================================
// CSV PARSER
// ============================================================
// Streaming record count and bounded sampling for delimited text

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{ByteRecord, ReaderBuilder, Trim};

use crate::domain::error::{MetadataError, Result};
use crate::infrastructure::encoding::{Candidate, TranscodingReader};

/// Bytes read when sniffing the delimiter
const DELIMITER_SNIFF_BYTES: u64 = 4096;

/// CSV parser over files in any supported encoding
pub struct CsvParser {
    /// Delimiter character (default: comma)
    delimiter: u8,

    /// Whether to trim whitespace from values
    trim: bool,
}

impl Default for CsvParser {
    fn default() -> Self {
        Self {
            delimiter: b',',
            trim: true,
        }
    }
}

impl CsvParser {
    /// Create a new CSV parser with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Count data records (header excluded) in one streaming pass
    ///
    /// Only one record buffer is kept alive. Quoted newlines stay inside
    /// their record, blank lines are skipped and ragged rows are accepted, so
    /// the only failure is I/O.
    pub fn count_records(&self, path: &Path, encoding: Candidate) -> Result<u64> {
        let mut reader = self.reader_builder().from_reader(open_source(path, encoding)?);
        let mut record = ByteRecord::new();
        let mut total = 0u64;

        while reader
            .read_byte_record(&mut record)
            .map_err(|e| csv_error(e, path))?
        {
            total += 1;
        }
        Ok(total)
    }

    /// Read the header and at most `sample_cap` data records
    ///
    /// Fields are decoded lossily so undecodable bytes never abort sampling.
    pub fn read_sample(
        &self,
        path: &Path,
        encoding: Candidate,
        sample_cap: usize,
    ) -> Result<(Vec<String>, Vec<Vec<String>>)> {
        let field_encoding = if encoding.needs_transcoding() {
            Candidate::utf8()
        } else {
            encoding
        };
        let mut reader = self.reader_builder().from_reader(open_source(path, encoding)?);

        let header_record = reader
            .byte_headers()
            .map_err(|e| csv_error(e, path))?
            .clone();
        let headers = self.decode_headers(&header_record, field_encoding);

        let mut rows = Vec::with_capacity(sample_cap.min(1024));
        let mut record = ByteRecord::new();
        while rows.len() < sample_cap {
            let more = reader
                .read_byte_record(&mut record)
                .map_err(|e| csv_error(e, path))?;
            if !more {
                break;
            }
            rows.push(
                record
                    .iter()
                    .map(|field| self.decode_field(field, field_encoding))
                    .collect(),
            );
        }

        Ok((headers, rows))
    }

    /// Detect the delimiter from the leading bytes of `path`
    pub fn sniff_delimiter(path: &Path, encoding: Candidate) -> Result<u8> {
        let file = File::open(path).map_err(|e| MetadataError::from_io(e, path))?;
        let mut buffer = Vec::with_capacity(DELIMITER_SNIFF_BYTES as usize);
        file.take(DELIMITER_SNIFF_BYTES)
            .read_to_end(&mut buffer)
            .map_err(|e| MetadataError::from_io(e, path))?;

        Ok(Self::detect_delimiter(&encoding.decode_lossy(&buffer)))
    }

    /// Delimiter implied by a file extension (tab for .tsv/.tab, pipe for .psv)
    pub fn delimiter_for_extension(extension: Option<&str>) -> Option<u8> {
        match extension.map(str::to_ascii_lowercase).as_deref() {
            Some("tsv") | Some("tab") => Some(b'\t'),
            Some("psv") => Some(b'|'),
            _ => None,
        }
    }

    /// Detect delimiter from content (comma, semicolon, tab, pipe)
    pub fn detect_delimiter(content: &str) -> u8 {
        let candidates = [b',', b';', b'\t', b'|'];
        let sample_lines: Vec<_> = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .take(10)
            .collect();

        let mut best_delimiter = b',';
        let mut best_score = 0.0f32;

        if sample_lines.is_empty() {
            return best_delimiter;
        }

        for &delimiter in &candidates {
            let field_counts: Vec<usize> = sample_lines
                .iter()
                .map(|line| line.bytes().filter(|&b| b == delimiter).count())
                .collect();

            // Score by consistency (low standard deviation) and frequency
            let avg = field_counts.iter().sum::<usize>() as f32 / field_counts.len() as f32;
            let variance = field_counts
                .iter()
                .map(|&x| (x as f32 - avg).powi(2))
                .sum::<f32>()
                / field_counts.len() as f32;

            let score = avg / (1.0 + variance.sqrt());

            if score > best_score {
                best_score = score;
                best_delimiter = delimiter;
            }
        }

        best_delimiter
    }

    fn reader_builder(&self) -> ReaderBuilder {
        let mut builder = ReaderBuilder::new();
        builder
            .delimiter(self.delimiter)
            .has_headers(true)
            .trim(if self.trim { Trim::All } else { Trim::None })
            .flexible(true); // Allow rows with different lengths
        builder
    }

    fn decode_headers(&self, record: &ByteRecord, encoding: Candidate) -> Vec<String> {
        record
            .iter()
            .enumerate()
            .map(|(idx, field)| {
                let name = self.decode_field(field, encoding);
                let name = name.trim_start_matches('\u{feff}').trim();
                if name.is_empty() {
                    format!("column_{}", idx + 1)
                } else {
                    name.to_string()
                }
            })
            .collect()
    }

    fn decode_field(&self, field: &[u8], encoding: Candidate) -> String {
        let text = encoding.decode_lossy(field);
        if self.trim {
            text.trim().to_string()
        } else {
            text.into_owned()
        }
    }
}

fn open_source(path: &Path, encoding: Candidate) -> Result<Box<dyn Read>> {
    let file = File::open(path).map_err(|e| MetadataError::from_io(e, path))?;
    let reader = BufReader::with_capacity(64 * 1024, file);
    match encoding.encoding() {
        Some(target) if encoding.needs_transcoding() => {
            Ok(Box::new(TranscodingReader::new(reader, target)))
        }
        _ => Ok(Box::new(reader)),
    }
}

fn csv_error(err: csv::Error, path: &Path) -> MetadataError {
    match err.into_kind() {
        csv::ErrorKind::Io(io_err) => MetadataError::from_io(io_err, path),
        other => MetadataError::Corrupt(format!("{}: {:?}", path.display(), other)),
    }
}
