//! Metadata sampling for delimited text files and spreadsheet workbooks.
//!
//! One request opens a file, guesses its text encoding, counts every data row
//! (header excluded), keeps a bounded preview sample, and infers column types
//! from that sample.
//!
//! ```no_run
//! use std::sync::Mutex;
//! use tabprobe::{assemble, MetadataOptions};
//!
//! let logs = Mutex::new(Vec::new());
//! let metadata = assemble("sales.csv", &MetadataOptions::default(), &logs)?;
//! println!("{}", metadata.summary());
//! # Ok::<(), tabprobe::MetadataError>(())
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod shared;

use std::path::Path;

pub use crate::application::{count_and_sample, ColumnAnalyzer, MetadataAssembler};
pub use crate::domain::error::{MetadataError, Result};
pub use crate::domain::metadata::{
    ColumnDescriptor, EncodingGuess, FileFacts, FileFormat, InferredType, Metadata, MetadataConfig,
    MetadataOptions, NumericStats, SampleResult, SheetInfo,
};
pub use crate::infrastructure::config::ConfigService;
pub use crate::infrastructure::encoding::{read_text, EncodingDetector};
pub use crate::interfaces::{handle_tool_call, run_metadata_tool, MetadataRequest, ToolResponse};
pub use crate::shared::log_buffer::{init_tracing, LogBuffer, LogEntry};

/// Assemble metadata for `path` with configuration from defaults and `TABPROBE_*` env vars
pub fn assemble(path: impl AsRef<Path>, options: &MetadataOptions, logs: &LogBuffer) -> Result<Metadata> {
    let config = ConfigService::new().load()?;
    MetadataAssembler::new(config).assemble(path.as_ref(), options, logs)
}
