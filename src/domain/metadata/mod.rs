// ============================================================
// METADATA DOMAIN LAYER
// ============================================================
// Value types produced by one metadata request
// No I/O, no external formats

mod column_descriptor;
mod encoding_guess;
mod file_format;
mod metadata_config;
mod record;
mod sample_result;

pub use column_descriptor::{ColumnDescriptor, InferredType, NumericStats};
pub use encoding_guess::{EncodingGuess, DEFAULT_ENCODING};
pub use file_format::FileFormat;
pub use metadata_config::{MetadataConfig, MetadataOptions, DEFAULT_SAMPLE_CAP};
pub use record::{FileFacts, Metadata, SheetInfo};
pub use sample_result::{SampleBatch, SampleResult};
