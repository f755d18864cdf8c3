pub mod use_cases;

pub use use_cases::column_inference::ColumnAnalyzer;
pub use use_cases::metadata_assembler::MetadataAssembler;
pub use use_cases::row_count_estimator::count_and_sample;
