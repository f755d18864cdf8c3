pub mod column_inference;
pub mod metadata_assembler;
pub mod row_count_estimator;
