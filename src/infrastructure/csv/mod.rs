// ============================================================
// CSV INFRASTRUCTURE LAYER
// ============================================================
// Streaming record counting and bounded sampling of delimited text

mod csv_parser;

pub use csv_parser::CsvParser;
