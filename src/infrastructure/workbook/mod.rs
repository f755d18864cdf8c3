// ============================================================
// WORKBOOK INFRASTRUCTURE LAYER
// ============================================================
// Spreadsheet workbooks read through calamine

mod workbook_reader;

pub use workbook_reader::sample_workbook;
