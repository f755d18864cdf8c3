pub mod checksum;
pub mod config;
pub mod csv;
pub mod encoding;
pub mod file_handle;
pub mod workbook;
