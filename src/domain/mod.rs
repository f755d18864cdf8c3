pub mod error;

// Tabular metadata value types
pub mod metadata;
