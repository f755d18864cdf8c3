// ============================================================
// ENCODING INFRASTRUCTURE LAYER
// ============================================================
// Encoding detection, candidate decoding and streaming transcoding

mod decoder;
mod detector;
mod transcoding_reader;

pub use decoder::{candidate_chain, decode_with, read_text, Candidate, DecodeAttemptError};
pub use detector::EncodingDetector;
pub use transcoding_reader::TranscodingReader;
