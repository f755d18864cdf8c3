// ============================================================
// ENCODING DETECTOR
// ============================================================
// Statistical encoding guess over the leading bytes of a file

use std::fs::File;
use std::io::Read;
use std::path::Path;

use encoding_rs::{Encoding, UTF_8};

use super::decoder::{candidate_chain, decode_with, read_text, Candidate};
use crate::domain::metadata::{EncodingGuess, MetadataConfig};
use crate::shared::log_buffer::{add_log, LogBuffer};

const LOG_SOURCE: &str = "ENCODING";

/// Encoding detector with a trust threshold
pub struct EncodingDetector {
    /// Guesses below this confidence are replaced by the default (default: 0.7)
    confidence_threshold: f32,

    /// Leading bytes read from a file (default: 10 KiB)
    sample_bytes: usize,
}

impl Default for EncodingDetector {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.7,
            sample_bytes: 10 * 1024,
        }
    }
}

impl EncodingDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &MetadataConfig) -> Self {
        Self {
            confidence_threshold: config.confidence_threshold,
            sample_bytes: config.detection_sample_bytes.max(1),
        }
    }

    pub fn with_threshold(mut self, confidence_threshold: f32) -> Self {
        self.confidence_threshold = confidence_threshold;
        self
    }

    /// Guess the encoding of a complete byte sample
    pub fn detect(&self, sample: &[u8]) -> EncodingGuess {
        self.detect_sample(sample, true)
    }

    /// Guess the encoding of `sample`; `complete` is false when the sample
    /// was cut from a longer input and may end inside a character
    pub fn detect_sample(&self, sample: &[u8], complete: bool) -> EncodingGuess {
        let guess = raw_guess(sample, complete);
        if guess.confidence < self.confidence_threshold {
            EncodingGuess::fallback()
        } else {
            guess
        }
    }

    /// Detect from the leading bytes of `path`; read failures are logged and
    /// yield the default guess
    pub fn detect_file(&self, path: &Path, logs: &LogBuffer) -> EncodingGuess {
        match read_prefix(path, self.sample_bytes) {
            Ok((sample, complete)) => {
                let guess = self.detect_sample(&sample, complete);
                add_log(
                    logs,
                    "DEBUG",
                    LOG_SOURCE,
                    &format!(
                        "Detected {} ({:.2}) from {} bytes of {}",
                        guess.name,
                        guess.confidence,
                        sample.len(),
                        path.display()
                    ),
                );
                guess
            }
            Err(err) => {
                add_log(
                    logs,
                    "WARN",
                    LOG_SOURCE,
                    &format!(
                        "Encoding detection failed for {}: {}; assuming UTF-8",
                        path.display(),
                        err
                    ),
                );
                EncodingGuess::fallback()
            }
        }
    }

    /// Best-effort text read: detected encoding, `fallback`, Latin-1, windows-1252
    ///
    /// Returns `None` when every candidate fails.
    pub fn safe_read(&self, path: &Path, fallback: &str, logs: &LogBuffer) -> Option<String> {
        let detected = self.detect_file(path, logs);
        let candidates = candidate_chain(&detected.name, fallback);

        match read_text(path, &candidates) {
            Ok(text) => Some(text),
            Err(err) => {
                add_log(
                    logs,
                    "ERROR",
                    LOG_SOURCE,
                    &format!("Unable to read {}: {}", path.display(), err),
                );
                None
            }
        }
    }
}

fn read_prefix(path: &Path, limit: usize) -> std::io::Result<(Vec<u8>, bool)> {
    let file = File::open(path)?;
    let mut sample = Vec::with_capacity(limit.min(64 * 1024) + 1);
    file.take(limit as u64 + 1).read_to_end(&mut sample)?;
    let complete = sample.len() <= limit;
    sample.truncate(limit);
    Ok((sample, complete))
}

fn raw_guess(sample: &[u8], complete: bool) -> EncodingGuess {
    if sample.is_empty() {
        return EncodingGuess::fallback();
    }
    if let Some((encoding, _)) = Encoding::for_bom(sample) {
        return EncodingGuess::new(encoding.name(), 1.0);
    }
    if sample.is_ascii() {
        return EncodingGuess::new(UTF_8.name(), 1.0);
    }
    if is_utf8(sample, complete) {
        return EncodingGuess::new(UTF_8.name(), 0.99);
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(sample, complete);
    let encoding = detector.guess(None, false);

    let confidence = decode_trimmed(sample, encoding, complete)
        .map(|text| plausibility(&text))
        .unwrap_or(0.0);
    EncodingGuess::new(encoding.name(), confidence)
}

fn is_utf8(sample: &[u8], complete: bool) -> bool {
    match std::str::from_utf8(sample) {
        Ok(_) => true,
        // error_len() is None only for a sequence cut short by the end of input
        Err(err) => !complete && err.error_len().is_none(),
    }
}

/// Strictly decode, allowing up to three trailing bytes of a cut character
fn decode_trimmed(sample: &[u8], encoding: &'static Encoding, complete: bool) -> Option<String> {
    let max_cut = if complete { 0 } else { 3.min(sample.len() - 1) };
    (0..=max_cut).find_map(|cut| {
        decode_with(&sample[..sample.len() - cut], Candidate::Standard(encoding)).ok()
    })
}

/// Score decoded text by the share of non-ASCII characters that read as
/// letters or common typographic symbols; mis-decoded bytes tend to land on
/// control characters and stray symbols instead
fn plausibility(text: &str) -> f32 {
    let mut considered = 0usize;
    let mut plausible = 0usize;

    for ch in text.chars() {
        if matches!(ch, '\t' | '\n' | '\r') || (ch.is_ascii() && !ch.is_ascii_control()) {
            continue;
        }
        considered += 1;
        if is_plausible_char(ch) {
            plausible += 1;
        }
    }

    if considered == 0 {
        return 0.99;
    }
    let ratio = plausible as f32 / considered as f32;
    0.99 * ratio * ratio
}

fn is_plausible_char(ch: char) -> bool {
    ch.is_alphabetic()
        || matches!(
            ch,
            '\u{00A0}'
                | '€'
                | '£'
                | '¥'
                | '°'
                | '±'
                | '§'
                | '©'
                | '®'
                | '«'
                | '»'
                | '·'
                | '–'
                | '—'
                | '‘'
                | '’'
                | '“'
                | '”'
                | '…'
                | '•'
        )
        // CJK punctuation and fullwidth forms
        || ('\u{3000}'..='\u{303F}').contains(&ch)
        || ('\u{FF00}'..='\u{FFEF}').contains(&ch)
}
