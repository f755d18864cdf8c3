// ============================================================
// CANDIDATE DECODER
// ============================================================
// Strict, side-effect free decoding attempts over an ordered candidate list

use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::path::Path;

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use tracing::debug;

use crate::domain::error::{MetadataError, Result};

/// Bytes windows-1252 leaves unassigned; strict decoding rejects them
const WINDOWS_1252_UNDEFINED: [u8; 5] = [0x81, 0x8D, 0x8F, 0x90, 0x9D];

/// A text encoding that can be attempted on raw bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Candidate {
    /// ISO-8859-1: every byte maps to the code point of the same value
    Latin1,

    /// Any WHATWG encoding known to `encoding_rs`
    Standard(&'static Encoding),
}

/// A candidate rejected the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeAttemptError {
    pub encoding: &'static str,
}

impl fmt::Display for DecodeAttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "input is not valid {}", self.encoding)
    }
}

impl Candidate {
    pub fn utf8() -> Self {
        Candidate::Standard(UTF_8)
    }

    /// Resolve an encoding label such as "utf-8", "latin1", "cp1252" or "GBK"
    ///
    /// Latin-1 labels resolve to true ISO-8859-1 rather than the WHATWG
    /// windows-1252 alias.
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "latin-1" | "latin1" | "iso-8859-1" | "iso8859-1" | "l1" => Some(Candidate::Latin1),
            "cp1252" => Some(Candidate::Standard(WINDOWS_1252)),
            _ => Encoding::for_label(normalized.as_bytes()).map(Candidate::Standard),
        }
    }

    pub fn name(&self) -> &'static str {
        match *self {
            Candidate::Latin1 => "ISO-8859-1",
            Candidate::Standard(encoding) => encoding.name(),
        }
    }

    /// Whether delimiter bytes can appear inside multi-byte characters, so
    /// the byte stream must be converted to UTF-8 before CSV splitting
    pub fn needs_transcoding(&self) -> bool {
        match *self {
            Candidate::Latin1 => false,
            Candidate::Standard(encoding) => encoding != UTF_8 && !encoding.is_single_byte(),
        }
    }

    pub fn encoding(&self) -> Option<&'static Encoding> {
        match *self {
            Candidate::Latin1 => None,
            Candidate::Standard(encoding) => Some(encoding),
        }
    }

    /// Decode replacing malformed sequences with U+FFFD
    pub fn decode_lossy<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str> {
        match *self {
            Candidate::Latin1 => Cow::Owned(decode_latin1(bytes)),
            Candidate::Standard(encoding) => {
                let (text, _) = encoding.decode_without_bom_handling(strip_bom(bytes, encoding));
                text
            }
        }
    }
}

/// Strictly decode `bytes` with one candidate
///
/// A byte order mark matching the candidate is stripped first.
pub fn decode_with(bytes: &[u8], candidate: Candidate) -> std::result::Result<String, DecodeAttemptError> {
    match candidate {
        Candidate::Latin1 => Ok(decode_latin1(bytes)),
        Candidate::Standard(encoding) => {
            let body = strip_bom(bytes, encoding);
            let rejected = DecodeAttemptError {
                encoding: encoding.name(),
            };
            if encoding == WINDOWS_1252
                && body.iter().any(|b| WINDOWS_1252_UNDEFINED.contains(b))
            {
                return Err(rejected);
            }
            encoding
                .decode_without_bom_handling_and_without_replacement(body)
                .map(Cow::into_owned)
                .ok_or(rejected)
        }
    }
}

/// Ordered candidate chain: detected, fallback, Latin-1, windows-1252
///
/// Unknown labels are skipped and duplicates keep their first position.
pub fn candidate_chain(detected: &str, fallback: &str) -> Vec<Candidate> {
    let mut chain: Vec<Candidate> = Vec::with_capacity(4);
    let ordered = [
        Candidate::from_label(detected),
        Candidate::from_label(fallback),
        Some(Candidate::Latin1),
        Some(Candidate::Standard(WINDOWS_1252)),
    ];
    for candidate in ordered.into_iter().flatten() {
        if !chain.contains(&candidate) {
            chain.push(candidate);
        }
    }
    chain
}

/// Read `path` and return the text of the first candidate that decodes it
pub fn read_text(path: &Path, candidates: &[Candidate]) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| MetadataError::from_io(e, path))?;

    for candidate in candidates {
        match decode_with(&bytes, *candidate) {
            Ok(text) => return Ok(text),
            Err(err) => debug!(path = %path.display(), error = %err, "Candidate encoding rejected"),
        }
    }

    let tried = candidates
        .iter()
        .map(Candidate::name)
        .collect::<Vec<_>>()
        .join(", ");
    Err(MetadataError::DecodeFailure(format!(
        "{} could not be decoded with any candidate encoding [{}]",
        path.display(),
        tried
    )))
}

fn strip_bom<'a>(bytes: &'a [u8], encoding: &'static Encoding) -> &'a [u8] {
    match Encoding::for_bom(bytes) {
        Some((bom_encoding, bom_len)) if bom_encoding == encoding => &bytes[bom_len..],
        _ => bytes,
    }
}

fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}
