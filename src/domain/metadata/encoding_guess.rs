// ============================================================
// ENCODING GUESS
// ============================================================

use serde::{Deserialize, Serialize};

/// Encoding reported when detection is untrusted or impossible
pub const DEFAULT_ENCODING: &str = "UTF-8";

/// Best-guess text encoding of a file with the detector's confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingGuess {
    /// Canonical encoding name (e.g. "UTF-8", "windows-1252", "GBK")
    pub name: String,

    /// Trust in the guess, 0.0 - 1.0
    pub confidence: f32,
}

impl EncodingGuess {
    pub fn new(name: impl Into<String>, confidence: f32) -> Self {
        Self {
            name: name.into(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// The default encoding with zero confidence
    pub fn fallback() -> Self {
        Self::new(DEFAULT_ENCODING, 0.0)
    }

    /// A zero-confidence guess carries no information and must not be trusted
    pub fn is_fallback(&self) -> bool {
        self.confidence <= 0.0
    }
}

impl Default for EncodingGuess {
    fn default() -> Self {
        Self::fallback()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_is_clamped() {
        assert_eq!(EncodingGuess::new("GBK", 1.7).confidence, 1.0);
        assert_eq!(EncodingGuess::new("GBK", -0.2).confidence, 0.0);
    }

    #[test]
    fn test_fallback_is_utf8_without_confidence() {
        let guess = EncodingGuess::fallback();
        assert_eq!(guess.name, "UTF-8");
        assert!(guess.is_fallback());
    }
}
