use std::fs;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::domain::error::{MetadataError, Result};

/// Hex-encoded SHA-256 of a file, read in 64 KiB chunks
pub fn sha256_hex_file(path: &Path) -> Result<String> {
    let mut file = fs::File::open(path).map_err(|e| MetadataError::from_io(e, path))?;

    let mut hasher = Sha256::new();
    let mut buf = [0u8; 1024 * 64];
    loop {
        let n = file
            .read(&mut buf)
            .map_err(|e| MetadataError::from_io(e, path))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    let digest = hasher.finalize();
    Ok(hex::encode(digest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_support::write_file;

    #[test]
    fn test_sha256_of_known_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "abc.csv", b"abc");

        assert_eq!(
            sha256_hex_file(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_missing_file() {
        let err = sha256_hex_file(Path::new("/nonexistent/abc.csv")).unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }
}
