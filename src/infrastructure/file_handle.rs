// ============================================================
// FILE HANDLE
// ============================================================
// Validated access to a tabular source on disk

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::domain::error::{MetadataError, Result};
use crate::domain::metadata::{FileFacts, FileFormat};

/// Leading bytes kept for format sniffing
const HEAD_BYTES: u64 = 512;

/// An existing, readable, supported file
#[derive(Debug, Clone)]
pub struct FileHandle {
    path: PathBuf,
    extension: Option<String>,
    format: FileFormat,
    size_bytes: u64,
    modified: Option<DateTime<Utc>>,
}

impl FileHandle {
    /// Validate `path` and classify its format
    ///
    /// The extension decides the format when it is present; unknown
    /// extensions are rejected. Files without an extension are classified
    /// from their leading bytes.
    pub fn open(path: impl AsRef<Path>, max_file_size: Option<u64>) -> Result<Self> {
        let path = path.as_ref();
        let meta = fs::metadata(path).map_err(|e| MetadataError::from_io(e, path))?;
        if !meta.is_file() {
            return Err(MetadataError::NotFound(format!(
                "{} is not a regular file",
                path.display()
            )));
        }

        let size_bytes = meta.len();
        if let Some(limit) = max_file_size {
            if size_bytes > limit {
                return Err(MetadataError::TooLarge(format!(
                    "{} is {} bytes (limit {})",
                    path.display(),
                    size_bytes,
                    limit
                )));
            }
        }

        let mut head = Vec::with_capacity(HEAD_BYTES as usize);
        File::open(path)
            .and_then(|file| file.take(HEAD_BYTES).read_to_end(&mut head))
            .map_err(|e| MetadataError::from_io(e, path))?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let format = classify(path, extension.as_deref(), &head)?;

        Ok(Self {
            path: path.to_path_buf(),
            extension,
            format,
            size_bytes,
            modified: meta.modified().ok().map(DateTime::<Utc>::from),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    pub fn format(&self) -> FileFormat {
        self.format
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// File facts without a checksum
    pub fn facts(&self) -> FileFacts {
        FileFacts {
            path: self.path.display().to_string(),
            name: self
                .path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            extension: self.extension.clone(),
            size_bytes: self.size_bytes,
            modified: self.modified,
            checksum_sha256: None,
        }
    }
}

fn classify(path: &Path, extension: Option<&str>, head: &[u8]) -> Result<FileFormat> {
    match extension {
        Some(ext) => FileFormat::from_extension(ext).ok_or_else(|| {
            MetadataError::UnsupportedFormat(format!(
                "{}: unsupported extension '.{}'",
                path.display(),
                ext
            ))
        }),
        None => {
            if let Some(format) = FileFormat::sniff_workbook(head) {
                Ok(format)
            } else if FileFormat::looks_like_text(head) {
                Ok(FileFormat::Delimited)
            } else {
                Err(MetadataError::UnsupportedFormat(format!(
                    "{}: unrecognized binary content",
                    path.display()
                )))
            }
        }
    }
}
