// ============================================================
// FILE FORMAT
// ============================================================
// Classification of a tabular source by extension or leading bytes

use serde::{Deserialize, Serialize};

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
const ODS_MIMETYPE: &[u8] = b"application/vnd.oasis.opendocument.spreadsheet";

/// Supported tabular source formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    /// Delimited text (CSV, TSV, pipe or semicolon separated)
    Delimited,

    /// Office Open XML workbook (.xlsx, .xlsm)
    Xlsx,

    /// Legacy binary workbook (.xls)
    Xls,

    /// Binary Office Open XML workbook (.xlsb)
    Xlsb,

    /// OpenDocument spreadsheet (.ods)
    Ods,
}

impl FileFormat {
    /// Map a file extension (without the dot, any case) to a format
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "csv" | "tsv" | "tab" | "txt" | "psv" => Some(FileFormat::Delimited),
            "xlsx" | "xlsm" => Some(FileFormat::Xlsx),
            "xls" => Some(FileFormat::Xls),
            "xlsb" => Some(FileFormat::Xlsb),
            "ods" => Some(FileFormat::Ods),
            _ => None,
        }
    }

    /// Guess a workbook format from leading bytes
    ///
    /// ZIP containers are XLSX unless they declare the OpenDocument mimetype;
    /// OLE compound files are legacy XLS.
    pub fn sniff_workbook(head: &[u8]) -> Option<Self> {
        if head.starts_with(ZIP_MAGIC) {
            let is_ods = head
                .windows(ODS_MIMETYPE.len())
                .any(|window| window == ODS_MIMETYPE);
            return Some(if is_ods { FileFormat::Ods } else { FileFormat::Xlsx });
        }
        if head.starts_with(OLE_MAGIC) {
            return Some(FileFormat::Xls);
        }
        None
    }

    /// Whether leading bytes look like text rather than a binary blob
    pub fn looks_like_text(head: &[u8]) -> bool {
        let utf16_bom = head.starts_with(&[0xFF, 0xFE]) || head.starts_with(&[0xFE, 0xFF]);
        utf16_bom || !head.contains(&0)
    }

    pub fn is_workbook(&self) -> bool {
        !matches!(self, FileFormat::Delimited)
    }

    pub fn label(&self) -> &'static str {
        match self {
            FileFormat::Delimited => "delimited",
            FileFormat::Xlsx => "xlsx",
            FileFormat::Xls => "xls",
            FileFormat::Xlsb => "xlsb",
            FileFormat::Ods => "ods",
        }
    }
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
