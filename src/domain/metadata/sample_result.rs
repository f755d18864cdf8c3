// ============================================================
// SAMPLE RESULT
// ============================================================
// Total row count and bounded preview, always tracked separately

use super::{ColumnDescriptor, SheetInfo};
use serde::{Deserialize, Serialize};

/// Row counts and column summaries of one source
///
/// `sample_rows <= min(total_rows, sample_cap)` holds for every value built by
/// [`SampleBatch::into_result`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleResult {
    /// Data rows in the whole file, header excluded
    pub total_rows: u64,

    /// Data rows actually read into the preview
    pub sample_rows: usize,

    pub columns: Vec<ColumnDescriptor>,
}

/// Raw output of the row-count estimator before column inference
#[derive(Debug, Clone, Default)]
pub struct SampleBatch {
    /// Header names, one per column
    pub headers: Vec<String>,

    /// Sampled data rows; rows may be shorter than `headers`
    pub rows: Vec<Vec<String>>,

    /// Data rows in the whole file, header excluded
    pub total_rows: u64,

    /// Field delimiter used for delimited text
    pub delimiter: Option<u8>,

    /// Sheet that was measured, for workbooks
    pub sheet: Option<String>,

    /// Every sheet of a workbook with its measured extent
    pub sheets: Vec<SheetInfo>,
}

impl SampleBatch {
    pub fn sample_rows(&self) -> usize {
        self.rows.len()
    }

    /// Drop sampled rows beyond `min(total_rows, sample_cap)`
    pub fn enforce_cap(&mut self, sample_cap: usize) {
        let limit = usize::try_from(self.total_rows)
            .unwrap_or(usize::MAX)
            .min(sample_cap);
        self.rows.truncate(limit);
    }

    pub fn into_result(self, columns: Vec<ColumnDescriptor>) -> SampleResult {
        SampleResult {
            total_rows: self.total_rows,
            sample_rows: self.rows.len(),
            columns,
        }
    }
}
