// ============================================================
// WORKBOOK READER
// ============================================================
// Row counting and bounded sampling for spreadsheet workbooks

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use calamine::{
    open_workbook, open_workbook_auto, Data, DataRef, DataType, Range, Reader, Xlsx, XlsxError,
};
use chrono::{NaiveDateTime, Timelike};
use tracing::debug;

use crate::domain::error::{MetadataError, Result};
use crate::domain::metadata::{FileFormat, SampleBatch, SheetInfo};

/// Rows and header of one scanned sheet
struct SheetScan {
    info: SheetInfo,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Sample one sheet of a workbook and describe every sheet in it
///
/// `sheet` selects the sampled sheet by name; the first sheet is used when
/// it is `None`. XLSX sheets are streamed cell by cell, so only the header
/// and the sampled rows are held in memory. Other workbook formats are
/// loaded one sheet at a time.
pub fn sample_workbook(
    path: &Path,
    format: FileFormat,
    sheet: Option<&str>,
    sample_cap: usize,
) -> Result<SampleBatch> {
    match format {
        FileFormat::Xlsx => sample_xlsx(path, sheet, sample_cap),
        FileFormat::Xls | FileFormat::Xlsb | FileFormat::Ods => {
            sample_loaded_workbook(path, sheet, sample_cap)
        }
        FileFormat::Delimited => Err(MetadataError::UnsupportedFormat(format!(
            "{} is not a workbook",
            path.display()
        ))),
    }
}

fn sample_xlsx(path: &Path, sheet: Option<&str>, sample_cap: usize) -> Result<SampleBatch> {
    let mut workbook: Xlsx<BufReader<File>> =
        open_workbook(path).map_err(|e| xlsx_error(e, path))?;
    let sheet_names = workbook.sheet_names().to_vec();
    let target = resolve_sheet(&sheet_names, sheet, path)?;

    let mut sheets = Vec::with_capacity(sheet_names.len());
    let mut sampled = None;
    for name in &sheet_names {
        let is_target = *name == target;
        let cap = if is_target { sample_cap } else { 0 };
        let scan = scan_xlsx_sheet(&mut workbook, name, cap).map_err(|e| xlsx_error(e, path))?;
        debug!(
            sheet = %name,
            total_rows = scan.info.total_rows,
            total_columns = scan.info.total_columns,
            "Scanned worksheet"
        );
        sheets.push(scan.info.clone());
        if is_target {
            sampled = Some(scan);
        }
    }

    finish_batch(sampled, target, sheets, sample_cap, path)
}

/// Stream one XLSX sheet cell by cell
///
/// The header is the first row holding a non-blank cell and the total is the
/// last populated row below it. Only header cells and the first `sample_cap`
/// data rows are rendered; other cells are checked for blankness and
/// dropped. Column indices are absolute, so column A is always the first
/// column.
fn scan_xlsx_sheet<RS: Read + Seek>(
    workbook: &mut Xlsx<RS>,
    name: &str,
    sample_cap: usize,
) -> std::result::Result<SheetScan, XlsxError> {
    let mut reader = workbook.worksheet_cells_reader(name)?;
    let mut header_row: Option<u32> = None;
    let mut headers: Vec<String> = Vec::new();
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut last_row: Option<u32> = None;
    let mut last_col: Option<u32> = None;

    while let Some(cell) = reader.next_cell()? {
        let value = cell.get_value();
        if is_blank(value) {
            continue;
        }
        let (row, col) = cell.get_position();
        last_row = Some(last_row.map_or(row, |r| r.max(row)));
        last_col = Some(last_col.map_or(col, |c| c.max(col)));

        let header = *header_row.get_or_insert(row);
        let idx = if row == header {
            None
        } else {
            match (row - header - 1) as usize {
                idx if idx < sample_cap => Some(idx),
                _ => continue,
            }
        };
        let Some(text) = render_cell(&Data::from(value.clone())) else {
            continue;
        };

        match idx {
            None => put(&mut headers, col as usize, text),
            Some(idx) => {
                if rows.len() <= idx {
                    rows.resize(idx + 1, Vec::new());
                }
                put(&mut rows[idx], col as usize, text);
            }
        }
    }

    let (total_rows, total_columns) = match (header_row, last_row, last_col) {
        (Some(header), Some(last), Some(col)) => (u64::from(last - header), col + 1),
        _ => (0, 0),
    };

    Ok(SheetScan {
        info: SheetInfo {
            name: name.to_string(),
            total_rows,
            total_columns,
            has_data: total_rows > 0,
        },
        headers,
        rows,
    })
}

/// Empty, error and whitespace-only cells
fn is_blank(value: &DataRef<'_>) -> bool {
    match value {
        DataRef::Empty | DataRef::Error(_) => true,
        DataRef::String(s) => s.trim().is_empty(),
        DataRef::SharedString(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn sample_loaded_workbook(path: &Path, sheet: Option<&str>, sample_cap: usize) -> Result<SampleBatch> {
    let mut workbook = open_workbook_auto(path).map_err(|e| calamine_error(e, path))?;
    let sheet_names = workbook.sheet_names().to_vec();
    let target = resolve_sheet(&sheet_names, sheet, path)?;

    let mut sheets = Vec::with_capacity(sheet_names.len());
    let mut sampled = None;
    for name in &sheet_names {
        let range = workbook
            .worksheet_range(name)
            .map_err(|e| calamine_error(e, path))?;
        let scan = scan_range(name, &range, if *name == target { sample_cap } else { 0 });
        sheets.push(scan.info.clone());
        if *name == target {
            sampled = Some(scan);
        }
    }

    finish_batch(sampled, target, sheets, sample_cap, path)
}

fn scan_range(name: &str, range: &Range<Data>, sample_cap: usize) -> SheetScan {
    let mut rows = range.rows();
    let headers = rows
        .next()
        .map(|row| row.iter().map(|cell| render_cell(cell).unwrap_or_default()).collect())
        .unwrap_or_default();
    let sample = rows
        .take(sample_cap)
        .map(|row| row.iter().map(|cell| render_cell(cell).unwrap_or_default()).collect())
        .collect();

    let total_rows = range.height().saturating_sub(1) as u64;
    SheetScan {
        info: SheetInfo {
            name: name.to_string(),
            total_rows,
            total_columns: range.width() as u32,
            has_data: total_rows > 0,
        },
        headers,
        rows: sample,
    }
}

fn finish_batch(
    sampled: Option<SheetScan>,
    target: String,
    sheets: Vec<SheetInfo>,
    sample_cap: usize,
    path: &Path,
) -> Result<SampleBatch> {
    let scan = sampled.ok_or_else(|| {
        MetadataError::NotFound(format!("sheet '{}' in {}", target, path.display()))
    })?;

    let width = (scan.info.total_columns as usize).max(scan.headers.len());
    let headers = normalize_headers(scan.headers, width);
    let expected = usize::try_from(scan.info.total_rows)
        .unwrap_or(usize::MAX)
        .min(sample_cap);

    let mut rows = scan.rows;
    rows.resize(expected, Vec::new());
    for row in &mut rows {
        row.resize(width, String::new());
    }

    let mut batch = SampleBatch {
        headers,
        rows,
        total_rows: scan.info.total_rows,
        delimiter: None,
        sheet: Some(target),
        sheets,
    };
    batch.enforce_cap(sample_cap);
    Ok(batch)
}

fn resolve_sheet(sheet_names: &[String], requested: Option<&str>, path: &Path) -> Result<String> {
    match requested {
        Some(name) => sheet_names
            .iter()
            .find(|candidate| candidate.as_str() == name)
            .cloned()
            .ok_or_else(|| {
                MetadataError::NotFound(format!(
                    "sheet '{}' in {} (available: {})",
                    name,
                    path.display(),
                    sheet_names.join(", ")
                ))
            }),
        None => sheet_names.first().cloned().ok_or_else(|| {
            MetadataError::Corrupt(format!("{}: workbook has no worksheets", path.display()))
        }),
    }
}

fn normalize_headers(mut headers: Vec<String>, width: usize) -> Vec<String> {
    headers.resize(width, String::new());
    headers
        .into_iter()
        .enumerate()
        .map(|(idx, name)| {
            if name.is_empty() {
                format!("column_{}", idx + 1)
            } else {
                name
            }
        })
        .collect()
}

fn put(row: &mut Vec<String>, col_idx: usize, value: String) {
    if row.len() <= col_idx {
        row.resize(col_idx + 1, String::new());
    }
    row[col_idx] = value;
}

/// Render a cell as text; `None` for empty and error cells
fn render_cell(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => Some(f.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        _ => Some(
            cell.as_datetime()
                .map(format_datetime)
                .unwrap_or_else(|| cell.to_string()),
        ),
    }
}

fn format_datetime(value: NaiveDateTime) -> String {
    if value.time().num_seconds_from_midnight() == 0 {
        value.format("%Y-%m-%d").to_string()
    } else {
        value.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

fn xlsx_error(err: XlsxError, path: &Path) -> MetadataError {
    match err {
        XlsxError::Io(io_err) => MetadataError::from_io(io_err, path),
        other => MetadataError::Corrupt(format!("{}: {}", path.display(), other)),
    }
}

fn calamine_error(err: calamine::Error, path: &Path) -> MetadataError {
    match err {
        calamine::Error::Io(io_err) => MetadataError::from_io(io_err, path),
        other => MetadataError::Corrupt(format!("{}: {}", path.display(), other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_support::{write_file, write_numeric_xlsx, write_xlsx};

    #[test]
    fn test_xlsx_counts_and_caps_sample() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_numeric_xlsx(dir.path(), "scores.xlsx", &["a", "b"], 150);

        let batch = sample_workbook(&path, FileFormat::Xlsx, None, 100).unwrap();
        assert_eq!(batch.total_rows, 150);
        assert_eq!(batch.sample_rows(), 100);
        assert_eq!(batch.headers, vec!["a", "b"]);
        assert_eq!(batch.rows[0], vec!["0", "1"]);
        assert_eq!(batch.sheet.as_deref(), Some("Sheet1"));
    }

    #[test]
    fn test_xlsx_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_xlsx(dir.path(), "header.xlsx", &[("Data", vec![vec!["id", "name"]])]);

        let batch = sample_workbook(&path, FileFormat::Xlsx, None, 100).unwrap();
        assert_eq!(batch.total_rows, 0);
        assert_eq!(batch.sample_rows(), 0);
        assert_eq!(batch.headers, vec!["id", "name"]);
    }

    #[test]
    fn test_xlsx_describes_every_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_xlsx(
            dir.path(),
            "multi.xlsx",
            &[
                ("Orders", vec![vec!["id", "total"], vec!["1", "9.5"], vec!["2", "3"]]),
                ("Empty", vec![]),
                ("Notes", vec![vec!["note"], vec!["x"], vec!["y"], vec!["z"]]),
            ],
        );

        let batch = sample_workbook(&path, FileFormat::Xlsx, Some("Notes"), 2).unwrap();
        assert_eq!(batch.sheet.as_deref(), Some("Notes"));
        assert_eq!(batch.total_rows, 3);
        assert_eq!(batch.sample_rows(), 2);
        assert_eq!(batch.rows[1], vec!["y"]);

        let names: Vec<_> = batch.sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Orders", "Empty", "Notes"]);
        assert_eq!(batch.sheets[0].total_rows, 2);
        assert_eq!(batch.sheets[0].total_columns, 2);
        assert!(!batch.sheets[1].has_data);
        assert_eq!(batch.sheets[1].total_rows, 0);
    }

    #[test]
    fn test_header_only_sheet_has_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_xlsx(
            dir.path(),
            "pair.xlsx",
            &[
                ("Main", vec![vec!["id"], vec!["1"]]),
                ("HeaderOnly", vec![vec!["a", "b"]]),
            ],
        );

        let batch = sample_workbook(&path, FileFormat::Xlsx, None, 10).unwrap();
        assert!(batch.sheets[0].has_data);
        assert_eq!(
            batch.sheets[1],
            SheetInfo {
                name: "HeaderOnly".to_string(),
                total_rows: 0,
                total_columns: 2,
                has_data: false,
            }
        );
    }

    #[test]
    fn test_xlsx_total_runs_to_last_populated_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_xlsx(
            dir.path(),
            "gaps.xlsx",
            &[(
                "Data",
                vec![
                    vec!["id", "note"],
                    vec!["1", "a"],
                    vec!["", ""],
                    vec!["3", "c"],
                    vec!["", " "],
                ],
            )],
        );

        let batch = sample_workbook(&path, FileFormat::Xlsx, None, 10).unwrap();
        assert_eq!(batch.total_rows, 3);
        assert_eq!(batch.sample_rows(), 3);
        assert_eq!(batch.rows[1], vec!["", ""]);
        assert_eq!(batch.rows[2], vec!["3", "c"]);
    }

    #[test]
    fn test_loaded_workbook_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_xlsx(
            dir.path(),
            "loaded.xlsx",
            &[
                ("Orders", vec![vec!["id", "total"], vec!["1", "9.5"], vec!["2", "3"], vec!["3", "4"]]),
                ("HeaderOnly", vec![vec!["a"]]),
            ],
        );

        let batch = sample_loaded_workbook(&path, Some("Orders"), 2).unwrap();
        assert_eq!(batch.sheet.as_deref(), Some("Orders"));
        assert_eq!(batch.headers, vec!["id", "total"]);
        assert_eq!(batch.total_rows, 3);
        assert_eq!(batch.sample_rows(), 2);
        assert_eq!(batch.rows[0], vec!["1", "9.5"]);

        assert_eq!(batch.sheets.len(), 2);
        assert_eq!(batch.sheets[0].total_columns, 2);
        assert!(batch.sheets[0].has_data);
        assert_eq!(batch.sheets[1].total_rows, 0);
        assert!(!batch.sheets[1].has_data);

        let err = sample_loaded_workbook(&path, Some("Missing"), 2).unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn test_unknown_sheet_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_xlsx(dir.path(), "one.xlsx", &[("Only", vec![vec!["a"]])]);

        let err = sample_workbook(&path, FileFormat::Xlsx, Some("Missing"), 10).unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
        assert!(err.message().contains("Only"));
    }

    #[test]
    fn test_garbage_workbook_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "broken.xlsx", b"PK\x03\x04 not really a zip");

        let err = sample_workbook(&path, FileFormat::Xlsx, None, 10).unwrap_err();
        assert_eq!(err.code(), "CORRUPT");
    }

    #[test]
    fn test_render_cell() {
        assert_eq!(render_cell(&Data::Empty), None);
        assert_eq!(render_cell(&Data::String("  ".to_string())), None);
        assert_eq!(render_cell(&Data::Float(10.0)).as_deref(), Some("10"));
        assert_eq!(render_cell(&Data::Float(2.5)).as_deref(), Some("2.5"));
        assert_eq!(render_cell(&Data::Bool(true)).as_deref(), Some("true"));
    }

    #[test]
    fn test_delimited_is_rejected() {
        let err = sample_workbook(Path::new("a.csv"), FileFormat::Delimited, None, 1).unwrap_err();
        assert_eq!(err.code(), "UNSUPPORTED_FORMAT");
    }
}
