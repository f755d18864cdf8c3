// ============================================================
// ROW-COUNT ESTIMATOR USE CASE
// ============================================================
// Exact data-row totals plus a bounded preview sample

use std::time::Instant;

use crate::domain::error::Result;
use crate::domain::metadata::{MetadataOptions, SampleBatch};
use crate::infrastructure::csv::CsvParser;
use crate::infrastructure::encoding::Candidate;
use crate::infrastructure::file_handle::FileHandle;
use crate::infrastructure::workbook::sample_workbook;
use crate::shared::log_buffer::{add_log, LogBuffer};

const LOG_SOURCE: &str = "RowCount";

/// Count data rows (header excluded) and read at most `options.sample_cap` of them
///
/// `encoding` is used for delimited text only; workbooks carry their own.
/// The returned batch always satisfies `sample_rows <= min(total_rows, sample_cap)`.
pub fn count_and_sample(
    handle: &FileHandle,
    encoding: Candidate,
    options: &MetadataOptions,
    logs: &LogBuffer,
) -> Result<SampleBatch> {
    let start = Instant::now();
    let format = handle.format();

    let mut batch = if format.is_workbook() {
        sample_workbook(
            handle.path(),
            format,
            options.sheet.as_deref(),
            options.sample_cap,
        )?
    } else {
        sample_delimited(handle, encoding, options)?
    };
    batch.enforce_cap(options.sample_cap);

    add_log(
        logs,
        "DEBUG",
        LOG_SOURCE,
        &format!(
            "{}: {} data rows, {} sampled in {}ms",
            handle.path().display(),
            batch.total_rows,
            batch.sample_rows(),
            start.elapsed().as_millis()
        ),
    );
    Ok(batch)
}

fn sample_delimited(
    handle: &FileHandle,
    encoding: Candidate,
    options: &MetadataOptions,
) -> Result<SampleBatch> {
    let path = handle.path();
    let delimiter = match options
        .delimiter
        .or_else(|| CsvParser::delimiter_for_extension(handle.extension()))
    {
        Some(delimiter) => delimiter,
        None => CsvParser::sniff_delimiter(path, encoding)?,
    };

    let parser = CsvParser::new().with_delimiter(delimiter);
    let total_rows = parser.count_records(path, encoding)?;
    let (headers, rows) = parser.read_sample(path, encoding, options.sample_cap)?;
    Ok(SampleBatch {
        headers,
        rows,
        total_rows,
        delimiter: Some(delimiter),
        sheet: None,
        sheets: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_support::{write_file, write_numbered_csv, write_numeric_xlsx};
    use std::sync::Mutex;

    fn run(path: &std::path::Path, options: &MetadataOptions) -> SampleBatch {
        let logs: LogBuffer = Mutex::new(Vec::new());
        let handle = FileHandle::open(path, None).unwrap();
        count_and_sample(&handle, Candidate::utf8(), options, &logs).unwrap()
    }

    #[test]
    fn test_more_rows_than_cap() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_numbered_csv(dir.path(), "people.csv", 150);

        let batch = run(&path, &MetadataOptions::default());
        assert_eq!(batch.total_rows, 150);
        assert_eq!(batch.sample_rows(), 100);
        assert_eq!(batch.delimiter, Some(b','));
    }

    #[test]
    fn test_exactly_cap_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_numbered_csv(dir.path(), "people.csv", 100);

        let batch = run(&path, &MetadataOptions::default());
        assert_eq!(batch.total_rows, 100);
        assert_eq!(batch.sample_rows(), 100);
    }

    #[test]
    fn test_fewer_rows_than_cap() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_numbered_csv(dir.path(), "people.csv", 7);

        let batch = run(&path, &MetadataOptions::default().with_sample_cap(5));
        assert_eq!(batch.total_rows, 7);
        assert_eq!(batch.sample_rows(), 5);
    }

    #[test]
    fn test_empty_and_header_only() {
        let dir = tempfile::tempdir().unwrap();
        for (name, bytes) in [("empty.csv", &b""[..]), ("header.csv", &b"a,b\n"[..])] {
            let path = write_file(dir.path(), name, bytes);
            let batch = run(&path, &MetadataOptions::default());
            assert_eq!(batch.total_rows, 0);
            assert_eq!(batch.sample_rows(), 0);
        }
    }

    #[test]
    fn test_zero_cap_still_counts() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_numbered_csv(dir.path(), "people.csv", 12);

        let batch = run(&path, &MetadataOptions::default().with_sample_cap(0));
        assert_eq!(batch.total_rows, 12);
        assert_eq!(batch.sample_rows(), 0);
    }

    #[test]
    fn test_delimiter_sources() {
        let dir = tempfile::tempdir().unwrap();

        let tsv = write_file(dir.path(), "data.tsv", b"a,x\tb\n1,y\t2\n");
        assert_eq!(run(&tsv, &MetadataOptions::default()).headers, vec!["a,x", "b"]);

        let semi = write_file(dir.path(), "data.csv", b"a;b;c\n1;2;3\n4;5;6\n");
        assert_eq!(run(&semi, &MetadataOptions::default()).delimiter, Some(b';'));

        let forced = run(&semi, &MetadataOptions::default().with_delimiter(b','));
        assert_eq!(forced.headers, vec!["a;b;c"]);
    }

    #[test]
    fn test_workbook_ignores_text_encoding() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_numeric_xlsx(dir.path(), "nums.xlsx", &["x", "y", "z"], 3);

        let batch = run(&path, &MetadataOptions::default());
        assert_eq!(batch.total_rows, 3);
        assert_eq!(batch.sample_rows(), 3);
        assert_eq!(batch.delimiter, None);
        assert_eq!(batch.sheets.len(), 1);
    }
}
