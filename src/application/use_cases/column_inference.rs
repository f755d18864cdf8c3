// ============================================================
// COLUMN INFERENCE
// ============================================================
// Per-column type, null and distinct statistics over sampled rows

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::metadata::{ColumnDescriptor, InferredType, NumericStats};

/// Distinct values kept per column as examples
const SAMPLE_VALUES: usize = 3;

const NULL_TOKENS: [&str; 5] = ["null", "none", "nan", "n/a", "na"];

const DATE_FORMATS: [&str; 6] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y", "%d.%m.%Y"];

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
];

/// Digits grouped by commas, e.g. `-1,234,567.89`
static THOUSANDS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?\d{1,3}(,\d{3})+(\.\d+)?$").unwrap());

/// Rough shape check before trying chrono formats
static DATE_SHAPE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,4}[-/.]\d{1,2}[-/.]\d{1,4}([ T].*)?$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    /// `0` or `1`: an integer that also reads as a boolean
    Binary,
    Integer,
    Float,
    Boolean,
    Datetime,
    Text,
}

/// Column analyzer working only on the sample
#[derive(Debug, Default, Clone, Copy)]
pub struct ColumnAnalyzer;

impl ColumnAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Describe every header column from `rows`
    ///
    /// A missing trailing field in a ragged row counts as null.
    pub fn infer_columns(&self, headers: &[String], rows: &[Vec<String>]) -> Vec<ColumnDescriptor> {
        headers
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let values = rows.iter().map(|row| row.get(idx).map(String::as_str));
                self.describe(name, values, rows.len())
            })
            .collect()
    }

    fn describe<'a>(
        &self,
        name: &str,
        values: impl Iterator<Item = Option<&'a str>>,
        sampled: usize,
    ) -> ColumnDescriptor {
        let mut descriptor = ColumnDescriptor::empty(name);
        let mut distinct: HashSet<&str> = HashSet::new();
        let mut kinds: Vec<ValueKind> = Vec::new();
        let mut numbers: Vec<f64> = Vec::new();

        for value in values {
            let value = value.map(str::trim).unwrap_or("");
            if is_null(value) {
                descriptor.null_count += 1;
                continue;
            }
            if distinct.insert(value) && descriptor.sample_values.len() < SAMPLE_VALUES {
                descriptor.sample_values.push(value.to_string());
            }
            let kind = classify(value);
            if matches!(kind, ValueKind::Binary | ValueKind::Integer | ValueKind::Float) {
                if let Some(number) = parse_number(value) {
                    numbers.push(number);
                }
            }
            kinds.push(kind);
        }

        descriptor.distinct_count = distinct.len();
        descriptor.null_percentage = if sampled == 0 {
            0.0
        } else {
            descriptor.null_count as f32 / sampled as f32 * 100.0
        };
        descriptor.inferred_type = resolve(&kinds);
        if matches!(descriptor.inferred_type, InferredType::Integer | InferredType::Float) {
            descriptor.stats = NumericStats::from_values(&numbers);
        }
        descriptor
    }
}

fn resolve(kinds: &[ValueKind]) -> InferredType {
    if kinds.is_empty() {
        return InferredType::String;
    }

    let all = |pred: fn(ValueKind) -> bool| kinds.iter().all(|&kind| pred(kind));
    let any = |pred: fn(ValueKind) -> bool| kinds.iter().any(|&kind| pred(kind));

    // A pure 0/1 column stays integer; a boolean column needs at least one word
    if all(|k| matches!(k, ValueKind::Binary | ValueKind::Integer)) {
        InferredType::Integer
    } else if all(|k| matches!(k, ValueKind::Binary | ValueKind::Integer | ValueKind::Float)) {
        InferredType::Float
    } else if all(|k| matches!(k, ValueKind::Binary | ValueKind::Boolean)) {
        InferredType::Boolean
    } else if all(|k| k == ValueKind::Datetime) {
        InferredType::Datetime
    } else if any(|k| matches!(k, ValueKind::Binary | ValueKind::Integer | ValueKind::Float)) {
        InferredType::Mixed
    } else {
        InferredType::String
    }
}

fn classify(value: &str) -> ValueKind {
    if value == "0" || value == "1" {
        ValueKind::Binary
    } else if is_integer(value) {
        ValueKind::Integer
    } else if is_float(value) {
        ValueKind::Float
    } else if is_boolean_word(value) {
        ValueKind::Boolean
    } else if is_datetime(value) {
        ValueKind::Datetime
    } else {
        ValueKind::Text
    }
}

fn is_null(value: &str) -> bool {
    value.is_empty() || NULL_TOKENS.iter().any(|token| value.eq_ignore_ascii_case(token))
}

fn is_integer(value: &str) -> bool {
    value.parse::<i64>().is_ok()
        || (THOUSANDS_PATTERN.is_match(value)
            && !value.contains('.')
            && value.replace(',', "").parse::<i64>().is_ok())
}

fn is_float(value: &str) -> bool {
    if THOUSANDS_PATTERN.is_match(value) {
        return true;
    }
    // Rust also parses "inf" and "nan"; only digit-bearing values count
    value.bytes().any(|b| b.is_ascii_digit())
        && value.parse::<f64>().map(f64::is_finite).unwrap_or(false)
}

fn parse_number(value: &str) -> Option<f64> {
    let plain = if THOUSANDS_PATTERN.is_match(value) {
        value.replace(',', "")
    } else {
        value.to_string()
    };
    plain.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn is_boolean_word(value: &str) -> bool {
    ["true", "false", "yes", "no"]
        .iter()
        .any(|word| value.eq_ignore_ascii_case(word))
}

fn is_datetime(value: &str) -> bool {
    if DateTime::parse_from_rfc3339(value).is_ok() {
        return true;
    }
    if !DATE_SHAPE_PATTERN.is_match(value) {
        return false;
    }
    DATE_FORMATS
        .iter()
        .any(|fmt| NaiveDate::parse_from_str(value, fmt).is_ok())
        || DATETIME_FORMATS
            .iter()
            .any(|fmt| NaiveDateTime::parse_from_str(value, fmt).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(values: &[&str]) -> ColumnDescriptor {
        let headers = vec!["col".to_string()];
        let rows: Vec<Vec<String>> = values.iter().map(|v| vec![v.to_string()]).collect();
        ColumnAnalyzer::new()
            .infer_columns(&headers, &rows)
            .remove(0)
    }

    #[test]
    fn test_numeric_types() {
        assert_eq!(column(&["1", "2", "-3"]).inferred_type, InferredType::Integer);
        assert_eq!(column(&["1", "2.5", "1e3"]).inferred_type, InferredType::Float);
        assert_eq!(column(&["1,234", "5,678"]).inferred_type, InferredType::Integer);
        assert_eq!(column(&["1,234.5", "7"]).inferred_type, InferredType::Float);
    }

    #[test]
    fn test_zero_one_is_integer() {
        assert_eq!(column(&["0", "1", "1", "0"]).inferred_type, InferredType::Integer);
    }

    #[test]
    fn test_zero_one_mixed_with_words_is_boolean() {
        assert_eq!(column(&["1", "0", "yes", "no"]).inferred_type, InferredType::Boolean);
        assert_eq!(column(&["true", "1"]).inferred_type, InferredType::Boolean);
        assert_eq!(column(&["true", "2"]).inferred_type, InferredType::Mixed);
        assert_eq!(column(&["0", "1", "2"]).inferred_type, InferredType::Integer);
        assert_eq!(column(&["0", "1", "0.5"]).inferred_type, InferredType::Float);
    }

    #[test]
    fn test_numeric_columns_carry_stats() {
        let col = column(&["1,000", "3,000", "", "2,000"]);
        let stats = col.stats.unwrap();
        assert_eq!(stats.min, 1000.0);
        assert_eq!(stats.max, 3000.0);
        assert_eq!(stats.mean, 2000.0);
        assert_eq!(stats.std, Some(1000.0));

        assert!(column(&["12", "abc"]).stats.is_none());
        assert!(column(&["yes", "1"]).stats.is_none());
        assert!(column(&[""]).stats.is_none());
    }

    #[test]
    fn test_boolean_words() {
        assert_eq!(column(&["true", "False", "YES", "no"]).inferred_type, InferredType::Boolean);
    }

    #[test]
    fn test_datetime() {
        let col = column(&["2024-01-05", "2024/02/06", "2024-03-07 10:11:12", "2024-03-07T10:11:12Z"]);
        assert_eq!(col.inferred_type, InferredType::Datetime);
        assert_eq!(column(&["31/12/2023", "01.02.2024"]).inferred_type, InferredType::Datetime);
    }

    #[test]
    fn test_mixed_and_string() {
        assert_eq!(column(&["12", "abc", "3.5"]).inferred_type, InferredType::Mixed);
        assert_eq!(column(&["abc", "def"]).inferred_type, InferredType::String);
        assert_eq!(column(&["inf", "nan-ish"]).inferred_type, InferredType::String);
    }

    #[test]
    fn test_null_and_distinct_counts() {
        let col = column(&["a", "", "NULL", "n/a", "a", "b", "  "]);
        assert_eq!(col.null_count, 4);
        assert_eq!(col.distinct_count, 2);
        assert_eq!(col.sample_values, vec!["a", "b"]);
        assert!((col.null_percentage - 400.0 / 7.0).abs() < 0.01);
    }

    #[test]
    fn test_all_null_column_is_string() {
        let col = column(&["", "none", "NaN"]);
        assert_eq!(col.inferred_type, InferredType::String);
        assert_eq!(col.distinct_count, 0);
    }

    #[test]
    fn test_ragged_rows_count_missing_as_null() {
        let headers = vec!["a".to_string(), "b".to_string()];
        let rows = vec![
            vec!["1".to_string(), "x".to_string()],
            vec!["2".to_string()],
        ];
        let columns = ColumnAnalyzer::new().infer_columns(&headers, &rows);
        assert_eq!(columns[1].null_count, 1);
        assert_eq!(columns[1].inferred_type, InferredType::String);
    }

    #[test]
    fn test_header_only_has_zero_counts() {
        let headers = vec!["id".to_string(), "name".to_string()];
        let columns = ColumnAnalyzer::new().infer_columns(&headers, &[]);
        assert_eq!(columns.len(), 2);
        assert!(columns.iter().all(|c| c.null_count == 0 && c.distinct_count == 0));
        assert!(columns.iter().all(|c| c.null_percentage == 0.0));
    }
}
