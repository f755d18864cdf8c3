//! Fixture helpers shared by unit tests

use rust_xlsxwriter::Workbook;
use std::fs;
use std::path::{Path, PathBuf};

pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).expect("write fixture");
    path
}

/// Write `header` followed by `rows` generated data rows of `id,name,score`
pub fn write_numbered_csv(dir: &Path, name: &str, rows: usize) -> PathBuf {
    let mut content = String::from("id,name,score\n");
    for i in 0..rows {
        content.push_str(&format!("{},user{},{}.5\n", i + 1, i + 1, i));
    }
    write_file(dir, name, content.as_bytes())
}

/// Write a workbook with one sheet per `(sheet_name, rows)` pair; all cells as strings
pub fn write_xlsx(dir: &Path, name: &str, sheets: &[(&str, Vec<Vec<&str>>)]) -> PathBuf {
    let path = dir.join(name);
    let mut workbook = Workbook::new();
    for (sheet_name, rows) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*sheet_name).expect("sheet name");
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                worksheet
                    .write_string(r as u32, c as u16, *value)
                    .expect("write cell");
            }
        }
    }
    workbook.save(&path).expect("save workbook");
    path
}

/// Write a single-sheet workbook whose data rows are numeric
pub fn write_numeric_xlsx(dir: &Path, name: &str, header: &[&str], rows: usize) -> PathBuf {
    let path = dir.join(name);
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (c, title) in header.iter().enumerate() {
        worksheet.write_string(0, c as u16, *title).expect("write header");
    }
    for r in 0..rows {
        for c in 0..header.len() {
            worksheet
                .write_number((r + 1) as u32, c as u16, (r * 10 + c) as f64)
                .expect("write cell");
        }
    }
    workbook.save(&path).expect("save workbook");
    path
}
