//! CSV / clipboard renditions of a record list.
//!
//! Column order is fixed: name, email, phone, date.

use crate::core::error::ExportError;
use crate::types::Record;
use crate::HarvestError;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::info;

/// UTF-8 byte-order mark, so spreadsheet apps pick the right encoding.
pub const BOM: char = '\u{FEFF}';

/// Header labels for the four columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLabels {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date: String,
}

impl ColumnLabels {
    pub fn english() -> Self {
        Self {
            name: "name".to_string(),
            email: "email".to_string(),
            phone: "phone".to_string(),
            date: "date".to_string(),
        }
    }

    pub fn hebrew() -> Self {
        Self {
            name: "שם".to_string(),
            email: "אימייל".to_string(),
            phone: "טלפון".to_string(),
            date: "תאריך".to_string(),
        }
    }

    pub fn from_code(code: &str) -> Result<Self, HarvestError> {
        match code.trim().to_ascii_lowercase().as_str() {
            "" | "en" | "english" => Ok(Self::english()),
            "he" | "hebrew" => Ok(Self::hebrew()),
            other => Err(HarvestError::Config(format!(
                "unknown column labels '{}', expected 'en' or 'he'",
                other
            ))),
        }
    }

    fn as_row(&self) -> [&str; 4] {
        [&self.name, &self.email, &self.phone, &self.date]
    }
}

impl Default for ColumnLabels {
    fn default() -> Self {
        Self::english()
    }
}

fn record_row(r: &Record) -> [&str; 4] {
    [&r.name, &r.email, &r.phone, &r.date]
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// BOM + header + one quoted row per record, `\n`-joined.
pub fn to_csv(records: &[Record], labels: &ColumnLabels) -> String {
    let mut out = String::new();
    out.push(BOM);
    out.push_str(&labels.as_row().join(","));
    for r in records {
        out.push('\n');
        out.push_str(&record_row(r).map(quote).join(","));
    }
    out
}

/// Header + one tab-separated row per record, for pasting into a sheet.
pub fn to_clipboard_text(records: &[Record], labels: &ColumnLabels) -> String {
    std::iter::once(labels.as_row().join("\t"))
        .chain(records.iter().map(|r| record_row(r).join("\t")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `group-requests-YYYY-MM-DD.csv`
pub fn csv_filename(date: NaiveDate) -> String {
    format!("group-requests-{}.csv", date.format("%Y-%m-%d"))
}

/// Writes today's CSV into `dir` and returns its path.
pub fn write_csv(dir: &Path, records: &[Record], labels: &ColumnLabels) -> Result<PathBuf, ExportError> {
    let path = dir.join(csv_filename(chrono::Local::now().date_naive()));
    std::fs::write(&path, to_csv(records, labels)).map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    info!("wrote {} record(s) to {}", records.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(name: &str, email: &str, phone: &str) -> Record {
        Record {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            date: "19/10/2026".to_string(),
        }
    }

    /// Minimal RFC 4180 reader: quoted fields, doubled quotes, `\n` rows.
    fn parse_csv(input: &str) -> Vec<Vec<String>> {
        let mut rows = Vec::new();
        let mut row = Vec::new();
        let mut field = String::new();
        let mut in_quotes = false;
        let mut chars = input.chars().peekable();
        while let Some(c) = chars.next() {
            match (c, in_quotes) {
                ('"', true) if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                ('"', true) => in_quotes = false,
                ('"', false) => in_quotes = true,
                (',', false) => row.push(std::mem::take(&mut field)),
                ('\n', false) => {
                    row.push(std::mem::take(&mut field));
                    rows.push(std::mem::take(&mut row));
                }
                (c, _) => field.push(c),
            }
        }
        row.push(field);
        rows.push(row);
        rows
    }

    #[test]
    fn test_csv_layout() {
        let csv = to_csv(&[rec("Dana Levi", "dana@example.com", "")], &ColumnLabels::english());
        assert!(csv.starts_with('\u{FEFF}'));
        assert_eq!(
            csv.trim_start_matches(BOM),
            "name,email,phone,date\n\"Dana Levi\",\"dana@example.com\",\"\",\"19/10/2026\""
        );
    }

    #[test]
    fn test_csv_round_trip_with_quotes_and_commas() {
        let records = vec![
            rec("Dana \"Dee\" Levi", "dana@example.com", "050-1234567"),
            rec("כהן, יוסי", "", "+972 52-765-4321"),
        ];
        let csv = to_csv(&records, &ColumnLabels::hebrew());
        let rows = parse_csv(csv.trim_start_matches(BOM));

        assert_eq!(rows[0], vec!["שם", "אימייל", "טלפון", "תאריך"]);
        for (row, r) in rows[1..].iter().zip(&records) {
            assert_eq!(row, &vec![r.name.clone(), r.email.clone(), r.phone.clone(), r.date.clone()]);
        }
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_clipboard_text_is_tab_separated() {
        let text = to_clipboard_text(
            &[rec("Dana Levi", "dana@example.com", ""), rec("Avi", "", "054-9876543")],
            &ColumnLabels::english(),
        );
        assert_eq!(
            text,
            "name\temail\tphone\tdate\nDana Levi\tdana@example.com\t\t19/10/2026\nAvi\t\t054-9876543\t19/10/2026"
        );
    }

    #[test]
    fn test_empty_export_keeps_header() {
        assert_eq!(to_clipboard_text(&[], &ColumnLabels::english()), "name\temail\tphone\tdate");
        assert_eq!(to_csv(&[], &ColumnLabels::english()), "\u{FEFF}name,email,phone,date");
    }

    #[test]
    fn test_csv_filename_is_iso_dated() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(csv_filename(date), "group-requests-2026-03-07.csv");
    }

    #[test]
    fn test_label_codes() {
        assert_eq!(ColumnLabels::from_code("HE").unwrap(), ColumnLabels::hebrew());
        assert_eq!(ColumnLabels::from_code("en").unwrap(), ColumnLabels::english());
        assert!(ColumnLabels::from_code("fr").is_err());
    }

    #[test]
    fn test_write_csv_to_missing_dir_is_recoverable() {
        let dir = std::env::temp_dir().join("member-harvest-no-such-dir").join("nested");
        let records = vec![rec("Dana Levi", "dana@example.com", "")];
        let err = write_csv(&dir, &records, &ColumnLabels::english()).unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
        assert_eq!(records.len(), 1);
    }
}
