use std::io::Cursor;
use std::path::Path;

use anyhow::Context;
use calamine::{Data, Reader};
use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{ReportError, Result};
use crate::models::{Sheet, Table, Value, Workbook};

/// File extensions accepted by the workbook picker.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xls"];

// ---------------------------------------------------------------------------
// Cell helpers
// ---------------------------------------------------------------------------

/// Convert an Excel serial day number (with fractional time) to a datetime.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    base.checked_add_signed(chrono::Duration::milliseconds(millis))
}

fn parse_iso_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

pub fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty | Data::Error(_) => Value::Empty,
        Data::Float(f) => Value::Number(*f),
        Data::Int(i) => Value::Number(*i as f64),
        Data::Bool(b) => Value::Bool(*b),
        Data::String(s) => Value::Text(s.clone()),
        Data::DateTime(dt) => match excel_serial_to_datetime(dt.as_f64()) {
            Some(d) => Value::Date(d),
            None => Value::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => match parse_iso_datetime(s) {
            Some(d) => Value::Date(d),
            None => Value::Text(s.clone()),
        },
        Data::DurationIso(s) => Value::Text(s.clone()),
    }
}

/// Column names from the header row. Blank names become `Unnamed: <i>` and
/// repeats get `.1`, `.2`, ... so every name in a table is unique.
pub fn header_names(cells: &[Data]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(cells.len());
    for (i, cell) in cells.iter().enumerate() {
        let raw = match cell {
            Data::Empty => String::new(),
            other => other.to_string().trim().to_string(),
        };
        let base = if raw.is_empty() {
            format!("Unnamed: {i}")
        } else {
            raw
        };
        let mut name = base.clone();
        let mut n = 1;
        while names.contains(&name) {
            name = format!("{base}.{n}");
            n += 1;
        }
        names.push(name);
    }
    names
}

// ---------------------------------------------------------------------------
// Workbook loading
// ---------------------------------------------------------------------------

/// Parse raw spreadsheet bytes into a workbook, one table per sheet in file order.
pub fn load(bytes: Vec<u8>) -> Result<Workbook> {
    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| ReportError::Workbook(e.to_string()))?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .with_context(|| format!("read worksheet range {name}"))?;

        let mut rows = range.rows();
        let table = match rows.next() {
            Some(header) => {
                let header = header_names(header);
                let data: Vec<Vec<Value>> = rows
                    .map(|row| row.iter().map(cell_value).collect())
                    .collect();
                Table::from_rows(header, data)
            }
            None => Table::default(),
        };
        tracing::debug!(
            sheet = %name,
            rows = table.row_count(),
            columns = table.columns.len(),
            "parsed sheet"
        );
        sheets.push(Sheet::new(name, table));
    }
    Ok(Workbook { sheets })
}

/// Read a workbook from disk, rejecting files outside the supported extensions.
pub fn load_path(path: &Path) -> Result<Workbook> {
    let supported = path
        .extension()
        .and_then(|e| e.to_str())
        .map_or(false, |ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| ext.eq_ignore_ascii_case(s))
        });
    if !supported {
        return Err(ReportError::Workbook(format!(
            "unsupported file type: {} (expected .xlsx or .xls)",
            path.display()
        )));
    }
    let bytes = std::fs::read(path)?;
    load(bytes)
}
