use chrono::Timelike;

use crate::models::Value;

/// Format a float with thousands separators and fixed decimals: 1,234.56
pub fn amount(val: f64, decimals: usize) -> String {
    if !val.is_finite() {
        return val.to_string();
    }
    let negative = val < 0.0;
    let fixed = format!("{:.*}", decimals, val.abs());
    let (int_part, dec_part) = match fixed.split_once('.') {
        Some((i, d)) => (i, Some(d)),
        None => (fixed.as_str(), None),
    };

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    // "-0.00" reads as noise
    let sign = if negative && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    match dec_part {
        Some(d) => format!("{sign}{with_commas}.{d}"),
        None => format!("{sign}{with_commas}"),
    }
}

/// Display text for a table cell.
pub fn cell(value: &Value, decimals: usize) -> String {
    match value {
        Value::Number(n) => amount(*n, decimals),
        Value::Text(s) => s.clone(),
        Value::Date(d) => {
            if d.time().num_seconds_from_midnight() == 0 {
                d.format("%Y-%m-%d").to_string()
            } else {
                d.format("%Y-%m-%d %H:%M:%S").to_string()
            }
        }
        Value::Bool(b) => b.to_string(),
        Value::Empty => String::new(),
    }
}

/// Compact axis label: 1.2k, 3.4M.
pub fn compact(val: f64) -> String {
    let abs = val.abs();
    let sign = if val < 0.0 { "-" } else { "" };
    if abs >= 1_000_000.0 {
        format!("{sign}{:.1}M", abs / 1_000_000.0)
    } else if abs >= 1000.0 {
        format!("{sign}{:.1}k", abs / 1000.0)
    } else if abs == abs.floor() {
        format!("{sign}{}", abs as u64)
    } else {
        format!("{sign}{:.2}", abs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_formatting() {
        assert_eq!(amount(1234.56, 2), "1,234.56");
        assert_eq!(amount(-500.0, 2), "-500.00");
        assert_eq!(amount(0.0, 2), "0.00");
        assert_eq!(amount(1000000.99, 2), "1,000,000.99");
        assert_eq!(amount(42.1, 0), "42");
        assert_eq!(amount(-0.001, 2), "0.00");
    }

    #[test]
    fn test_cell_formatting() {
        assert_eq!(cell(&Value::Number(300.0), 2), "300.00");
        assert_eq!(cell(&Value::Text("PAST DUE".into()), 2), "PAST DUE");
        assert_eq!(cell(&Value::Empty, 2), "");
        let d = chrono::NaiveDate::from_ymd_opt(2025, 1, 31)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(cell(&Value::Date(d), 2), "2025-01-31");
    }

    #[test]
    fn test_compact_labels() {
        assert_eq!(compact(2500.0), "2.5k");
        assert_eq!(compact(1_200_000.0), "1.2M");
        assert_eq!(compact(40.0), "40");
        assert_eq!(compact(0.84), "0.84");
    }
}
