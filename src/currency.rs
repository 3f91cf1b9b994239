use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};
use crate::models::{Table, Value};
use crate::reports::{Chart, Series};

/// Conversion target. Never looked up in the rate table.
pub const TARGET_CURRENCY: &str = "USD";

/// Currency code -> multiplier: `amount_in_code * rate = amount_in_usd`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateTable(BTreeMap<String, f64>);

impl Default for RateTable {
    fn default() -> Self {
        let mut rates = BTreeMap::new();
        // Placeholders until real rates are entered
        rates.insert("EUR".to_string(), 0.875843475231553);
        rates.insert("GBP".to_string(), 1.14175652188951);
        Self(rates)
    }
}

impl RateTable {
    pub fn get(&self, code: &str) -> Option<f64> {
        self.0.get(code).copied()
    }

    /// Overwrite (or add) one rate. Any value is accepted, including zero and negatives.
    pub fn set(&mut self, code: &str, rate: f64) {
        self.0.insert(code.to_string(), rate);
    }

    pub fn codes(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Multiply every number in `column` by the rate for `from_currency`.
///
/// Returns the input unchanged when the code has no rate or the column does
/// not exist. Non-numeric cells pass through. This is a plain multiply:
/// converting the result again scales by the rate a second time.
pub fn convert(table: &Table, column: &str, from_currency: &str, rates: &RateTable) -> Table {
    let mut out = table.clone();
    let Some(rate) = rates.get(from_currency) else {
        tracing::debug!(currency = from_currency, "no rate, conversion skipped");
        return out;
    };
    if let Some(col) = out.column_mut(column) {
        for value in col.values.iter_mut() {
            if let Value::Number(n) = value {
                *n *= rate;
            }
        }
        tracing::info!(
            column,
            from = from_currency,
            to = TARGET_CURRENCY,
            rate,
            "converted column"
        );
    }
    out
}

fn currency_code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z]{3}$").expect("valid currency code pattern"))
}

pub fn is_currency_code(code: &str) -> bool {
    currency_code_re().is_match(code)
}

/// Parse a `CODE=VALUE` override such as `EUR=0.92`.
pub fn parse_rate_arg(raw: &str) -> Result<(String, f64)> {
    let (code, value) = raw
        .split_once('=')
        .ok_or_else(|| ReportError::InvalidRate(raw.to_string()))?;
    let code = code.trim().to_ascii_uppercase();
    if !is_currency_code(&code) {
        return Err(ReportError::InvalidRate(raw.to_string()));
    }
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| ReportError::InvalidRate(raw.to_string()))?;
    Ok((code, value))
}

// ---------------------------------------------------------------------------
// Currency trend panel (illustrative, not derived from any workbook)
// ---------------------------------------------------------------------------

const TREND_EUR: [f64; 7] = [0.87, 0.88, 0.875, 0.87, 0.86, 0.85, 0.84];
const TREND_GBP: [f64; 7] = [1.14, 1.15, 1.14, 1.13, 1.12, 1.11, 1.10];

/// Seven month-end dates from January 2025.
pub fn trend_dates() -> Vec<NaiveDate> {
    (1..=7u32)
        .filter_map(|month| {
            NaiveDate::from_ymd_opt(2025, month + 1, 1).and_then(|d| d.pred_opt())
        })
        .collect()
}

pub fn trend_chart() -> Chart {
    Chart::Line {
        title: "Exchange Rate Trends".to_string(),
        x_labels: trend_dates()
            .iter()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .collect(),
        series: vec![
            Series {
                name: "EUR".to_string(),
                values: TREND_EUR.iter().map(|v| Some(*v)).collect(),
            },
            Series {
                name: "GBP".to_string(),
                values: TREND_GBP.iter().map(|v| Some(*v)).collect(),
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Column;

    fn sample() -> Table {
        Table::new(vec![
            Column::texts("Customer", &["Acme", "Globex"]),
            Column::numbers("Revenue", &[100.0, 250.0]),
            Column::numbers("Cost", &[10.0, 20.0]),
        ])
    }

    #[test]
    fn test_default_rates() {
        let rates = RateTable::default();
        assert_eq!(rates.codes(), vec!["EUR", "GBP"]);
        assert_eq!(rates.get("EUR"), Some(0.875843475231553));
        assert_eq!(rates.get("GBP"), Some(1.14175652188951));
        assert_eq!(rates.get("USD"), None);
    }

    #[test]
    fn test_convert_unknown_currency_is_noop() {
        let table = sample();
        let out = convert(&table, "Revenue", "JPY", &RateTable::default());
        assert_eq!(out, table);
    }

    #[test]
    fn test_convert_unknown_column_is_noop() {
        let table = sample();
        assert_eq!(convert(&table, "Nope", "EUR", &RateTable::default()), table);
    }

    #[test]
    fn test_convert_multiplies_only_target_column() {
        let mut rates = RateTable::default();
        rates.set("EUR", 0.5);
        let table = sample();
        let out = convert(&table, "Revenue", "EUR", &rates);
        assert_eq!(
            out.column("Revenue").unwrap().values,
            vec![Value::Number(50.0), Value::Number(125.0)]
        );
        assert_eq!(out.column("Cost"), table.column("Cost"));
        assert_eq!(out.column("Customer"), table.column("Customer"));
    }

    #[test]
    fn test_convert_twice_compounds() {
        let mut rates = RateTable::default();
        rates.set("GBP", 2.0);
        let once = convert(&sample(), "Revenue", "GBP", &rates);
        let twice = convert(&once, "Revenue", "GBP", &rates);
        assert_eq!(
            twice.column("Revenue").unwrap().values,
            vec![Value::Number(400.0), Value::Number(1000.0)]
        );
    }

    #[test]
    fn test_convert_skips_non_numeric_cells() {
        let table = Table::new(vec![Column::new(
            "Amount",
            vec![Value::Number(4.0), Value::Text("n/a".into()), Value::Empty],
        )]);
        let mut rates = RateTable::default();
        rates.set("EUR", 0.25);
        let out = convert(&table, "Amount", "EUR", &rates);
        assert_eq!(
            out.column("Amount").unwrap().values,
            vec![Value::Number(1.0), Value::Text("n/a".into()), Value::Empty]
        );
    }

    #[test]
    fn test_set_accepts_any_value() {
        let mut rates = RateTable::default();
        rates.set("EUR", -1.0);
        rates.set("CHF", 0.0);
        assert_eq!(rates.get("EUR"), Some(-1.0));
        assert_eq!(rates.get("CHF"), Some(0.0));
        assert_eq!(rates.codes().len(), 3);
    }

    #[test]
    fn test_parse_rate_arg() {
        assert_eq!(parse_rate_arg("EUR=0.92").unwrap(), ("EUR".to_string(), 0.92));
        assert_eq!(parse_rate_arg("chf = 1.1").unwrap(), ("CHF".to_string(), 1.1));
        assert_eq!(parse_rate_arg("GBP=-2").unwrap(), ("GBP".to_string(), -2.0));
        assert!(parse_rate_arg("EUR").is_err());
        assert!(parse_rate_arg("EURO=1").is_err());
        assert!(parse_rate_arg("EUR=abc").is_err());
    }

    #[test]
    fn test_trend_dates_are_month_ends() {
        let dates: Vec<String> = trend_dates()
            .iter()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .collect();
        assert_eq!(
            dates,
            vec![
                "2025-01-31", "2025-02-28", "2025-03-31", "2025-04-30",
                "2025-05-31", "2025-06-30", "2025-07-31",
            ]
        );
    }

    #[test]
    fn test_trend_chart_series() {
        match trend_chart() {
            Chart::Line { x_labels, series, .. } => {
                assert_eq!(x_labels.len(), 7);
                assert_eq!(series[0].name, "EUR");
                assert_eq!(series[0].values[2], Some(0.875));
                assert_eq!(series[1].name, "GBP");
                assert_eq!(series[1].values[6], Some(1.10));
            }
            other => panic!("unexpected chart: {other:?}"),
        }
    }
}
