use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::currency::{RateTable, TARGET_CURRENCY};
use crate::fmt::{cell, compact};
use crate::models::{ColumnKind, Table as DataTable};
use crate::reports::{pie_shares, Chart, ChartOutcome, SheetView};
use crate::session::Conversion;

use super::view::applied_line;

/// Longest text bar, in characters.
const BAR_WIDTH: usize = 40;

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

pub fn format_table(table: &DataTable, decimals: usize) -> String {
    if table.columns.is_empty() {
        return "(empty sheet)".to_string();
    }
    let mut out = Table::new();
    let mut header = vec![Cell::new("")];
    header.extend(table.columns.iter().map(|c| Cell::new(&c.name)));
    out.set_header(header);

    for r in 0..table.row_count() {
        let mut row = vec![Cell::new(table.index[r])];
        for col in &table.columns {
            let c = Cell::new(cell(&col.values[r], decimals));
            row.push(if col.kind == ColumnKind::Numeric {
                c.set_alignment(CellAlignment::Right)
            } else {
                c
            });
        }
        out.add_row(row);
    }
    out.to_string()
}

pub fn format_rates(rates: &RateTable) -> String {
    if rates.is_empty() {
        return "No exchange rates configured.".to_string();
    }
    let mut table = Table::new();
    table.set_header(vec!["Currency", &format!("Rate to {TARGET_CURRENCY}")]);
    for (code, rate) in rates.iter() {
        table.add_row(vec![Cell::new(code), Cell::new(rate)]);
    }
    format!("Exchange Rates\n{table}")
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 || value <= 0.0 || !value.is_finite() {
        return String::new();
    }
    let len = ((value / max) * BAR_WIDTH as f64).round().max(1.0) as usize;
    "\u{2588}".repeat(len)
}

fn label_width<'a>(labels: impl Iterator<Item = &'a str>) -> usize {
    labels.map(|l| l.chars().count()).max().unwrap_or(0)
}

pub fn format_chart(chart: &Chart) -> String {
    let mut out = format!("{}\n", chart.title().bold());
    match chart {
        Chart::Bar {
            categories, series, ..
        } => {
            let max = series
                .iter()
                .flat_map(|s| s.values.iter().flatten())
                .fold(0.0_f64, |m, v| m.max(*v));
            let width = label_width(
                categories
                    .iter()
                    .map(String::as_str)
                    .chain(series.iter().map(|s| s.name.as_str())),
            );
            for (i, category) in categories.iter().enumerate() {
                for (si, s) in series.iter().enumerate() {
                    let v = s.values.get(i).copied().flatten();
                    let label = if si == 0 { category.as_str() } else { "" };
                    let name = if series.len() > 1 { s.name.as_str() } else { "" };
                    let value = v.map(compact).unwrap_or_default();
                    let line = format!(
                        "{label:>w$} {name:<w2$} {} {value}",
                        bar(v.unwrap_or(0.0), max),
                        w = width,
                        w2 = if series.len() > 1 { width } else { 0 },
                    );
                    out.push_str(line.trim_end());
                    out.push('\n');
                }
            }
        }
        Chart::Line {
            x_labels, series, ..
        } => {
            let mut table = Table::new();
            let mut header = vec![Cell::new("")];
            header.extend(x_labels.iter().map(Cell::new));
            table.set_header(header);
            for s in series {
                let mut row = vec![Cell::new(&s.name)];
                row.extend(s.values.iter().map(|v| {
                    Cell::new(v.map(compact).unwrap_or_default())
                        .set_alignment(CellAlignment::Right)
                }));
                table.add_row(row);
            }
            out.push_str(&table.to_string());
            out.push('\n');
        }
        Chart::Pie { slices, .. } => {
            let shares = pie_shares(slices);
            let width = label_width(slices.iter().map(|(n, _)| n.as_str()));
            for ((name, value), share) in slices.iter().zip(shares.iter()) {
                let line = match share {
                    Some(s) => format!(
                        "{name:>width$} {} {:.1}% ({})",
                        bar(*s, 1.0),
                        s * 100.0,
                        compact(*value)
                    ),
                    None => format!("{name:>width$} n/a ({})", compact(*value)),
                };
                out.push_str(&line);
                out.push('\n');
            }
        }
        Chart::Histogram { bins, column, .. } => {
            let max = bins.iter().map(|b| b.count).max().unwrap_or(0) as f64;
            let labels: Vec<String> = bins
                .iter()
                .map(|b| format!("{} - {}", compact(b.start), compact(b.end)))
                .collect();
            let width = label_width(labels.iter().map(String::as_str));
            out.push_str(&format!("{column} (count per range)\n"));
            for (label, b) in labels.iter().zip(bins.iter()) {
                let line = format!("{label:>width$} {} {}", bar(b.count as f64, max), b.count);
                out.push_str(&line);
                out.push('\n');
            }
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Whole sheet
// ---------------------------------------------------------------------------

pub fn format_view(view: &SheetView, decimals: usize, conversion: Option<&Conversion>, rates: &RateTable) -> String {
    let mut out = format!("{}\n", format!("Sheet: {}", view.sheet_name).bold());
    out.push_str(&format_table(&view.table, decimals));
    out.push('\n');

    if let Some(c) = conversion {
        out.push_str(&applied_line(c, rates));
        out.push('\n');
    }

    if let Some(sub) = view.subheader {
        out.push('\n');
        out.push_str(&format!("{}\n", sub.cyan().bold()));
    }
    for sub in &view.sub_tables {
        out.push_str(&format!("{}\n", sub.caption));
        out.push_str(&format_table(&sub.table, decimals));
        out.push('\n');
    }
    for outcome in &view.charts {
        out.push('\n');
        match outcome {
            ChartOutcome::Drawn(chart) => out.push_str(&format_chart(chart)),
            ChartOutcome::Skipped { missing } => {
                out.push_str(&format!("Chart unavailable (missing columns: {})\n", missing.join(", ")))
            }
        }
    }
    out
}

/// One line of the `sheets` listing.
pub struct SheetSummary {
    pub name: String,
    pub report: &'static str,
    pub rows: usize,
    pub columns: usize,
    pub charts: usize,
}

pub fn format_sheet_list(sheets: &[SheetSummary]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Sheet", "Report", "Rows", "Columns", "Charts"]);
    for s in sheets {
        table.add_row(vec![
            Cell::new(&s.name),
            Cell::new(s.report),
            Cell::new(s.rows).set_alignment(CellAlignment::Right),
            Cell::new(s.columns).set_alignment(CellAlignment::Right),
            Cell::new(s.charts).set_alignment(CellAlignment::Right),
        ]);
    }
    format!("Sheets\n{table}")
}

pub fn format_trends() -> String {
    format!(
        "{}\n{}",
        "Currency Trends".bold(),
        format_chart(&crate::currency::trend_chart())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Column;
    use crate::reports::{build_view, ReportKind};

    #[test]
    fn test_format_table_shows_index_and_values() {
        let table = DataTable::new(vec![
            Column::texts("Name", &["Acme"]),
            Column::numbers("outstandingusd", &[1234.5]),
        ]);
        let s = format_table(&table, 2);
        assert!(s.contains("Name"));
        assert!(s.contains("outstandingusd"));
        assert!(s.contains("1,234.50"));
        assert!(s.contains("Acme"));
    }

    #[test]
    fn test_format_view_pnl() {
        let table = DataTable::new(vec![
            Column::numbers("Revenue", &[500.0, 300.0]),
            Column::numbers("Cost of Sales", &[200.0, 250.0]),
        ]);
        let view = build_view("P&L Per Customer", ReportKind::PnlPerCustomer, &table);
        colored::control::set_override(false);
        let s = format_view(&view, 2, None, &RateTable::default());
        assert!(s.contains("Sheet: P&L Per Customer"));
        assert!(s.contains("Profitability per Customer"));
        assert!(s.contains("Gross Profit"));
        assert!(s.contains("300.00"));
        assert!(s.contains("50.00"));
        assert!(s.contains("85.7%"));
        assert!(s.contains("14.3%"));
    }

    #[test]
    fn test_format_view_skipped_chart() {
        let table = DataTable::new(vec![Column::numbers("Other", &[1.0])]);
        let view = build_view("Balance Sheet", ReportKind::BalanceSheet, &table);
        colored::control::set_override(false);
        let s = format_view(&view, 2, None, &RateTable::default());
        assert!(s.contains("Balance Sheet"));
        assert!(s.contains("Chart unavailable (missing columns: Fixed Assets)"));
    }

    #[test]
    fn test_format_view_notes_conversion() {
        let table = DataTable::new(vec![Column::numbers("Amount", &[10.0])]);
        let view = build_view("Ledger", ReportKind::Unrecognized, &table);
        let conversion = Conversion {
            column: "Amount".to_string(),
            from_currency: "JPY".to_string(),
        };
        colored::control::set_override(false);
        let s = format_view(&view, 2, Some(&conversion), &RateTable::default());
        assert!(s.contains("No rate for JPY; 'Amount' left unchanged"));
    }

    #[test]
    fn test_format_bar_chart_scales_to_max() {
        let chart = Chart::Bar {
            title: "Fixed Assets".to_string(),
            categories: vec!["0".to_string(), "1".to_string()],
            series: vec![crate::reports::Series {
                name: "Fixed Assets".to_string(),
                values: vec![Some(50.0), Some(100.0)],
            }],
        };
        colored::control::set_override(false);
        let s = format_chart(&chart);
        let lines: Vec<&str> = s.lines().collect();
        assert_eq!(lines[1].matches('\u{2588}').count(), BAR_WIDTH / 2);
        assert_eq!(lines[2].matches('\u{2588}').count(), BAR_WIDTH);
    }

    #[test]
    fn test_format_rates_and_trends() {
        let rates = format_rates(&RateTable::default());
        assert!(rates.contains("EUR"));
        assert!(rates.contains("0.875843475231553"));
        colored::control::set_override(false);
        let trends = format_trends();
        assert!(trends.contains("2025-01-31"));
        assert!(trends.contains("2025-07-31"));
        assert!(trends.contains("GBP"));
    }

    #[test]
    fn test_format_sheet_list() {
        let s = format_sheet_list(&[SheetSummary {
            name: "Balance Sheet".to_string(),
            report: "balance sheet",
            rows: 3,
            columns: 1,
            charts: 1,
        }]);
        assert!(s.contains("Balance Sheet"));
        assert!(s.contains("balance sheet"));
        assert!(s.contains("Charts"));
    }
}
