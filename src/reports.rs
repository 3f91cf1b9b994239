use crate::models::{Column, Table, Value};

// ---------------------------------------------------------------------------
// Report kinds
// ---------------------------------------------------------------------------

/// The fixed set of sheet layouts this dashboard knows how to chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    BudgetVsActual,
    OpexGroupAnalysis,
    PnlPerCustomer,
    BalanceSheet,
    SalesAccruals,
    AccountsReceivable,
    Unrecognized,
}

const ALL_KINDS: &[ReportKind] = &[
    ReportKind::BudgetVsActual,
    ReportKind::OpexGroupAnalysis,
    ReportKind::PnlPerCustomer,
    ReportKind::BalanceSheet,
    ReportKind::SalesAccruals,
    ReportKind::AccountsReceivable,
];

impl ReportKind {
    /// Exact, case-sensitive sheet name this kind is bound to.
    pub fn sheet_name(&self) -> Option<&'static str> {
        match self {
            Self::BudgetVsActual => Some("Budget VS Actual"),
            Self::OpexGroupAnalysis => Some("OPEX Group Analysis"),
            Self::PnlPerCustomer => Some("P&L Per Customer"),
            Self::BalanceSheet => Some("Balance Sheet"),
            Self::SalesAccruals => Some("Sales Accruals"),
            Self::AccountsReceivable => Some("Accounts Receivable"),
            Self::Unrecognized => None,
        }
    }

    pub fn from_sheet_name(name: &str) -> Self {
        ALL_KINDS
            .iter()
            .find(|k| k.sheet_name() == Some(name))
            .copied()
            .unwrap_or(Self::Unrecognized)
    }

    pub fn subheader(&self) -> Option<&'static str> {
        match self {
            Self::BudgetVsActual => Some("Budget vs Forecast vs Actual"),
            Self::OpexGroupAnalysis => Some("OPEX Expense Analysis"),
            Self::PnlPerCustomer => Some("Profitability per Customer"),
            Self::BalanceSheet => Some("Balance Sheet"),
            Self::SalesAccruals => Some("Sales Accruals"),
            Self::AccountsReceivable => Some("Accounts Receivable"),
            Self::Unrecognized => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::BudgetVsActual => "budget vs actual",
            Self::OpexGroupAnalysis => "opex analysis",
            Self::PnlPerCustomer => "p&l per customer",
            Self::BalanceSheet => "balance sheet",
            Self::SalesAccruals => "sales accruals",
            Self::AccountsReceivable => "accounts receivable",
            Self::Unrecognized => "table only",
        }
    }
}

// ---------------------------------------------------------------------------
// Chart descriptions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: u64,
}

/// Renderer-independent description of one chart.
#[derive(Debug, Clone, PartialEq)]
pub enum Chart {
    /// One bar per series within each category group.
    Bar {
        title: String,
        categories: Vec<String>,
        series: Vec<Series>,
    },
    Line {
        title: String,
        x_labels: Vec<String>,
        series: Vec<Series>,
    },
    Pie {
        title: String,
        slices: Vec<(String, f64)>,
    },
    Histogram {
        title: String,
        column: String,
        bins: Vec<HistogramBin>,
    },
}

impl Chart {
    pub fn title(&self) -> &str {
        match self {
            Chart::Bar { title, .. }
            | Chart::Line { title, .. }
            | Chart::Pie { title, .. }
            | Chart::Histogram { title, .. } => title,
        }
    }
}

/// Either a chart, or the columns whose absence suppressed it.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartOutcome {
    Drawn(Chart),
    Skipped { missing: Vec<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubTable {
    pub caption: String,
    pub table: Table,
}

/// Everything a renderer needs to show one sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetView {
    pub sheet_name: String,
    pub kind: ReportKind,
    pub table: Table,
    pub subheader: Option<&'static str>,
    pub sub_tables: Vec<SubTable>,
    pub charts: Vec<ChartOutcome>,
}

impl SheetView {
    pub fn drawn_charts(&self) -> impl Iterator<Item = &Chart> {
        self.charts.iter().filter_map(|c| match c {
            ChartOutcome::Drawn(chart) => Some(chart),
            ChartOutcome::Skipped { .. } => None,
        })
    }
}

// ---------------------------------------------------------------------------
// View selection
// ---------------------------------------------------------------------------

struct Section {
    sub_tables: Vec<SubTable>,
    charts: Vec<ChartOutcome>,
}

impl Section {
    fn chart(chart: Chart) -> Self {
        Self {
            sub_tables: vec![],
            charts: vec![ChartOutcome::Drawn(chart)],
        }
    }

    fn skipped(missing: Vec<String>) -> Self {
        Self {
            sub_tables: vec![],
            charts: vec![ChartOutcome::Skipped { missing }],
        }
    }
}

/// Build the view for a sheet: the full table plus the kind-specific extras.
pub fn build_view(sheet_name: &str, kind: ReportKind, table: &Table) -> SheetView {
    let section = match kind {
        ReportKind::BudgetVsActual => budget_vs_actual(table),
        ReportKind::OpexGroupAnalysis => opex_group_analysis(table),
        ReportKind::PnlPerCustomer => pnl_per_customer(table),
        ReportKind::BalanceSheet => balance_sheet(table),
        ReportKind::SalesAccruals => sales_accruals(table),
        ReportKind::AccountsReceivable => accounts_receivable(table),
        ReportKind::Unrecognized => Section {
            sub_tables: vec![],
            charts: vec![],
        },
    };
    for outcome in &section.charts {
        if let ChartOutcome::Skipped { missing } = outcome {
            tracing::debug!(sheet = sheet_name, ?missing, "chart skipped");
        }
    }
    SheetView {
        sheet_name: sheet_name.to_string(),
        kind,
        table: table.clone(),
        subheader: kind.subheader(),
        sub_tables: section.sub_tables,
        charts: section.charts,
    }
}

fn numeric_values(table: &Table, column: &str) -> Vec<Option<f64>> {
    table
        .column(column)
        .map(|c| c.values.iter().map(Value::as_f64).collect())
        .unwrap_or_default()
}

fn series(table: &Table, column: &str) -> Series {
    Series {
        name: column.to_string(),
        values: numeric_values(table, column),
    }
}

fn budget_vs_actual(table: &Table) -> Section {
    let missing = table.missing_columns(&["Revenue", "Direct Costs"]);
    if !missing.is_empty() {
        return Section::skipped(missing);
    }
    Section::chart(Chart::Bar {
        title: "Revenue vs Direct Costs".to_string(),
        categories: table.index_labels(),
        series: vec![series(table, "Revenue"), series(table, "Direct Costs")],
    })
}

/// Columns whose name ends in "25" (the FY25 monthly columns), in sheet order.
pub fn monthly_columns(table: &Table) -> Vec<&str> {
    table
        .column_names()
        .into_iter()
        .filter(|name| name.ends_with("25"))
        .collect()
}

fn opex_group_analysis(table: &Table) -> Section {
    let missing = table.missing_columns(&["Account Name", "Jan 25"]);
    if !missing.is_empty() {
        return Section::skipped(missing);
    }
    // Wide form: one trace per month, accounts along the category axis
    let accounts = table
        .column("Account Name")
        .map(|c| c.values.as_slice())
        .unwrap_or_default();
    let x_labels = accounts
        .iter()
        .enumerate()
        .map(|(row, account)| match account {
            Value::Text(s) => s.clone(),
            Value::Empty => format!("Row {}", table.index[row]),
            other => crate::fmt::cell(other, 2),
        })
        .collect();
    let series = monthly_columns(table)
        .into_iter()
        .map(|month| series(table, month))
        .collect();
    Section::chart(Chart::Line {
        title: "Expense Trends by Account".to_string(),
        x_labels,
        series,
    })
}

/// Gross Profit = Revenue - Cost of Sales, row by row; empty where either side is not a number.
pub fn gross_profit(table: &Table) -> Column {
    let revenue = numeric_values(table, "Revenue");
    let cost = numeric_values(table, "Cost of Sales");
    let values = revenue
        .iter()
        .zip(cost.iter())
        .map(|(r, c)| match (r, c) {
            (Some(r), Some(c)) => Value::Number(r - c),
            _ => Value::Empty,
        })
        .collect();
    Column::new("Gross Profit", values)
}

fn pnl_per_customer(table: &Table) -> Section {
    let missing = table.missing_columns(&["Revenue", "Cost of Sales"]);
    if !missing.is_empty() {
        return Section::skipped(missing);
    }
    let with_profit = table.clone().with_column(gross_profit(table));
    let profit_table = with_profit.select(&["Revenue", "Cost of Sales", "Gross Profit"]);
    let slices = pie_slices(
        &profit_table.index_labels(),
        &numeric_values(&profit_table, "Gross Profit"),
    );
    Section {
        sub_tables: vec![SubTable {
            caption: "Gross Profit".to_string(),
            table: profit_table,
        }],
        charts: vec![ChartOutcome::Drawn(Chart::Pie {
            title: "Gross Profit Split by Customer".to_string(),
            slices,
        })],
    }
}

fn balance_sheet(table: &Table) -> Section {
    let missing = table.missing_columns(&["Fixed Assets"]);
    if !missing.is_empty() {
        return Section::skipped(missing);
    }
    Section::chart(Chart::Bar {
        title: "Fixed Assets".to_string(),
        categories: table.index_labels(),
        series: vec![series(table, "Fixed Assets")],
    })
}

/// Equal-width bins over [min, max]: ceil(sqrt(n)) bins, clamped to 1..=20.
/// The last bin is closed on the right so the maximum is counted.
pub fn histogram(values: &[f64]) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return vec![];
    }
    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        return vec![HistogramBin {
            start: min,
            end: max,
            count: finite.len() as u64,
        }];
    }
    let n_bins = ((finite.len() as f64).sqrt().ceil() as usize).clamp(1, 20);
    let width = (max - min) / n_bins as f64;
    let mut bins: Vec<HistogramBin> = (0..n_bins)
        .map(|i| HistogramBin {
            start: min + width * i as f64,
            end: min + width * (i + 1) as f64,
            count: 0,
        })
        .collect();
    for v in finite {
        let idx = (((v - min) / width) as usize).min(n_bins - 1);
        bins[idx].count += 1;
    }
    bins
}

fn sales_accruals(table: &Table) -> Section {
    let missing = table.missing_columns(&["Amount"]);
    if !missing.is_empty() {
        return Section::skipped(missing);
    }
    let amounts: Vec<f64> = numeric_values(table, "Amount").into_iter().flatten().collect();
    Section::chart(Chart::Histogram {
        title: "Amount Distribution".to_string(),
        column: "Amount".to_string(),
        bins: histogram(&amounts),
    })
}

/// Rows whose `statusDays` text contains "DUE".
pub fn overdue_rows(table: &Table) -> Table {
    let status = table
        .column("statusDays")
        .map(|c| c.values.as_slice())
        .unwrap_or_default();
    table.filter_rows(|i| {
        status
            .get(i)
            .and_then(Value::as_text)
            .map_or(false, |s| s.contains("DUE"))
    })
}

fn accounts_receivable(table: &Table) -> Section {
    let missing = table.missing_columns(&["outstandingusd", "statusDays"]);
    if !missing.is_empty() {
        return Section::skipped(missing);
    }
    let overdue = overdue_rows(table);
    let names: Vec<String> = match overdue.column("Name") {
        Some(col) => col.values.iter().map(|v| crate::fmt::cell(v, 2)).collect(),
        None => overdue.index_labels(),
    };
    let slices = pie_slices(&names, &numeric_values(&overdue, "outstandingusd"));
    Section {
        sub_tables: vec![SubTable {
            caption: "Overdue Receivables".to_string(),
            table: overdue,
        }],
        charts: vec![ChartOutcome::Drawn(Chart::Pie {
            title: "Overdue Receivables Split".to_string(),
            slices,
        })],
    }
}

fn pie_slices(names: &[String], values: &[Option<f64>]) -> Vec<(String, f64)> {
    names
        .iter()
        .zip(values.iter())
        .filter_map(|(name, v)| v.map(|v| (name.clone(), v)))
        .collect()
}

/// Share of each slice in the positive total; non-positive slices get `None`.
pub fn pie_shares(slices: &[(String, f64)]) -> Vec<Option<f64>> {
    let total: f64 = slices.iter().map(|(_, v)| v.max(0.0)).sum();
    slices
        .iter()
        .map(|(_, v)| {
            if *v > 0.0 && total > 0.0 {
                Some(v / total)
            } else {
                None
            }
        })
        .collect()
}
