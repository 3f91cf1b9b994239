use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Cell, Chart as LineChart, Dataset,
        GraphType, Paragraph, Row, Table as TuiTable,
    },
    Frame,
};

use crate::currency::{RateTable, TARGET_CURRENCY};
use crate::fmt::{cell, compact};
use crate::models::{ColumnKind, Table};
use crate::reports::{pie_shares, Chart, ChartOutcome, SheetView};
use crate::session::{Conversion, SessionState};
use crate::tui::{
    series_color, ReportView, ReportViewAction, FOOTER_STYLE, HEADER_STYLE, SECTION_STYLE,
    STATUS_STYLE,
};

const HEADER_ROW_STYLE: Style = Style::new()
    .fg(ratatui::style::Color::DarkGray)
    .add_modifier(Modifier::BOLD);

const MAX_COLUMN_WIDTH: usize = 28;
const CHART_HEIGHT: u16 = 14;
const SUB_TABLE_MAX_HEIGHT: u16 = 10;

// ---------------------------------------------------------------------------
// Sheet view: table + charts + currency conversion controls
// ---------------------------------------------------------------------------

pub(crate) struct SheetScreen {
    view: SheetView,
    rates: RateTable,
    decimals: usize,
    numeric_columns: Vec<String>,
    currencies: Vec<String>,
    column_idx: usize,
    currency_idx: usize,
    applied: Option<Conversion>,
    offset: usize,
    visible_count: usize,
}

impl SheetScreen {
    pub(crate) fn new(view: SheetView, rates: RateTable, decimals: usize) -> Self {
        let numeric_columns = numeric_columns(&view.table);
        let currencies = rates.codes().into_iter().map(String::from).collect();
        Self {
            view,
            rates,
            decimals,
            numeric_columns,
            currencies,
            column_idx: 0,
            currency_idx: 0,
            applied: None,
            offset: 0,
            visible_count: 20,
        }
    }

    /// Report `conversion` as already applied and keep it selected.
    pub(crate) fn with_conversion(mut self, conversion: &Conversion) -> Self {
        if let Some(i) = self.numeric_columns.iter().position(|c| *c == conversion.column) {
            self.column_idx = i;
        }
        self.currency_idx = match self
            .currencies
            .iter()
            .position(|c| *c == conversion.from_currency)
        {
            Some(i) => i,
            None => {
                // Unknown code: keep it selectable so the line can say it has no rate
                self.currencies.push(conversion.from_currency.clone());
                self.currencies.len() - 1
            }
        };
        self.applied = Some(conversion.clone());
        self
    }

    /// Column and currency the next `c` press converts.
    pub(crate) fn selection(&self) -> Option<Conversion> {
        Some(Conversion {
            column: self.numeric_columns.get(self.column_idx)?.clone(),
            from_currency: self.currencies.get(self.currency_idx)?.clone(),
        })
    }

    pub(crate) fn displayed(&self) -> &Table {
        &self.view.table
    }

    /// Convert the session's copy of this sheet and show the result.
    pub(crate) fn apply(&mut self, session: &mut SessionState, conversion: &Conversion) {
        let name = self.view.sheet_name.clone();
        if !session.apply_conversion(&name, conversion) {
            return;
        }
        if let Some(view) = session.render(&name) {
            self.numeric_columns = numeric_columns(&view.table);
            self.column_idx = self
                .numeric_columns
                .iter()
                .position(|c| *c == conversion.column)
                .unwrap_or(0);
            self.view = view;
        }
        self.rates = session.exchange_rates.clone();
        self.applied = Some(conversion.clone());
    }

    fn conversion_line(&self) -> String {
        if self.numeric_columns.is_empty() {
            return "No numeric columns to convert.".to_string();
        }
        let next = match self.selection() {
            None => "No currencies configured.".to_string(),
            Some(c) => match self.rates.get(&c.from_currency) {
                Some(rate) => format!(
                    "c converts '{}' from {} to {TARGET_CURRENCY} at {rate}",
                    c.column, c.from_currency
                ),
                None => format!("No rate for {}; c leaves '{}' unchanged", c.from_currency, c.column),
            },
        };
        match &self.applied {
            Some(a) => format!("{}  |  {next}", applied_line(a, &self.rates)),
            None => next,
        }
    }

    fn cycle(idx: usize, len: usize, forward: bool) -> usize {
        if len == 0 {
            return 0;
        }
        if forward {
            (idx + 1) % len
        } else {
            (idx + len - 1) % len
        }
    }
}

fn numeric_columns(table: &Table) -> Vec<String> {
    table.numeric_columns().into_iter().map(String::from).collect()
}

/// Status text for a conversion that has been applied.
pub(crate) fn applied_line(conversion: &Conversion, rates: &RateTable) -> String {
    match rates.get(&conversion.from_currency) {
        Some(rate) => format!(
            "Converted '{}' from {} to {TARGET_CURRENCY} at {rate}",
            conversion.column, conversion.from_currency
        ),
        None => format!(
            "No rate for {}; '{}' left unchanged",
            conversion.from_currency, conversion.column
        ),
    }
}

impl ReportView for SheetScreen {
    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let chart_height = if self.view.charts.is_empty() { 0 } else { CHART_HEIGHT };

        let mut constraints = vec![
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(if self.view.subheader.is_some() { 1 } else { 0 }),
            Constraint::Min(4),
        ];
        for sub in &self.view.sub_tables {
            let h = u16::try_from(sub.table.row_count())
                .unwrap_or(u16::MAX)
                .saturating_add(3)
                .min(SUB_TABLE_MAX_HEIGHT);
            constraints.push(Constraint::Length(h));
        }
        constraints.push(Constraint::Length(chart_height));
        constraints.push(Constraint::Length(1));
        constraints.push(Constraint::Length(1));
        let areas = Layout::vertical(constraints).split(area);

        let title = format!(" Sheet: {}", self.view.sheet_name);
        frame.render_widget(Paragraph::new(title).style(HEADER_STYLE), areas[0]);
        frame.render_widget(
            Paragraph::new("━".repeat(area.width as usize)).style(FOOTER_STYLE),
            areas[1],
        );
        if let Some(sub) = self.view.subheader {
            frame.render_widget(
                Paragraph::new(format!(" {sub}")).style(SECTION_STYLE),
                areas[2],
            );
        }

        // Main table; header takes two lines (header + bottom margin)
        let table_area = areas[3];
        self.visible_count = (table_area.height.saturating_sub(2) as usize).max(1);
        self.offset = self
            .offset
            .min(self.displayed().row_count().saturating_sub(self.visible_count));
        render_table(
            frame,
            table_area,
            self.displayed(),
            self.decimals,
            self.offset,
            self.visible_count,
            None,
        );

        let mut next = 4;
        for sub in &self.view.sub_tables {
            let h = areas[next].height.saturating_sub(3) as usize;
            render_table(
                frame,
                areas[next],
                &sub.table,
                self.decimals,
                0,
                h.max(1),
                Some(sub.caption.as_str()),
            );
            next += 1;
        }

        if chart_height > 0 {
            render_outcomes(frame, areas[next], &self.view.charts);
        }
        next += 1;

        frame.render_widget(
            Paragraph::new(format!(" {}", self.conversion_line())).style(STATUS_STYLE),
            areas[next],
        );

        let rows = self.displayed().row_count();
        let pos_info = if rows > self.visible_count {
            format!("  row {}/{}", self.offset + 1, rows)
        } else {
            String::new()
        };
        frame.render_widget(
            Paragraph::new(format!(
                " \u{2191}/\u{2193}=scroll  c=convert  [/]=column  f=currency  q/Esc=close{pos_info}"
            ))
            .style(FOOTER_STYLE),
            areas[next + 1],
        );
    }

    fn handle_key(&mut self, code: KeyCode) -> ReportViewAction {
        let page = self.visible_count;
        let max = self.displayed().row_count().saturating_sub(page);
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return ReportViewAction::Close,
            KeyCode::Up | KeyCode::Char('k') => self.offset = self.offset.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => self.offset = (self.offset + 1).min(max),
            KeyCode::PageUp => self.offset = self.offset.saturating_sub(page),
            KeyCode::PageDown => self.offset = (self.offset + page).min(max),
            KeyCode::Home => self.offset = 0,
            KeyCode::End => self.offset = max,
            KeyCode::Char('c') => {
                if let Some(c) = self.selection() {
                    return ReportViewAction::Convert(c);
                }
            }
            KeyCode::Char(']') => {
                self.column_idx = Self::cycle(self.column_idx, self.numeric_columns.len(), true);
            }
            KeyCode::Char('[') => {
                self.column_idx = Self::cycle(self.column_idx, self.numeric_columns.len(), false);
            }
            KeyCode::Char('f') => {
                self.currency_idx = Self::cycle(self.currency_idx, self.currencies.len(), true);
            }
            _ => {}
        }
        ReportViewAction::Continue
    }
}

// ---------------------------------------------------------------------------
// Single-chart view (currency trends)
// ---------------------------------------------------------------------------

pub(crate) struct ChartScreen {
    title: String,
    chart: Chart,
}

impl ChartScreen {
    pub(crate) fn new(title: impl Into<String>, chart: Chart) -> Self {
        Self {
            title: title.into(),
            chart,
        }
    }
}

impl ReportView for ChartScreen {
    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let [header_area, sep_area, chart_area, footer_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(area);
        frame.render_widget(
            Paragraph::new(format!(" {}", self.title)).style(HEADER_STYLE),
            header_area,
        );
        frame.render_widget(
            Paragraph::new("━".repeat(area.width as usize)).style(FOOTER_STYLE),
            sep_area,
        );
        render_chart(frame, chart_area, &self.chart);
        frame.render_widget(
            Paragraph::new(" q/Esc=close").style(FOOTER_STYLE),
            footer_area,
        );
    }

    fn handle_key(&mut self, code: KeyCode) -> ReportViewAction {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => ReportViewAction::Close,
            _ => ReportViewAction::Continue,
        }
    }
}

// ---------------------------------------------------------------------------
// Widgets
// ---------------------------------------------------------------------------

fn column_width(table: &Table, col: usize, decimals: usize) -> u16 {
    let column = &table.columns[col];
    let widest = column
        .values
        .iter()
        .map(|v| cell(v, decimals).chars().count())
        .max()
        .unwrap_or(0);
    widest
        .max(column.name.chars().count())
        .clamp(1, MAX_COLUMN_WIDTH) as u16
}

pub(crate) fn render_table(
    frame: &mut Frame,
    area: Rect,
    table: &Table,
    decimals: usize,
    offset: usize,
    visible: usize,
    caption: Option<&str>,
) {
    let block = match caption {
        Some(c) => Block::default()
            .title(Span::styled(format!(" {c}"), SECTION_STYLE))
            .borders(Borders::TOP)
            .border_style(FOOTER_STYLE),
        None => Block::default(),
    };

    if table.columns.is_empty() {
        frame.render_widget(
            Paragraph::new(" (empty sheet)").style(FOOTER_STYLE).block(block),
            area,
        );
        return;
    }

    let index_width = table
        .index
        .iter()
        .map(|i| i.to_string().len())
        .max()
        .unwrap_or(1)
        .max(1) as u16;
    let mut widths = vec![Constraint::Length(index_width)];
    widths.extend((0..table.columns.len()).map(|c| Constraint::Length(column_width(table, c, decimals))));

    let header = Row::new(
        std::iter::once(Cell::from(""))
            .chain(table.columns.iter().map(|c| Cell::from(c.name.clone()))),
    )
    .style(HEADER_ROW_STYLE)
    .bottom_margin(1);

    let rows: Vec<Row> = (offset..table.row_count())
        .take(visible)
        .map(|r| {
            let mut cells = vec![Cell::from(Span::styled(table.index[r].to_string(), FOOTER_STYLE))];
            for col in &table.columns {
                let text = cell(&col.values[r], decimals);
                let line = if col.kind == ColumnKind::Numeric {
                    Line::from(text).alignment(Alignment::Right)
                } else {
                    Line::from(text)
                };
                cells.push(Cell::from(line));
            }
            Row::new(cells)
        })
        .collect();

    let widget = TuiTable::new(rows, widths)
        .header(header)
        .column_spacing(2)
        .block(block);
    frame.render_widget(widget, area);
}

fn render_outcomes(frame: &mut Frame, area: Rect, outcomes: &[ChartOutcome]) {
    if outcomes.is_empty() {
        return;
    }
    let n = outcomes.len() as u32;
    let constraints: Vec<Constraint> = (0..n).map(|_| Constraint::Ratio(1, n)).collect();
    let areas = Layout::horizontal(constraints).split(area);
    for (outcome, chunk) in outcomes.iter().zip(areas.iter()) {
        match outcome {
            ChartOutcome::Drawn(chart) => render_chart(frame, *chunk, chart),
            ChartOutcome::Skipped { missing } => {
                let text = format!(" Missing columns: {}", missing.join(", "));
                frame.render_widget(
                    Paragraph::new(text).style(FOOTER_STYLE).block(
                        Block::default()
                            .title(" Chart unavailable")
                            .borders(Borders::ALL)
                            .border_style(FOOTER_STYLE),
                    ),
                    *chunk,
                );
            }
        }
    }
}

/// Bar heights relative to the largest positive value, so small rates and
/// large amounts chart alike. Negative values draw as empty bars.
fn scaled(value: f64, max: f64) -> u64 {
    if max <= 0.0 || !value.is_finite() {
        return 0;
    }
    ((value.max(0.0) / max) * 1000.0).round() as u64
}

fn chart_block(title: &str, legend: &[String]) -> Block<'static> {
    let mut spans = vec![Span::styled(
        format!(" {title} "),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if legend.len() > 1 {
        for (i, name) in legend.iter().enumerate() {
            spans.push(Span::styled(
                format!(" \u{25a0} {name}"),
                Style::default().fg(series_color(i)),
            ));
        }
    }
    Block::default()
        .title(Line::from(spans))
        .borders(Borders::ALL)
        .border_style(FOOTER_STYLE)
}

pub(crate) fn render_chart(frame: &mut Frame, area: Rect, chart: &Chart) {
    match chart {
        Chart::Bar {
            title,
            categories,
            series,
        } => {
            let names: Vec<String> = series.iter().map(|s| s.name.clone()).collect();
            let max = series
                .iter()
                .flat_map(|s| s.values.iter().flatten())
                .fold(0.0_f64, |m, v| m.max(*v));
            let slots = u16::try_from(categories.len().saturating_mul(series.len() + 1))
                .unwrap_or(u16::MAX)
                .max(1);
            let bar_width = (area.width.saturating_sub(2) / slots).clamp(1, 6);

            let groups: Vec<BarGroup> = categories
                .iter()
                .enumerate()
                .map(|(i, label)| {
                    let bars: Vec<Bar> = series
                        .iter()
                        .enumerate()
                        .map(|(si, s)| {
                            let v = s.values.get(i).copied().flatten().unwrap_or(0.0);
                            Bar::default()
                                .value(scaled(v, max))
                                .text_value(compact(v))
                                .style(Style::default().fg(series_color(si)))
                        })
                        .collect();
                    BarGroup::default()
                        .label(Line::from(label.clone()))
                        .bars(&bars)
                })
                .collect();

            let mut widget = BarChart::default()
                .block(chart_block(title, &names))
                .bar_width(bar_width)
                .bar_gap(0)
                .group_gap(1);
            for group in &groups {
                widget = widget.data(group.clone());
            }
            frame.render_widget(widget, area);
        }
        Chart::Line {
            title,
            x_labels,
            series,
        } => {
            let names: Vec<String> = series.iter().map(|s| s.name.clone()).collect();
            let points: Vec<Vec<(f64, f64)>> = series
                .iter()
                .map(|s| {
                    s.values
                        .iter()
                        .enumerate()
                        .filter_map(|(i, v)| v.map(|v| (i as f64, v)))
                        .collect()
                })
                .collect();
            let (y_min, y_max) = y_bounds(points.iter().flatten().map(|(_, y)| *y));
            let x_max = x_labels.len().saturating_sub(1).max(1) as f64;

            let datasets: Vec<Dataset> = series
                .iter()
                .zip(points.iter())
                .enumerate()
                .map(|(i, (s, data))| {
                    Dataset::default()
                        .name(s.name.clone())
                        .marker(Marker::Braille)
                        .graph_type(GraphType::Line)
                        .style(Style::default().fg(series_color(i)))
                        .data(data)
                })
                .collect();

            let x_axis_labels: Vec<String> = match x_labels.len() {
                0 => vec![],
                1 | 2 => x_labels.clone(),
                n => vec![
                    x_labels[0].clone(),
                    x_labels[n / 2].clone(),
                    x_labels[n - 1].clone(),
                ],
            };
            let widget = LineChart::new(datasets)
                .block(chart_block(title, &names))
                .x_axis(
                    Axis::default()
                        .style(FOOTER_STYLE)
                        .bounds([0.0, x_max])
                        .labels(x_axis_labels),
                )
                .y_axis(
                    Axis::default()
                        .style(FOOTER_STYLE)
                        .bounds([y_min, y_max])
                        .labels(vec![
                            compact(y_min),
                            compact((y_min + y_max) / 2.0),
                            compact(y_max),
                        ]),
                );
            frame.render_widget(widget, area);
        }
        Chart::Pie { title, slices } => {
            // No pie primitive in a terminal: one horizontal bar per slice, sized by share
            let shares = pie_shares(slices);
            let bars: Vec<Bar> = slices
                .iter()
                .zip(shares.iter())
                .enumerate()
                .map(|(i, ((name, value), share))| {
                    let text = match share {
                        Some(s) => format!("{:.1}%", s * 100.0),
                        None => format!("{} (n/a)", compact(*value)),
                    };
                    Bar::default()
                        .label(Line::from(name.clone()))
                        .value((share.unwrap_or(0.0) * 1000.0).round() as u64)
                        .text_value(text)
                        .style(Style::default().fg(series_color(i)))
                })
                .collect();
            let widget = BarChart::default()
                .block(chart_block(title, &[]))
                .direction(Direction::Horizontal)
                .bar_width(1)
                .bar_gap(0)
                .data(BarGroup::default().bars(&bars));
            frame.render_widget(widget, area);
        }
        Chart::Histogram { title, bins, .. } => {
            let bars: Vec<Bar> = bins
                .iter()
                .map(|b| {
                    Bar::default()
                        .label(Line::from(compact(b.start)))
                        .value(b.count)
                        .text_value(b.count.to_string())
                        .style(Style::default().fg(series_color(0)))
                })
                .collect();
            let slots = u16::try_from(bins.len()).unwrap_or(u16::MAX).max(1);
            let widget = BarChart::default()
                .block(chart_block(title, &[]))
                .bar_width((area.width.saturating_sub(2) / slots).saturating_sub(1).clamp(1, 8))
                .bar_gap(1)
                .data(BarGroup::default().bars(&bars));
            frame.render_widget(widget, area);
        }
    }
}

fn y_bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    if min == max {
        return (min - 1.0, max + 1.0);
    }
    let pad = (max - min) * 0.05;
    (min - pad, max + pad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::tests::xlsx_bytes;
    use crate::models::{Column, Value};
    use crate::reports::{build_view, ReportKind};
    use ratatui::{backend::TestBackend, Terminal};

    fn pnl_screen() -> SheetScreen {
        let table = Table::new(vec![
            Column::texts("Customer", &["Acme", "Globex"]),
            Column::numbers("Revenue", &[500.0, 300.0]),
            Column::numbers("Cost of Sales", &[200.0, 250.0]),
        ]);
        let view = build_view("P&L Per Customer", ReportKind::PnlPerCustomer, &table);
        let mut rates = RateTable::default();
        rates.set("EUR", 2.0);
        SheetScreen::new(view, rates, 2)
    }

    fn screen_text(screen: &mut SheetScreen) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 50)).unwrap();
        terminal.draw(|f| screen.draw(f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn pnl_session() -> SessionState {
        let mut session = SessionState::default();
        session.load(xlsx_bytes(&[(
            "P&L Per Customer",
            &["Customer", "Revenue", "Cost of Sales"],
            &[&["Acme", "500", "200"], &["Globex", "300", "250"]],
        )]));
        session.update_rate("EUR", 2.0);
        session
    }

    #[test]
    fn test_convert_key_requests_selected_conversion() {
        let mut screen = pnl_screen();
        let expected = Conversion {
            column: "Revenue".to_string(),
            from_currency: "EUR".to_string(),
        };
        assert_eq!(screen.selection(), Some(expected.clone()));
        assert_eq!(screen.handle_key(KeyCode::Char('c')), ReportViewAction::Convert(expected));
        // Nothing changes until the owner of the data applies it
        assert_eq!(
            screen.displayed().column("Revenue").unwrap().values[0],
            Value::Number(500.0)
        );
    }

    #[test]
    fn test_apply_twice_compounds() {
        let mut session = pnl_session();
        let view = session.render("P&L Per Customer").unwrap();
        let mut screen = SheetScreen::new(view, session.exchange_rates.clone(), 2);
        for _ in 0..2 {
            let ReportViewAction::Convert(c) = screen.handle_key(KeyCode::Char('c')) else {
                panic!("c should request a conversion");
            };
            screen.apply(&mut session, &c);
        }
        assert_eq!(
            screen.displayed().column("Revenue").unwrap().values[0],
            Value::Number(2000.0)
        );
        assert_eq!(
            session.sheet("P&L Per Customer").unwrap().table.column("Revenue").unwrap().values[0],
            Value::Number(2000.0)
        );
        let text = screen_text(&mut screen);
        assert!(text.contains("Converted 'Revenue' from EUR to USD at 2"));
    }

    #[test]
    fn test_cycle_column_and_currency() {
        let mut screen = pnl_screen();
        screen.handle_key(KeyCode::Char(']'));
        assert_eq!(screen.selection().unwrap().column, "Cost of Sales");
        screen.handle_key(KeyCode::Char(']'));
        assert_eq!(screen.selection().unwrap().column, "Revenue");
        screen.handle_key(KeyCode::Char('['));
        assert_eq!(screen.selection().unwrap().column, "Cost of Sales");
        screen.handle_key(KeyCode::Char('f'));
        assert_eq!(screen.selection().unwrap().from_currency, "GBP");
    }

    #[test]
    fn test_with_conversion_preselects_and_reports() {
        let mut screen = pnl_screen().with_conversion(&Conversion {
            column: "Cost of Sales".to_string(),
            from_currency: "JPY".to_string(),
        });
        let selection = screen.selection().unwrap();
        assert_eq!(selection.column, "Cost of Sales");
        assert_eq!(selection.from_currency, "JPY");
        let text = screen_text(&mut screen);
        assert!(text.contains("No rate for JPY; 'Cost of Sales' left unchanged"));
    }

    #[test]
    fn test_close_keys() {
        let mut screen = pnl_screen();
        assert_eq!(screen.handle_key(KeyCode::Esc), ReportViewAction::Close);
        assert_eq!(screen.handle_key(KeyCode::Char('q')), ReportViewAction::Close);
    }

    #[test]
    fn test_draw_shows_subheader_and_tables() {
        let mut screen = pnl_screen();
        let text = screen_text(&mut screen);
        assert!(text.contains("Sheet: P&L Per Customer"));
        assert!(text.contains("Profitability per Customer"));
        assert!(text.contains("Gross Profit"));
        assert!(text.contains("c converts 'Revenue' from EUR to USD at 2"));
    }

    #[test]
    fn test_draw_skipped_chart() {
        let table = Table::new(vec![Column::numbers("Revenue", &[1.0])]);
        let view = build_view("Budget VS Actual", ReportKind::BudgetVsActual, &table);
        let mut screen = SheetScreen::new(view, RateTable::default(), 2);
        let text = screen_text(&mut screen);
        assert!(text.contains("Missing columns: Direct Costs"));
    }

    #[test]
    fn test_draw_bar_chart_with_more_rows_than_u16() {
        let values: Vec<f64> = (0..32768).map(|i| i as f64).collect();
        let table = Table::new(vec![Column::numbers("Fixed Assets", &values)]);
        let view = build_view("Balance Sheet", ReportKind::BalanceSheet, &table);
        let mut screen = SheetScreen::new(view, RateTable::default(), 2);
        let text = screen_text(&mut screen);
        assert!(text.contains("Sheet: Balance Sheet"));
        assert!(text.contains("row 1/32768"));
    }

    #[test]
    fn test_draw_large_sub_table() {
        let statuses = vec!["DUE"; 70000];
        let amounts = vec![1.0; 70000];
        let table = Table::new(vec![
            Column::texts("statusDays", &statuses),
            Column::numbers("outstandingusd", &amounts),
        ]);
        let view = build_view("Accounts Receivable", ReportKind::AccountsReceivable, &table);
        let mut screen = SheetScreen::new(view, RateTable::default(), 2);
        assert!(screen_text(&mut screen).contains("Overdue Receivables"));
    }

    #[test]
    fn test_chart_screen_draws_trends() {
        let mut screen = ChartScreen::new("Currency Trends", crate::currency::trend_chart());
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| screen.draw(f)).unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Exchange Rate Trends"));
        assert_eq!(screen.handle_key(KeyCode::Char('x')), ReportViewAction::Continue);
    }

    #[test]
    fn test_scaled_and_bounds() {
        assert_eq!(scaled(50.0, 100.0), 500);
        assert_eq!(scaled(-5.0, 100.0), 0);
        assert_eq!(scaled(1.0, 0.0), 0);
        assert_eq!(y_bounds([2.0, 2.0].into_iter()), (1.0, 3.0));
        assert_eq!(y_bounds(std::iter::empty()), (0.0, 1.0));
    }
}
