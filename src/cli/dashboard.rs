use std::io::Write;
use std::path::Path;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;

use super::report::view::{ChartScreen, SheetScreen};
use crate::currency::{self, parse_rate_arg, TARGET_CURRENCY};
use crate::error::{ReportError, Result};
use crate::session::{LoadStatus, SessionState};
use crate::settings::{load_settings, shellexpand_path};
use crate::tui::{
    wrap_text, ReportView, ReportViewAction, ERROR_STYLE, FOOTER_STYLE, HEADER_STYLE,
    SECTION_STYLE, SELECTED_STYLE, STATUS_STYLE,
};

enum DashboardScreen {
    Home,
    Sheet(SheetScreen),
    Trends(ChartScreen),
}

enum TerminalCommand {
    Load,
    EditRate,
}

#[derive(Debug, Clone, PartialEq)]
struct Status {
    text: String,
    is_error: bool,
}

impl Status {
    fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

impl From<LoadStatus> for Status {
    fn from(status: LoadStatus) -> Self {
        match status {
            LoadStatus::Loaded { .. } => Status::info(status.message()),
            LoadStatus::Failed { .. } => Status::error(status.message()),
        }
    }
}

struct Dashboard {
    session: SessionState,
    screen: DashboardScreen,
    selection: usize,
    decimals: usize,
    status: Option<Status>,
    terminal_action: Option<TerminalCommand>,
}

impl Dashboard {
    fn new(session: SessionState, decimals: usize) -> Self {
        Self {
            session,
            screen: DashboardScreen::Home,
            selection: 0,
            decimals,
            status: None,
            terminal_action: None,
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        match &mut self.screen {
            DashboardScreen::Sheet(view) => view.draw(frame),
            DashboardScreen::Trends(view) => view.draw(frame),
            DashboardScreen::Home => self.draw_home(frame),
        }
    }

    fn draw_home(&self, frame: &mut Frame) {
        let area = frame.area();
        let border_style = Style::default().fg(Color::DarkGray);

        let status_lines = self
            .status
            .as_ref()
            .map(|s| wrap_text(&s.text, area.width.saturating_sub(2) as usize).1)
            .unwrap_or(1);

        let [header_area, sep1, body_area, sep2, status_area, hints_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Length(status_lines),
            Constraint::Length(1),
        ])
        .areas(area);

        let title = if self.session.has_data() {
            format!(" Group Report: {} sheets", self.session.sheet_names.len())
        } else {
            " Group Report".to_string()
        };
        frame.render_widget(Paragraph::new(title).style(HEADER_STYLE), header_area);

        let sep_line = "\u{2501}".repeat(area.width as usize);
        let sep_widget = Paragraph::new(sep_line.as_str()).style(border_style);
        frame.render_widget(sep_widget.clone(), sep1);
        frame.render_widget(sep_widget, sep2);

        let [sheets_area, rates_area] =
            Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)])
                .areas(body_area);
        self.draw_sheet_list(frame, sheets_area);
        self.draw_rates(frame, rates_area);

        if let Some(status) = &self.status {
            let (wrapped, _) = wrap_text(&status.text, status_area.width.saturating_sub(2) as usize);
            let style = if status.is_error { ERROR_STYLE } else { STATUS_STYLE };
            frame.render_widget(Paragraph::new(wrapped).style(style), status_area);
        }

        let hints = if self.session.has_data() {
            " \u{2191}\u{2193} select  Enter open  o load  e edit rate  t trends  q quit"
        } else {
            " o load  e edit rate  t trends  q quit"
        };
        frame.render_widget(Paragraph::new(hints).style(FOOTER_STYLE), hints_area);
    }

    fn draw_sheet_list(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(Span::styled(" Sheets ", SECTION_STYLE));

        if !self.session.has_data() {
            let msg = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(" No workbook loaded", STATUS_STYLE)),
                Line::from(""),
                Line::from(" Press o and enter the path of an .xlsx or .xls file."),
            ])
            .block(block);
            frame.render_widget(msg, area);
            return;
        }

        let lines: Vec<Line> = self
            .session
            .workbook
            .sheets
            .iter()
            .enumerate()
            .map(|(i, sheet)| {
                let label = format!(" {:<28} {}", sheet.name, sheet.kind.label());
                if i == self.selection {
                    Line::from(Span::styled(label, SELECTED_STYLE))
                } else {
                    Line::from(label)
                }
            })
            .collect();
        let visible = area.height.saturating_sub(2) as usize;
        let skip = (self.selection + 1).saturating_sub(visible);
        frame.render_widget(
            Paragraph::new(lines).block(block).scroll((skip as u16, 0)),
            area,
        );
    }

    fn draw_rates(&self, frame: &mut Frame, area: Rect) {
        let rows: Vec<Row> = self
            .session
            .exchange_rates
            .iter()
            .map(|(code, rate)| Row::new(vec![Cell::from(code.to_string()), Cell::from(rate.to_string())]))
            .collect();
        let table = Table::new(rows, [Constraint::Length(6), Constraint::Fill(1)])
            .header(Row::new(vec!["Code", "Rate"]).style(HEADER_STYLE))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray))
                    .title(Span::styled(format!(" Rates to {TARGET_CURRENCY} "), SECTION_STYLE)),
            );
        frame.render_widget(table, area);
    }

    /// Returns true when the dashboard should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        let action = match &mut self.screen {
            DashboardScreen::Sheet(view) => match view.handle_key(code) {
                ReportViewAction::Convert(c) => {
                    view.apply(&mut self.session, &c);
                    ReportViewAction::Continue
                }
                action => action,
            },
            DashboardScreen::Trends(view) => view.handle_key(code),
            DashboardScreen::Home => return self.handle_home_key(code),
        };
        if action == ReportViewAction::Close {
            self.screen = DashboardScreen::Home;
        }
        false
    }

    fn handle_home_key(&mut self, code: KeyCode) -> bool {
        let count = self.session.sheet_names.len();
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up | KeyCode::Char('k') => {
                self.selection = self.selection.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if count > 0 {
                    self.selection = (self.selection + 1).min(count - 1);
                }
            }
            KeyCode::Enter => self.open_selected(),
            KeyCode::Char('o') => self.terminal_action = Some(TerminalCommand::Load),
            KeyCode::Char('e') => self.terminal_action = Some(TerminalCommand::EditRate),
            KeyCode::Char('t') => {
                self.screen = DashboardScreen::Trends(ChartScreen::new(
                    "Currency Trends",
                    currency::trend_chart(),
                ));
            }
            _ => {}
        }
        false
    }

    fn open_selected(&mut self) {
        let Some(name) = self.session.sheet_names.get(self.selection) else {
            return;
        };
        if let Some(view) = self.session.render(name) {
            self.screen = DashboardScreen::Sheet(SheetScreen::new(
                view,
                self.session.exchange_rates.clone(),
                self.decimals,
            ));
        }
    }

    fn apply_load(&mut self, path: &str) {
        let status = self.session.load_path(Path::new(&shellexpand_path(path)));
        self.selection = 0;
        self.status = Some(status.into());
    }

    fn apply_rate_edit(&mut self, code: &str, value: &str) {
        self.status = Some(match parse_rate_arg(&format!("{code}={value}")) {
            Ok((code, rate)) => Status::info(self.session.update_rate(&code, rate)),
            Err(e) => Status::error(e.to_string()),
        });
    }
}

// ---------------------------------------------------------------------------
// Terminal-mode helpers
// ---------------------------------------------------------------------------

fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    std::io::stdout().flush()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn run_terminal_command(cmd: TerminalCommand, dashboard: &mut Dashboard) -> Result<()> {
    match cmd {
        TerminalCommand::Load => {
            let path = prompt("Workbook path (.xlsx or .xls): ")?;
            if !path.is_empty() {
                dashboard.apply_load(&path);
            }
        }
        TerminalCommand::EditRate => {
            let codes = dashboard.session.exchange_rates.codes().join(", ");
            println!("Current rates: {codes}");
            let code = prompt("Currency code: ")?;
            if code.is_empty() {
                return Ok(());
            }
            let value = prompt(&format!("Rate to {TARGET_CURRENCY}: "))?;
            dashboard.apply_rate_edit(&code, &value);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

pub fn run(file: Option<String>) -> Result<()> {
    let settings = load_settings();
    let mut dashboard = Dashboard::new(SessionState::with_rates(settings.rates), settings.decimals);

    if let Some(path) = file.or(settings.default_workbook) {
        dashboard.apply_load(&path);
    }

    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        ratatui::restore();
        hook(info);
    }));

    loop {
        let mut terminal = ratatui::init();

        let exit: std::result::Result<Option<TerminalCommand>, ReportError> = loop {
            if let Err(e) = terminal.draw(|frame| dashboard.draw(frame)) {
                break Err(e.into());
            }

            match event::read() {
                Err(e) => break Err(e.into()),
                Ok(Event::Key(key)) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if key.modifiers.contains(KeyModifiers::CONTROL)
                        && key.code == KeyCode::Char('c')
                    {
                        break Ok(None);
                    }
                    if dashboard.handle_key(key.code) {
                        break Ok(None);
                    }
                    if let Some(cmd) = dashboard.terminal_action.take() {
                        break Ok(Some(cmd));
                    }
                }
                _ => {}
            }
        };

        drop(terminal);
        ratatui::restore();

        match exit {
            Err(e) => return Err(e),
            Ok(None) => return Ok(()),
            Ok(Some(cmd)) => {
                if let Err(e) = run_terminal_command(cmd, &mut dashboard) {
                    dashboard.status = Some(Status::error(e.to_string()));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::tests::xlsx_bytes;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn screen_text(dashboard: &mut Dashboard) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| dashboard.draw(f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn loaded() -> Dashboard {
        let mut session = SessionState::default();
        session.load(xlsx_bytes(&[
            ("Balance Sheet", &["Fixed Assets"], &[&["1000"], &["1500"]]),
            (
                "P&L Per Customer",
                &["Customer", "Revenue", "Cost of Sales"],
                &[&["Acme", "500", "200"]],
            ),
        ]));
        Dashboard::new(session, 2)
    }

    #[test]
    fn test_home_without_workbook_prompts() {
        let mut dashboard = Dashboard::new(SessionState::default(), 2);
        let text = screen_text(&mut dashboard);
        assert!(text.contains("No workbook loaded"));
        assert!(text.contains("EUR"));
    }

    #[test]
    fn test_home_lists_sheets() {
        let mut dashboard = loaded();
        let text = screen_text(&mut dashboard);
        assert!(text.contains("Balance Sheet"));
        assert!(text.contains("P&L Per Customer"));
    }

    #[test]
    fn test_select_and_open_sheet_then_close() {
        let mut dashboard = loaded();
        dashboard.handle_key(KeyCode::Down);
        dashboard.handle_key(KeyCode::Down);
        assert_eq!(dashboard.selection, 1);
        dashboard.handle_key(KeyCode::Enter);
        assert!(matches!(dashboard.screen, DashboardScreen::Sheet(_)));
        let text = screen_text(&mut dashboard);
        assert!(text.contains("Profitability per Customer"));

        assert!(!dashboard.handle_key(KeyCode::Char('q')));
        assert!(matches!(dashboard.screen, DashboardScreen::Home));
        assert!(dashboard.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn test_conversion_persists_after_reopening_sheet() {
        let mut dashboard = loaded();
        dashboard.apply_rate_edit("EUR", "2");
        dashboard.handle_key(KeyCode::Enter);
        dashboard.handle_key(KeyCode::Char('c'));
        dashboard.handle_key(KeyCode::Char('c'));
        dashboard.handle_key(KeyCode::Esc);
        assert!(matches!(dashboard.screen, DashboardScreen::Home));

        dashboard.handle_key(KeyCode::Enter);
        let DashboardScreen::Sheet(view) = &dashboard.screen else {
            panic!("sheet screen should be open");
        };
        assert_eq!(
            view.displayed().column("Fixed Assets").unwrap().values[0],
            crate::models::Value::Number(4000.0)
        );
    }

    #[test]
    fn test_trends_screen() {
        let mut dashboard = Dashboard::new(SessionState::default(), 2);
        dashboard.handle_key(KeyCode::Char('t'));
        assert!(matches!(dashboard.screen, DashboardScreen::Trends(_)));
        assert!(screen_text(&mut dashboard).contains("Currency Trends"));
    }

    #[test]
    fn test_terminal_actions_are_queued() {
        let mut dashboard = Dashboard::new(SessionState::default(), 2);
        dashboard.handle_key(KeyCode::Char('o'));
        assert!(matches!(dashboard.terminal_action, Some(TerminalCommand::Load)));
        dashboard.terminal_action = None;
        dashboard.handle_key(KeyCode::Char('e'));
        assert!(matches!(dashboard.terminal_action, Some(TerminalCommand::EditRate)));
    }

    #[test]
    fn test_rate_edit_status() {
        let mut dashboard = Dashboard::new(SessionState::default(), 2);
        dashboard.apply_rate_edit("eur", "0.9");
        assert_eq!(dashboard.status, Some(Status::info("Rate for EUR updated.")));
        assert_eq!(dashboard.session.exchange_rates.get("EUR"), Some(0.9));

        dashboard.apply_rate_edit("EUR", "abc");
        assert!(dashboard.status.as_ref().unwrap().is_error);
        assert_eq!(dashboard.session.exchange_rates.get("EUR"), Some(0.9));
    }

    #[test]
    fn test_failed_load_clears_sheets_and_shows_error() {
        let mut dashboard = loaded();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"not a workbook").unwrap();
        dashboard.apply_load(path.to_str().unwrap());
        let status = dashboard.status.clone().unwrap();
        assert!(status.is_error);
        assert!(status.text.starts_with("Error while processing the file"));
        assert!(!dashboard.session.has_data());
        assert!(screen_text(&mut dashboard).contains("No workbook loaded"));
    }
}
