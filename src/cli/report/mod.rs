pub mod text;
pub mod view;

use std::io::IsTerminal;

use crossterm::event::KeyCode;
use ratatui::Frame;

use crate::currency;
use crate::error::{ReportError, Result};
use crate::session::{Conversion, SessionState};
use crate::settings::load_settings;
use crate::tui::{run_report_view, ReportView, ReportViewAction};

use super::{load_session, ShowArgs};

/// Interactive view when stdout is a terminal, plain text otherwise.
fn wants_view(mode: Option<&str>) -> bool {
    match mode {
        Some("text") => false,
        Some("view") => true,
        _ => std::io::stdout().is_terminal(),
    }
}

pub fn show(args: ShowArgs) -> Result<()> {
    let settings = load_settings();
    let mut session = load_session(&args.file, &args.rate)?;

    let sheet = session.sheet(&args.sheet).ok_or_else(|| ReportError::UnknownSheet {
        name: args.sheet.clone(),
        available: session.sheet_names.join(", "),
    })?;

    let conversion = match (&args.convert, &args.from) {
        (Some(column), Some(from)) => {
            let numeric = sheet.table.numeric_columns();
            if !numeric.contains(&column.as_str()) {
                return Err(ReportError::NotNumeric {
                    column: column.clone(),
                    numeric: numeric.join(", "),
                });
            }
            Some(Conversion {
                column: column.clone(),
                from_currency: from.to_uppercase(),
            })
        }
        _ => None,
    };
    if let Some(c) = &conversion {
        session.apply_conversion(&args.sheet, c);
    }

    if wants_view(args.mode.as_deref()) {
        return show_view(session, &args.sheet, conversion.as_ref(), settings.decimals);
    }

    let view = session
        .render(&args.sheet)
        .ok_or_else(|| ReportError::Other(format!("Sheet '{}' disappeared", args.sheet)))?;
    println!(
        "{}",
        text::format_view(&view, settings.decimals, conversion.as_ref(), &session.exchange_rates)
    );
    Ok(())
}

/// Sheet screen that applies conversions to the session it was rendered from.
struct SessionSheetView {
    session: SessionState,
    screen: view::SheetScreen,
}

impl ReportView for SessionSheetView {
    fn draw(&mut self, frame: &mut Frame) {
        self.screen.draw(frame);
    }

    fn handle_key(&mut self, code: KeyCode) -> ReportViewAction {
        match self.screen.handle_key(code) {
            ReportViewAction::Convert(c) => {
                self.screen.apply(&mut self.session, &c);
                ReportViewAction::Continue
            }
            action => action,
        }
    }
}

fn show_view(
    session: SessionState,
    sheet: &str,
    conversion: Option<&Conversion>,
    decimals: usize,
) -> Result<()> {
    let Some(view) = session.render(sheet) else {
        return Ok(());
    };
    let mut screen = view::SheetScreen::new(view, session.exchange_rates.clone(), decimals);
    if let Some(c) = conversion {
        screen = screen.with_conversion(c);
    }
    run_report_view(&mut SessionSheetView { session, screen })
}

pub fn trends(mode: Option<String>) -> Result<()> {
    if wants_view(mode.as_deref()) {
        let mut screen = view::ChartScreen::new("Currency Trends", currency::trend_chart());
        run_report_view(&mut screen)
    } else {
        println!("{}", text::format_trends());
        Ok(())
    }
}
