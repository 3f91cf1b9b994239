use super::load_session;
use super::report::text::{format_sheet_list, SheetSummary};
use crate::error::Result;

pub fn run(file: &str) -> Result<()> {
    let session = load_session(file, &[])?;
    let summaries: Vec<SheetSummary> = session
        .workbook
        .sheets
        .iter()
        .map(|sheet| SheetSummary {
            name: sheet.name.clone(),
            report: sheet.kind.label(),
            rows: sheet.table.row_count(),
            columns: sheet.table.columns.len(),
            charts: session
                .render(&sheet.name)
                .map_or(0, |view| view.drawn_charts().count()),
        })
        .collect();
    println!("{}", format_sheet_list(&summaries));
    Ok(())
}
