pub mod config;
pub mod dashboard;
pub mod rates;
pub mod report;
pub mod sheets;

use std::path::Path;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use crate::currency::parse_rate_arg;
use crate::error::{ReportError, Result};
use crate::session::{LoadStatus, SessionState};
use crate::settings::{load_settings, shellexpand_path};

#[derive(Parser)]
#[command(
    name = "group-report",
    version,
    about = "Terminal dashboard for group financial report workbooks."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open the interactive dashboard.
    Dashboard {
        /// Workbook to load on start (default: `default_workbook` from settings)
        file: Option<String>,
    },
    /// List the sheets of a workbook and the report each one is recognised as.
    Sheets {
        /// Path to an .xlsx or .xls workbook
        file: String,
    },
    /// Render one sheet: table, sub-header, derived tables and charts.
    Show(ShowArgs),
    /// Print the exchange-rate table.
    Rates {
        /// Override a rate for this run: CODE=VALUE (repeatable)
        #[arg(long)]
        rate: Vec<String>,
    },
    /// Show the currency trend chart.
    Trends {
        /// Output mode: view or text (default: view on a terminal)
        #[arg(long, value_parser = ["view", "text"])]
        mode: Option<String>,
    },
    /// Manage the settings file.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Print a shell completion script.
    Completions {
        shell: Shell,
    },
}

#[derive(Args)]
pub struct ShowArgs {
    /// Path to an .xlsx or .xls workbook
    pub file: String,
    /// Sheet name, e.g. 'P&L Per Customer'
    #[arg(long)]
    pub sheet: String,
    /// Numeric column to convert to USD
    #[arg(long, requires = "from")]
    pub convert: Option<String>,
    /// Source currency code of the converted column, e.g. EUR
    #[arg(long, requires = "convert")]
    pub from: Option<String>,
    /// Override a rate for this run: CODE=VALUE (repeatable)
    #[arg(long)]
    pub rate: Vec<String>,
    /// Output mode: view or text (default: view on a terminal)
    #[arg(long, value_parser = ["view", "text"])]
    pub mode: Option<String>,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective settings.
    Show,
    /// Write a settings file with default values if none exists.
    Init,
}

/// Session seeded with the settings' rates, then each `CODE=VALUE` override in order.
pub(crate) fn session_with_rates(rate_args: &[String]) -> Result<SessionState> {
    let mut session = SessionState::with_rates(load_settings().rates);
    for raw in rate_args {
        let (code, rate) = parse_rate_arg(raw)?;
        session.update_rate(&code, rate);
    }
    Ok(session)
}

/// Load `file` into a fresh session. Unlike the dashboard, a failed load is an error here.
pub(crate) fn load_session(file: &str, rate_args: &[String]) -> Result<SessionState> {
    let mut session = session_with_rates(rate_args)?;
    let path = shellexpand_path(file);
    match session.load_path(Path::new(&path)) {
        LoadStatus::Loaded { .. } => Ok(session),
        // The message already carries the loader's own error prefix
        LoadStatus::Failed { message } => Err(ReportError::Other(message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_show_convert_requires_from() {
        let res = Cli::try_parse_from([
            "group-report", "show", "book.xlsx", "--sheet", "Balance Sheet", "--convert", "Fixed Assets",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn test_session_with_rates_applies_overrides_in_order() {
        let session =
            session_with_rates(&["EUR=0.5".to_string(), "EUR=0.7".to_string(), "chf=1.1".to_string()]).unwrap();
        assert_eq!(session.exchange_rates.get("EUR"), Some(0.7));
        assert_eq!(session.exchange_rates.get("CHF"), Some(1.1));
    }

    #[test]
    fn test_session_with_bad_rate_fails() {
        assert!(matches!(
            session_with_rates(&["EURO=1".to_string()]),
            Err(ReportError::InvalidRate(_))
        ));
    }

    #[test]
    fn test_load_session_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.xlsx");
        let err = load_session(path.to_str().unwrap(), &[]).err().unwrap();
        assert!(err.to_string().starts_with("IO error"));
    }
}
