mod cli;
mod currency;
mod error;
mod fmt;
mod loader;
mod models;
mod reports;
mod session;
mod settings;
mod tui;

use std::io::IsTerminal;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, ConfigCommands};

/// Logs go to stderr. The dashboard owns the terminal, so it only logs when
/// RUST_LOG asks for it.
fn init_logging(interactive: bool) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) => EnvFilter::new(directives),
        Err(_) if interactive => return,
        Err(_) => EnvFilter::new("warn"),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();
}

fn main() {
    let cli = Cli::parse();

    let interactive = matches!(cli.command, None | Some(Commands::Dashboard { .. }));
    init_logging(interactive);

    let result = match cli.command {
        None => cli::dashboard::run(None),
        Some(Commands::Dashboard { file }) => cli::dashboard::run(file),
        Some(Commands::Sheets { file }) => cli::sheets::run(&file),
        Some(Commands::Show(args)) => cli::report::show(args),
        Some(Commands::Rates { rate }) => cli::rates::run(&rate),
        Some(Commands::Trends { mode }) => cli::report::trends(mode),
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => cli::config::show(),
            ConfigCommands::Init => cli::config::init(),
        },
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "group-report", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
