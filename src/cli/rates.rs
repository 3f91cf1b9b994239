use super::report::text::format_rates;
use super::session_with_rates;
use crate::error::Result;

/// Print the rate table after applying `--rate` overrides. Nothing is saved.
pub fn run(rate_args: &[String]) -> Result<()> {
    let session = session_with_rates(rate_args)?;
    println!("{}", format_rates(&session.exchange_rates));
    Ok(())
}
