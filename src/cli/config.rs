use crate::error::{ReportError, Result};
use crate::settings::{load_settings, save_settings, settings_file_exists, settings_path, Settings};

pub fn show() -> Result<()> {
    let settings = load_settings();
    let json = serde_json::to_string_pretty(&settings)
        .map_err(|e| ReportError::Settings(e.to_string()))?;
    println!("# {}", settings_path().display());
    println!("{json}");
    Ok(())
}

pub fn init() -> Result<()> {
    let path = settings_path();
    if settings_file_exists() {
        println!("Settings already exist at {}", path.display());
        return Ok(());
    }
    save_settings(&Settings::default())?;
    println!("Wrote default settings to {}", path.display());
    Ok(())
}
