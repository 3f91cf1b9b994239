use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::currency::RateTable;
use crate::error::{ReportError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Decimal places for numeric table cells.
    #[serde(default = "default_decimals")]
    pub decimals: usize,
    /// Rates every session starts from. Edits made during a session are not written back.
    #[serde(default)]
    pub rates: RateTable,
    /// Workbook the dashboard opens when none is given on the command line.
    #[serde(default)]
    pub default_workbook: Option<String>,
}

fn default_decimals() -> usize {
    2
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            decimals: default_decimals(),
            rates: RateTable::default(),
            default_workbook: None,
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("group-report")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        match serde_json::from_str(&content) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed settings");
                Settings::default()
            }
        }
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| ReportError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn settings_file_exists() -> bool {
    settings_path().exists()
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut rates = RateTable::default();
        rates.set("CHF", 1.12);
        let settings = Settings {
            decimals: 0,
            rates,
            default_workbook: Some("/tmp/group.xlsx".to_string()),
        };
        let json = serde_json::to_string_pretty(&settings).unwrap();
        std::fs::write(&path, &json).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let loaded: Settings = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded.decimals, 0);
        assert_eq!(loaded.rates.get("CHF"), Some(1.12));
        assert_eq!(loaded.default_workbook.as_deref(), Some("/tmp/group.xlsx"));
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.decimals, 2);
        assert_eq!(s.rates, RateTable::default());
        assert!(s.default_workbook.is_none());
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let s: Settings = serde_json::from_str(r#"{"decimals": 3}"#).unwrap();
        assert_eq!(s.decimals, 3);
        assert_eq!(s.rates.codes(), vec!["EUR", "GBP"]);
    }

    #[test]
    fn test_rates_serialize_as_plain_map() {
        let json = serde_json::to_value(RateTable::default()).unwrap();
        assert!(json.get("EUR").is_some());
        let s: Settings = serde_json::from_str(r#"{"rates": {"JPY": 0.0067}}"#).unwrap();
        assert_eq!(s.rates.codes(), vec!["JPY"]);
    }

    #[test]
    fn test_shellexpand_leaves_plain_paths() {
        assert_eq!(shellexpand_path("/data/group.xlsx"), "/data/group.xlsx");
    }
}
