use std::path::Path;

use crate::currency::{self, RateTable};
use crate::loader;
use crate::models::{Sheet, Workbook};
use crate::reports::{self, SheetView};

/// Result of a load action, shown to the user as a status line.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    Loaded { sheets: usize },
    Failed { message: String },
}

impl LoadStatus {
    pub fn message(&self) -> String {
        match self {
            LoadStatus::Loaded { sheets } => format!("Workbook loaded ({sheets} sheets)."),
            LoadStatus::Failed { message } => format!("Error while processing the file: {message}"),
        }
    }
}

/// One column of one sheet converted to USD from a source currency.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub column: String,
    pub from_currency: String,
}

/// Everything one dashboard session owns. Passed by `&mut` to whatever handles
/// a user action; there is no other copy.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub workbook: Workbook,
    pub sheet_names: Vec<String>,
    pub exchange_rates: RateTable,
}

impl SessionState {
    pub fn with_rates(exchange_rates: RateTable) -> Self {
        Self {
            exchange_rates,
            ..Self::default()
        }
    }

    pub fn has_data(&self) -> bool {
        !self.workbook.is_empty()
    }

    /// Replace the workbook with whatever `bytes` parse to. A failure leaves
    /// the session with no workbook and no sheet names.
    pub fn load(&mut self, bytes: Vec<u8>) -> LoadStatus {
        self.replace(loader::load(bytes))
    }

    pub fn load_path(&mut self, path: &Path) -> LoadStatus {
        self.replace(loader::load_path(path))
    }

    fn replace(&mut self, result: crate::error::Result<Workbook>) -> LoadStatus {
        match result {
            Ok(workbook) => {
                self.sheet_names = workbook.sheet_names();
                self.workbook = workbook;
                tracing::info!(sheets = self.sheet_names.len(), "workbook loaded");
                LoadStatus::Loaded {
                    sheets: self.sheet_names.len(),
                }
            }
            Err(e) => {
                self.workbook = Workbook::default();
                self.sheet_names.clear();
                tracing::error!(error = %e, "workbook load failed");
                LoadStatus::Failed {
                    message: e.to_string(),
                }
            }
        }
    }

    pub fn update_rate(&mut self, code: &str, rate: f64) -> String {
        self.exchange_rates.set(code, rate);
        tracing::info!(code, rate, "rate updated");
        format!("Rate for {code} updated.")
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.workbook.sheet(name)
    }

    /// Convert one column of a stored sheet in place. Later renders show the
    /// converted values, and applying the same conversion again multiplies by
    /// the rate again. Returns false when the sheet does not exist.
    pub fn apply_conversion(&mut self, name: &str, conversion: &Conversion) -> bool {
        let Some(sheet) = self.workbook.sheet_mut(name) else {
            return false;
        };
        sheet.table = currency::convert(
            &sheet.table,
            &conversion.column,
            &conversion.from_currency,
            &self.exchange_rates,
        );
        true
    }

    /// Build the view for a sheet from its current stored data.
    pub fn render(&self, name: &str) -> Option<SheetView> {
        let sheet = self.sheet(name)?;
        Some(reports::build_view(&sheet.name, sheet.kind, &sheet.table))
    }
}
