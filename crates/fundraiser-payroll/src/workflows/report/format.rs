use crate::config::ReportConfig;
use serde::Serialize;

/// Display formatting for numbers in rendered columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NumberFormat {
    pub decimal_separator: char,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            decimal_separator: ',',
        }
    }
}

impl NumberFormat {
    pub fn new(decimal_separator: char) -> Self {
        Self { decimal_separator }
    }

    pub fn from_config(config: &ReportConfig) -> Self {
        Self::new(config.decimal_separator)
    }

    /// Up to two decimals with trailing zeros dropped: `0,5`, `3`, `2,25`.
    pub fn points(&self, value: f64) -> String {
        let fixed = format!("{value:.2}");
        let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
        self.localize(trimmed)
    }

    /// Always two decimals.
    pub fn money(&self, value: f64) -> String {
        self.localize(&format!("{value:.2}"))
    }

    fn localize(&self, canonical: &str) -> String {
        if self.decimal_separator == '.' {
            canonical.to_string()
        } else {
            canonical.replace('.', &self.decimal_separator.to_string())
        }
    }
}
