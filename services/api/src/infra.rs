use chrono::NaiveDate;
use fundraiser_payroll::config::{parse_decimal_separator, parse_report_year, ReportConfig};
use fundraiser_payroll::error::AppError;
use fundraiser_payroll::workflows::ledger::{parse_number, PaymentInterval};
use fundraiser_payroll::workflows::report::Roster;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) report: Arc<ReportConfig>,
}

pub(crate) fn load_roster(path: Option<&Path>) -> Result<Roster, AppError> {
    match path {
        Some(path) => Roster::from_path(path).map_err(AppError::from),
        None => Ok(Roster::default()),
    }
}

/// `payroll.csv` becomes `payroll_formatted.csv` next to the input.
pub(crate) fn default_output_path(ledger: &Path) -> PathBuf {
    let stem = ledger
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "ledger".to_string());
    ledger.with_file_name(format!("{stem}_formatted.csv"))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_separator(raw: &str) -> Result<char, String> {
    parse_decimal_separator(raw).map_err(|err| err.to_string())
}

pub(crate) fn parse_year(raw: &str) -> Result<i32, String> {
    parse_report_year(raw).map_err(|err| err.to_string())
}

pub(crate) fn parse_interval(raw: &str) -> Result<PaymentInterval, String> {
    PaymentInterval::from_label(raw)
        .ok_or_else(|| format!("'{raw}' is not a monthly, half-yearly or yearly interval"))
}

pub(crate) fn parse_amount(raw: &str) -> Result<f64, String> {
    parse_number(raw).ok_or_else(|| format!("'{raw}' is not a non-negative amount"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_sits_next_to_the_ledger() {
        let path = default_output_path(Path::new("/data/KW18_export.csv"));
        assert_eq!(path, PathBuf::from("/data/KW18_export_formatted.csv"));
    }

    #[test]
    fn cli_value_parsers_reject_bad_input() {
        assert_eq!(parse_separator(","), Ok(','));
        assert!(parse_separator(";").is_err());
        assert_eq!(parse_interval("halbjährlich"), Ok(PaymentInterval::HalfYearly));
        assert!(parse_interval("quarterly").is_err());
        assert_eq!(parse_amount("180,5"), Ok(180.5));
        assert!(parse_amount("-1").is_err());
        assert!(parse_date("2025-13-01").is_err());
        assert_eq!(parse_year("2024"), Ok(2024));
        assert!(parse_year("-5").is_err());
    }

    #[test]
    fn missing_roster_path_means_empty_roster() {
        let roster = load_roster(None).expect("empty roster");
        assert!(roster.weeks.is_empty());
        assert!(load_roster(Some(Path::new("./no-such-roster.json"))).is_err());
    }
}
