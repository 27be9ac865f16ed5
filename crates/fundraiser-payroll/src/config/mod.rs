use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::ops::RangeInclusive;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub report: ReportConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            report: ReportConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// What to do with a ledger row whose age, interval or amount cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidRecordPolicy {
    /// Abort the whole run on the first invalid row.
    #[default]
    Fail,
    /// Drop the row, log it and keep going.
    Skip,
}

impl InvalidRecordPolicy {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fail" | "abort" => Ok(Self::Fail),
            "skip" => Ok(Self::Skip),
            _ => Err(ConfigError::InvalidRecordPolicy(value.to_string())),
        }
    }
}

/// Knobs the ledger, compensation and report components read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    pub decimal_separator: char,
    pub year: i32,
    pub invalid_records: InvalidRecordPolicy,
    pub legacy_team_fallback: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            decimal_separator: ',',
            year: Local::now().year(),
            invalid_records: InvalidRecordPolicy::Fail,
            legacy_team_fallback: false,
        }
    }
}

impl ReportConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let decimal_separator = match env::var("APP_DECIMAL_SEPARATOR") {
            Ok(raw) => parse_decimal_separator(&raw)?,
            Err(_) => defaults.decimal_separator,
        };

        let year = match env::var("APP_REPORT_YEAR") {
            Ok(raw) => parse_report_year(&raw)?,
            Err(_) => defaults.year,
        };

        let invalid_records = match env::var("APP_INVALID_RECORDS") {
            Ok(raw) => InvalidRecordPolicy::parse(&raw)?,
            Err(_) => defaults.invalid_records,
        };

        let legacy_team_fallback = match env::var("APP_LEGACY_TEAM_FALLBACK") {
            Ok(raw) => parse_flag(&raw)
                .ok_or_else(|| ConfigError::InvalidFlag("APP_LEGACY_TEAM_FALLBACK", raw))?,
            Err(_) => defaults.legacy_team_fallback,
        };

        Ok(Self {
            decimal_separator,
            year,
            invalid_records,
            legacy_team_fallback,
        })
    }
}

/// Years accepted for week labels, from env, CLI flags and request options alike.
const REPORT_YEARS: RangeInclusive<i32> = 1900..=9999;

pub fn validate_report_year(year: i32) -> Result<i32, ConfigError> {
    if REPORT_YEARS.contains(&year) {
        Ok(year)
    } else {
        Err(ConfigError::InvalidYear(year.to_string()))
    }
}

pub fn parse_report_year(raw: &str) -> Result<i32, ConfigError> {
    let year = raw
        .trim()
        .parse::<i32>()
        .map_err(|_| ConfigError::InvalidYear(raw.to_string()))?;
    validate_report_year(year)
}

/// Accepts exactly one character that cannot be confused with the field separator or a digit.
pub fn parse_decimal_separator(raw: &str) -> Result<char, ConfigError> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(separator), None)
            if separator != ';' && !separator.is_ascii_digit() && !separator.is_whitespace() =>
        {
            Ok(separator)
        }
        _ => Err(ConfigError::InvalidDecimalSeparator(raw.to_string())),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidDecimalSeparator(String),
    InvalidYear(String),
    InvalidRecordPolicy(String),
    InvalidFlag(&'static str, String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidDecimalSeparator(value) => write!(
                f,
                "decimal separator '{value}' must be a single character other than ';', a digit or whitespace"
            ),
            ConfigError::InvalidYear(value) => {
                write!(f, "report year '{value}' must be between 1900 and 9999")
            }
            ConfigError::InvalidRecordPolicy(value) => {
                write!(f, "APP_INVALID_RECORDS '{value}' must be 'fail' or 'skip'")
            }
            ConfigError::InvalidFlag(name, value) => {
                write!(f, "{name} '{value}' must be true or false")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_DECIMAL_SEPARATOR",
            "APP_REPORT_YEAR",
            "APP_INVALID_RECORDS",
            "APP_LEGACY_TEAM_FALLBACK",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.report.decimal_separator, ',');
        assert_eq!(config.report.invalid_records, InvalidRecordPolicy::Fail);
        assert!(!config.report.legacy_team_fallback);
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn report_settings_read_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_DECIMAL_SEPARATOR", ".");
        env::set_var("APP_REPORT_YEAR", "2025");
        env::set_var("APP_INVALID_RECORDS", "skip");
        env::set_var("APP_LEGACY_TEAM_FALLBACK", "true");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.report.decimal_separator, '.');
        assert_eq!(config.report.year, 2025);
        assert_eq!(config.report.invalid_records, InvalidRecordPolicy::Skip);
        assert!(config.report.legacy_team_fallback);
        reset_env();
    }

    #[test]
    fn rejects_field_separator_as_decimal_marker() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_DECIMAL_SEPARATOR", ";");
        let error = AppConfig::load().expect_err("semicolon is the field separator");
        assert!(matches!(error, ConfigError::InvalidDecimalSeparator(_)));
        reset_env();
    }

    #[test]
    fn report_year_must_be_four_digits() {
        assert_eq!(validate_report_year(2025).expect("in range"), 2025);
        assert!(matches!(
            validate_report_year(-5),
            Err(ConfigError::InvalidYear(value)) if value == "-5"
        ));
        assert!(parse_report_year("10000").is_err());
        assert!(parse_report_year("twenty").is_err());

        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_REPORT_YEAR", "25");
        let error = AppConfig::load().expect_err("two digit year rejected");
        assert!(matches!(error, ConfigError::InvalidYear(_)));
        reset_env();
    }

    #[test]
    fn unknown_policy_is_an_error_not_a_default() {
        assert!(InvalidRecordPolicy::parse("ignore").is_err());
        assert_eq!(
            InvalidRecordPolicy::parse(" SKIP ").expect("skip parses"),
            InvalidRecordPolicy::Skip
        );
    }
}
