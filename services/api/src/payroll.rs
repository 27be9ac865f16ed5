use crate::infra::{
    default_output_path, load_roster, parse_amount, parse_date, parse_interval, parse_separator,
    parse_year,
};
use chrono::{Local, NaiveDate};
use clap::Args;
use fundraiser_payroll::config::{AppConfig, InvalidRecordPolicy, ReportConfig};
use fundraiser_payroll::error::AppError;
use fundraiser_payroll::telemetry;
use fundraiser_payroll::workflows::compensation::{score, PointsRule};
use fundraiser_payroll::workflows::ledger::{LedgerImporter, PaymentInterval};
use fundraiser_payroll::workflows::report::{
    assemble, export, AssembledReport, NumberFormat, ReportRow,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Semicolon-delimited ledger export
    #[arg(long)]
    pub(crate) ledger: PathBuf,
    /// Team leader and working-days roster (JSON)
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
    /// Output path (defaults to <ledger>_formatted.csv)
    #[arg(long)]
    pub(crate) out: Option<PathBuf>,
    /// Drop rows with unreadable age, interval or amount instead of aborting
    #[arg(long)]
    pub(crate) skip_invalid: bool,
    /// Fill missing member lists with every other fundraiser of the week
    #[arg(long)]
    pub(crate) legacy_team_fallback: bool,
    /// Decimal marker for rendered numbers
    #[arg(long, value_parser = parse_separator)]
    pub(crate) decimal_separator: Option<char>,
    /// Year used in week labels when the ledger omits it
    #[arg(long, value_parser = parse_year)]
    pub(crate) year: Option<i32>,
    /// Date stamped into the title line (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) generated_on: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct PointsArgs {
    /// Donor age in years
    #[arg(long)]
    pub(crate) age: u32,
    /// Payment interval label, English or German
    #[arg(long, value_parser = parse_interval)]
    pub(crate) interval: PaymentInterval,
    /// Yearly pledge amount
    #[arg(long, value_parser = parse_amount)]
    pub(crate) amount: f64,
}

impl ReportArgs {
    fn apply(&self, config: &mut ReportConfig) {
        if self.skip_invalid {
            config.invalid_records = InvalidRecordPolicy::Skip;
        }
        if self.legacy_team_fallback {
            config.legacy_team_fallback = true;
        }
        if let Some(separator) = self.decimal_separator {
            config.decimal_separator = separator;
        }
        if let Some(year) = self.year {
            config.year = year;
        }
    }
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    args.apply(&mut config.report);

    let ledger = LedgerImporter::from_path(&args.ledger, &config.report)?;
    let roster = load_roster(args.roster.as_deref())?;
    let report = assemble(&ledger, &roster, &config.report);

    let out = args
        .out
        .clone()
        .unwrap_or_else(|| default_output_path(&args.ledger));
    let generated_on = args
        .generated_on
        .unwrap_or_else(|| Local::now().date_naive());
    let format = NumberFormat::from_config(&config.report);
    export::write_csv_to_path(&out, &report, &format, generated_on)?;
    info!(path = %out.display(), rows = report.rows.len(), "formatted ledger written");

    render_summary(&report, &format, &out);
    Ok(())
}

pub(crate) fn run_points(args: PointsArgs) {
    let result = score(args.age, args.interval, args.amount);
    let rule = match result.rule {
        PointsRule::UnderTwentyFive => "donor under 25".to_string(),
        PointsRule::UnderThirty => "donor under 30".to_string(),
        PointsRule::Table {
            bracket,
            senior_bonus,
        } => {
            let bonus = if senior_bonus { ", +1 age 40+" } else { "" };
            format!("amount {}{bonus}", bracket.label())
        }
    };

    println!(
        "{} points ({}, {} {})",
        NumberFormat::new('.').points(result.value),
        rule,
        args.interval.label(),
        args.amount
    );
}

fn render_summary(report: &AssembledReport, format: &NumberFormat, out: &std::path::Path) {
    println!("Formatted ledger written to {}", out.display());
    println!(
        "{} donations, {} fundraiser weeks, {} payouts, {} team bonuses",
        report.count("detail"),
        report.count("subtotal"),
        report.count("payout"),
        report.count("team_bonus")
    );

    let payouts: Vec<_> = report
        .rows
        .iter()
        .filter_map(|row| match row {
            ReportRow::Payout(payout) => Some(payout),
            _ => None,
        })
        .collect();
    if !payouts.is_empty() {
        println!("\nPayouts");
        for row in payouts {
            let bracket = row
                .payout
                .bracket
                .map_or("no working days", |bracket| bracket.label());
            println!(
                "- {} {}: {} ({})",
                row.week,
                row.fundraiser_name,
                format.money(row.payout.payout),
                bracket
            );
        }
    }

    if !report.rejected.is_empty() {
        println!("\nSkipped rows");
        for rejected in &report.rejected {
            println!(
                "- line {} ({}): {}",
                rejected.line, rejected.reference_id, rejected.reason
            );
        }
    }

    if report.issues.is_empty() {
        println!("\nIssues: none");
    } else {
        println!("\nIssues");
        for issue in &report.issues {
            println!("- {issue}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_flags_override_the_environment() {
        let args = ReportArgs {
            ledger: PathBuf::from("export.csv"),
            roster: None,
            out: None,
            skip_invalid: true,
            legacy_team_fallback: true,
            decimal_separator: Some('.'),
            year: Some(2024),
            generated_on: None,
        };
        let mut config = ReportConfig::default();
        args.apply(&mut config);

        assert_eq!(config.invalid_records, InvalidRecordPolicy::Skip);
        assert!(config.legacy_team_fallback);
        assert_eq!(config.decimal_separator, '.');
        assert_eq!(config.year, 2024);
    }

    #[test]
    fn unset_flags_keep_the_configured_values() {
        let args = ReportArgs {
            ledger: PathBuf::from("export.csv"),
            roster: None,
            out: None,
            skip_invalid: false,
            legacy_team_fallback: false,
            decimal_separator: None,
            year: None,
            generated_on: None,
        };
        let mut config = ReportConfig {
            legacy_team_fallback: true,
            ..ReportConfig::default()
        };
        args.apply(&mut config);

        assert_eq!(config.invalid_records, InvalidRecordPolicy::Fail);
        assert!(config.legacy_team_fallback);
        assert_eq!(config.decimal_separator, ',');
    }
}
