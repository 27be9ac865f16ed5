use super::domain::{AgencyStatus, DonationRecord, LedgerField, PaymentInterval, RawLedgerRow};
use super::week::WeekKey;
use super::LedgerError;
use crate::config::{InvalidRecordPolicy, ReportConfig};
use serde::Serialize;
use tracing::{debug, info, warn};

const FUNDRAISER_ID_WIDTH: usize = 5;

/// A donation line dropped under [`InvalidRecordPolicy::Skip`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRecord {
    pub line: usize,
    pub reference_id: String,
    pub reason: String,
}

/// Normalizer output: cleaned records in ledger order plus bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizedLedger {
    pub records: Vec<DonationRecord>,
    pub rejected: Vec<RejectedRecord>,
    pub summary_rows_dropped: usize,
    pub rows_without_reference: usize,
}

/// Group header cells carried down from the nearest populated row.
#[derive(Default)]
struct CarriedHeader {
    fundraiser_id: Option<String>,
    fundraiser_name: Option<String>,
    week_label: Option<String>,
    billing_group: Option<String>,
}

impl CarriedHeader {
    fn absorb(&mut self, row: &RawLedgerRow) {
        fill(&mut self.fundraiser_id, &row.fundraiser_id);
        fill(&mut self.fundraiser_name, &row.fundraiser_name);
        fill(&mut self.week_label, &row.week_label);
        fill(&mut self.billing_group, &row.billing_group);
    }
}

fn fill(slot: &mut Option<String>, value: &Option<String>) {
    if let Some(value) = value {
        *slot = Some(value.clone());
    }
}

/// Cleans raw ledger rows and forward-fills the sparse group headers.
pub fn normalize<I>(rows: I, config: &ReportConfig) -> Result<NormalizedLedger, LedgerError>
where
    I: IntoIterator<Item = RawLedgerRow>,
{
    let mut ledger = NormalizedLedger::default();
    let mut carried = CarriedHeader::default();

    for row in rows {
        if is_summary_row(&row) {
            debug!(line = row.line, "dropping summary row");
            ledger.summary_rows_dropped += 1;
            continue;
        }

        let Some(reference_id) = row.reference_id.clone().filter(|id| !id.trim().is_empty())
        else {
            ledger.rows_without_reference += 1;
            continue;
        };

        carried.absorb(&row);
        let header = resolve_header(&carried, row.line)?;

        match donation_fields(&row) {
            Ok((age, yearly_amount)) => {
                let interval_label = row.interval.clone().unwrap_or_default();
                let interval = PaymentInterval::resolve(&interval_label);
                if interval == PaymentInterval::Unlisted {
                    debug!(
                        line = row.line,
                        interval = %interval_label,
                        "unlisted payment interval"
                    );
                }
                let week = WeekKey::from_label(&header.week_label, config.year);
                ledger.records.push(DonationRecord {
                    line: row.line,
                    reference_id,
                    fundraiser_id: header.fundraiser_id,
                    fundraiser_name: header.fundraiser_name,
                    week_label: header.week_label,
                    week,
                    billing_group: carried.billing_group.clone(),
                    age,
                    interval,
                    interval_label,
                    yearly_amount,
                    status: AgencyStatus::from_label(row.status.as_deref().unwrap_or_default()),
                });
            }
            Err(error) => match config.invalid_records {
                InvalidRecordPolicy::Fail => return Err(error),
                InvalidRecordPolicy::Skip => {
                    warn!(
                        line = row.line,
                        %reference_id,
                        %error,
                        "skipping invalid donation record"
                    );
                    ledger.rejected.push(RejectedRecord {
                        line: row.line,
                        reference_id,
                        reason: error.to_string(),
                    });
                }
            },
        }
    }

    info!(
        records = ledger.records.len(),
        rejected = ledger.rejected.len(),
        summary_rows = ledger.summary_rows_dropped,
        "ledger normalized"
    );

    Ok(ledger)
}

fn is_summary_row(row: &RawLedgerRow) -> bool {
    row.fundraiser_name
        .as_deref()
        .map(str::to_lowercase)
        .is_some_and(|name| name.contains("subtotal") || name.contains("total"))
}

struct ResolvedHeader {
    fundraiser_id: String,
    fundraiser_name: String,
    week_label: String,
}

fn resolve_header(carried: &CarriedHeader, line: usize) -> Result<ResolvedHeader, LedgerError> {
    let missing = |column: &str| LedgerError::MalformedLedger {
        line,
        reason: format!("no '{column}' on this or any earlier row to fill from"),
    };

    let raw_id = carried
        .fundraiser_id
        .as_deref()
        .ok_or_else(|| missing("Fundraiser ID"))?;

    Ok(ResolvedHeader {
        fundraiser_id: format_fundraiser_id(raw_id, line)?,
        fundraiser_name: carried
            .fundraiser_name
            .clone()
            .ok_or_else(|| missing("Fundraiser Name"))?,
        week_label: carried
            .week_label
            .clone()
            .ok_or_else(|| missing("Calendar week"))?,
    })
}

/// Zero-pads to five digits after dropping a float-ingestion `.0` suffix.
pub fn format_fundraiser_id(raw: &str, line: usize) -> Result<String, LedgerError> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_suffix(".0").unwrap_or(trimmed);

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(LedgerError::MalformedLedger {
            line,
            reason: format!("{} '{raw}' is not numeric", LedgerField::FundraiserId),
        });
    }

    Ok(format!("{digits:0>width$}", width = FUNDRAISER_ID_WIDTH))
}

fn donation_fields(row: &RawLedgerRow) -> Result<(u32, f64), LedgerError> {
    let invalid = |field: LedgerField, value: Option<&str>| LedgerError::InvalidDonationRecord {
        line: row.line,
        field,
        value: value.unwrap_or_default().to_string(),
    };

    let age_raw = row.age.as_deref();
    let age = age_raw
        .and_then(parse_number)
        .filter(|age| *age < 150.0)
        .map(|age| age.trunc() as u32)
        .ok_or_else(|| invalid(LedgerField::Age, age_raw))?;

    let amount_raw = row.yearly_amount.as_deref();
    let yearly_amount = amount_raw
        .and_then(parse_number)
        .ok_or_else(|| invalid(LedgerField::YearlyAmount, amount_raw))?;

    Ok((age, yearly_amount))
}

/// Parses `360`, `360.5`, `360,5` and `1.234,56`. Negative or non-finite input is rejected.
pub fn parse_number(raw: &str) -> Option<f64> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let canonical = match (compact.contains('.'), compact.contains(',')) {
        (true, true) => compact.replace('.', "").replace(',', "."),
        (false, true) => compact.replace(',', "."),
        _ => compact,
    };

    canonical
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
}
