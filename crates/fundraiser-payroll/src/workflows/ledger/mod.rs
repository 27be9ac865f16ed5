pub mod domain;
mod normalizer;
mod parser;
pub mod week;

pub use domain::{AgencyStatus, DonationRecord, LedgerField, PaymentInterval, RawLedgerRow};
pub use normalizer::{
    format_fundraiser_id, normalize, parse_number, NormalizedLedger, RejectedRecord,
};
pub use week::WeekKey;

use crate::config::ReportConfig;
use std::io::Read;
use std::path::Path;

/// Failures while turning raw rows into donation records.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    #[error("malformed ledger at line {line}: {reason}")]
    MalformedLedger { line: usize, reason: String },
    #[error("invalid donation record at line {line}: {field} '{value}' is not usable")]
    InvalidDonationRecord {
        line: usize,
        field: LedgerField,
        value: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerImportError {
    #[error("failed to read ledger export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid ledger CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("ledger header is missing the '{0}' column")]
    MissingColumn(&'static str),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Loads a semicolon-delimited ledger export and normalizes it.
pub struct LedgerImporter;

impl LedgerImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        config: &ReportConfig,
    ) -> Result<NormalizedLedger, LedgerImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, config)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        config: &ReportConfig,
    ) -> Result<NormalizedLedger, LedgerImportError> {
        let rows = Self::raw_rows(reader)?;
        Ok(normalize(rows, config)?)
    }

    /// Parses the export without normalizing, for callers that want to inspect raw rows.
    pub fn raw_rows<R: Read>(reader: R) -> Result<Vec<RawLedgerRow>, LedgerImportError> {
        parser::parse_rows(reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InvalidRecordPolicy;
    use std::io::Cursor;

    fn config() -> ReportConfig {
        ReportConfig {
            decimal_separator: ',',
            year: 2025,
            invalid_records: InvalidRecordPolicy::Fail,
            legacy_team_fallback: false,
        }
    }

    const EXPORT: &str = "\u{feff}WoVi_CW_Final;;;;;;;;\n\
;;;;;;;;\n\
Fundraiser ID ;Fundraiser Name;Calendar week;Billing group;Public RefID;Age;Interval;Amount Yearly;status_agency\n\
42;Anna Berg;18/2025;F2F;1001;34;monthly;360;approved\n\
;;;;1002;22;yearly;120;active\n\
;Subtotal;;;;;;;\n\
7;Ben Kurz;KW18;F2F;1003;45;half-yearly;240;cancellation\n";

    #[test]
    fn parses_export_with_preamble_and_bom() {
        let rows = LedgerImporter::raw_rows(Cursor::new(EXPORT)).expect("parses");
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].line, 4);
        assert_eq!(rows[0].fundraiser_id.as_deref(), Some("42"));
        assert_eq!(rows[1].fundraiser_name, None);
        assert_eq!(rows[1].reference_id.as_deref(), Some("1002"));
        assert_eq!(rows[2].fundraiser_name.as_deref(), Some("Subtotal"));
    }

    #[test]
    fn importer_normalizes_the_export() {
        let ledger = LedgerImporter::from_reader(Cursor::new(EXPORT), &config()).expect("imports");
        assert_eq!(ledger.records.len(), 3);
        assert_eq!(ledger.records[1].fundraiser_name, "Anna Berg");
        assert_eq!(ledger.records[1].fundraiser_id, "00042");
        assert_eq!(ledger.records[2].status, AgencyStatus::Cancellation);
        assert_eq!(ledger.summary_rows_dropped, 1);
    }

    #[test]
    fn header_without_preamble_is_accepted() {
        let csv = "Fundraiser ID;Fundraiser Name;Calendar week;Public RefID;Age;Interval;Amount Yearly;status_agency\n\
1;Anna;KW3;R1;30;yearly;360;approved\n";
        let rows = LedgerImporter::raw_rows(Cursor::new(csv)).expect("parses");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].billing_group, None);
        assert_eq!(rows[0].line, 2);
    }

    #[test]
    fn missing_mandatory_column_is_reported() {
        let csv = "Fundraiser ID;Fundraiser Name;Calendar week;Public RefID;Age;Interval;status_agency\n";
        let error = LedgerImporter::raw_rows(Cursor::new(csv)).expect_err("amount column missing");
        assert!(matches!(
            error,
            LedgerImportError::MissingColumn("Amount Yearly")
        ));
    }

    #[test]
    fn latin1_exports_are_decoded() {
        let bytes = b"M\xFCller";
        assert_eq!(parser::decode_for_tests(bytes), "Müller");
    }

    #[test]
    fn importer_from_path_propagates_io_errors() {
        let error = LedgerImporter::from_path("./does-not-exist.csv", &config())
            .expect_err("expected io error");

        match error {
            LedgerImportError::Io(_) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
