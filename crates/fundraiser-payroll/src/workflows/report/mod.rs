mod assembler;
pub mod export;
mod format;
pub mod roster;
pub mod rows;

pub use assembler::{AssembledReport, FundraiserWeekAggregate, ReportAssembler, ReportIssue};
pub use export::{write_csv, ExportError};
pub use format::NumberFormat;
pub use roster::{LeaderDeclaration, Roster, RosterError, RosterWeek};
pub use rows::ReportRow;

use crate::config::ReportConfig;
use crate::workflows::ledger::NormalizedLedger;

/// Assembles the weekly report for an already normalized ledger.
pub fn assemble(
    ledger: &NormalizedLedger,
    roster: &Roster,
    config: &ReportConfig,
) -> AssembledReport {
    ReportAssembler::new(ledger, roster, config).assemble()
}
