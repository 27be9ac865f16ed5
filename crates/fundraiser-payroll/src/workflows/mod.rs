pub mod compensation;
pub mod ledger;
pub mod report;
