use super::week::WeekKey;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// One ledger line as the export tool wrote it, before forward-fill.
///
/// Every cell is optional: group header cells (fundraiser, week, billing group)
/// are only populated on the first line of each group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLedgerRow {
    pub line: usize,
    pub fundraiser_id: Option<String>,
    pub fundraiser_name: Option<String>,
    pub week_label: Option<String>,
    pub billing_group: Option<String>,
    pub reference_id: Option<String>,
    pub age: Option<String>,
    pub interval: Option<String>,
    pub yearly_amount: Option<String>,
    pub status: Option<String>,
}

/// Donation payment cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentInterval {
    Monthly,
    HalfYearly,
    Yearly,
    /// Any cadence outside the keyword set (quarterly, weekly, blank).
    /// Scores as "not monthly" under 30 and in the monthly column from 30 up.
    Unlisted,
}

impl PaymentInterval {
    /// Keyword match over English and German labels, case-insensitive.
    ///
    /// The same rule decides every column: quarterly cadences stay unmatched
    /// before the "jährlich" keyword can claim them, and "half"/"halb" is
    /// tested before the yearly keywords.
    pub fn from_label(label: &str) -> Option<Self> {
        let lowered = label.trim().to_lowercase();
        if lowered.is_empty() || lowered.contains("quarter") || lowered.contains("viertel") {
            return None;
        }

        if lowered.contains("half") || lowered.contains("halb") {
            Some(Self::HalfYearly)
        } else if lowered.contains("month") || lowered.contains("monat") {
            Some(Self::Monthly)
        } else if lowered.contains("year")
            || lowered.contains("annual")
            || lowered.contains("jähr")
            || lowered.contains("jaehr")
        {
            Some(Self::Yearly)
        } else {
            None
        }
    }

    /// Ledger cells never fail on the interval; unmatched labels become
    /// [`PaymentInterval::Unlisted`].
    pub fn resolve(label: &str) -> Self {
        Self::from_label(label).unwrap_or(Self::Unlisted)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::HalfYearly => "half-yearly",
            Self::Yearly => "yearly",
            Self::Unlisted => "unlisted",
        }
    }
}

/// Status the collecting agency reports for a donor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AgencyStatus {
    Active,
    Billable,
    Approved,
    ConditionallyApproved,
    Cancellation,
    Other(String),
}

impl AgencyStatus {
    pub fn from_label(label: &str) -> Self {
        let canonical = label
            .trim()
            .to_lowercase()
            .replace(['-', '_'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        match canonical.as_str() {
            "active" => Self::Active,
            "billable" => Self::Billable,
            "approved" => Self::Approved,
            "conditionally approved" => Self::ConditionallyApproved,
            "cancellation" => Self::Cancellation,
            _ => Self::Other(label.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Active => "active",
            Self::Billable => "billable",
            Self::Approved => "approved",
            Self::ConditionallyApproved => "conditionally approved",
            Self::Cancellation => "cancellation",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancellation)
    }
}

impl fmt::Display for AgencyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for AgencyStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// A ledger line after cleaning and forward-fill. Never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DonationRecord {
    pub line: usize,
    pub reference_id: String,
    pub fundraiser_id: String,
    pub fundraiser_name: String,
    pub week_label: String,
    /// `None` when the week label carries no usable ordinal.
    pub week: Option<WeekKey>,
    pub billing_group: Option<String>,
    pub age: u32,
    pub interval: PaymentInterval,
    pub interval_label: String,
    pub yearly_amount: f64,
    pub status: AgencyStatus,
}

/// Ledger cells that must be numeric on every donation line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerField {
    FundraiserId,
    Age,
    YearlyAmount,
}

impl LedgerField {
    pub const fn label(self) -> &'static str {
        match self {
            Self::FundraiserId => "Fundraiser ID",
            Self::Age => "Age",
            Self::YearlyAmount => "Amount Yearly",
        }
    }
}

impl fmt::Display for LedgerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
