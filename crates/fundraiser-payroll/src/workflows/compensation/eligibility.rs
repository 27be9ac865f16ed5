use crate::workflows::ledger::{AgencyStatus, DonationRecord};
use serde::Serialize;
use std::collections::BTreeMap;

/// Required share of approved donors, as numerator over denominator (70%).
const APPROVAL_THRESHOLD: (usize, usize) = (7, 10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusEligibility {
    Eligible,
    NotEligible,
}

impl BonusEligibility {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Eligible => "eligible",
            Self::NotEligible => "not-eligible",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EligibilityResult {
    /// Donations whose status counts towards the approval rate.
    pub relevant: usize,
    pub approved: usize,
    pub approval_rate: Option<f64>,
    pub eligibility: BonusEligibility,
}

fn is_relevant(status: &AgencyStatus) -> bool {
    !matches!(status, AgencyStatus::Other(_))
}

fn is_approved(status: &AgencyStatus) -> bool {
    matches!(
        status,
        AgencyStatus::Approved | AgencyStatus::ConditionallyApproved
    )
}

/// Approval-rate eligibility over every donation of one fundraiser.
pub fn evaluate<'a, I>(statuses: I) -> EligibilityResult
where
    I: IntoIterator<Item = &'a AgencyStatus>,
{
    let (relevant, approved) = statuses
        .into_iter()
        .filter(|status| is_relevant(status))
        .fold((0usize, 0usize), |(relevant, approved), status| {
            (relevant + 1, approved + usize::from(is_approved(status)))
        });

    if relevant == 0 {
        return EligibilityResult {
            relevant,
            approved,
            approval_rate: None,
            eligibility: BonusEligibility::NotEligible,
        };
    }

    let (numerator, denominator) = APPROVAL_THRESHOLD;
    let eligibility = if approved * denominator >= relevant * numerator {
        BonusEligibility::Eligible
    } else {
        BonusEligibility::NotEligible
    };

    EligibilityResult {
        relevant,
        approved,
        approval_rate: Some(approved as f64 / relevant as f64),
        eligibility,
    }
}

/// Eligibility per fundraiser id across all weeks, including rows whose week is unparsable.
pub fn by_fundraiser(records: &[DonationRecord]) -> BTreeMap<String, EligibilityResult> {
    let mut statuses: BTreeMap<&str, Vec<&AgencyStatus>> = BTreeMap::new();
    for record in records {
        statuses
            .entry(record.fundraiser_id.as_str())
            .or_default()
            .push(&record.status);
    }

    statuses
        .into_iter()
        .map(|(fundraiser_id, statuses)| (fundraiser_id.to_string(), evaluate(statuses)))
        .collect()
}
