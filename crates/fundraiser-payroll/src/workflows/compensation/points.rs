use crate::workflows::ledger::PaymentInterval;
use serde::Serialize;

/// Points for donors younger than 25, and for monthly donors younger than 30.
pub const JUNIOR_POINTS: f64 = 0.5;
/// Points for non-monthly donors aged 25 to 29, and the floor below the table.
pub const BASELINE_POINTS: f64 = 1.0;
/// Added to the table value for donors aged 40 and over.
pub const SENIOR_BONUS: f64 = 1.0;

/// Yearly amount bands of the points table, inclusive lower bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountBracket {
    From360,
    From240,
    From180,
    From120,
    Below120,
}

impl AmountBracket {
    pub fn for_amount(yearly_amount: f64) -> Self {
        if yearly_amount >= 360.0 {
            Self::From360
        } else if yearly_amount >= 240.0 {
            Self::From240
        } else if yearly_amount >= 180.0 {
            Self::From180
        } else if yearly_amount >= 120.0 {
            Self::From120
        } else {
            Self::Below120
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::From360 => "360+",
            Self::From240 => "240-359",
            Self::From180 => "180-239",
            Self::From120 => "120-179",
            Self::Below120 => "below 120",
        }
    }

    /// Table value by interval: yearly / half-yearly / monthly. Unlisted
    /// cadences share the monthly column.
    pub fn base_points(self, interval: PaymentInterval) -> f64 {
        let row = match self {
            Self::From360 => [5.0, 4.0, 3.0],
            Self::From240 => [4.0, 3.0, 2.0],
            Self::From180 => [3.0, 2.5, 1.5],
            Self::From120 => [2.0, 1.5, 1.0],
            Self::Below120 => return BASELINE_POINTS,
        };

        match interval {
            PaymentInterval::Yearly => row[0],
            PaymentInterval::HalfYearly => row[1],
            PaymentInterval::Monthly | PaymentInterval::Unlisted => row[2],
        }
    }
}

/// Which rule produced a points value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum PointsRule {
    UnderTwentyFive,
    UnderThirty,
    Table {
        bracket: AmountBracket,
        senior_bonus: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointsResult {
    pub value: f64,
    pub rule: PointsRule,
}

pub fn score(age: u32, interval: PaymentInterval, yearly_amount: f64) -> PointsResult {
    if age < 25 {
        return PointsResult {
            value: JUNIOR_POINTS,
            rule: PointsRule::UnderTwentyFive,
        };
    }

    if age < 30 {
        let value = if interval == PaymentInterval::Monthly {
            JUNIOR_POINTS
        } else {
            BASELINE_POINTS
        };
        return PointsResult {
            value,
            rule: PointsRule::UnderThirty,
        };
    }

    let bracket = AmountBracket::for_amount(yearly_amount);
    let senior_bonus = age >= 40;
    let mut value = bracket.base_points(interval);
    if senior_bonus {
        value += SENIOR_BONUS;
    }

    PointsResult {
        value,
        rule: PointsRule::Table {
            bracket,
            senior_bonus,
        },
    }
}

pub fn points(age: u32, interval: PaymentInterval, yearly_amount: f64) -> f64 {
    score(age, interval, yearly_amount).value
}
