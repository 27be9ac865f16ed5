use serde::Serialize;

/// Individual payout tier chosen by points earned per working day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutBracket {
    UnderTwo,
    Two,
    Three,
    Five,
    SevenPlus,
}

impl PayoutBracket {
    /// Half-open bands on the daily average: [0,2) [2,3) [3,5) [5,7) [7,inf).
    pub fn for_daily_average(daily_average: f64) -> Self {
        if daily_average >= 7.0 {
            Self::SevenPlus
        } else if daily_average >= 5.0 {
            Self::Five
        } else if daily_average >= 3.0 {
            Self::Three
        } else if daily_average >= 2.0 {
            Self::Two
        } else {
            Self::UnderTwo
        }
    }

    pub fn rate(self) -> f64 {
        match self {
            Self::UnderTwo => 3.95,
            Self::Two => 10.0,
            Self::Three => 15.0,
            Self::Five => 20.0,
            Self::SevenPlus => 30.0,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::UnderTwo => "under 2er",
            Self::Two => "2er",
            Self::Three => "3er",
            Self::Five => "5er",
            Self::SevenPlus => "7er+",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PayoutResult {
    pub points: f64,
    pub working_days: f64,
    pub daily_average: f64,
    /// `None` when no working days were declared.
    pub bracket: Option<PayoutBracket>,
    pub rate: Option<f64>,
    pub payout: f64,
}

/// The bracket follows the rate of accrual but the rate multiplies the total points.
pub fn payout(points: f64, working_days: f64) -> PayoutResult {
    if working_days.is_nan() || working_days <= 0.0 {
        return PayoutResult {
            points,
            working_days,
            daily_average: 0.0,
            bracket: None,
            rate: None,
            payout: 0.0,
        };
    }

    let daily_average = points / working_days;
    let bracket = PayoutBracket::for_daily_average(daily_average);
    let rate = bracket.rate();

    PayoutResult {
        points,
        working_days,
        daily_average,
        bracket: Some(bracket),
        rate: Some(rate),
        payout: points * rate,
    }
}
