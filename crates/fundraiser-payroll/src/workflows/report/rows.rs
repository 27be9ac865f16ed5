use super::format::NumberFormat;
use crate::workflows::compensation::{
    EligibilityResult, MilestoneResult, PayoutResult, PointsResult, TeamBonusResult,
};
use crate::workflows::ledger::AgencyStatus;
use serde::Serialize;

/// Header of the ten display columns, in render order.
pub const COLUMNS: [&str; 10] = [
    "Fundraiser ID",
    "Fundraiser Name",
    "Calendar week",
    "Public RefID",
    "Age",
    "Interval",
    "Amount Yearly",
    "status_agency",
    "points",
    "bonus_status",
];

pub const TEAM_SECTION_TITLE: &str = "TEAM LEADER BONUSES (BY WEEK)";

/// One donation line of a fundraiser-week group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailRow {
    pub fundraiser_id: String,
    pub fundraiser_name: String,
    pub week: String,
    pub reference_id: String,
    pub age: u32,
    pub interval: String,
    pub yearly_amount: f64,
    pub status: AgencyStatus,
    pub points: PointsResult,
}

/// Closes a fundraiser-week group; points exclude cancellations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtotalRow {
    pub fundraiser_id: String,
    pub fundraiser_name: String,
    pub week: String,
    pub points: f64,
    pub eligibility: EligibilityResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayoutRow {
    pub fundraiser_id: String,
    pub fundraiser_name: String,
    pub week: String,
    pub payout: PayoutResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeparatorRow {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamBonusRow {
    pub week: String,
    pub members: Vec<String>,
    pub bonus: TeamBonusResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MilestoneRow {
    pub week: String,
    pub leader: String,
    pub milestones: MilestoneResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportRow {
    Detail(DetailRow),
    Subtotal(SubtotalRow),
    Payout(PayoutRow),
    Separator(SeparatorRow),
    TeamBonus(TeamBonusRow),
    Milestone(MilestoneRow),
}

impl ReportRow {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Detail(_) => "detail",
            Self::Subtotal(_) => "subtotal",
            Self::Payout(_) => "payout",
            Self::Separator(_) => "separator",
            Self::TeamBonus(_) => "team_bonus",
            Self::Milestone(_) => "milestone",
        }
    }

    pub fn columns(&self, format: &NumberFormat) -> [String; 10] {
        match self {
            Self::Detail(row) => [
                row.fundraiser_id.clone(),
                row.fundraiser_name.clone(),
                row.week.clone(),
                row.reference_id.clone(),
                row.age.to_string(),
                row.interval.clone(),
                format.points(row.yearly_amount),
                row.status.label().to_string(),
                format.points(row.points.value),
                String::new(),
            ],
            Self::Subtotal(row) => with_tail(
                [String::new(), String::new(), String::new()],
                String::new(),
                format!("Total: {}", format.points(row.points)),
                row.eligibility.eligibility.label().to_string(),
            ),
            Self::Payout(row) => {
                let payout = &row.payout;
                let bracket = match (payout.bracket, payout.rate) {
                    (Some(bracket), Some(rate)) => format!(
                        "{} ({}/day x {})",
                        bracket.label(),
                        format.money(payout.daily_average),
                        format.money(rate)
                    ),
                    _ => "no working days".to_string(),
                };
                with_tail(
                    [
                        row.fundraiser_id.clone(),
                        row.fundraiser_name.clone(),
                        row.week.clone(),
                    ],
                    format!("Days: {}", format.points(payout.working_days)),
                    format!("Payout: {}", format.money(payout.payout)),
                    bracket,
                )
            }
            Self::Separator(row) => {
                let mut columns: [String; 10] = Default::default();
                columns[0] = row.title.clone();
                columns
            }
            Self::TeamBonus(row) => {
                let bonus = &row.bonus;
                let bracket = match bonus.rate {
                    Some(rate) => format!("{} x {}", bonus.bracket.label(), format.money(rate)),
                    None => bonus.bracket.label().to_string(),
                };
                with_tail(
                    [String::new(), bonus.leader.clone(), row.week.clone()],
                    format!("Team: {}", bonus.team_size),
                    format!("Team bonus: {}", format.money(bonus.bonus)),
                    bracket,
                )
            }
            Self::Milestone(row) => with_tail(
                [String::new(), row.leader.clone(), row.week.clone()],
                String::new(),
                format!(
                    "Milestones: up to {}",
                    format.money(row.milestones.total_possible)
                ),
                format!(
                    "{} per category",
                    format.money(row.milestones.per_category)
                ),
            ),
        }
    }
}

/// Identity columns, then the status, points and bonus columns; the donor columns stay blank.
fn with_tail(head: [String; 3], status: String, points: String, bonus: String) -> [String; 10] {
    let [id, name, week] = head;
    [
        id,
        name,
        week,
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        status,
        points,
        bonus,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::compensation::{
        milestones, payout, score, team_bonus, BonusEligibility, MemberStats, TeamAssignment,
    };
    use crate::workflows::ledger::PaymentInterval;

    fn eligibility() -> EligibilityResult {
        EligibilityResult {
            relevant: 2,
            approved: 2,
            approval_rate: Some(1.0),
            eligibility: BonusEligibility::Eligible,
        }
    }

    #[test]
    fn detail_columns_follow_the_header() {
        let row = ReportRow::Detail(DetailRow {
            fundraiser_id: "00042".to_string(),
            fundraiser_name: "Anna".to_string(),
            week: "18/2025".to_string(),
            reference_id: "R1".to_string(),
            age: 34,
            interval: "Monthly".to_string(),
            yearly_amount: 180.5,
            status: AgencyStatus::Approved,
            points: score(34, PaymentInterval::Monthly, 180.5),
        });

        let columns = row.columns(&NumberFormat::default());
        assert_eq!(
            columns,
            [
                "00042", "Anna", "18/2025", "R1", "34", "Monthly", "180,5", "approved", "1,5", ""
            ]
        );
    }

    #[test]
    fn subtotal_shows_points_and_eligibility_only() {
        let row = ReportRow::Subtotal(SubtotalRow {
            fundraiser_id: "00042".to_string(),
            fundraiser_name: "Anna".to_string(),
            week: "18/2025".to_string(),
            points: 12.5,
            eligibility: eligibility(),
        });

        let columns = row.columns(&NumberFormat::default());
        assert!(columns[..8].iter().all(String::is_empty));
        assert_eq!(columns[8], "Total: 12,5");
        assert_eq!(columns[9], "eligible");
    }

    #[test]
    fn payout_and_team_rows_render_amounts_as_money() {
        let payout_row = ReportRow::Payout(PayoutRow {
            fundraiser_id: "00042".to_string(),
            fundraiser_name: "Anna".to_string(),
            week: "18/2025".to_string(),
            payout: payout(31.0, 5.0),
        });
        let columns = payout_row.columns(&NumberFormat::default());
        assert_eq!(columns[7], "Days: 5");
        assert_eq!(columns[8], "Payout: 620,00");
        assert_eq!(columns[9], "5er (6,20/day x 20,00)");

        let team = TeamAssignment::new(
            "Anna",
            MemberStats {
                points: 10.0,
                working_days: 5.0,
            },
            [(
                "Ben".to_string(),
                MemberStats {
                    points: 10.0,
                    working_days: 5.0,
                },
            )],
        );
        let bonus_row = ReportRow::TeamBonus(TeamBonusRow {
            week: "18/2025".to_string(),
            members: vec!["Anna".to_string(), "Ben".to_string()],
            bonus: team_bonus(&team),
        });
        let columns = bonus_row.columns(&NumberFormat::default());
        assert_eq!(columns[1], "Anna");
        assert_eq!(columns[7], "Team: 2");
        assert_eq!(columns[8], "Team bonus: 10,00");
        assert_eq!(columns[9], "2er x 0,50");

        let milestone_row = ReportRow::Milestone(MilestoneRow {
            week: "18/2025".to_string(),
            leader: "Anna".to_string(),
            milestones: milestones(2),
        });
        let columns = milestone_row.columns(&NumberFormat::default());
        assert_eq!(columns[8], "Milestones: up to 20,00");
        assert_eq!(columns[9], "5,00 per category");
    }

    #[test]
    fn rows_serialize_with_their_kind() {
        let row = ReportRow::Separator(SeparatorRow {
            title: TEAM_SECTION_TITLE.to_string(),
        });
        let json = serde_json::to_value(&row).expect("serializes");
        assert_eq!(json["kind"], "separator");
        assert_eq!(json["title"], TEAM_SECTION_TITLE);
        assert_eq!(row.kind(), "separator");
        assert_eq!(row.columns(&NumberFormat::default())[0], TEAM_SECTION_TITLE);
    }
}
