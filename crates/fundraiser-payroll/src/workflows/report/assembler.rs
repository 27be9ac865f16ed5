use super::roster::{LeaderDeclaration, Roster, RosterWeek};
use super::rows::{
    DetailRow, MilestoneRow, PayoutRow, ReportRow, SeparatorRow, SubtotalRow, TeamBonusRow,
    TEAM_SECTION_TITLE,
};
use crate::config::ReportConfig;
use crate::workflows::compensation::{
    eligibility, milestones, payout, score, team_bonus, BonusEligibility, EligibilityResult,
    MemberStats, PointsResult, TeamAssignment,
};
use crate::workflows::ledger::{DonationRecord, NormalizedLedger, RejectedRecord, WeekKey};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, info, warn};

/// Non-fatal findings collected while assembling a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportIssue {
    /// Leader without working days; their bonus rows are omitted.
    IncompleteTeamData { week: String, leader: String },
    MemberWithoutWorkingDays {
        week: String,
        leader: String,
        member: String,
    },
    LegacyTeamFallback {
        week: String,
        leader: String,
        members: Vec<String>,
    },
    MissingMemberList { week: String, leader: String },
    UnparsableWeek {
        line: usize,
        reference_id: String,
        label: String,
    },
    InvalidRosterWeek { week: u32 },
}

impl fmt::Display for ReportIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IncompleteTeamData { week, leader } => {
                write!(f, "{week}: team leader {leader} has no working days, bonus omitted")
            }
            Self::MemberWithoutWorkingDays {
                week,
                leader,
                member,
            } => write!(
                f,
                "{week}: {member} has no working days and was left out of {leader}'s team"
            ),
            Self::LegacyTeamFallback {
                week,
                leader,
                members,
            } => write!(
                f,
                "{week}: {leader}'s team was filled with every other fundraiser ({})",
                members.join(", ")
            ),
            Self::MissingMemberList { week, leader } => {
                write!(f, "{week}: {leader} has no member list, counted as a team of one")
            }
            Self::UnparsableWeek {
                line,
                reference_id,
                label,
            } => write!(
                f,
                "line {line}: week '{label}' of {reference_id} has no ordinal, row left out of the weekly report"
            ),
            Self::InvalidRosterWeek { week } => {
                write!(f, "roster week {week} is not a calendar week")
            }
        }
    }
}

/// Rows in render order plus everything that did not make it into them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AssembledReport {
    pub rows: Vec<ReportRow>,
    pub issues: Vec<ReportIssue>,
    pub rejected: Vec<RejectedRecord>,
}

impl AssembledReport {
    pub fn count(&self, kind: &str) -> usize {
        self.rows.iter().filter(|row| row.kind() == kind).count()
    }
}

/// Donations of one fundraiser in one week, in ledger order.
#[derive(Debug, Clone)]
pub struct FundraiserWeekAggregate<'a> {
    pub week: WeekKey,
    pub fundraiser_id: String,
    pub fundraiser_name: String,
    pub records: Vec<&'a DonationRecord>,
    pub points: Vec<PointsResult>,
    /// Cancellations excluded.
    pub total_points: f64,
    /// Computed over every week of the fundraiser.
    pub eligibility: EligibilityResult,
}

impl<'a> FundraiserWeekAggregate<'a> {
    fn new(
        week: WeekKey,
        records: Vec<&'a DonationRecord>,
        eligibility: EligibilityResult,
    ) -> Self {
        let points: Vec<PointsResult> = records
            .iter()
            .map(|record| score(record.age, record.interval, record.yearly_amount))
            .collect();
        let total_points = records
            .iter()
            .zip(&points)
            .filter(|(record, _)| !record.status.is_cancellation())
            .map(|(_, points)| points.value)
            .sum();
        let (fundraiser_id, fundraiser_name) = records
            .first()
            .map(|record| (record.fundraiser_id.clone(), record.fundraiser_name.clone()))
            .unwrap_or_default();

        Self {
            week,
            fundraiser_id,
            fundraiser_name,
            records,
            points,
            total_points,
            eligibility,
        }
    }
}

type WeekGroups<'a> = BTreeMap<WeekKey, BTreeMap<String, Vec<&'a DonationRecord>>>;

/// Joins the engines into the ordered row sequence renderers consume.
pub struct ReportAssembler<'a> {
    ledger: &'a NormalizedLedger,
    roster: &'a Roster,
    config: &'a ReportConfig,
}

impl<'a> ReportAssembler<'a> {
    pub fn new(ledger: &'a NormalizedLedger, roster: &'a Roster, config: &'a ReportConfig) -> Self {
        Self {
            ledger,
            roster,
            config,
        }
    }

    pub fn assemble(&self) -> AssembledReport {
        let mut report = AssembledReport {
            rejected: self.ledger.rejected.clone(),
            ..AssembledReport::default()
        };

        let eligibility_by_id = eligibility::by_fundraiser(&self.ledger.records);
        let groups = self.group_by_week(&mut report.issues);
        let roster_weeks = self.roster_weeks(&mut report.issues);

        let mut week_points: BTreeMap<WeekKey, BTreeMap<String, f64>> = BTreeMap::new();
        for (week, fundraisers) in &groups {
            let roster_week = roster_weeks.get(week).copied();
            for records in fundraisers.values() {
                let fundraiser_eligibility = records
                    .first()
                    .and_then(|record| eligibility_by_id.get(&record.fundraiser_id))
                    .copied()
                    .unwrap_or(EligibilityResult {
                        relevant: 0,
                        approved: 0,
                        approval_rate: None,
                        eligibility: BonusEligibility::NotEligible,
                    });
                let aggregate = FundraiserWeekAggregate::new(
                    week.clone(),
                    records.clone(),
                    fundraiser_eligibility,
                );
                debug!(
                    week = week.label(),
                    fundraiser = %aggregate.fundraiser_name,
                    donations = aggregate.records.len(),
                    points = aggregate.total_points,
                    "fundraiser week aggregated"
                );

                week_points
                    .entry(week.clone())
                    .or_default()
                    .insert(aggregate.fundraiser_name.clone(), aggregate.total_points);
                push_fundraiser_block(&mut report.rows, &aggregate, roster_week);
            }
        }

        if self.roster.has_leaders() {
            report.rows.push(ReportRow::Separator(SeparatorRow {
                title: TEAM_SECTION_TITLE.to_string(),
            }));
            for (week, roster_week) in &roster_weeks {
                // Share the ledger's label when the week has donations.
                let week = groups.get_key_value(week).map_or(week, |(key, _)| key);
                let points = week_points.get(week);
                self.push_team_block(&mut report, week, roster_week, points);
            }
        }

        for issue in &report.issues {
            warn!(%issue, "report issue");
        }
        info!(
            rows = report.rows.len(),
            fundraiser_weeks = report.count("subtotal"),
            team_bonuses = report.count("team_bonus"),
            issues = report.issues.len(),
            "report assembled"
        );

        report
    }

    fn group_by_week(&self, issues: &mut Vec<ReportIssue>) -> WeekGroups<'a> {
        let mut groups: WeekGroups<'a> = BTreeMap::new();
        for record in &self.ledger.records {
            let Some(week) = record.week.clone() else {
                issues.push(ReportIssue::UnparsableWeek {
                    line: record.line,
                    reference_id: record.reference_id.clone(),
                    label: record.week_label.clone(),
                });
                continue;
            };

            groups
                .entry(week)
                .or_default()
                .entry(record.fundraiser_name.clone())
                .or_default()
                .push(record);
        }
        groups
    }

    fn roster_weeks(&self, issues: &mut Vec<ReportIssue>) -> BTreeMap<WeekKey, &'a RosterWeek> {
        let mut weeks = BTreeMap::new();
        for roster_week in &self.roster.weeks {
            let Some(key) = WeekKey::new(roster_week.week, self.config.year) else {
                issues.push(ReportIssue::InvalidRosterWeek {
                    week: roster_week.week,
                });
                continue;
            };
            if weeks.contains_key(&key) {
                warn!(week = key.label(), "duplicate roster week ignored");
                continue;
            }
            weeks.insert(key, roster_week);
        }
        weeks
    }

    fn push_team_block(
        &self,
        report: &mut AssembledReport,
        week: &WeekKey,
        roster_week: &RosterWeek,
        points: Option<&BTreeMap<String, f64>>,
    ) {
        let mut leaders: Vec<&LeaderDeclaration> = roster_week.leaders.iter().collect();
        leaders.sort_by(|left, right| left.name.cmp(&right.name));
        leaders.dedup_by(|later, earlier| later.name == earlier.name);

        let points_of = |name: &str| points.and_then(|map| map.get(name)).copied().unwrap_or(0.0);

        for leader in leaders {
            let Some(leader_days) = roster_week.working_days_for(&leader.name) else {
                report.issues.push(ReportIssue::IncompleteTeamData {
                    week: week.label().to_string(),
                    leader: leader.name.clone(),
                });
                continue;
            };

            let candidates = self.member_candidates(report, week, leader, points);
            let mut members = Vec::new();
            for name in candidates {
                match roster_week.working_days_for(&name) {
                    Some(working_days) => members.push((
                        name.clone(),
                        MemberStats {
                            points: points_of(&name),
                            working_days,
                        },
                    )),
                    None => report.issues.push(ReportIssue::MemberWithoutWorkingDays {
                        week: week.label().to_string(),
                        leader: leader.name.clone(),
                        member: name,
                    }),
                }
            }

            let team = TeamAssignment::new(
                leader.name.clone(),
                MemberStats {
                    points: points_of(&leader.name),
                    working_days: leader_days,
                },
                members,
            );
            let bonus = team_bonus(&team);
            debug!(
                week = week.label(),
                leader = %leader.name,
                team_size = bonus.team_size,
                bonus = bonus.bonus,
                "team bonus computed"
            );

            report.rows.push(ReportRow::TeamBonus(TeamBonusRow {
                week: week.label().to_string(),
                members: team.members().keys().cloned().collect(),
                bonus,
            }));
            report.rows.push(ReportRow::Milestone(MilestoneRow {
                week: week.label().to_string(),
                leader: leader.name.clone(),
                milestones: milestones(team.size()),
            }));
        }
    }

    /// Explicit member list, else the legacy "everyone else this week" fallback when enabled.
    fn member_candidates(
        &self,
        report: &mut AssembledReport,
        week: &WeekKey,
        leader: &LeaderDeclaration,
        points: Option<&BTreeMap<String, f64>>,
    ) -> BTreeSet<String> {
        if let Some(members) = &leader.members {
            return members
                .iter()
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty() && *name != leader.name)
                .collect();
        }

        if !self.config.legacy_team_fallback {
            report.issues.push(ReportIssue::MissingMemberList {
                week: week.label().to_string(),
                leader: leader.name.clone(),
            });
            return BTreeSet::new();
        }

        let members: BTreeSet<String> = points
            .into_iter()
            .flat_map(|map| map.keys())
            .filter(|name| **name != leader.name)
            .cloned()
            .collect();
        report.issues.push(ReportIssue::LegacyTeamFallback {
            week: week.label().to_string(),
            leader: leader.name.clone(),
            members: members.iter().cloned().collect(),
        });
        members
    }
}

fn push_fundraiser_block(
    rows: &mut Vec<ReportRow>,
    aggregate: &FundraiserWeekAggregate<'_>,
    roster_week: Option<&RosterWeek>,
) {
    let week = aggregate.week.label().to_string();

    for (record, points) in aggregate.records.iter().zip(&aggregate.points) {
        rows.push(ReportRow::Detail(DetailRow {
            fundraiser_id: record.fundraiser_id.clone(),
            fundraiser_name: record.fundraiser_name.clone(),
            week: week.clone(),
            reference_id: record.reference_id.clone(),
            age: record.age,
            interval: record.interval_label.clone(),
            yearly_amount: record.yearly_amount,
            status: record.status.clone(),
            points: *points,
        }));
    }

    rows.push(ReportRow::Subtotal(SubtotalRow {
        fundraiser_id: aggregate.fundraiser_id.clone(),
        fundraiser_name: aggregate.fundraiser_name.clone(),
        week: week.clone(),
        points: aggregate.total_points,
        eligibility: aggregate.eligibility,
    }));

    if let Some(working_days) =
        roster_week.and_then(|roster_week| roster_week.working_days_for(&aggregate.fundraiser_name))
    {
        rows.push(ReportRow::Payout(PayoutRow {
            fundraiser_id: aggregate.fundraiser_id.clone(),
            fundraiser_name: aggregate.fundraiser_name.clone(),
            week,
            payout: payout(aggregate.total_points, working_days),
        }));
    }
}
