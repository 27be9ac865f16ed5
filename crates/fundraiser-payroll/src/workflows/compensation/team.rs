use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Smallest team (leader included) that earns a performance bonus.
pub const MIN_TEAM_SIZE: usize = 2;
/// Teams smaller than this are paid on the reduced schedule.
pub const FULL_SCHEDULE_MIN_SIZE: usize = 3;

/// Points and working days a single team member contributes in one week.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MemberStats {
    pub points: f64,
    pub working_days: f64,
}

/// A team leader's declared team for one week. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamAssignment {
    leader: String,
    leader_working_days: f64,
    members: BTreeMap<String, MemberStats>,
}

impl TeamAssignment {
    /// The leader always belongs to the team; a member entry under the
    /// leader's own name is ignored in favour of `leader_stats`.
    pub fn new<I>(leader: impl Into<String>, leader_stats: MemberStats, members: I) -> Self
    where
        I: IntoIterator<Item = (String, MemberStats)>,
    {
        let leader = leader.into();
        let mut roster: BTreeMap<String, MemberStats> = members
            .into_iter()
            .filter(|(name, _)| *name != leader)
            .collect();
        roster.insert(leader.clone(), leader_stats);

        Self {
            leader,
            leader_working_days: leader_stats.working_days,
            members: roster,
        }
    }

    pub fn leader(&self) -> &str {
        &self.leader
    }

    pub fn leader_working_days(&self) -> f64 {
        self.leader_working_days
    }

    pub fn members(&self) -> &BTreeMap<String, MemberStats> {
        &self.members
    }

    /// Team size with the leader counted.
    pub fn size(&self) -> usize {
        self.members.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamSchedule {
    Reduced,
    Full,
}

impl TeamSchedule {
    pub fn for_size(team_size: usize) -> Self {
        if team_size < FULL_SCHEDULE_MIN_SIZE {
            Self::Reduced
        } else {
            Self::Full
        }
    }

    /// Rates for team averages below 2, below 3, below 5, and 5 or more.
    const fn rates(self) -> [f64; 4] {
        match self {
            Self::Reduced => [0.25, 0.50, 1.25, 2.25],
            Self::Full => [0.50, 1.00, 2.50, 4.50],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamBracket {
    TeamTooSmall,
    NoWorkingDays,
    UnderTwo,
    Two,
    Three,
    FivePlus,
}

impl TeamBracket {
    fn for_average(team_average: f64) -> Self {
        if team_average >= 5.0 {
            Self::FivePlus
        } else if team_average >= 3.0 {
            Self::Three
        } else if team_average >= 2.0 {
            Self::Two
        } else {
            Self::UnderTwo
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::TeamTooSmall => "team too small",
            Self::NoWorkingDays => "no working days",
            Self::UnderTwo => "under 2er",
            Self::Two => "2er",
            Self::Three => "3er",
            Self::FivePlus => "5er+",
        }
    }

    fn rate(self, schedule: TeamSchedule) -> Option<f64> {
        let rates = schedule.rates();
        match self {
            Self::TeamTooSmall | Self::NoWorkingDays => None,
            Self::UnderTwo => Some(rates[0]),
            Self::Two => Some(rates[1]),
            Self::Three => Some(rates[2]),
            Self::FivePlus => Some(rates[3]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamBonusResult {
    pub leader: String,
    pub team_size: usize,
    pub team_points: f64,
    pub team_working_days: f64,
    pub team_average: Option<f64>,
    pub bracket: TeamBracket,
    pub schedule: Option<TeamSchedule>,
    pub rate: Option<f64>,
    pub bonus: f64,
}

pub fn team_bonus(team: &TeamAssignment) -> TeamBonusResult {
    let team_size = team.size();
    let team_points: f64 = team.members.values().map(|member| member.points).sum();
    let team_working_days: f64 = team.members.values().map(|member| member.working_days).sum();

    let unpaid = |bracket: TeamBracket| TeamBonusResult {
        leader: team.leader.clone(),
        team_size,
        team_points,
        team_working_days,
        team_average: None,
        bracket,
        schedule: None,
        rate: None,
        bonus: 0.0,
    };

    if team_size < MIN_TEAM_SIZE {
        return unpaid(TeamBracket::TeamTooSmall);
    }
    if team_working_days.is_nan() || team_working_days <= 0.0 {
        return unpaid(TeamBracket::NoWorkingDays);
    }

    let team_average = team_points / team_working_days;
    let schedule = TeamSchedule::for_size(team_size);
    let bracket = TeamBracket::for_average(team_average);
    let rate = bracket.rate(schedule);

    TeamBonusResult {
        leader: team.leader.clone(),
        team_size,
        team_points,
        team_working_days,
        team_average: Some(team_average),
        bracket,
        schedule: Some(schedule),
        rate,
        bonus: rate.map_or(0.0, |rate| team_points * rate),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneCategory {
    Coaching,
    OfficeCommunication,
    ExternalPresence,
    MaterialResponsibility,
}

impl MilestoneCategory {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Coaching,
            Self::OfficeCommunication,
            Self::ExternalPresence,
            Self::MaterialResponsibility,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Coaching => "Coaching",
            Self::OfficeCommunication => "Office communication",
            Self::ExternalPresence => "External presence",
            Self::MaterialResponsibility => "Material responsibility",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MilestoneEntry {
    pub category: MilestoneCategory,
    pub amount: f64,
}

/// Potential milestone incentive; informational, never part of the bonus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MilestoneResult {
    pub team_size: usize,
    pub per_category: f64,
    pub categories: Vec<MilestoneEntry>,
    pub total_possible: f64,
}

pub fn milestones(team_size: usize) -> MilestoneResult {
    let per_category = match team_size {
        0..=3 => 5.0,
        4..=5 => 20.0,
        _ => 30.0,
    };

    let categories: Vec<MilestoneEntry> = MilestoneCategory::ordered()
        .into_iter()
        .map(|category| MilestoneEntry {
            category,
            amount: per_category,
        })
        .collect();
    let total_possible = categories.iter().map(|entry| entry.amount).sum();

    MilestoneResult {
        team_size,
        per_category,
        categories,
        total_possible,
    }
}
