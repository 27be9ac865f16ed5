pub mod eligibility;
pub mod payout;
pub mod points;
pub mod team;

pub use eligibility::{BonusEligibility, EligibilityResult};
pub use payout::{payout, PayoutBracket, PayoutResult};
pub use points::{points, score, AmountBracket, PointsResult, PointsRule};
pub use team::{
    milestones, team_bonus, MemberStats, MilestoneCategory, MilestoneEntry, MilestoneResult,
    TeamAssignment, TeamBonusResult, TeamBracket, TeamSchedule,
};
