use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

/// Team leaders and working days per week, as the data-entry tool saves them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub weeks: Vec<RosterWeek>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterWeek {
    pub week: u32,
    #[serde(default)]
    pub working_days: BTreeMap<String, f64>,
    #[serde(default)]
    pub leaders: Vec<LeaderDeclaration>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeaderDeclaration {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_days: Option<f64>,
    /// `None` means no member list was entered; `Some(vec![])` means no team.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<String>>,
}

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("failed to read roster: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid roster JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl Roster {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, RosterError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RosterError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn has_leaders(&self) -> bool {
        self.weeks.iter().any(|week| !week.leaders.is_empty())
    }
}

impl RosterWeek {
    /// Leader declarations win over the week's working-days map.
    pub fn working_days_for(&self, name: &str) -> Option<f64> {
        self.leaders
            .iter()
            .find(|leader| leader.name == name)
            .and_then(|leader| leader.working_days)
            .or_else(|| self.working_days.get(name).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROSTER: &str = r#"{
        "weeks": [
            {
                "week": 18,
                "working_days": { "Anna": 5, "Ben": 4.5 },
                "leaders": [
                    { "name": "Anna", "members": ["Ben"] },
                    { "name": "Cem", "working_days": 3, "members": [] },
                    { "name": "Dora" }
                ]
            },
            { "week": 19 }
        ]
    }"#;

    #[test]
    fn parses_roster_json() {
        let roster = Roster::from_reader(ROSTER.as_bytes()).expect("valid roster");
        assert_eq!(roster.weeks.len(), 2);

        let week = &roster.weeks[0];
        assert_eq!(week.week, 18);
        assert_eq!(week.leaders[0].members.as_deref(), Some(&["Ben".to_string()][..]));
        assert_eq!(week.leaders[1].members.as_deref(), Some(&[][..]));
        assert_eq!(week.leaders[2].members, None);
        assert!(roster.weeks[1].leaders.is_empty());
        assert!(roster.has_leaders());
    }

    #[test]
    fn working_days_prefer_the_leader_declaration() {
        let roster = Roster::from_reader(ROSTER.as_bytes()).expect("valid roster");
        let week = &roster.weeks[0];
        assert_eq!(week.working_days_for("Anna"), Some(5.0));
        assert_eq!(week.working_days_for("Ben"), Some(4.5));
        assert_eq!(week.working_days_for("Cem"), Some(3.0));
        assert_eq!(week.working_days_for("Dora"), None);
    }

    #[test]
    fn malformed_json_is_reported() {
        let error = Roster::from_reader("{\"weeks\": [".as_bytes()).expect_err("truncated json");
        assert!(matches!(error, RosterError::Json(_)));
    }
}
