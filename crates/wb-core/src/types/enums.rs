use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkoutType {
    ForTime,
    Amrap,
    Emom,
    Interval,
    Tabata,
}

impl WorkoutType {
    pub fn family(self) -> ScoringFamily {
        match self {
            Self::ForTime | Self::Emom => ScoringFamily::Time,
            Self::Amrap | Self::Interval | Self::Tabata => ScoringFamily::Reps,
        }
    }

    /// Formats scored from per-interval rows instead of a progress pointer.
    pub fn is_interval(self) -> bool {
        matches!(self, Self::Interval | Self::Tabata)
    }

    /// Formats where a member walks through the steps at their own pace.
    pub fn is_self_paced(self) -> bool {
        matches!(self, Self::ForTime | Self::Amrap | Self::Emom)
    }

    /// Formats that accept partial reps at the time cap.
    pub fn accepts_partial(self) -> bool {
        matches!(self, Self::ForTime | Self::Amrap)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ForTime => "FOR_TIME",
            Self::Amrap => "AMRAP",
            Self::Emom => "EMOM",
            Self::Interval => "INTERVAL",
            Self::Tabata => "TABATA",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScoringFamily {
    /// Ranked by elapsed time to finish; FOR_TIME and EMOM.
    Time,
    /// Ranked by total reps; AMRAP, INTERVAL and TABATA.
    Reps,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    NotStarted,
    Running,
    Paused,
    Ended,
}

impl SessionStatus {
    pub fn is_live(self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Ended => "ended",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Next,
    Prev,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuantityType {
    Reps,
    Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Member,
    Coach,
    Admin,
}

impl Role {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "member" => Some(Self::Member),
            "coach" => Some(Self::Coach),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardSource {
    Live,
    Final,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn families_split_time_and_reps() {
        assert_eq!(WorkoutType::ForTime.family(), ScoringFamily::Time);
        assert_eq!(WorkoutType::Emom.family(), ScoringFamily::Time);
        assert_eq!(WorkoutType::Amrap.family(), ScoringFamily::Reps);
        assert_eq!(WorkoutType::Tabata.family(), ScoringFamily::Reps);
    }

    #[test]
    fn workout_type_wire_names() {
        let json = serde_json::to_string(&WorkoutType::ForTime).expect("serialize");
        assert_eq!(json, "\"FOR_TIME\"");
        let parsed: WorkoutType = serde_json::from_str("\"TABATA\"").expect("parse");
        assert_eq!(parsed, WorkoutType::Tabata);
    }

    #[test]
    fn role_parse_is_case_insensitive() {
        assert_eq!(Role::parse(" Coach "), Some(Role::Coach));
        assert_eq!(Role::parse("owner"), None);
    }
}
