use crate::errors::ConfigError;
use crate::models::TeamKey;
use std::{env, path::PathBuf};

pub const DEFAULT_STORAGE_KEY: &str = "intelSummitCheckIn.v1";
pub const DEFAULT_GOAL: u64 = 50;
pub const DEFAULT_MAX_ATTENDEES: usize = 1000;
pub const DEFAULT_NAME: &str = "Guest";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    pub key: TeamKey,
    pub label: String,
}

impl Team {
    pub fn new(key: &str, label: &str) -> Self {
        Self {
            key: TeamKey::new(key),
            label: label.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CheckInConfig {
    pub teams: Vec<Team>,
    pub goal: u64,
    pub storage_key: String,
    /// Attendee log entries kept when state is loaded.
    pub max_attendees: usize,
    /// Name recorded when the submitted one is blank.
    pub default_name: String,
}

impl Default for CheckInConfig {
    fn default() -> Self {
        Self {
            teams: vec![
                Team::new("water-wise", "Team Water Wise"),
                Team::new("net-zero", "Team Net Zero"),
                Team::new("renewables", "Team Renewables"),
            ],
            goal: DEFAULT_GOAL,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            max_attendees: DEFAULT_MAX_ATTENDEES,
            default_name: DEFAULT_NAME.to_string(),
        }
    }
}

impl CheckInConfig {
    pub fn with_goal(mut self, goal: u64) -> Self {
        self.goal = goal;
        self
    }

    pub fn team(&self, key: &str) -> Option<&Team> {
        self.teams.iter().find(|team| team.key.as_str() == key)
    }

    pub fn is_known(&self, key: &str) -> bool {
        self.team(key).is_some()
    }

    /// Display label for a team key, or the key itself when it is not configured.
    pub fn label_for<'a>(&'a self, key: &'a str) -> &'a str {
        self.team(key).map(|team| team.label.as_str()).unwrap_or(key)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Ok(value) = env::var("ATTENDANCE_GOAL") {
            config.goal = parse_goal(&value)?;
        }
        if let Ok(value) = env::var("CHECKIN_TEAMS") {
            config.teams = parse_teams(&value)?;
        }
        Ok(config)
    }
}

pub fn parse_goal(value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(goal) if goal > 0 => Ok(goal),
        _ => Err(ConfigError::InvalidNumber {
            name: "ATTENDANCE_GOAL",
            value: value.to_string(),
        }),
    }
}

/// Parses `key=Label,key=Label`.
pub fn parse_teams(value: &str) -> Result<Vec<Team>, ConfigError> {
    let mut teams: Vec<Team> = Vec::new();
    for entry in value.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
        let Some((key, label)) = entry.split_once('=') else {
            return Err(ConfigError::InvalidTeam(entry.to_string()));
        };
        let (key, label) = (key.trim(), label.trim());
        if key.is_empty() || label.is_empty() {
            return Err(ConfigError::InvalidTeam(entry.to_string()));
        }
        if teams.iter().any(|team| team.key.as_str() == key) {
            return Err(ConfigError::DuplicateTeam(key.to_string()));
        }
        teams.push(Team::new(key, label));
    }

    if teams.is_empty() {
        return Err(ConfigError::NoTeams);
    }
    Ok(teams)
}

pub fn resolve_data_dir() -> PathBuf {
    if let Ok(path) = env::var("APP_DATA_DIR") {
        return PathBuf::from(path);
    }

    PathBuf::from("data")
}

pub fn resolve_port() -> u16 {
    env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_three_teams() {
        let config = CheckInConfig::default();
        assert_eq!(config.teams.len(), 3);
        assert_eq!(config.goal, 50);
        assert_eq!(config.label_for("net-zero"), "Team Net Zero");
        assert_eq!(config.label_for("unknown"), "unknown");
    }

    #[test]
    fn parse_teams_accepts_key_label_pairs() {
        let teams = parse_teams("red=Team Red, blue = Team Blue,").unwrap();
        assert_eq!(teams, vec![Team::new("red", "Team Red"), Team::new("blue", "Team Blue")]);
    }

    #[test]
    fn parse_teams_rejects_bad_entries() {
        assert_eq!(
            parse_teams("red"),
            Err(ConfigError::InvalidTeam("red".to_string()))
        );
        assert_eq!(
            parse_teams("red=A,red=B"),
            Err(ConfigError::DuplicateTeam("red".to_string()))
        );
        assert_eq!(parse_teams(" , "), Err(ConfigError::NoTeams));
    }

    #[test]
    fn parse_goal_requires_positive_integer() {
        assert_eq!(parse_goal(" 75 "), Ok(75));
        assert!(parse_goal("0").is_err());
        assert!(parse_goal("-3").is_err());
        assert!(parse_goal("lots").is_err());
    }
}
