use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of one of the configured teams, e.g. `water-wise`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamKey(String);

impl TeamKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TeamKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    pub name: String,
    pub team: TeamKey,
    /// Check-in time in milliseconds since the Unix epoch.
    #[serde(rename = "ts")]
    pub timestamp: i64,
}

/// Everything the store persists under its storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CheckInState {
    pub total: u64,
    #[serde(rename = "teams")]
    pub team_counts: BTreeMap<TeamKey, u64>,
    pub attendees: Vec<Attendee>,
}

#[derive(Debug, Deserialize)]
pub struct CheckInRequest {
    #[serde(default)]
    pub name: String,
    pub team: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub team: Option<String>,
    pub show: Option<u8>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AttendeeResponse {
    pub name: String,
    pub team: String,
    pub team_label: String,
    pub ts: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TeamSummary {
    pub key: String,
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub total: u64,
    pub goal: u64,
    pub progress_percent: u8,
    pub goal_reached: bool,
    pub leader: Option<String>,
    pub teams: Vec<TeamSummary>,
}
