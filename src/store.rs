use crate::clock::Clock;
use crate::config::CheckInConfig;
use crate::errors::{CheckInError, StorageError};
use crate::models::{Attendee, CheckInState, TeamKey};
use crate::storage::KeyValueStore;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{error, info, warn};

/// What `load` found in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Missing,
    Restored,
    Corrupt,
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    CheckedIn {
        attendee: Attendee,
        total: u64,
        goal_reached: bool,
    },
}

pub type Subscriber = Box<dyn FnMut(&StoreEvent) + Send>;

/// Owns the check-in state and mediates every read and write of it.
pub struct CheckInStore {
    config: CheckInConfig,
    storage: Box<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
    state: CheckInState,
    subscribers: Vec<Subscriber>,
}

impl CheckInStore {
    pub fn new(
        config: CheckInConfig,
        storage: impl KeyValueStore + 'static,
        clock: impl Clock + 'static,
    ) -> Self {
        let state = zeroed_state(&config);
        Self {
            config,
            storage: Box::new(storage),
            clock: Box::new(clock),
            state,
            subscribers: Vec::new(),
        }
    }

    pub fn config(&self) -> &CheckInConfig {
        &self.config
    }

    pub fn state(&self) -> &CheckInState {
        &self.state
    }

    pub fn total(&self) -> u64 {
        self.state.total
    }

    pub fn team_counts(&self) -> &BTreeMap<TeamKey, u64> {
        &self.state.team_counts
    }

    pub fn attendees(&self) -> &[Attendee] {
        &self.state.attendees
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&StoreEvent) + Send + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Restores state from storage. Fields are taken one by one and only when
    /// they have the expected type; anything else keeps its current value.
    pub fn load(&mut self) -> LoadOutcome {
        let raw = match self.storage.get(&self.config.storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return LoadOutcome::Missing,
            Err(err) => {
                error!("failed to read check-in state: {err}");
                return LoadOutcome::Unavailable;
            }
        };

        let saved = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(saved)) => saved,
            Ok(_) => {
                warn!("stored check-in state is not an object, using defaults");
                return LoadOutcome::Corrupt;
            }
            Err(err) => {
                error!("failed to parse check-in state: {err}");
                return LoadOutcome::Corrupt;
            }
        };

        self.apply_saved(&saved);
        info!(
            total = self.state.total,
            attendees = self.state.attendees.len(),
            "restored check-in state"
        );
        LoadOutcome::Restored
    }

    fn apply_saved(&mut self, saved: &Map<String, Value>) {
        if let Some(total) = saved.get("total").and_then(Value::as_u64) {
            self.state.total = total;
        }

        if let Some(teams) = saved.get("teams").and_then(Value::as_object) {
            for team in &self.config.teams {
                if let Some(count) = teams.get(team.key.as_str()).and_then(Value::as_u64) {
                    self.state.team_counts.insert(team.key.clone(), count);
                }
            }
        }

        if let Some(entries) = saved.get("attendees").and_then(Value::as_array) {
            let mut attendees: Vec<Attendee> = entries
                .iter()
                .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
                .collect();
            let skipped = entries.len() - attendees.len();
            if skipped > 0 {
                warn!(skipped, "ignored malformed attendee entries");
            }

            let max = self.config.max_attendees;
            if attendees.len() > max {
                attendees.drain(..attendees.len() - max);
            }
            self.state.attendees = attendees;
        }
    }

    /// Writes the full state under the configured key. The in-memory state
    /// stays authoritative when this fails.
    pub fn save(&self) -> Result<(), StorageError> {
        let result = serde_json::to_string(&self.state)
            .map_err(StorageError::from)
            .and_then(|payload| self.storage.set(&self.config.storage_key, &payload));
        if let Err(err) = &result {
            error!("failed to save check-in state: {err}");
        }
        result
    }

    pub fn check_in(&mut self, name: &str, team: &str) -> Result<Attendee, CheckInError> {
        let Some(key) = self.config.team(team).map(|team| team.key.clone()) else {
            warn!(team, "rejected check-in for unknown team");
            return Err(CheckInError::UnknownTeam(team.to_string()));
        };

        let name = match name.trim() {
            "" => self.config.default_name.clone(),
            trimmed => trimmed.to_string(),
        };
        let attendee = Attendee {
            name,
            team: key.clone(),
            timestamp: self.clock.now_millis(),
        };

        self.state.total = self.state.total.saturating_add(1);
        let count = self.state.team_counts.entry(key).or_insert(0);
        *count = count.saturating_add(1);
        self.state.attendees.push(attendee.clone());

        // Failures are logged by save; the session carries on in memory.
        let _ = self.save();

        info!(name = %attendee.name, team = %attendee.team, total = self.state.total, "checked in");
        let event = StoreEvent::CheckedIn {
            attendee: attendee.clone(),
            total: self.state.total,
            goal_reached: self.is_goal_reached(),
        };
        for subscriber in &mut self.subscribers {
            subscriber(&event);
        }

        Ok(attendee)
    }

    pub fn is_goal_reached(&self) -> bool {
        self.state.total >= self.config.goal
    }

    pub fn progress_percent(&self) -> u8 {
        if self.config.goal == 0 {
            return 100;
        }
        let pct = (self.state.total as f64 / self.config.goal as f64 * 100.0).round();
        pct.min(100.0) as u8
    }

    /// The team with the strictly highest count, or `None` on a tie for first.
    pub fn current_leader(&self) -> Option<&TeamKey> {
        let mut counts: Vec<(&TeamKey, u64)> = self
            .state
            .team_counts
            .iter()
            .map(|(key, count)| (key, *count))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1));

        match counts.as_slice() {
            [] => None,
            [(_, first), (_, second), ..] if first == second => None,
            [(key, _), ..] => Some(*key),
        }
    }

    /// Most recent first, optionally limited to one team.
    pub fn filtered_attendees(&self, team: Option<&str>) -> Vec<&Attendee> {
        self.state
            .attendees
            .iter()
            .rev()
            .filter(|attendee| team.is_none_or(|team| attendee.team.as_str() == team))
            .collect()
    }
}

fn zeroed_state(config: &CheckInConfig) -> CheckInState {
    CheckInState {
        total: 0,
        team_counts: config.teams.iter().map(|team| (team.key.clone(), 0)).collect(),
        attendees: Vec::new(),
    }
}
