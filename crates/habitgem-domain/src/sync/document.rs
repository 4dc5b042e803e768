use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::shared::{BadgeId, DayId, DomainError, HabitId, OwnerId};
use crate::tracker::{
    calculate_diamonds, default_categories, Category, Day, Habit, TrackerState, UnlockedBadges,
};

/// Wire shape of a tracked day.
///
/// Completions travel as a `habitId -> true` map. Older documents stored the
/// same map under `habits`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayDocument {
    pub id: DayId,
    #[serde(default)]
    pub label: String,
    #[serde(default, alias = "habits")]
    pub completions: BTreeMap<HabitId, bool>,
    #[serde(default)]
    pub reflection: String,
}

impl DayDocument {
    pub fn from_day(day: &Day) -> Self {
        Self {
            id: day.id,
            label: day.label.clone(),
            completions: day
                .completions
                .iter()
                .map(|habit_id| (habit_id.clone(), true))
                .collect(),
            reflection: day.reflection.clone(),
        }
    }

    pub fn into_day(self) -> Day {
        let mut day = Day::new(self.id, self.label);
        day.reflection = self.reflection;
        day.completions = self
            .completions
            .into_iter()
            .filter_map(|(habit_id, done)| done.then_some(habit_id))
            .collect();
        day
    }
}

/// Per-owner detail document, also used verbatim as the local cache record.
///
/// Every field is optional so a partial document can be merged field by
/// field and documents predating a field can still be decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<Category>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub habits: Option<Vec<Habit>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<Vec<DayDocument>>,
    #[serde(default, alias = "achievements", skip_serializing_if = "Option::is_none")]
    pub unlocked_badges: Option<Vec<BadgeId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_diamonds: Option<u32>,
}

impl TrackerDocument {
    /// Full snapshot of the aggregate's persisted fields.
    pub fn from_state(state: &TrackerState) -> Self {
        Self {
            categories: Some(state.categories().to_vec()),
            habits: Some(state.habits().to_vec()),
            days: Some(state.days().iter().map(DayDocument::from_day).collect()),
            unlocked_badges: Some(state.unlocked_badges().as_slice().to_vec()),
            total_diamonds: Some(state.total_diamonds()),
        }
    }

    /// Decodes into an aggregate, filling schema drift.
    ///
    /// Missing categories fall back to the defaults, other missing lists to
    /// empty. `total_diamonds` is always derived from the loaded days and
    /// habits so an absent or stale stored value never leaks through.
    pub fn into_state(self, owner_id: Option<OwnerId>) -> TrackerState {
        let categories = self.categories.unwrap_or_else(default_categories);
        let habits = self.habits.unwrap_or_default();
        let days: Vec<Day> = self
            .days
            .unwrap_or_default()
            .into_iter()
            .map(DayDocument::into_day)
            .collect();
        let unlocked_badges: UnlockedBadges =
            self.unlocked_badges.unwrap_or_default().into_iter().collect();

        let derived = calculate_diamonds(&days, &habits);
        match self.total_diamonds {
            None => debug!("Document without totalDiamonds, derived {}", derived),
            Some(stored) if stored != derived => {
                debug!("Stored totalDiamonds {} is stale, derived {}", stored, derived)
            }
            Some(_) => {}
        }

        TrackerState::restore(
            categories,
            habits,
            days,
            unlocked_badges,
            derived,
            owner_id,
        )
    }

    pub fn from_json(raw: &str) -> Result<Self, DomainError> {
        serde_json::from_str(raw).map_err(|e| DomainError::Deserialization(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, DomainError> {
        serde_json::to_string(self).map_err(|e| DomainError::Serialization(e.to_string()))
    }
}

/// Per-owner leaderboard summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDocument {
    pub total_diamonds: u32,
    pub last_updated_timestamp: DateTime<Utc>,
}

impl SummaryDocument {
    pub fn from_state(state: &TrackerState, now: DateTime<Utc>) -> Self {
        Self {
            total_diamonds: state.total_diamonds(),
            last_updated_timestamp: now,
        }
    }
}

/// Profile fields written once when an owner registers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerProfile {
    pub display_name: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub owner_id: OwnerId,
    pub display_name: Option<String>,
    pub total_diamonds: u32,
    pub last_updated_timestamp: Option<DateTime<Utc>>,
}
