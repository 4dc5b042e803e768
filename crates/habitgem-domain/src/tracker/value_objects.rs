use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::shared::{BadgeId, CategoryId, DayId, HabitId};

/// Habit grouping shown as a column band in the tracker grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// Opaque style token handed to the renderer.
    #[serde(alias = "color")]
    pub color_tag: String,
}

impl Category {
    pub fn new(id: CategoryId, name: impl Into<String>, color_tag: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color_tag: color_tag.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    /// Not checked against existing categories once created.
    pub category_id: CategoryId,
}

/// One tracked day.
///
/// `label` is fixed at creation and is not a positional index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Day {
    pub id: DayId,
    pub label: String,
    pub completions: BTreeSet<HabitId>,
    pub reflection: String,
}

impl Day {
    pub fn new(id: DayId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            completions: BTreeSet::new(),
            reflection: String::new(),
        }
    }

    pub fn is_completed(&self, habit_id: &HabitId) -> bool {
        self.completions.contains(habit_id)
    }

    /// Flips membership of `habit_id`; returns the new membership.
    pub fn toggle(&mut self, habit_id: &HabitId) -> bool {
        if self.completions.remove(habit_id) {
            false
        } else {
            self.completions.insert(habit_id.clone());
            true
        }
    }

    pub fn completion_count(&self) -> usize {
        self.completions.len()
    }
}

/// Insertion-ordered, append-only set of unlocked badge ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnlockedBadges(Vec<BadgeId>);

impl UnlockedBadges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `badge_id` unless already present. Returns whether it was added.
    pub fn insert(&mut self, badge_id: BadgeId) -> bool {
        if self.contains(&badge_id) {
            return false;
        }
        self.0.push(badge_id);
        true
    }

    pub fn contains(&self, badge_id: &BadgeId) -> bool {
        self.0.iter().any(|id| id == badge_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BadgeId> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[BadgeId] {
        &self.0
    }
}

impl FromIterator<BadgeId> for UnlockedBadges {
    fn from_iter<I: IntoIterator<Item = BadgeId>>(iter: I) -> Self {
        let mut badges = Self::new();
        for badge_id in iter {
            badges.insert(badge_id);
        }
        badges
    }
}

/// Categories seeded into every fresh tracker.
pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new(
            CategoryId::from_string("c_pray"),
            "الصلاة",
            "bg-emerald-50 text-emerald-800",
        ),
        Category::new(
            CategoryId::from_string("c_quran"),
            "القرآن",
            "bg-amber-50 text-amber-800",
        ),
        Category::new(
            CategoryId::from_string("c_hadith"),
            "الحديث",
            "bg-blue-50 text-blue-800",
        ),
        Category::new(
            CategoryId::from_string("c_azkar"),
            "الذكر",
            "bg-purple-50 text-purple-800",
        ),
    ]
}

/// Style token for user-created categories.
pub const CUSTOM_CATEGORY_COLOR: &str = "bg-gray-50 text-gray-800";
