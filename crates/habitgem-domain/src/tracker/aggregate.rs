use chrono::Utc;

use super::diamonds;
use super::value_objects::{
    default_categories, Category, Day, Habit, UnlockedBadges, CUSTOM_CATEGORY_COLOR,
};
use crate::shared::{BadgeId, CategoryId, DayId, HabitId, OwnerId};

/// Aggregate root for one owner's tracking period.
///
/// Mutations are guard-and-return: invalid input leaves the state untouched
/// and is reported through the return value, never as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerState {
    categories: Vec<Category>,
    habits: Vec<Habit>,
    days: Vec<Day>,
    unlocked_badges: UnlockedBadges,
    total_diamonds: u32,
    owner_id: Option<OwnerId>,
}

impl Default for TrackerState {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackerState {
    /// Fresh tracker: default categories, no habits, no days.
    pub fn new() -> Self {
        Self {
            categories: default_categories(),
            habits: Vec::new(),
            days: Vec::new(),
            unlocked_badges: UnlockedBadges::new(),
            total_diamonds: 0,
            owner_id: None,
        }
    }

    pub fn for_owner(owner_id: Option<OwnerId>) -> Self {
        Self {
            owner_id,
            ..Self::new()
        }
    }

    /// Rebuilds an aggregate from persisted parts.
    ///
    /// `total_diamonds` is taken as given; callers decide whether to
    /// recompute it.
    pub fn restore(
        categories: Vec<Category>,
        habits: Vec<Habit>,
        days: Vec<Day>,
        unlocked_badges: UnlockedBadges,
        total_diamonds: u32,
        owner_id: Option<OwnerId>,
    ) -> Self {
        Self {
            categories,
            habits,
            days,
            unlocked_badges,
            total_diamonds,
            owner_id,
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn days(&self) -> &[Day] {
        &self.days
    }

    pub fn day(&self, index: usize) -> Option<&Day> {
        self.days.get(index)
    }

    pub fn unlocked_badges(&self) -> &UnlockedBadges {
        &self.unlocked_badges
    }

    pub fn total_diamonds(&self) -> u32 {
        self.total_diamonds
    }

    pub fn owner_id(&self) -> Option<&OwnerId> {
        self.owner_id.as_ref()
    }

    pub fn set_owner(&mut self, owner_id: Option<OwnerId>) {
        self.owner_id = owner_id;
    }

    pub fn add_category(&mut self, name: &str) -> Option<CategoryId> {
        self.add_category_at(name, now_millis())
    }

    pub fn add_category_at(&mut self, name: &str, now_ms: i64) -> Option<CategoryId> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let id = self.fresh_category_id(now_ms);
        self.categories
            .push(Category::new(id.clone(), name, CUSTOM_CATEGORY_COLOR));
        Some(id)
    }

    pub fn add_habit(&mut self, name: &str, category_id: &CategoryId) -> Option<HabitId> {
        self.add_habit_at(name, category_id, now_millis())
    }

    /// Dangling `category_id` values are accepted.
    pub fn add_habit_at(
        &mut self,
        name: &str,
        category_id: &CategoryId,
        now_ms: i64,
    ) -> Option<HabitId> {
        let name = name.trim();
        if name.is_empty() || category_id.as_str().trim().is_empty() {
            return None;
        }

        let id = self.fresh_habit_id(now_ms);
        self.habits.push(Habit {
            id: id.clone(),
            name: name.to_string(),
            category_id: category_id.clone(),
        });
        Some(id)
    }

    pub fn add_day(&mut self) -> DayId {
        self.add_day_at(now_millis())
    }

    /// Label uses the day count at creation time and is never renumbered.
    pub fn add_day_at(&mut self, now_ms: i64) -> DayId {
        let mut millis = now_ms;
        while self.days.iter().any(|day| day.id.as_millis() == millis) {
            millis += 1;
        }

        let id = DayId::from_millis(millis);
        let label = format!("Day {}", self.days.len() + 1);
        self.days.push(Day::new(id, label));
        id
    }

    /// Removes the day at `index`. Confirmation is the caller's concern.
    pub fn delete_day(&mut self, index: usize) -> Option<Day> {
        if index >= self.days.len() {
            return None;
        }
        Some(self.days.remove(index))
    }

    /// Removes the habit and scrubs it from every day's completions.
    pub fn delete_habit(&mut self, habit_id: &HabitId) -> Option<Habit> {
        let position = self.habits.iter().position(|h| &h.id == habit_id)?;
        let removed = self.habits.remove(position);

        for day in &mut self.days {
            day.completions.remove(habit_id);
        }

        Some(removed)
    }

    /// Flips `habit_id` in the day's completion set.
    ///
    /// Returns the new membership, or `None` when the index is out of range
    /// or the habit is neither known nor already recorded on that day.
    ///
    /// Toggling twice restores the set for every id this accepts: known
    /// habits, and ids already recorded on the day (so stale entries can be
    /// cleared). An id that is neither is rejected instead of being flipped
    /// in, which keeps unknown habits out of stored days.
    pub fn toggle_completion(&mut self, day_index: usize, habit_id: &HabitId) -> Option<bool> {
        let known = self.habits.iter().any(|h| &h.id == habit_id);
        let day = self.days.get_mut(day_index)?;
        if !known && !day.is_completed(habit_id) {
            return None;
        }
        Some(day.toggle(habit_id))
    }

    pub fn set_reflection(&mut self, day_index: usize, text: &str) -> bool {
        match self.days.get_mut(day_index) {
            Some(day) => {
                day.reflection = text.to_string();
                true
            }
            None => false,
        }
    }

    /// Recomputes `total_diamonds` from days and habits.
    pub fn refresh_diamonds(&mut self) -> u32 {
        self.total_diamonds = diamonds::calculate_diamonds(&self.days, &self.habits);
        self.total_diamonds
    }

    pub fn is_diamond_day(&self, day_index: usize) -> bool {
        self.days
            .get(day_index)
            .is_some_and(|day| diamonds::is_diamond_day(day, &self.habits))
    }

    pub fn has_diamond_day(&self) -> bool {
        self.days
            .iter()
            .any(|day| diamonds::is_diamond_day(day, &self.habits))
    }

    pub fn longest_diamond_streak(&self) -> u32 {
        diamonds::longest_diamond_streak(&self.days, &self.habits)
    }

    /// Appends the badge once; returns whether it was newly unlocked.
    pub fn unlock_badge(&mut self, badge_id: BadgeId) -> bool {
        self.unlocked_badges.insert(badge_id)
    }

    fn fresh_category_id(&self, now_ms: i64) -> CategoryId {
        let mut millis = now_ms;
        loop {
            let candidate = CategoryId::from_string(&format!("c_{}", millis));
            if !self.categories.iter().any(|c| c.id == candidate) {
                return candidate;
            }
            millis += 1;
        }
    }

    fn fresh_habit_id(&self, now_ms: i64) -> HabitId {
        let mut millis = now_ms;
        loop {
            let candidate = HabitId::from_string(&format!("h_{}", millis));
            if !self.habits.iter().any(|h| h.id == candidate) {
                return candidate;
            }
            millis += 1;
        }
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
