use log::debug;

use super::rules::BadgeRuleSet;
use crate::shared::BadgeId;
use crate::tracker::TrackerState;

/// Applies every rule against the current full state.
///
/// Expects `total_diamonds` to be fresh; run it after
/// `TrackerState::refresh_diamonds`.
#[derive(Debug, Clone)]
pub struct AchievementEvaluator {
    rules: BadgeRuleSet,
}

impl Default for AchievementEvaluator {
    fn default() -> Self {
        Self::new(BadgeRuleSet::standard())
    }
}

impl AchievementEvaluator {
    pub fn new(rules: BadgeRuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &BadgeRuleSet {
        &self.rules
    }

    /// Unlocks every satisfied badge not yet held.
    ///
    /// Returns the newly unlocked ids in rule order; each one is meant to be
    /// celebrated individually.
    pub fn evaluate(&self, state: &mut TrackerState) -> Vec<BadgeId> {
        let mut unlocked = Vec::new();

        for rule in self.rules.rules() {
            if state.unlocked_badges().contains(rule.badge_id()) {
                continue;
            }
            if rule.is_satisfied(state) && state.unlock_badge(rule.badge_id().clone()) {
                debug!("Badge unlocked: {}", rule.badge_id());
                unlocked.push(rule.badge_id().clone());
            }
        }

        unlocked
    }
}
