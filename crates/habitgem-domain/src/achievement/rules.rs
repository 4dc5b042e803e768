use std::fmt;
use std::sync::Arc;

use super::catalog::{
    DIAMOND_COLLECTOR_BADGE_ID, DIAMOND_COLLECTOR_THRESHOLD, STARTER_BADGE_ID,
    WEEK_STREAK_BADGE_ID, WEEK_STREAK_LENGTH,
};
use crate::shared::BadgeId;
use crate::tracker::TrackerState;

pub type BadgePredicate = Arc<dyn Fn(&TrackerState) -> bool + Send + Sync>;

/// One unlock rule: a badge id and a predicate over the full state.
#[derive(Clone)]
pub struct BadgeRule {
    badge_id: BadgeId,
    predicate: BadgePredicate,
}

impl BadgeRule {
    pub fn new<F>(badge_id: BadgeId, predicate: F) -> Self
    where
        F: Fn(&TrackerState) -> bool + Send + Sync + 'static,
    {
        Self {
            badge_id,
            predicate: Arc::new(predicate),
        }
    }

    pub fn badge_id(&self) -> &BadgeId {
        &self.badge_id
    }

    pub fn is_satisfied(&self, state: &TrackerState) -> bool {
        (self.predicate)(state)
    }

    pub fn starter() -> Self {
        Self::new(BadgeId::from_string(STARTER_BADGE_ID), |state| {
            state.has_diamond_day()
        })
    }

    pub fn diamond_collector() -> Self {
        Self::new(BadgeId::from_string(DIAMOND_COLLECTOR_BADGE_ID), |state| {
            state.total_diamonds() >= DIAMOND_COLLECTOR_THRESHOLD
        })
    }

    pub fn week_streak() -> Self {
        Self::new(BadgeId::from_string(WEEK_STREAK_BADGE_ID), |state| {
            state.longest_diamond_streak() >= WEEK_STREAK_LENGTH
        })
    }
}

impl fmt::Debug for BadgeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BadgeRule")
            .field("badge_id", &self.badge_id)
            .finish_non_exhaustive()
    }
}

/// Ordered rule list; evaluation order is unlock order.
#[derive(Debug, Clone, Default)]
pub struct BadgeRuleSet {
    rules: Vec<BadgeRule>,
}

impl BadgeRuleSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Rules exercised by the tracker out of the box.
    pub fn standard() -> Self {
        Self::empty()
            .with_rule(BadgeRule::starter())
            .with_rule(BadgeRule::diamond_collector())
    }

    /// Standard rules, optionally extended with the seven-day streak rule.
    pub fn from_flags(week_streak_enabled: bool) -> Self {
        let rules = Self::standard();
        if week_streak_enabled {
            rules.with_rule(BadgeRule::week_streak())
        } else {
            rules
        }
    }

    /// Adds a rule, replacing any existing rule for the same badge.
    pub fn with_rule(mut self, rule: BadgeRule) -> Self {
        self.rules.retain(|r| r.badge_id != rule.badge_id);
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[BadgeRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
