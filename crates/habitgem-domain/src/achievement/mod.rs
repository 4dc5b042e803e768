mod catalog;
mod evaluator;
mod rules;

pub use catalog::{
    find_badge, BadgeDefinition, BADGE_CATALOG, DIAMOND_COLLECTOR_BADGE_ID,
    DIAMOND_COLLECTOR_THRESHOLD, STARTER_BADGE_ID, WEEK_STREAK_BADGE_ID, WEEK_STREAK_LENGTH,
};
pub use evaluator::AchievementEvaluator;
pub use rules::{BadgePredicate, BadgeRule, BadgeRuleSet};
