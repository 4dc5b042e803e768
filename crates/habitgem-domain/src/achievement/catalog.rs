use serde::Serialize;

use crate::shared::BadgeId;

pub const STARTER_BADGE_ID: &str = "starter_1_day";
pub const WEEK_STREAK_BADGE_ID: &str = "week_streak";
pub const DIAMOND_COLLECTOR_BADGE_ID: &str = "diamond_collector";

/// Diamonds required for the collector badge.
pub const DIAMOND_COLLECTOR_THRESHOLD: u32 = 10;
/// Consecutive diamond days required for the streak badge.
pub const WEEK_STREAK_LENGTH: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BadgeDefinition {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
}

impl BadgeDefinition {
    pub fn badge_id(&self) -> BadgeId {
        BadgeId::from_string(self.id)
    }
}

pub const BADGE_CATALOG: &[BadgeDefinition] = &[
    BadgeDefinition {
        id: STARTER_BADGE_ID,
        title: "First Rain",
        description: "Complete one full day at 100%",
        icon: "fa-solid fa-droplet",
        color: "text-blue-500",
    },
    BadgeDefinition {
        id: WEEK_STREAK_BADGE_ID,
        title: "Steadfast Week",
        description: "Complete seven full days in a row",
        icon: "fa-solid fa-fire",
        color: "text-orange-500",
    },
    BadgeDefinition {
        id: DIAMOND_COLLECTOR_BADGE_ID,
        title: "Diamond Collector",
        description: "Collect 10 diamonds",
        icon: "fa-solid fa-gem",
        color: "text-cyan-500",
    },
];

pub fn find_badge(badge_id: &BadgeId) -> Option<&'static BadgeDefinition> {
    BADGE_CATALOG.iter().find(|b| b.id == badge_id.as_str())
}
