use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::any::Any;

use crate::events::DomainEvent;
use crate::shared::{BadgeId, OwnerId};

macro_rules! impl_domain_event {
    ($type:ty) => {
        impl DomainEvent for $type {
            fn as_any(&self) -> &(dyn Any + Send + Sync) {
                self
            }

            fn event_type_name(&self) -> &'static str {
                std::any::type_name::<Self>()
            }
        }
    };
}

/// Fired once per newly unlocked badge, after the state is persisted locally
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeUnlocked {
    pub badge_id: BadgeId,
    pub owner_id: Option<OwnerId>,
    pub total_diamonds: u32,
    pub occurred_at: DateTime<Utc>,
}

impl_domain_event!(BadgeUnlocked);

/// Fired when a remote snapshot replaced the in-memory state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerReplaced {
    pub owner_id: OwnerId,
    pub total_diamonds: u32,
    pub bootstrapped: bool,
    pub occurred_at: DateTime<Utc>,
}

impl_domain_event!(TrackerReplaced);
