use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use habitgem_domain::achievement::{find_badge, BadgeDefinition};
use habitgem_domain::events::event_bus::EventHandler;
use habitgem_domain::events::tracker_events::BadgeUnlocked;
use habitgem_domain::shared::{DomainError, OwnerId};

/// Where badge celebrations are shown.
#[cfg_attr(test, mockall::automock)]
pub trait CelebrationSink: Send + Sync {
    fn celebrate(&self, badge: &'static BadgeDefinition, owner_id: Option<OwnerId>);
}

/// Writes celebrations to the log. Used when no UI is attached.
pub struct LogCelebrationSink;

impl CelebrationSink for LogCelebrationSink {
    fn celebrate(&self, badge: &'static BadgeDefinition, owner_id: Option<OwnerId>) {
        match owner_id {
            Some(owner_id) => info!(
                "🏆 {} unlocked \"{}\": {}",
                owner_id, badge.title, badge.description
            ),
            None => info!("🏆 Unlocked \"{}\": {}", badge.title, badge.description),
        }
    }
}

/// Turns `BadgeUnlocked` events into celebrations.
#[derive(Clone)]
pub struct CelebrationHandler {
    sink: Arc<dyn CelebrationSink>,
}

impl CelebrationHandler {
    pub fn new(sink: Arc<dyn CelebrationSink>) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl EventHandler<BadgeUnlocked> for CelebrationHandler {
    async fn handle(&self, event: &BadgeUnlocked) -> Result<(), DomainError> {
        let Some(badge) = find_badge(&event.badge_id) else {
            warn!("No catalog entry for unlocked badge {}", event.badge_id);
            return Ok(());
        };

        self.sink.celebrate(badge, event.owner_id.clone());
        Ok(())
    }
}
