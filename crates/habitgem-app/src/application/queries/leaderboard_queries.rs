use std::sync::Arc;
use tracing::debug;

use crate::application::dtos::LeaderboardEntryDto;
use habitgem_domain::shared::{DomainError, OwnerId};
use habitgem_domain::sync::RemoteTrackerStore;

/// Leaderboard query service
/// Ranks owner summaries by diamonds
pub struct LeaderboardQueryService {
    remote: Arc<dyn RemoteTrackerStore>,
    limit: u32,
}

impl LeaderboardQueryService {
    pub fn new(remote: Arc<dyn RemoteTrackerStore>, limit: u32) -> Self {
        Self { remote, limit }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Top owners, highest first. `current_owner` is flagged in the result.
    pub async fn top(
        &self,
        current_owner: Option<&OwnerId>,
    ) -> Result<Vec<LeaderboardEntryDto>, DomainError> {
        if self.limit == 0 {
            return Ok(Vec::new());
        }

        let entries = self.remote.top_by_diamonds(self.limit).await?;
        debug!("Leaderboard query returned {} entries", entries.len());

        let current_owner = current_owner.map(|o| o.as_str());
        Ok(entries
            .into_iter()
            .zip(1u32..)
            .map(|(entry, rank)| LeaderboardEntryDto::from_entry(rank, entry, current_owner))
            .collect())
    }
}
