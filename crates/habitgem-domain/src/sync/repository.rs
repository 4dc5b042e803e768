use async_trait::async_trait;

use super::document::{LeaderboardEntry, OwnerProfile, SummaryDocument, TrackerDocument};
use super::subscription::RemoteSubscription;
use crate::shared::{DomainError, OwnerId};

/// Device-local key/value store holding the serialized tracker document.
///
/// Synchronous: the local tier is written before any remote write starts.
pub trait LocalSnapshotStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>, DomainError>;
    fn save(&self, key: &str, value: &str) -> Result<(), DomainError>;
    fn remove(&self, key: &str) -> Result<(), DomainError>;
}

/// Shared document store keyed by owner.
#[async_trait]
pub trait RemoteTrackerStore: Send + Sync {
    /// Opens a live feed for `owner_id`. The current document (or `None`) is
    /// delivered first, then one snapshot per change.
    async fn subscribe(&self, owner_id: &OwnerId) -> Result<RemoteSubscription, DomainError>;

    async fn fetch_document(&self, owner_id: &OwnerId)
        -> Result<Option<TrackerDocument>, DomainError>;

    /// Field-level merge: fields left as `None` keep their stored value.
    async fn merge_document(
        &self,
        owner_id: &OwnerId,
        document: &TrackerDocument,
    ) -> Result<(), DomainError>;

    async fn merge_summary(
        &self,
        owner_id: &OwnerId,
        summary: &SummaryDocument,
    ) -> Result<(), DomainError>;

    /// Creates the profile when absent. Returns `true` when it was created.
    async fn ensure_profile(
        &self,
        owner_id: &OwnerId,
        profile: &OwnerProfile,
    ) -> Result<bool, DomainError>;

    /// Summaries ordered by diamonds, highest first.
    async fn top_by_diamonds(&self, limit: u32) -> Result<Vec<LeaderboardEntry>, DomainError>;
}
