use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use habitgem_domain::shared::{DomainError, OwnerId};
use habitgem_domain::sync::{
    LeaderboardEntry, OwnerProfile, RemoteSubscription, RemoteTrackerStore, SummaryDocument,
    TrackerDocument,
};

use super::change_feed::{open_subscription, CHANGE_FEED_CAPACITY};

#[derive(Debug, Clone, Default)]
struct SummaryRecord {
    display_name: Option<String>,
    email: Option<String>,
    total_diamonds: u32,
    last_updated_timestamp: Option<DateTime<Utc>>,
}

/// Process-local remote tier.
///
/// Used for offline runs and tests; writes can be made to fail on demand.
#[derive(Clone)]
pub struct InMemoryRemoteStore {
    documents: Arc<RwLock<HashMap<OwnerId, TrackerDocument>>>,
    summaries: Arc<RwLock<HashMap<OwnerId, SummaryRecord>>>,
    changes: broadcast::Sender<OwnerId>,
    fail_writes: Arc<AtomicBool>,
    write_count: Arc<AtomicUsize>,
}

impl Default for InMemoryRemoteStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRemoteStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            documents: Arc::new(RwLock::new(HashMap::new())),
            summaries: Arc::new(RwLock::new(HashMap::new())),
            changes,
            fail_writes: Arc::new(AtomicBool::new(false)),
            write_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Makes every later write return `DomainError::RemoteStore`.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Successful document and summary writes so far.
    pub fn write_count(&self) -> usize {
        self.write_count.load(Ordering::SeqCst)
    }

    /// Overwrites the stored document as another device would, notifying
    /// subscribers.
    pub async fn put_document(&self, owner_id: &OwnerId, document: TrackerDocument) {
        self.documents
            .write()
            .await
            .insert(owner_id.clone(), document);
        let _ = self.changes.send(owner_id.clone());
    }

    pub async fn summary_total(&self, owner_id: &OwnerId) -> Option<u32> {
        self.summaries
            .read()
            .await
            .get(owner_id)
            .map(|s| s.total_diamonds)
    }

    fn check_writable(&self, operation: &str) -> Result<(), DomainError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::RemoteStore(format!(
                "{}: store unavailable",
                operation
            )));
        }
        Ok(())
    }
}

fn merge_field<T>(target: &mut Option<T>, incoming: &Option<T>)
where
    T: Clone,
{
    if let Some(value) = incoming {
        *target = Some(value.clone());
    }
}

#[async_trait]
impl RemoteTrackerStore for InMemoryRemoteStore {
    async fn subscribe(&self, owner_id: &OwnerId) -> Result<RemoteSubscription, DomainError> {
        let changes = self.changes.subscribe();
        open_subscription(self, owner_id, changes, CHANGE_FEED_CAPACITY).await
    }

    async fn fetch_document(
        &self,
        owner_id: &OwnerId,
    ) -> Result<Option<TrackerDocument>, DomainError> {
        Ok(self.documents.read().await.get(owner_id).cloned())
    }

    async fn merge_document(
        &self,
        owner_id: &OwnerId,
        document: &TrackerDocument,
    ) -> Result<(), DomainError> {
        self.check_writable("Merge tracker document")?;

        {
            let mut documents = self.documents.write().await;
            let stored = documents.entry(owner_id.clone()).or_default();
            merge_field(&mut stored.categories, &document.categories);
            merge_field(&mut stored.habits, &document.habits);
            merge_field(&mut stored.days, &document.days);
            merge_field(&mut stored.unlocked_badges, &document.unlocked_badges);
            merge_field(&mut stored.total_diamonds, &document.total_diamonds);
        }

        self.write_count.fetch_add(1, Ordering::SeqCst);
        let _ = self.changes.send(owner_id.clone());
        Ok(())
    }

    async fn merge_summary(
        &self,
        owner_id: &OwnerId,
        summary: &SummaryDocument,
    ) -> Result<(), DomainError> {
        self.check_writable("Merge owner summary")?;

        let mut summaries = self.summaries.write().await;
        let record = summaries.entry(owner_id.clone()).or_default();
        record.total_diamonds = summary.total_diamonds;
        record.last_updated_timestamp = Some(summary.last_updated_timestamp);

        self.write_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn ensure_profile(
        &self,
        owner_id: &OwnerId,
        profile: &OwnerProfile,
    ) -> Result<bool, DomainError> {
        self.check_writable("Ensure owner profile")?;

        let mut summaries = self.summaries.write().await;
        let record = summaries.entry(owner_id.clone()).or_default();
        if record.display_name.is_some() {
            return Ok(false);
        }
        record.display_name = Some(profile.display_name.clone());
        record.email = profile.email.clone();
        Ok(true)
    }

    async fn top_by_diamonds(&self, limit: u32) -> Result<Vec<LeaderboardEntry>, DomainError> {
        let summaries = self.summaries.read().await;
        let mut entries: Vec<LeaderboardEntry> = summaries
            .iter()
            .map(|(owner_id, record)| LeaderboardEntry {
                owner_id: owner_id.clone(),
                display_name: record.display_name.clone(),
                total_diamonds: record.total_diamonds,
                last_updated_timestamp: record.last_updated_timestamp,
            })
            .collect();

        entries.sort_by(|a, b| {
            b.total_diamonds
                .cmp(&a.total_diamonds)
                .then_with(|| a.owner_id.cmp(&b.owner_id))
        });
        entries.truncate(limit as usize);
        Ok(entries)
    }
}
