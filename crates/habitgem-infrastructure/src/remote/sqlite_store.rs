use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};

use habitgem_domain::shared::{DomainError, OwnerId};
use habitgem_domain::sync::{
    LeaderboardEntry, OwnerProfile, RemoteSubscription, RemoteTrackerStore, SummaryDocument,
    TrackerDocument,
};

use super::change_feed::{open_subscription, CHANGE_FEED_CAPACITY};
use crate::persistence::SqliteRepositoryBase;

const DEFAULT_SUBSCRIPTION_BUFFER: usize = 16;

#[derive(FromRow)]
struct TrackerDocumentRow {
    categories: Option<String>,
    habits: Option<String>,
    days: Option<String>,
    unlocked_badges: Option<String>,
    total_diamonds: Option<i64>,
}

impl TrackerDocumentRow {
    fn into_document(self) -> Result<TrackerDocument, DomainError> {
        Ok(TrackerDocument {
            categories: decode_column(self.categories, "categories")?,
            habits: decode_column(self.habits, "habits")?,
            days: decode_column(self.days, "days")?,
            unlocked_badges: decode_column(self.unlocked_badges, "unlocked_badges")?,
            total_diamonds: self.total_diamonds.map(clamp_diamonds),
        })
    }
}

#[derive(FromRow)]
struct LeaderboardRow {
    owner_id: String,
    display_name: Option<String>,
    total_diamonds: i64,
    last_updated_at: Option<DateTime<Utc>>,
}

impl LeaderboardRow {
    fn into_entry(self) -> LeaderboardEntry {
        LeaderboardEntry {
            owner_id: OwnerId::from_string(&self.owner_id),
            display_name: self.display_name,
            total_diamonds: clamp_diamonds(self.total_diamonds),
            last_updated_timestamp: self.last_updated_at,
        }
    }
}

fn clamp_diamonds(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

fn decode_column<T: DeserializeOwned>(
    raw: Option<String>,
    column: &str,
) -> Result<Option<T>, DomainError> {
    raw.map(|json| {
        serde_json::from_str(&json)
            .map_err(|e| DomainError::DataIntegrity(format!("Corrupt {} column: {}", column, e)))
    })
    .transpose()
}

fn encode_column<T: Serialize>(value: Option<&T>) -> Result<Option<String>, DomainError> {
    value
        .map(|v| serde_json::to_string(v).map_err(|e| DomainError::Serialization(e.to_string())))
        .transpose()
}

/// Remote tier backed by sqlite.
///
/// Writes publish the owner on an in-process broadcast so open
/// subscriptions re-read and deliver the new document.
#[derive(Clone)]
pub struct SqliteRemoteStore {
    base: SqliteRepositoryBase,
    changes: broadcast::Sender<OwnerId>,
    subscription_buffer: usize,
}

impl SqliteRemoteStore {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            base: SqliteRepositoryBase::new(pool),
            changes,
            subscription_buffer: DEFAULT_SUBSCRIPTION_BUFFER,
        }
    }

    pub fn with_subscription_buffer(mut self, buffer: usize) -> Self {
        self.subscription_buffer = buffer.max(1);
        self
    }

    fn notify(&self, owner_id: &OwnerId) {
        // No receivers is fine: nobody is subscribed.
        let _ = self.changes.send(owner_id.clone());
    }
}

#[async_trait]
impl RemoteTrackerStore for SqliteRemoteStore {
    async fn subscribe(&self, owner_id: &OwnerId) -> Result<RemoteSubscription, DomainError> {
        let changes = self.changes.subscribe();
        let subscription =
            open_subscription(self, owner_id, changes, self.subscription_buffer).await?;
        info!("Opened tracker subscription for {}", owner_id);
        Ok(subscription)
    }

    async fn fetch_document(
        &self,
        owner_id: &OwnerId,
    ) -> Result<Option<TrackerDocument>, DomainError> {
        let query = r#"
            SELECT categories, habits, days, unlocked_badges, total_diamonds
            FROM tracker_documents
            WHERE owner_id = ?1
        "#;

        let row: Option<TrackerDocumentRow> = self
            .base
            .fetch_optional(
                sqlx::query_as(query).bind(owner_id.as_str()),
                "Fetch tracker document",
            )
            .await?;

        row.map(TrackerDocumentRow::into_document).transpose()
    }

    async fn merge_document(
        &self,
        owner_id: &OwnerId,
        document: &TrackerDocument,
    ) -> Result<(), DomainError> {
        let query = r#"
            INSERT INTO tracker_documents
                (owner_id, categories, habits, days, unlocked_badges, total_diamonds, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(owner_id) DO UPDATE SET
                categories = COALESCE(excluded.categories, categories),
                habits = COALESCE(excluded.habits, habits),
                days = COALESCE(excluded.days, days),
                unlocked_badges = COALESCE(excluded.unlocked_badges, unlocked_badges),
                total_diamonds = COALESCE(excluded.total_diamonds, total_diamonds),
                updated_at = excluded.updated_at
        "#;

        self.base
            .execute(
                sqlx::query(query)
                    .bind(owner_id.as_str())
                    .bind(encode_column(document.categories.as_ref())?)
                    .bind(encode_column(document.habits.as_ref())?)
                    .bind(encode_column(document.days.as_ref())?)
                    .bind(encode_column(document.unlocked_badges.as_ref())?)
                    .bind(document.total_diamonds.map(i64::from))
                    .bind(Utc::now()),
                "Merge tracker document",
            )
            .await?;

        debug!("Merged tracker document for {}", owner_id);
        self.notify(owner_id);
        Ok(())
    }

    async fn merge_summary(
        &self,
        owner_id: &OwnerId,
        summary: &SummaryDocument,
    ) -> Result<(), DomainError> {
        let query = r#"
            INSERT INTO owner_summaries (owner_id, total_diamonds, last_updated_at, created_at)
            VALUES (?1, ?2, ?3, ?3)
            ON CONFLICT(owner_id) DO UPDATE SET
                total_diamonds = excluded.total_diamonds,
                last_updated_at = excluded.last_updated_at
        "#;

        self.base
            .execute(
                sqlx::query(query)
                    .bind(owner_id.as_str())
                    .bind(i64::from(summary.total_diamonds))
                    .bind(summary.last_updated_timestamp),
                "Merge owner summary",
            )
            .await?;

        Ok(())
    }

    async fn ensure_profile(
        &self,
        owner_id: &OwnerId,
        profile: &OwnerProfile,
    ) -> Result<bool, DomainError> {
        // Fills a row created earlier by a summary write, never overwrites.
        let query = r#"
            INSERT INTO owner_summaries (owner_id, display_name, email, total_diamonds, created_at)
            VALUES (?1, ?2, ?3, 0, ?4)
            ON CONFLICT(owner_id) DO UPDATE SET
                display_name = excluded.display_name,
                email = excluded.email
            WHERE display_name IS NULL
        "#;

        let result = self
            .base
            .execute(
                sqlx::query(query)
                    .bind(owner_id.as_str())
                    .bind(profile.display_name.as_str())
                    .bind(profile.email.as_deref())
                    .bind(Utc::now()),
                "Ensure owner profile",
            )
            .await?;

        let created = result.rows_affected() > 0;
        if created {
            info!("Registered profile for {}", owner_id);
        }
        Ok(created)
    }

    async fn top_by_diamonds(&self, limit: u32) -> Result<Vec<LeaderboardEntry>, DomainError> {
        let query = r#"
            SELECT owner_id, display_name, total_diamonds, last_updated_at
            FROM owner_summaries
            ORDER BY total_diamonds DESC, owner_id ASC
            LIMIT ?1
        "#;

        let rows: Vec<LeaderboardRow> = self
            .base
            .fetch_all(
                sqlx::query_as(query).bind(i64::from(limit)),
                "Fetch leaderboard",
            )
            .await?;

        Ok(rows.into_iter().map(LeaderboardRow::into_entry).collect())
    }
}
