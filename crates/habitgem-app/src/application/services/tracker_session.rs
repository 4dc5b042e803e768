use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use habitgem_domain::achievement::{AchievementEvaluator, BadgeRuleSet};
use habitgem_domain::events::tracker_events::{BadgeUnlocked, TrackerReplaced};
use habitgem_domain::events::{DomainEvent, EventBus};
use habitgem_domain::shared::{CategoryId, DayId, DomainError, HabitId, OwnerId};
use habitgem_domain::sync::{
    LocalSnapshotStore, OwnerProfile, RemoteSnapshot, RemoteSubscription, RemoteTrackerStore,
    SnapshotResult, SummaryDocument, TrackerDocument,
};
use habitgem_domain::tracker::TrackerState;
use habitgem_infrastructure::config::SyncConfig;

use super::confirmation::UserConfirmation;
use super::snapshot_gate::SnapshotGate;
use crate::application::dtos::TrackerGridDto;

/// What happened to one inbound remote delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOutcome {
    /// A remote document replaced the in-memory state.
    Applied,
    /// No remote document existed; defaults were installed and written back.
    Bootstrapped,
    /// Held back while this session's remote writes are in flight.
    Deferred,
    /// Addressed to an owner other than the current one.
    Ignored,
    /// The feed reported an error; state was kept.
    Failed,
    /// No subscription is open or the feed has ended.
    Closed,
}

/// Owns the tracker state for the current owner and keeps the local cache
/// and the remote store in step with it.
///
/// Every successful mutation runs, in order: diamond refresh, badge
/// evaluation, synchronous local mirror, fire-and-forget remote writes and
/// one `BadgeUnlocked` event per new badge. Without an owner the remote
/// writes are skipped.
///
/// Driven from a single task; there are no locks around the aggregate.
pub struct TrackerSession {
    state: TrackerState,
    local: Arc<dyn LocalSnapshotStore>,
    remote: Arc<dyn RemoteTrackerStore>,
    event_bus: Arc<dyn EventBus>,
    evaluator: AchievementEvaluator,
    config: SyncConfig,
    subscription: Option<RemoteSubscription>,
    pending_writes: Vec<JoinHandle<()>>,
    gate: SnapshotGate,
}

impl TrackerSession {
    pub fn new(
        local: Arc<dyn LocalSnapshotStore>,
        remote: Arc<dyn RemoteTrackerStore>,
        event_bus: Arc<dyn EventBus>,
        config: SyncConfig,
    ) -> Self {
        let evaluator =
            AchievementEvaluator::new(BadgeRuleSet::from_flags(config.week_streak_enabled));
        let gate = SnapshotGate::new(config.snapshot_precedence);

        Self {
            state: TrackerState::new(),
            local,
            remote,
            event_bus,
            evaluator,
            config,
            subscription: None,
            pending_writes: Vec::new(),
            gate,
        }
    }

    pub fn with_evaluator(mut self, evaluator: AchievementEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn owner_id(&self) -> Option<&OwnerId> {
        self.state.owner_id()
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn grid(&self) -> TrackerGridDto {
        TrackerGridDto::from_state(&self.state)
    }

    // ------------------------------------------------------------------
    // Load path and ownership
    // ------------------------------------------------------------------

    /// Restores state from the local cache, keeping the current owner.
    ///
    /// A missing or unreadable record yields defaults; only a failing cache
    /// read is an error.
    pub fn load_local(&mut self) -> Result<(), DomainError> {
        let owner_id = self.state.owner_id().cloned();
        let raw = self.local.load(&self.config.cache_key)?;

        self.state = match raw {
            None => {
                debug!("No local snapshot under {}", self.config.cache_key);
                TrackerState::for_owner(owner_id)
            }
            Some(raw) => match TrackerDocument::from_json(&raw) {
                Ok(document) => document.into_state(owner_id),
                Err(e) => {
                    warn!("Local snapshot unreadable, starting from defaults: {}", e);
                    TrackerState::for_owner(owner_id)
                }
            },
        };

        info!(
            "Loaded local tracker: {} habits, {} days, {} diamonds",
            self.state.habits().len(),
            self.state.days().len(),
            self.state.total_diamonds()
        );
        Ok(())
    }

    /// Switches to `owner_id` and applies the first remote snapshot.
    ///
    /// Any previous subscription is cancelled first. When the owner changes
    /// the in-memory tracker is replaced with defaults for the new owner, so
    /// nothing from the previous owner can be written to the new document
    /// even if the first delivery fails. When the subscription cannot be
    /// opened the session falls back to signed-out defaults and the error is
    /// returned.
    pub async fn sign_in(&mut self, owner_id: OwnerId) -> Result<SnapshotOutcome, DomainError> {
        self.teardown();
        info!("Signing in {}", owner_id);
        if self.state.owner_id() != Some(&owner_id) {
            debug!("Owner changed, discarding in-memory tracker");
            self.state = TrackerState::for_owner(Some(owner_id.clone()));
        }

        match self.remote.subscribe(&owner_id).await {
            Ok(subscription) => self.subscription = Some(subscription),
            Err(e) => {
                error!("Failed to open remote feed for {}: {}", owner_id, e);
                self.state = TrackerState::new();
                return Err(e);
            }
        }

        Ok(self.process_remote().await)
    }

    /// Cancels the feed, forgets the owner and resets to defaults.
    ///
    /// Remote writes already started are left to finish.
    pub fn sign_out(&mut self) {
        self.teardown();
        self.state = TrackerState::new();
        info!("Signed out, tracker reset to defaults");
    }

    pub async fn register_profile(&self, profile: &OwnerProfile) -> Result<bool, DomainError> {
        let owner_id = self.state.owner_id().ok_or_else(|| {
            DomainError::OwnerNotSignedIn("Profile registration needs an owner".to_string())
        })?;
        self.remote.ensure_profile(owner_id, profile).await
    }

    fn teardown(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            debug!("Cancelling remote feed for {}", subscription.owner_id());
            subscription.cancel();
        }
        self.pending_writes.clear();
        self.gate.clear();
    }

    // ------------------------------------------------------------------
    // Inbound snapshots
    // ------------------------------------------------------------------

    /// Waits for the next remote delivery and handles it.
    pub async fn process_remote(&mut self) -> SnapshotOutcome {
        let delivery = match self.subscription.as_mut() {
            Some(subscription) => subscription.recv().await,
            None => return SnapshotOutcome::Closed,
        };

        match delivery {
            Some(result) => self.receive(result).await,
            None => {
                warn!("Remote feed ended");
                self.subscription = None;
                SnapshotOutcome::Closed
            }
        }
    }

    /// Handles every delivery already queued, then a held snapshot if the
    /// writes it waited on have settled.
    pub async fn drain_remote(&mut self) -> Vec<SnapshotOutcome> {
        let mut outcomes = Vec::new();
        while let Some(result) = self.subscription.as_mut().and_then(|s| s.try_recv()) {
            outcomes.push(self.receive(result).await);
        }
        if let Some(outcome) = self.apply_released().await {
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Handles one delivery from the remote tier.
    pub async fn receive(&mut self, result: SnapshotResult) -> SnapshotOutcome {
        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(
                    "Remote snapshot failed, keeping current state: {}",
                    e.format_with_code()
                );
                return SnapshotOutcome::Failed;
            }
        };

        if self.state.owner_id() != Some(&snapshot.owner_id) {
            debug!("Ignoring snapshot addressed to {}", snapshot.owner_id);
            return SnapshotOutcome::Ignored;
        }

        let in_flight = self.writes_in_flight();
        match self.gate.offer(snapshot, in_flight) {
            Some(snapshot) => self.apply_snapshot(snapshot).await,
            None => {
                debug!("Snapshot deferred while remote writes are in flight");
                SnapshotOutcome::Deferred
            }
        }
    }

    /// Awaits every remote write started so far, then applies a held
    /// snapshot if there is one.
    pub async fn wait_for_remote_writes(&mut self) -> Option<SnapshotOutcome> {
        let pending = std::mem::take(&mut self.pending_writes);
        for result in join_all(pending).await {
            if let Err(e) = result {
                warn!("Remote write task ended abnormally: {}", e);
            }
        }
        self.apply_released().await
    }

    async fn apply_released(&mut self) -> Option<SnapshotOutcome> {
        let in_flight = self.writes_in_flight();
        let snapshot = self.gate.release(in_flight)?;
        Some(self.apply_snapshot(snapshot).await)
    }

    async fn apply_snapshot(&mut self, snapshot: RemoteSnapshot) -> SnapshotOutcome {
        let RemoteSnapshot { owner_id, document } = snapshot;

        let outcome = match document {
            Some(document) => {
                self.state = document.into_state(Some(owner_id.clone()));
                SnapshotOutcome::Applied
            }
            None => {
                info!("No remote tracker for {}, bootstrapping defaults", owner_id);
                self.state = TrackerState::for_owner(Some(owner_id.clone()));
                self.push_remote();
                SnapshotOutcome::Bootstrapped
            }
        };

        if let Err(e) = self.mirror_locally() {
            error!("Failed to mirror remote snapshot locally: {}", e);
        }

        self.publish(Box::new(TrackerReplaced {
            owner_id,
            total_diamonds: self.state.total_diamonds(),
            bootstrapped: outcome == SnapshotOutcome::Bootstrapped,
            occurred_at: Utc::now(),
        }))
        .await;

        outcome
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    pub async fn add_category(&mut self, name: &str) -> Result<Option<CategoryId>, DomainError> {
        let Some(id) = self.state.add_category(name) else {
            return Ok(None);
        };
        self.commit().await?;
        Ok(Some(id))
    }

    pub async fn add_habit(
        &mut self,
        name: &str,
        category_id: &CategoryId,
    ) -> Result<Option<HabitId>, DomainError> {
        let Some(id) = self.state.add_habit(name, category_id) else {
            return Ok(None);
        };
        self.commit().await?;
        Ok(Some(id))
    }

    pub async fn add_day(&mut self) -> Result<DayId, DomainError> {
        let id = self.state.add_day();
        self.commit().await?;
        Ok(id)
    }

    /// Deletes the day at `index` once `confirmation` approves.
    ///
    /// Returns whether a day was removed.
    pub async fn delete_day(
        &mut self,
        index: usize,
        confirmation: &dyn UserConfirmation,
    ) -> Result<bool, DomainError> {
        let Some(day) = self.state.day(index) else {
            return Ok(false);
        };

        let prompt = format!("Delete {}?", day.label);
        if !confirmation.confirm(&prompt) {
            debug!("Deletion of day {} declined", index);
            return Ok(false);
        }

        if self.state.delete_day(index).is_none() {
            return Ok(false);
        }
        self.commit().await?;
        Ok(true)
    }

    pub async fn delete_habit(&mut self, habit_id: &HabitId) -> Result<bool, DomainError> {
        if self.state.delete_habit(habit_id).is_none() {
            return Ok(false);
        }
        self.commit().await?;
        Ok(true)
    }

    /// Returns the habit's new membership on that day, `None` when ignored.
    pub async fn toggle_completion(
        &mut self,
        day_index: usize,
        habit_id: &HabitId,
    ) -> Result<Option<bool>, DomainError> {
        let Some(done) = self.state.toggle_completion(day_index, habit_id) else {
            return Ok(None);
        };
        self.commit().await?;
        Ok(Some(done))
    }

    pub async fn set_reflection(&mut self, day_index: usize, text: &str) -> Result<bool, DomainError> {
        if !self.state.set_reflection(day_index, text) {
            return Ok(false);
        }
        self.commit().await?;
        Ok(true)
    }

    async fn commit(&mut self) -> Result<(), DomainError> {
        self.state.refresh_diamonds();
        let unlocked = self.evaluator.evaluate(&mut self.state);

        let mirrored = self.mirror_locally();
        self.push_remote();

        for badge_id in unlocked {
            info!("Badge unlocked: {}", badge_id);
            self.publish(Box::new(BadgeUnlocked {
                badge_id,
                owner_id: self.state.owner_id().cloned(),
                total_diamonds: self.state.total_diamonds(),
                occurred_at: Utc::now(),
            }))
            .await;
        }

        mirrored
    }

    // ------------------------------------------------------------------
    // Write path
    // ------------------------------------------------------------------

    fn mirror_locally(&self) -> Result<(), DomainError> {
        let json = TrackerDocument::from_state(&self.state).to_json()?;
        self.local.save(&self.config.cache_key, &json)
    }

    /// Spawns the detail and summary upserts for the current owner.
    fn push_remote(&mut self) {
        let Some(owner_id) = self.state.owner_id().cloned() else {
            return;
        };

        let remote = Arc::clone(&self.remote);
        let document = TrackerDocument::from_state(&self.state);
        let summary = SummaryDocument::from_state(&self.state, Utc::now());

        let handle = tokio::spawn(async move {
            if let Err(e) = remote.merge_document(&owner_id, &document).await {
                warn!(
                    "Remote tracker write for {} dropped: {}",
                    owner_id,
                    e.format_with_code()
                );
            }
            if let Err(e) = remote.merge_summary(&owner_id, &summary).await {
                warn!(
                    "Remote summary write for {} dropped: {}",
                    owner_id,
                    e.format_with_code()
                );
            }
        });

        self.pending_writes.retain(|h| !h.is_finished());
        self.pending_writes.push(handle);
    }

    fn writes_in_flight(&mut self) -> bool {
        self.pending_writes.retain(|h| !h.is_finished());
        !self.pending_writes.is_empty()
    }

    async fn publish(&self, event: Box<dyn DomainEvent>) {
        let event_type = event.event_type_name();
        if let Err(e) = self.event_bus.publish(event).await {
            error!("Failed to publish {}: {}", event_type, e);
        }
    }
}
