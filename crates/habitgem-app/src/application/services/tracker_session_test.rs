#[cfg(test)]
mod tests {
    use super::super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::sync::Semaphore;
    use tokio::time::timeout;

    use habitgem_domain::achievement::{STARTER_BADGE_ID, WEEK_STREAK_BADGE_ID};
    use habitgem_domain::events::tracker_events::BadgeUnlocked;
    use habitgem_domain::events::{EventHandler, TypedEventHandlerWrapper};
    use habitgem_domain::shared::{BadgeId, CategoryId, DayId, DomainError, HabitId, OwnerId};
    use habitgem_domain::sync::{
        DayDocument, LeaderboardEntry, LocalSnapshotStore, OwnerProfile, RemoteSnapshot,
        RemoteSubscription, RemoteTrackerStore, SummaryDocument, TrackerDocument,
    };
    use habitgem_domain::tracker::Habit;
    use habitgem_infrastructure::config::{SnapshotPrecedence, SyncConfig};
    use habitgem_infrastructure::events::InMemoryEventBus;
    use habitgem_infrastructure::persistence::InMemorySnapshotStore;
    use habitgem_infrastructure::remote::InMemoryRemoteStore;

    const WAIT: Duration = Duration::from_secs(2);

    struct RecordingHandler {
        badges: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl EventHandler<BadgeUnlocked> for RecordingHandler {
        async fn handle(&self, event: &BadgeUnlocked) -> Result<(), DomainError> {
            self.badges.lock().unwrap().push(event.badge_id.to_string());
            Ok(())
        }
    }

    #[derive(Clone, Copy)]
    enum FeedFault {
        /// `subscribe` itself fails.
        Refused,
        /// The feed opens but its first delivery is an error.
        FirstDeliveryFails,
    }

    /// Delegates to an in-memory store. Tracker writes can be held until a
    /// permit is added, and one owner's feed can be made to fail.
    struct ScriptedRemote {
        inner: InMemoryRemoteStore,
        permits: Option<Arc<Semaphore>>,
        settled: Arc<AtomicUsize>,
        feed_fault: Option<(OwnerId, FeedFault)>,
    }

    impl ScriptedRemote {
        fn new(inner: InMemoryRemoteStore) -> Self {
            Self {
                inner,
                permits: None,
                settled: Arc::new(AtomicUsize::new(0)),
                feed_fault: None,
            }
        }
    }

    #[async_trait]
    impl RemoteTrackerStore for ScriptedRemote {
        async fn subscribe(&self, owner_id: &OwnerId) -> Result<RemoteSubscription, DomainError> {
            match &self.feed_fault {
                Some((faulty, FeedFault::Refused)) if faulty == owner_id => Err(
                    DomainError::Subscription("permission denied".to_string()),
                ),
                Some((faulty, FeedFault::FirstDeliveryFails)) if faulty == owner_id => {
                    let (sender, subscription) = RemoteSubscription::channel(owner_id.clone(), 1);
                    sender
                        .try_send(Err(DomainError::Subscription("offline".to_string())))
                        .map_err(|e| DomainError::Subscription(e.to_string()))?;
                    Ok(subscription)
                }
                _ => self.inner.subscribe(owner_id).await,
            }
        }

        async fn fetch_document(
            &self,
            owner_id: &OwnerId,
        ) -> Result<Option<TrackerDocument>, DomainError> {
            self.inner.fetch_document(owner_id).await
        }

        async fn merge_document(
            &self,
            owner_id: &OwnerId,
            document: &TrackerDocument,
        ) -> Result<(), DomainError> {
            let _permit = match &self.permits {
                Some(permits) => Some(
                    permits
                        .acquire()
                        .await
                        .map_err(|e| DomainError::RemoteStore(e.to_string()))?,
                ),
                None => None,
            };
            self.inner.merge_document(owner_id, document).await
        }

        async fn merge_summary(
            &self,
            owner_id: &OwnerId,
            summary: &SummaryDocument,
        ) -> Result<(), DomainError> {
            let result = self.inner.merge_summary(owner_id, summary).await;
            // Last step of every spawned write.
            self.settled.fetch_add(1, Ordering::SeqCst);
            result
        }

        async fn ensure_profile(
            &self,
            owner_id: &OwnerId,
            profile: &OwnerProfile,
        ) -> Result<bool, DomainError> {
            self.inner.ensure_profile(owner_id, profile).await
        }

        async fn top_by_diamonds(
            &self,
            limit: u32,
        ) -> Result<Vec<LeaderboardEntry>, DomainError> {
            self.inner.top_by_diamonds(limit).await
        }
    }

    struct Harness {
        session: TrackerSession,
        local: Arc<InMemorySnapshotStore>,
        remote: InMemoryRemoteStore,
        badges: Arc<Mutex<Vec<String>>>,
    }

    impl Harness {
        fn cached(&self) -> TrackerDocument {
            let raw = self
                .local
                .load(&SyncConfig::default().cache_key)
                .unwrap()
                .expect("local snapshot");
            TrackerDocument::from_json(&raw).unwrap()
        }

        fn badges(&self) -> Vec<String> {
            self.badges.lock().unwrap().clone()
        }
    }

    async fn build(
        config: SyncConfig,
        remote: InMemoryRemoteStore,
        port: Arc<dyn RemoteTrackerStore>,
    ) -> Harness {
        let local = Arc::new(InMemorySnapshotStore::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let badges = Arc::new(Mutex::new(Vec::new()));
        bus.subscribe::<BadgeUnlocked>(Arc::new(TypedEventHandlerWrapper::new(
            RecordingHandler {
                badges: badges.clone(),
            },
        )))
        .await;

        let session = TrackerSession::new(local.clone(), port, bus, config);
        Harness {
            session,
            local,
            remote,
            badges,
        }
    }

    async fn harness() -> Harness {
        let remote = InMemoryRemoteStore::new();
        build(SyncConfig::default(), remote.clone(), Arc::new(remote)).await
    }

    struct Held {
        permits: Arc<Semaphore>,
        settled: Arc<AtomicUsize>,
    }

    impl Held {
        /// Lets the next held write through and waits until it has finished.
        async fn settle_one(&self) {
            let target = self.settled.load(Ordering::SeqCst) + 1;
            self.permits.add_permits(1);
            timeout(WAIT, async {
                while self.settled.load(Ordering::SeqCst) < target {
                    tokio::task::yield_now().await;
                }
            })
            .await
            .unwrap();
        }
    }

    async fn held_harness(precedence: SnapshotPrecedence) -> (Harness, Held) {
        let remote = InMemoryRemoteStore::new();
        let permits = Arc::new(Semaphore::new(0));
        let port = ScriptedRemote {
            permits: Some(permits.clone()),
            ..ScriptedRemote::new(remote.clone())
        };
        let held = Held {
            permits,
            settled: port.settled.clone(),
        };
        let config = SyncConfig {
            snapshot_precedence: precedence,
            ..SyncConfig::default()
        };
        (build(config, remote, Arc::new(port)).await, held)
    }

    async fn faulty_feed_harness(faulty: &OwnerId, fault: FeedFault) -> Harness {
        let remote = InMemoryRemoteStore::new();
        let port = ScriptedRemote {
            feed_fault: Some((faulty.clone(), fault)),
            ..ScriptedRemote::new(remote.clone())
        };
        build(SyncConfig::default(), remote, Arc::new(port)).await
    }

    fn owner(id: &str) -> OwnerId {
        OwnerId::from_string(id)
    }

    fn remote_document(habit_ids: &[&str], done: &[&str]) -> TrackerDocument {
        TrackerDocument {
            categories: None,
            habits: Some(
                habit_ids
                    .iter()
                    .map(|id| Habit {
                        id: HabitId::from_string(id),
                        name: format!("Habit {}", id),
                        category_id: CategoryId::from_string("c_pray"),
                    })
                    .collect(),
            ),
            days: Some(vec![DayDocument {
                id: DayId::from_millis(1_700_000_000_000),
                label: "Day 1".to_string(),
                completions: done
                    .iter()
                    .map(|id| (HabitId::from_string(id), true))
                    .collect(),
                reflection: String::new(),
            }]),
            unlocked_badges: Some(Vec::new()),
            total_diamonds: None,
        }
    }

    #[tokio::test]
    async fn test_full_day_earns_diamond_and_starter_badge() {
        let mut h = harness().await;
        let pray = CategoryId::from_string("c_pray");

        let fajr = h.session.add_habit("Fajr", &pray).await.unwrap().unwrap();
        let maghrib = h.session.add_habit("Maghrib", &pray).await.unwrap().unwrap();
        h.session.add_day().await.unwrap();

        assert_eq!(
            h.session.toggle_completion(0, &fajr).await.unwrap(),
            Some(true)
        );
        assert_eq!(h.session.state().total_diamonds(), 0);
        assert!(h.badges().is_empty());

        h.session.toggle_completion(0, &maghrib).await.unwrap();
        assert_eq!(h.session.state().total_diamonds(), 1);
        assert!(h
            .session
            .state()
            .unlocked_badges()
            .contains(&BadgeId::from_string(STARTER_BADGE_ID)));
        assert_eq!(h.badges(), vec![STARTER_BADGE_ID.to_string()]);

        // Removing a habit never takes a diamond away from a full day.
        assert!(h.session.delete_habit(&maghrib).await.unwrap());
        assert_eq!(h.session.state().total_diamonds(), 1);
        assert_eq!(h.badges().len(), 1);

        let cached = h.cached();
        assert_eq!(cached.total_diamonds, Some(1));
        assert_eq!(cached.habits.map(|habits| habits.len()), Some(1));
    }

    #[tokio::test]
    async fn test_signed_out_mutations_stay_local() {
        let mut h = harness().await;

        h.session.add_category("Charity").await.unwrap();
        h.session.add_day().await.unwrap();
        h.session.set_reflection(0, "quiet morning").await.unwrap();
        h.session.wait_for_remote_writes().await;

        assert_eq!(h.remote.write_count(), 0);
        assert_eq!(h.cached().categories.map(|c| c.len()), Some(5));
        assert_eq!(h.session.grid().rows[0].reflection, "quiet morning");
    }

    #[tokio::test]
    async fn test_ignored_inputs_do_not_write() {
        let mut h = harness().await;

        assert_eq!(h.session.add_category("  ").await.unwrap(), None);
        assert_eq!(
            h.session
                .add_habit("", &CategoryId::from_string("c_pray"))
                .await
                .unwrap(),
            None
        );
        assert_eq!(
            h.session
                .toggle_completion(3, &HabitId::from_string("h_x"))
                .await
                .unwrap(),
            None
        );
        assert!(!h.session.set_reflection(0, "nothing here").await.unwrap());

        assert!(h
            .local
            .load(&SyncConfig::default().cache_key)
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_load_local_falls_back_to_defaults_when_malformed() {
        let mut h = harness().await;
        h.local
            .save(&SyncConfig::default().cache_key, "{not json")
            .unwrap();

        h.session.load_local().unwrap();

        assert_eq!(h.session.state().categories().len(), 4);
        assert!(h.session.state().habits().is_empty());
    }

    #[tokio::test]
    async fn test_load_local_reads_legacy_record_and_recomputes_total() {
        let mut h = harness().await;
        let legacy = serde_json::json!({
            "habits": [{ "id": "h1", "name": "Fajr", "categoryId": "c_pray" }],
            "days": [{ "id": 1_700_000_000_000_i64, "label": "Day 1", "habits": { "h1": true } }],
            "achievements": [STARTER_BADGE_ID],
            "totalDiamonds": 7
        });
        h.local
            .save(&SyncConfig::default().cache_key, &legacy.to_string())
            .unwrap();

        h.session.load_local().unwrap();

        let state = h.session.state();
        assert_eq!(state.total_diamonds(), 1);
        assert_eq!(state.categories().len(), 4);
        assert!(state
            .unlocked_badges()
            .contains(&BadgeId::from_string(STARTER_BADGE_ID)));
    }

    #[tokio::test]
    async fn test_sign_in_bootstraps_missing_document() {
        let mut h = harness().await;
        let u1 = owner("u1");

        let outcome = h.session.sign_in(u1.clone()).await.unwrap();
        assert_eq!(outcome, SnapshotOutcome::Bootstrapped);
        assert_eq!(h.session.owner_id(), Some(&u1));
        assert!(h.session.is_subscribed());

        h.session.wait_for_remote_writes().await;

        let stored = h.remote.fetch_document(&u1).await.unwrap().unwrap();
        assert_eq!(stored.categories.map(|c| c.len()), Some(4));
        assert_eq!(stored.total_diamonds, Some(0));
        assert_eq!(h.remote.summary_total(&u1).await, Some(0));
    }

    #[tokio::test]
    async fn test_sign_in_recomputes_total_for_migrated_document() {
        let mut h = harness().await;
        let u1 = owner("u1");
        h.remote
            .put_document(&u1, remote_document(&["h1", "h2"], &["h1", "h2"]))
            .await;

        let outcome = h.session.sign_in(u1).await.unwrap();

        assert_eq!(outcome, SnapshotOutcome::Applied);
        assert_eq!(h.session.state().total_diamonds(), 1);
        assert_eq!(h.session.state().categories().len(), 4);
        assert_eq!(h.cached().total_diamonds, Some(1));
        assert!(h.badges().is_empty());
    }

    #[tokio::test]
    async fn test_signed_in_changes_reach_detail_and_summary() {
        let mut h = harness().await;
        let u1 = owner("u1");
        h.session.sign_in(u1.clone()).await.unwrap();

        let fajr = h
            .session
            .add_habit("Fajr", &CategoryId::from_string("c_pray"))
            .await
            .unwrap()
            .unwrap();
        h.session.add_day().await.unwrap();
        h.session.toggle_completion(0, &fajr).await.unwrap();
        h.session.wait_for_remote_writes().await;

        let stored = h.remote.fetch_document(&u1).await.unwrap().unwrap();
        assert_eq!(stored.total_diamonds, Some(1));
        assert_eq!(h.remote.summary_total(&u1).await, Some(1));
    }

    #[tokio::test]
    async fn test_remote_failure_keeps_local_state() {
        let mut h = harness().await;
        let u1 = owner("u1");
        h.session.sign_in(u1.clone()).await.unwrap();
        h.session.wait_for_remote_writes().await;
        h.remote.set_fail_writes(true);

        let added = h
            .session
            .add_habit("Fajr", &CategoryId::from_string("c_pray"))
            .await
            .unwrap();
        h.session.wait_for_remote_writes().await;

        assert!(added.is_some());
        assert_eq!(h.session.state().habits().len(), 1);
        assert_eq!(h.cached().habits.map(|habits| habits.len()), Some(1));
        let stored = h.remote.fetch_document(&u1).await.unwrap().unwrap();
        assert_eq!(stored.habits.map(|habits| habits.len()), Some(0));
    }

    #[tokio::test]
    async fn test_snapshot_for_other_owner_is_ignored() {
        let mut h = harness().await;
        h.session.sign_in(owner("u1")).await.unwrap();

        let outcome = h
            .session
            .receive(Ok(RemoteSnapshot {
                owner_id: owner("u2"),
                document: Some(remote_document(&["h1"], &["h1"])),
            }))
            .await;

        assert_eq!(outcome, SnapshotOutcome::Ignored);
        assert!(h.session.state().habits().is_empty());
    }

    #[tokio::test]
    async fn test_feed_error_keeps_state() {
        let mut h = harness().await;
        h.session.sign_in(owner("u1")).await.unwrap();
        h.session.add_day().await.unwrap();

        let outcome = h
            .session
            .receive(Err(DomainError::Subscription("offline".to_string())))
            .await;

        assert_eq!(outcome, SnapshotOutcome::Failed);
        assert_eq!(h.session.state().days().len(), 1);
    }

    #[tokio::test]
    async fn test_sign_out_resets_and_closes_feed() {
        let mut h = harness().await;
        h.session.sign_in(owner("u1")).await.unwrap();
        h.session.add_day().await.unwrap();
        h.session.wait_for_remote_writes().await;
        let writes = h.remote.write_count();

        h.session.sign_out();

        assert!(h.session.owner_id().is_none());
        assert!(!h.session.is_subscribed());
        assert!(h.session.state().days().is_empty());
        assert_eq!(h.session.process_remote().await, SnapshotOutcome::Closed);

        h.session.add_day().await.unwrap();
        h.session.wait_for_remote_writes().await;
        assert_eq!(h.remote.write_count(), writes);
    }

    #[tokio::test]
    async fn test_register_profile_requires_owner() {
        let mut h = harness().await;
        let profile = OwnerProfile {
            display_name: "Amina".to_string(),
            email: None,
        };

        let err = h.session.register_profile(&profile).await.unwrap_err();
        assert!(matches!(err, DomainError::OwnerNotSignedIn(_)));

        h.session.sign_in(owner("u1")).await.unwrap();
        assert!(h.session.register_profile(&profile).await.unwrap());
        assert!(!h.session.register_profile(&profile).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_day_waits_for_confirmation() {
        let mut h = harness().await;
        h.session.add_day().await.unwrap();

        let mut decline = MockUserConfirmation::new();
        decline
            .expect_confirm()
            .withf(|prompt| prompt == "Delete Day 1?")
            .times(1)
            .returning(|_| false);
        assert!(!h.session.delete_day(0, &decline).await.unwrap());
        assert_eq!(h.session.state().days().len(), 1);

        let mut untouched = MockUserConfirmation::new();
        untouched.expect_confirm().times(0);
        assert!(!h.session.delete_day(4, &untouched).await.unwrap());

        assert!(h.session.delete_day(0, &AlwaysConfirm).await.unwrap());
        assert!(h.session.state().days().is_empty());
    }

    #[tokio::test]
    async fn test_week_streak_badge_when_enabled() {
        let remote = InMemoryRemoteStore::new();
        let config = SyncConfig {
            week_streak_enabled: true,
            ..SyncConfig::default()
        };
        let mut h = build(config, remote.clone(), Arc::new(remote)).await;

        let fajr = h
            .session
            .add_habit("Fajr", &CategoryId::from_string("c_pray"))
            .await
            .unwrap()
            .unwrap();
        for index in 0..7 {
            h.session.add_day().await.unwrap();
            h.session.toggle_completion(index, &fajr).await.unwrap();
        }

        assert_eq!(h.session.state().total_diamonds(), 7);
        assert_eq!(
            h.badges(),
            vec![STARTER_BADGE_ID.to_string(), WEEK_STREAK_BADGE_ID.to_string()]
        );
    }

    #[tokio::test]
    async fn test_snapshot_deferred_until_writes_settle() {
        let (mut h, held) = held_harness(SnapshotPrecedence::LocalWhileWriting).await;
        let u1 = owner("u1");
        h.remote.put_document(&u1, remote_document(&["h1"], &[])).await;
        assert_eq!(
            h.session.sign_in(u1.clone()).await.unwrap(),
            SnapshotOutcome::Applied
        );

        h.session
            .toggle_completion(0, &HabitId::from_string("h1"))
            .await
            .unwrap();
        h.remote
            .put_document(&u1, remote_document(&["h1", "h2"], &[]))
            .await;

        let outcome = timeout(WAIT, h.session.process_remote()).await.unwrap();
        assert_eq!(outcome, SnapshotOutcome::Deferred);
        assert_eq!(h.session.state().habits().len(), 1);
        assert_eq!(h.session.state().total_diamonds(), 1);

        held.permits.add_permits(1);
        let released = timeout(WAIT, h.session.wait_for_remote_writes())
            .await
            .unwrap();

        assert_eq!(released, Some(SnapshotOutcome::Applied));
        assert_eq!(h.session.state().habits().len(), 2);
    }

    #[tokio::test]
    async fn test_remote_always_applies_during_writes() {
        let (mut h, held) = held_harness(SnapshotPrecedence::RemoteAlways).await;
        let u1 = owner("u1");
        h.remote.put_document(&u1, remote_document(&["h1"], &[])).await;
        h.session.sign_in(u1.clone()).await.unwrap();

        h.session
            .toggle_completion(0, &HabitId::from_string("h1"))
            .await
            .unwrap();
        h.remote
            .put_document(&u1, remote_document(&["h1", "h2"], &[]))
            .await;

        let outcome = timeout(WAIT, h.session.process_remote()).await.unwrap();
        assert_eq!(outcome, SnapshotOutcome::Applied);
        assert_eq!(h.session.state().habits().len(), 2);
        assert_eq!(h.session.state().total_diamonds(), 0);

        held.permits.add_permits(1);
        timeout(WAIT, h.session.wait_for_remote_writes())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_drain_applies_held_snapshot_once_writes_settle() {
        let (mut h, held) = held_harness(SnapshotPrecedence::LocalWhileWriting).await;
        let u1 = owner("u1");
        h.remote.put_document(&u1, remote_document(&["h1"], &[])).await;
        h.session.sign_in(u1.clone()).await.unwrap();

        h.session
            .toggle_completion(0, &HabitId::from_string("h1"))
            .await
            .unwrap();
        h.remote
            .put_document(&u1, remote_document(&["h1", "h2"], &[]))
            .await;
        let outcome = timeout(WAIT, h.session.process_remote()).await.unwrap();
        assert_eq!(outcome, SnapshotOutcome::Deferred);
        assert!(h.session.drain_remote().await.is_empty());

        // The write is dropped, so no echo follows it.
        h.remote.set_fail_writes(true);
        held.settle_one().await;

        assert_eq!(h.session.drain_remote().await, vec![SnapshotOutcome::Applied]);
        assert_eq!(h.session.state().habits().len(), 2);
        assert_eq!(h.session.state().total_diamonds(), 0);
        assert!(h.session.drain_remote().await.is_empty());
    }

    #[tokio::test]
    async fn test_drain_prefers_echo_queued_after_held_snapshot() {
        let (mut h, held) = held_harness(SnapshotPrecedence::LocalWhileWriting).await;
        let u1 = owner("u1");
        h.remote.put_document(&u1, remote_document(&["h1"], &[])).await;
        h.session.sign_in(u1.clone()).await.unwrap();

        h.session
            .toggle_completion(0, &HabitId::from_string("h1"))
            .await
            .unwrap();
        h.remote
            .put_document(&u1, remote_document(&["h1", "h2"], &[]))
            .await;
        let outcome = timeout(WAIT, h.session.process_remote()).await.unwrap();
        assert_eq!(outcome, SnapshotOutcome::Deferred);

        held.settle_one().await;
        // Give the feed worker a turn to forward the echo of that write.
        tokio::task::yield_now().await;

        assert_eq!(h.session.drain_remote().await, vec![SnapshotOutcome::Applied]);
        assert_eq!(h.session.state().habits().len(), 1);
        assert_eq!(h.session.state().total_diamonds(), 1);
        // The held snapshot was superseded, not queued behind the echo.
        assert!(h.session.drain_remote().await.is_empty());
        assert_eq!(h.session.state().habits().len(), 1);
    }

    #[tokio::test]
    async fn test_owner_change_discards_previous_tracker_when_first_delivery_fails() {
        let u1 = owner("u1");
        let u2 = owner("u2");
        let mut h = faulty_feed_harness(&u2, FeedFault::FirstDeliveryFails).await;

        assert_eq!(
            h.session.sign_in(u1.clone()).await.unwrap(),
            SnapshotOutcome::Bootstrapped
        );
        h.session
            .add_habit("Night prayer", &CategoryId::from_string("c_pray"))
            .await
            .unwrap()
            .unwrap();
        h.session.add_day().await.unwrap();
        h.session.wait_for_remote_writes().await;

        let outcome = h.session.sign_in(u2.clone()).await.unwrap();
        assert_eq!(outcome, SnapshotOutcome::Failed);
        assert_eq!(h.session.owner_id(), Some(&u2));
        assert!(h.session.state().habits().is_empty());
        assert!(h.session.state().days().is_empty());
        assert_eq!(h.session.state().categories().len(), 4);

        h.session.add_day().await.unwrap();
        h.session.wait_for_remote_writes().await;

        let stored = h.remote.fetch_document(&u2).await.unwrap().unwrap();
        assert_eq!(stored.habits.map(|habits| habits.len()), Some(0));
        assert_eq!(stored.days.map(|days| days.len()), Some(1));
        let previous = h.remote.fetch_document(&u1).await.unwrap().unwrap();
        assert_eq!(previous.habits.map(|habits| habits.len()), Some(1));
    }

    #[tokio::test]
    async fn test_refused_feed_falls_back_to_signed_out_defaults() {
        let u1 = owner("u1");
        let u2 = owner("u2");
        let mut h = faulty_feed_harness(&u2, FeedFault::Refused).await;

        h.session.sign_in(u1).await.unwrap();
        h.session.add_day().await.unwrap();
        h.session.wait_for_remote_writes().await;
        let writes = h.remote.write_count();

        let err = h.session.sign_in(u2).await.unwrap_err();
        assert!(matches!(err, DomainError::Subscription(_)));
        assert!(h.session.owner_id().is_none());
        assert!(!h.session.is_subscribed());
        assert!(h.session.state().days().is_empty());

        h.session.add_day().await.unwrap();
        h.session.wait_for_remote_writes().await;
        assert_eq!(h.remote.write_count(), writes);
    }
}
