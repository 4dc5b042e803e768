use anyhow::Context;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::info;

use crate::application::event_handlers::{CelebrationHandler, LogCelebrationSink};
use crate::application::queries::LeaderboardQueryService;
use crate::application::services::TrackerSession;
use crate::presentation::state::{AppState, Queries, Runtime};
use habitgem_domain::events::tracker_events::BadgeUnlocked;
use habitgem_domain::events::{EventBus, TypedEventHandlerWrapper};
use habitgem_domain::sync::{LocalSnapshotStore, RemoteTrackerStore};
use habitgem_infrastructure::config::AppConfig;
use habitgem_infrastructure::events::InMemoryEventBus;
use habitgem_infrastructure::logging::init_logger;
use habitgem_infrastructure::persistence::{Database, JsonFileSnapshotStore};
use habitgem_infrastructure::remote::SqliteRemoteStore;

/// Installs logging, then wires the application.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let log_dir = config.log_dir()?;
    init_logger(log_dir, config.log_level).context("Failed to initialize logging")?;
    assemble(config).await
}

/// Opens the stores and wires the session, without touching global logging.
///
/// The tracker is restored from the local cache; no owner is signed in.
pub async fn assemble(config: AppConfig) -> anyhow::Result<AppState> {
    let startup_started_at = Instant::now();

    let data_dir = config.data_dir()?;
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

    let db_path = config.database_path()?;
    info!("Database path: {}", db_path.display());

    let started_at = Instant::now();
    let db = Database::new(&db_path).await?;
    db.run_migrations().await?;
    info!(
        "✓ Database ready ({}ms)",
        started_at.elapsed().as_millis()
    );

    let remote: Arc<dyn RemoteTrackerStore> = Arc::new(
        SqliteRemoteStore::new(Arc::new(db.pool().clone()))
            .with_subscription_buffer(config.sync.subscription_buffer),
    );
    let local: Arc<dyn LocalSnapshotStore> =
        Arc::new(JsonFileSnapshotStore::new(config.cache_dir()?)?);

    let bus = Arc::new(InMemoryEventBus::new());
    bus.subscribe::<BadgeUnlocked>(Arc::new(TypedEventHandlerWrapper::new(
        CelebrationHandler::new(Arc::new(LogCelebrationSink)),
    )))
    .await;
    let event_bus: Arc<dyn EventBus> = bus;
    info!("✓ Event handlers registered");

    let mut session = TrackerSession::new(
        local,
        remote.clone(),
        event_bus.clone(),
        config.sync.clone(),
    );
    session.load_local()?;

    let leaderboard = Arc::new(LeaderboardQueryService::new(
        remote.clone(),
        config.sync.leaderboard_limit,
    ));

    info!(
        "✓ HabitGem ready ({}ms)",
        startup_started_at.elapsed().as_millis()
    );

    Ok(AppState {
        config,
        runtime: Runtime {
            db: Arc::new(db),
            remote,
            event_bus,
        },
        session: Arc::new(Mutex::new(session)),
        queries: Queries { leaderboard },
    })
}
