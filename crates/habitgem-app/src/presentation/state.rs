use std::sync::Arc;
use tokio::sync::Mutex;

use crate::application::queries::LeaderboardQueryService;
use crate::application::services::TrackerSession;
use habitgem_domain::events::EventBus;
use habitgem_domain::sync::RemoteTrackerStore;
use habitgem_infrastructure::config::AppConfig;
use habitgem_infrastructure::persistence::Database;

pub struct Runtime {
    pub db: Arc<Database>,
    pub remote: Arc<dyn RemoteTrackerStore>,
    pub event_bus: Arc<dyn EventBus>,
}

pub struct Queries {
    pub leaderboard: Arc<LeaderboardQueryService>,
}

pub struct AppState {
    pub config: AppConfig,
    pub runtime: Runtime,
    /// The session is driven by one caller at a time.
    pub session: Arc<Mutex<TrackerSession>>,
    pub queries: Queries,
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        crate::presentation::bootstrap::build_app_state(config).await
    }
}
