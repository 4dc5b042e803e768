#![allow(dead_code)]

use sqlx::SqlitePool;
use std::sync::Arc;

use habitgem_domain::sync::{DayDocument, TrackerDocument};
use habitgem_domain::tracker::Habit;
use habitgem_domain::{CategoryId, DayId, HabitId};
use habitgem_infrastructure::persistence::Database;
use habitgem_infrastructure::remote::SqliteRemoteStore;

/// Migrated single-connection in-memory database.
pub async fn setup_in_memory_db() -> SqlitePool {
    let database = Database::in_memory().await.expect("open in-memory db");
    database.run_migrations().await.expect("run migrations");
    database.pool().clone()
}

pub async fn setup_remote_store() -> (SqlitePool, SqliteRemoteStore) {
    let pool = setup_in_memory_db().await;
    let store = SqliteRemoteStore::new(Arc::new(pool.clone()));
    (pool, store)
}

pub fn habit(id: &str) -> Habit {
    Habit {
        id: HabitId::from_string(id),
        name: format!("Habit {}", id),
        category_id: CategoryId::from_string("c_pray"),
    }
}

/// Document with the given habits and one day completing `done`.
pub fn document(habit_ids: &[&str], done: &[&str]) -> TrackerDocument {
    TrackerDocument {
        categories: None,
        habits: Some(habit_ids.iter().map(|id| habit(id)).collect()),
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
