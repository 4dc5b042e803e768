mod change_feed;
mod memory_store;
mod sqlite_store;

pub use memory_store::InMemoryRemoteStore;
pub use sqlite_store::SqliteRemoteStore;
