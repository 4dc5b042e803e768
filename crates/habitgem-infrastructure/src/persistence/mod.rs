mod database;
mod local_cache;
mod repository_base;
mod result_ext;

pub use database::Database;
pub use local_cache::{InMemorySnapshotStore, JsonFileSnapshotStore};
pub use repository_base::SqliteRepositoryBase;
pub use result_ext::ResultExt;
