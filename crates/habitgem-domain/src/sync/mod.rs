mod document;
mod repository;
mod subscription;

pub use document::{DayDocument, LeaderboardEntry, OwnerProfile, SummaryDocument, TrackerDocument};
pub use repository::{LocalSnapshotStore, RemoteTrackerStore};
pub use subscription::{RemoteSnapshot, RemoteSubscription, SnapshotResult, SnapshotSender};
