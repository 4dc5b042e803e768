// Domain layer - Pure tracking and achievement logic
// No dependencies on infrastructure or presentation layers

pub mod achievement;
pub mod events;
pub mod shared;
pub mod sync;
pub mod tracker;

// Re-exports for convenience
pub use events::DomainEvent;
pub use shared::{BadgeId, CategoryId, DayId, DomainError, HabitId, OwnerId};
pub use tracker::TrackerState;
