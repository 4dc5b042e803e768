mod confirmation;
mod snapshot_gate;
mod tracker_session;

#[cfg(test)]
mod tracker_session_test;

pub use confirmation::{AlwaysConfirm, UserConfirmation};
pub use snapshot_gate::SnapshotGate;
pub use tracker_session::{SnapshotOutcome, TrackerSession};

#[cfg(test)]
pub use confirmation::MockUserConfirmation;
