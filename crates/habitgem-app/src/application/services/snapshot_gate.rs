use tracing::debug;

use habitgem_domain::sync::RemoteSnapshot;
use habitgem_infrastructure::config::SnapshotPrecedence;

/// Decides when an inbound remote snapshot may replace local state.
///
/// Pure policy; the session tells it whether remote writes are in flight.
#[derive(Debug)]
pub struct SnapshotGate {
    precedence: SnapshotPrecedence,
    deferred: Option<RemoteSnapshot>,
}

impl SnapshotGate {
    pub fn new(precedence: SnapshotPrecedence) -> Self {
        Self {
            precedence,
            deferred: None,
        }
    }

    pub fn precedence(&self) -> SnapshotPrecedence {
        self.precedence
    }

    /// Returns the snapshot when it should be applied now, otherwise holds
    /// it. A held snapshot is superseded by any newer one.
    pub fn offer(&mut self, snapshot: RemoteSnapshot, writes_in_flight: bool) -> Option<RemoteSnapshot> {
        match self.precedence {
            SnapshotPrecedence::RemoteAlways => Some(snapshot),
            SnapshotPrecedence::LocalWhileWriting if writes_in_flight => {
                if self.deferred.replace(snapshot).is_some() {
                    debug!("Deferred snapshot superseded by a newer one");
                }
                None
            }
            SnapshotPrecedence::LocalWhileWriting => {
                self.deferred = None;
                Some(snapshot)
            }
        }
    }

    /// Hands back the held snapshot once no write is in flight.
    pub fn release(&mut self, writes_in_flight: bool) -> Option<RemoteSnapshot> {
        if writes_in_flight {
            return None;
        }
        self.deferred.take()
    }

    pub fn has_deferred(&self) -> bool {
        self.deferred.is_some()
    }

    pub fn clear(&mut self) {
        self.deferred = None;
    }
}
