use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::task::JoinHandle;

use super::document::TrackerDocument;
use crate::shared::{DomainError, OwnerId};

/// One delivery from the remote tier: the owner's full document, or `None`
/// when no document exists yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSnapshot {
    pub owner_id: OwnerId,
    pub document: Option<TrackerDocument>,
}

pub type SnapshotResult = Result<RemoteSnapshot, DomainError>;
pub type SnapshotSender = mpsc::Sender<SnapshotResult>;

/// Handle to a live remote feed for a single owner.
///
/// Dropping or cancelling the handle stops the feeding task; no snapshot is
/// delivered afterwards.
#[derive(Debug)]
pub struct RemoteSubscription {
    owner_id: OwnerId,
    receiver: mpsc::Receiver<SnapshotResult>,
    worker: Option<JoinHandle<()>>,
}

impl RemoteSubscription {
    /// Creates the channel pair. Stores push into the sender and attach
    /// their feeding task with [`RemoteSubscription::with_worker`].
    pub fn channel(owner_id: OwnerId, buffer: usize) -> (SnapshotSender, Self) {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        (
            sender,
            Self {
                owner_id,
                receiver,
                worker: None,
            },
        )
    }

    pub fn with_worker(mut self, worker: JoinHandle<()>) -> Self {
        self.worker = Some(worker);
        self
    }

    pub fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }

    /// Waits for the next snapshot. `None` once the feed has ended.
    pub async fn recv(&mut self) -> Option<SnapshotResult> {
        self.receiver.recv().await
    }

    /// Returns a snapshot already queued, if any.
    pub fn try_recv(&mut self) -> Option<SnapshotResult> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    pub fn cancel(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.receiver.close();
        if let Some(worker) = self.worker.take() {
            worker.abort();
        }
    }
}

impl Drop for RemoteSubscription {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(owner: &str) -> SnapshotResult {
        Ok(RemoteSnapshot {
            owner_id: OwnerId::from_string(owner),
            document: None,
        })
    }

    #[tokio::test]
    async fn test_queued_snapshots_arrive_in_order() {
        let (sender, mut subscription) = RemoteSubscription::channel(OwnerId::from_string("u1"), 4);

        sender.send(snapshot("u1")).await.unwrap();
        sender
            .send(Err(DomainError::Subscription("denied".to_string())))
            .await
            .unwrap();

        assert!(subscription.recv().await.unwrap().is_ok());
        assert!(subscription.try_recv().unwrap().is_err());
        assert!(subscription.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_cancel_closes_the_feed() {
        let (sender, subscription) = RemoteSubscription::channel(OwnerId::from_string("u1"), 4);
        let worker = tokio::spawn(std::future::pending::<()>());
        let subscription = subscription.with_worker(worker);

        subscription.cancel();

        assert!(sender.send(snapshot("u1")).await.is_err());
        assert!(sender.is_closed());
    }
}
