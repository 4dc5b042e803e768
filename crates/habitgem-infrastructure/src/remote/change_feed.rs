use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use habitgem_domain::shared::{DomainError, OwnerId};
use habitgem_domain::sync::{RemoteSnapshot, RemoteSubscription, RemoteTrackerStore, SnapshotSender};

/// Capacity of the per-store broadcast of changed owners.
pub(crate) const CHANGE_FEED_CAPACITY: usize = 64;

/// Opens a subscription: delivers the current document, then re-reads and
/// delivers it whenever `changes` reports the owner.
///
/// `changes` must be subscribed before calling so no write between the
/// initial read and the worker start is missed.
pub(crate) async fn open_subscription<S>(
    store: &S,
    owner_id: &OwnerId,
    changes: broadcast::Receiver<OwnerId>,
    buffer: usize,
) -> Result<RemoteSubscription, DomainError>
where
    S: RemoteTrackerStore + Clone + 'static,
{
    let (sender, subscription) = RemoteSubscription::channel(owner_id.clone(), buffer);

    let document = store.fetch_document(owner_id).await?;
    sender
        .send(Ok(RemoteSnapshot {
            owner_id: owner_id.clone(),
            document,
        }))
        .await
        .map_err(|_| {
            DomainError::Subscription("Subscription closed before first snapshot".to_string())
        })?;

    let worker = spawn_feed(store.clone(), owner_id.clone(), changes, sender);
    Ok(subscription.with_worker(worker))
}

fn spawn_feed<S>(
    store: S,
    owner_id: OwnerId,
    mut changes: broadcast::Receiver<OwnerId>,
    sender: SnapshotSender,
) -> JoinHandle<()>
where
    S: RemoteTrackerStore + 'static,
{
    tokio::spawn(async move {
        loop {
            let relevant = match changes.recv().await {
                Ok(changed) => changed == owner_id,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Change feed for {} lagged by {} events", owner_id, skipped);
                    true
                }
                Err(RecvError::Closed) => break,
            };
            if !relevant {
                continue;
            }

            let result = store
                .fetch_document(&owner_id)
                .await
                .map(|document| RemoteSnapshot {
                    owner_id: owner_id.clone(),
                    document,
                });

            if sender.send(result).await.is_err() {
                debug!("Subscriber for {} is gone, stopping feed", owner_id);
                break;
            }
        }
    })
}
