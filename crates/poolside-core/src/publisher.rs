// ── Status fan-out ──
//
// Latest-status cell plus a copy-on-write subscriber registry. Publishing
// replaces the cell (waking blocked retrievers) and then delivers to every
// subscriber queue in the registry snapshot taken at publish time, so
// concurrent subscribe/close never races delivery.

use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};

use arc_swap::ArcSwap;
use futures_core::Stream;
use tokio::sync::{mpsc, watch};
use tracing::debug;

use crate::model::PoolStatus;

/// One registered subscriber: its id and the producer side of its queue.
#[derive(Clone)]
struct Subscriber {
    id: u64,
    tx: mpsc::UnboundedSender<Arc<PoolStatus>>,
}

/// Holds the latest published status and fans new statuses out to every
/// live subscription.
pub(crate) struct StatusPublisher {
    /// `None` until first contact (or first reachability timeout).
    latest: watch::Sender<Option<Arc<PoolStatus>>>,
    subscribers: ArcSwap<Vec<Subscriber>>,
    next_id: AtomicU64,
}

impl StatusPublisher {
    pub(crate) fn new() -> Self {
        let (latest, _) = watch::channel(None);
        Self {
            latest,
            subscribers: ArcSwap::from_pointee(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Record `status` as the latest, wake any blocked retrievers, and
    /// deliver it to every current subscription.
    pub(crate) fn publish(&self, status: PoolStatus) {
        debug!(%status, "publishing status");
        let status = Arc::new(status);
        self.latest.send_replace(Some(Arc::clone(&status)));

        for subscriber in self.subscribers.load().iter() {
            // A send only fails if the subscription was dropped without
            // close(); the Drop impl removes it shortly after.
            let _ = subscriber.tx.send(Arc::clone(&status));
        }
    }

    /// The latest published status, if any. Never blocks.
    pub(crate) fn latest(&self) -> Option<Arc<PoolStatus>> {
        self.latest.borrow().clone()
    }

    /// The latest published status, waiting for the first publication if
    /// none exists yet.
    pub(crate) async fn current(&self) -> Arc<PoolStatus> {
        let mut rx = self.latest.subscribe();
        loop {
            if let Some(status) = rx.borrow_and_update().clone() {
                return status;
            }
            // The sender lives in `self`, so this cannot fail while we
            // hold `&self`.
            let _ = rx.changed().await;
        }
    }

    /// Register a new subscription.
    pub(crate) fn subscribe(self: &Arc<Self>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();

        self.subscribers.rcu(|subscribers| {
            let mut next = Vec::clone(subscribers);
            next.push(Subscriber { id, tx: tx.clone() });
            next
        });

        Subscription {
            id,
            rx,
            publisher: Arc::clone(self),
        }
    }

    fn remove(&self, id: u64) {
        self.subscribers.rcu(|subscribers| {
            subscribers
                .iter()
                .filter(|s| s.id != id)
                .cloned()
                .collect::<Vec<_>>()
        });
    }

    #[cfg(test)]
    fn subscriber_count(&self) -> usize {
        self.subscribers.load().len()
    }
}

/// A subscription to pool status updates.
///
/// Each subscription owns an unbounded, order-preserving queue, so a slow
/// consumer only grows its own backlog — it never stalls the monitor or
/// other subscribers. A subscription that stops draining grows without
/// bound; release it with [`close`](Subscription::close) (or let it drop,
/// which does the same).
pub struct Subscription {
    id: u64,
    rx: mpsc::UnboundedReceiver<Arc<PoolStatus>>,
    publisher: Arc<StatusPublisher>,
}

impl Subscription {
    /// Receive the next status update, waiting until one is published.
    ///
    /// Returns `None` once the controller has shut down and the queue is
    /// drained.
    pub async fn recv(&mut self) -> Option<Arc<PoolStatus>> {
        self.rx.recv().await
    }

    /// Terminate the subscription. No further updates will be delivered,
    /// even if events are published immediately after.
    pub fn close(self) {
        // Deregistration happens in Drop.
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> StatusStream {
        StatusStream { inner: self }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.publisher.remove(self.id);
    }
}

/// `Stream` adapter over a [`Subscription`].
pub struct StatusStream {
    inner: Subscription,
}

impl Stream for StatusStream {
    type Item = Arc<PoolStatus>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.rx.poll_recv(cx)
    }
}
