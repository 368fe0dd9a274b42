// ── Bus access contract ──
//
// Two access patterns onto one half-duplex channel: a fan-out subscription
// feed (passive observation) and a send/receive primitive (request/response
// exchanges). The controller core holds exactly one feed for its lifetime
// and uses send/receive from caller tasks.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::BusError;
use crate::message::Message;

/// Access to the pool hardware's shared serial bus.
///
/// # Exchange exclusivity
///
/// [`receive`](Bus::receive) reads the next inbound message *independently*
/// of any subscription feed — feeds still observe every message. The core
/// does not serialize concurrent send/receive exchanges; if the medium
/// requires one exchange in flight at a time, the implementation must
/// provide that exclusivity itself. This is part of the contract, not an
/// assumption.
#[async_trait]
pub trait Bus: Send + Sync {
    /// Register a new subscription feed. Every inbound message is delivered
    /// to every live feed, in arrival order.
    fn subscribe(&self) -> BusFeed;

    /// Transmit a message on the bus.
    async fn send(&self, message: Message) -> Result<(), BusError>;

    /// Block until the next inbound message arrives.
    async fn receive(&self) -> Result<Message, BusError>;
}

/// A single consumer's queue of inbound bus messages.
///
/// Backed by an unbounded channel so a slow consumer never stalls the bus
/// reader. Constructed by bus implementations via [`BusFeed::new`].
pub struct BusFeed {
    rx: mpsc::UnboundedReceiver<Message>,
}

impl BusFeed {
    pub fn new(rx: mpsc::UnboundedReceiver<Message>) -> Self {
        Self { rx }
    }

    /// Wait up to `wait` for the next inbound message.
    ///
    /// Returns `Ok(None)` if the wait elapsed with no traffic, and
    /// `Err(BusError::Closed)` once the bus has been torn down.
    pub async fn next_timeout(&mut self, wait: Duration) -> Result<Option<Message>, BusError> {
        match tokio::time::timeout(wait, self.rx.recv()).await {
            Ok(Some(message)) => Ok(Some(message)),
            Ok(None) => Err(BusError::Closed),
            Err(_) => Ok(None),
        }
    }
}
