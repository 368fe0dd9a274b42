//! Test double for the [`Bus`] contract.
//!
//! [`FakeBus`] is a fully in-memory bus: tests emit inbound traffic onto the
//! subscription feeds with [`emit`](FakeBus::emit), script the replies that
//! [`receive`](Bus::receive) will hand back with
//! [`enqueue_response`](FakeBus::enqueue_response), and inspect everything
//! the code under test transmitted via [`sent`](FakeBus::sent).
//!
//! ```no_run
//! use poolside_bus::testing::FakeBus;
//! use poolside_bus::{Bus, Message};
//!
//! # async fn example() {
//! let bus = FakeBus::new();
//! bus.enqueue_response(Message::StateChangeResponse);
//! bus.send(Message::HeatStatusQuery).await.unwrap();
//! assert_eq!(bus.sent(), vec![Message::HeatStatusQuery]);
//! # }
//! ```

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::{Notify, mpsc};

use crate::bus::{Bus, BusFeed};
use crate::error::BusError;
use crate::message::Message;

/// Scripted in-memory implementation of [`Bus`].
#[derive(Default)]
pub struct FakeBus {
    feeds: Mutex<Vec<mpsc::UnboundedSender<Message>>>,
    sent: Mutex<Vec<Message>>,
    responses: Mutex<VecDeque<Message>>,
    response_ready: Notify,
    receive_calls: AtomicUsize,
}

impl FakeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver an inbound message to every live subscription feed, as the
    /// hardware would by broadcasting on the shared line.
    pub fn emit(&self, message: Message) {
        let mut feeds = self.feeds.lock().expect("feeds lock");
        feeds.retain(|tx| tx.send(message.clone()).is_ok());
    }

    /// Script the next reply that [`Bus::receive`] will return.
    ///
    /// Replies are consumed in FIFO order; `receive` waits if none is
    /// scripted yet.
    pub fn enqueue_response(&self, message: Message) {
        self.responses.lock().expect("responses lock").push_back(message);
        self.response_ready.notify_one();
    }

    /// Everything transmitted through [`Bus::send`], in order.
    pub fn sent(&self) -> Vec<Message> {
        self.sent.lock().expect("sent lock").clone()
    }

    /// Drain the transmit log, so a test can assert on one operation's
    /// traffic in isolation.
    pub fn take_sent(&self) -> Vec<Message> {
        std::mem::take(&mut *self.sent.lock().expect("sent lock"))
    }

    /// Number of times [`Bus::receive`] has been called.
    pub fn receive_calls(&self) -> usize {
        self.receive_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Bus for FakeBus {
    fn subscribe(&self) -> BusFeed {
        let (tx, rx) = mpsc::unbounded_channel();
        self.feeds.lock().expect("feeds lock").push(tx);
        BusFeed::new(rx)
    }

    async fn send(&self, message: Message) -> Result<(), BusError> {
        self.sent.lock().expect("sent lock").push(message);
        Ok(())
    }

    async fn receive(&self) -> Result<Message, BusError> {
        self.receive_calls.fetch_add(1, Ordering::SeqCst);
        loop {
            if let Some(message) = self.responses.lock().expect("responses lock").pop_front() {
                return Ok(message);
            }
            self.response_ready.notified().await;
        }
    }
}
