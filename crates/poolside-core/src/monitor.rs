// ── Reachability monitor ──
//
// One long-lived task per controller: drains the bus subscription feed with
// a bounded wait, feeds the live snapshot, chains the status polls, and
// publishes. This task is the sole owner of the snapshot — commands and
// subscribers never touch it.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use poolside_bus::{Bus, BusFeed, Message};

use crate::model::PoolStatus;
use crate::publisher::StatusPublisher;
use crate::snapshot::LiveSnapshot;

/// Run the reachability monitor until cancelled or the feed closes.
pub(crate) async fn run<B: Bus + ?Sized>(
    bus: Arc<B>,
    mut feed: BusFeed,
    publisher: Arc<StatusPublisher>,
    reachability_timeout: Duration,
    cancel: CancellationToken,
) {
    let mut snapshot = LiveSnapshot::default();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            next = feed.next_timeout(reachability_timeout) => match next {
                Ok(Some(message)) => {
                    handle_message(&*bus, &publisher, &mut snapshot, &message).await;
                }
                Ok(None) => handle_silence(&publisher, reachability_timeout),
                Err(_) => {
                    warn!("bus feed closed; reachability monitor exiting");
                    break;
                }
            },
        }
    }
}

/// Dispatch one inbound message to the snapshot; publish if the update was
/// significant and the snapshot can synthesize a full status.
async fn handle_message<B: Bus + ?Sized>(
    bus: &B,
    publisher: &StatusPublisher,
    snapshot: &mut LiveSnapshot,
    message: &Message,
) {
    let significant = match message {
        Message::SystemStatus(update) => {
            let significant = snapshot.apply_system_status(update);
            // Daisy-chain the next poll instead of polling on a timer:
            // unsolicited polls must not collide with command traffic on
            // the half-duplex line.
            attempt_send(bus, Message::HeatStatusQuery).await;
            significant
        }
        Message::HeatStatus(update) => {
            let significant = snapshot.apply_heat_status(update);
            attempt_send(bus, Message::PumpStatusRequest).await;
            significant
        }
        Message::PumpStatus(update) => snapshot.apply_pump_status(update),
        _ => false,
    };

    if significant {
        if let Some(status) = snapshot.to_status() {
            publisher.publish(status);
        }
    }
}

/// The bounded wait elapsed with no traffic: the hardware is unreachable.
/// Publishes only on the transition — never two Unreachable events in a row.
fn handle_silence(publisher: &StatusPublisher, reachability_timeout: Duration) {
    let latest = publisher.latest();
    if latest.as_deref().is_some_and(PoolStatus::is_unreachable) {
        return;
    }

    let last_contact = latest.map(|_| {
        // Contact lapsed one timeout window ago.
        Local::now() - chrono::Duration::seconds(reachability_timeout.as_secs() as i64)
    });
    info!(had_contact = last_contact.is_some(), "pool hardware unreachable");
    publisher.publish(PoolStatus::Unreachable { last_contact });
}

/// Best-effort send for chained polls. Failure costs only promptness — the
/// next natural message cycle retries — so it is logged and dropped.
async fn attempt_send<B: Bus + ?Sized>(bus: &B, message: Message) {
    if let Err(error) = bus.send(message.clone()).await {
        warn!(%error, ?message, "failed to send chained poll");
    }
}
