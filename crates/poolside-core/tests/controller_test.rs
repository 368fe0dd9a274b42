#![allow(clippy::unwrap_used)]
// End-to-end tests for `PoolController` against a scripted `FakeBus`.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::NaiveTime;
use pretty_assertions::assert_eq;

use poolside_bus::testing::FakeBus;
use poolside_bus::{
    Circuit, CircuitPowerState, HeatMode, HeatStatus, Message, MessageKind, PumpStatus,
    SystemStatus,
};
use poolside_core::{Body, CoreError, Feature, PoolController, PoolStatus, PowerState};

// ── Helpers ─────────────────────────────────────────────────────────

fn controller() -> (Arc<FakeBus>, PoolController<FakeBus>) {
    let bus = Arc::new(FakeBus::new());
    let controller = PoolController::new(Arc::clone(&bus));
    (bus, controller)
}

fn system_status(circuits: &[Circuit]) -> Message {
    Message::SystemStatus(SystemStatus {
        time: NaiveTime::from_hms_opt(14, 5, 0).unwrap(),
        air_temp: 75,
        water_temp: 82,
        enabled_circuits: circuits.iter().copied().collect(),
        heater_on: false,
    })
}

fn heat_status() -> Message {
    Message::HeatStatus(HeatStatus {
        pool_seek_temp: 78,
        spa_seek_temp: 102,
        pool_heat_mode: HeatMode::SolarPreferred,
        spa_heat_mode: HeatMode::Heater,
    })
}

/// Drive the monitor to an Active status with the given circuits energized,
/// then clear the transmit log so a test can assert on one command's
/// traffic in isolation.
async fn establish_active(
    bus: &FakeBus,
    controller: &PoolController<FakeBus>,
    circuits: &[Circuit],
) {
    let mut updates = controller.subscribe();
    bus.emit(system_status(circuits));
    bus.emit(heat_status());

    let status = updates.recv().await.unwrap();
    assert!(matches!(*status, PoolStatus::Active(_)));
    bus.take_sent();
}

// ── Status aggregation and reachability ─────────────────────────────

#[tokio::test(start_paused = true)]
async fn no_event_until_system_and_heat_status_seen() {
    let (bus, controller) = controller();
    let mut updates = controller.subscribe();

    bus.emit(system_status(&[Circuit::Pool]));
    let early = tokio::time::timeout(Duration::from_millis(50), updates.recv()).await;
    assert!(early.is_err(), "no event may fire from a partially-known state");

    bus.emit(heat_status());
    let status = updates.recv().await.unwrap();
    match &*status {
        PoolStatus::Active(active) => {
            assert_eq!(active.active_body, Body::Pool);
            assert_eq!(active.water_temp, 82);
        }
        other => panic!("expected active status, got {other}"),
    }
}

#[tokio::test(start_paused = true)]
async fn insignificant_repeat_publishes_nothing() {
    let (bus, controller) = controller();
    let mut updates = controller.subscribe();

    bus.emit(system_status(&[Circuit::Pool]));
    bus.emit(heat_status());
    updates.recv().await.unwrap();

    // Same heat configuration again: no state change, no event.
    bus.emit(heat_status());
    let repeat = tokio::time::timeout(Duration::from_millis(50), updates.recv()).await;
    assert!(repeat.is_err());
}

#[tokio::test(start_paused = true)]
async fn unreachable_fires_once_and_recovers_with_last_contact() {
    let (bus, controller) = controller();
    let mut updates = controller.subscribe();

    // Never contacted: Unreachable with no last-contact time.
    let first = updates.recv().await.unwrap();
    assert_eq!(*first, PoolStatus::Unreachable { last_contact: None });

    // Continued silence: no second Unreachable event.
    let repeat = tokio::time::timeout(Duration::from_secs(35), updates.recv()).await;
    assert!(repeat.is_err(), "consecutive Unreachable events are forbidden");

    // Contact established, then lost again: Unreachable with a timestamp.
    bus.emit(system_status(&[]));
    bus.emit(heat_status());
    let recovered = updates.recv().await.unwrap();
    assert!(matches!(*recovered, PoolStatus::Inactive(_)));

    let lapsed = updates.recv().await.unwrap();
    assert!(matches!(
        *lapsed,
        PoolStatus::Unreachable {
            last_contact: Some(_)
        }
    ));
}

#[tokio::test(start_paused = true)]
async fn monitor_daisy_chains_status_polls() {
    let (bus, controller) = controller();
    let mut updates = controller.subscribe();

    bus.emit(system_status(&[]));
    bus.emit(heat_status());
    updates.recv().await.unwrap();

    // System status begets a heat query; heat status begets a pump request.
    assert_eq!(
        bus.sent(),
        vec![Message::HeatStatusQuery, Message::PumpStatusRequest]
    );
}

#[tokio::test(start_paused = true)]
async fn status_blocks_until_first_event() {
    let (_bus, controller) = controller();

    // Nothing ever arrives; the call parks until the reachability timeout
    // produces the first event.
    let status = controller.status().await;
    assert_eq!(*status, PoolStatus::Unreachable { last_contact: None });
}

// ── Command façade ──────────────────────────────────────────────────

#[tokio::test]
async fn heater_power_is_rejected_before_any_bus_traffic() {
    let (bus, controller) = controller();

    let result = controller
        .set_feature_power(Feature::Heater, PowerState::On)
        .await;
    assert!(matches!(result, Err(CoreError::HeaterNotSettable)));
    assert!(bus.sent().is_empty());
}

#[tokio::test]
async fn jets_on_without_active_body_is_a_silent_noop() {
    let (bus, controller) = controller();

    controller
        .set_feature_power(Feature::Jets, PowerState::On)
        .await
        .unwrap();
    assert!(bus.sent().is_empty());
}

#[tokio::test(start_paused = true)]
async fn jets_on_with_active_body_switches_the_circuit() {
    let (bus, controller) = controller();
    establish_active(&bus, &controller, &[Circuit::Spa]).await;

    bus.enqueue_response(Message::StateChangeResponse);
    controller
        .set_feature_power(Feature::Jets, PowerState::On)
        .await
        .unwrap();

    assert_eq!(
        bus.sent(),
        vec![Message::CircuitStateChangeRequest {
            circuit: Circuit::Aux3,
            state: CircuitPowerState::On,
        }]
    );
}

#[tokio::test]
async fn pool_on_enables_pool_then_disables_spa() {
    let (bus, controller) = controller();

    bus.enqueue_response(Message::StateChangeResponse);
    bus.enqueue_response(Message::StateChangeResponse);
    controller
        .set_body_power(Body::Pool, PowerState::On)
        .await
        .unwrap();

    assert_eq!(
        bus.sent(),
        vec![
            Message::CircuitStateChangeRequest {
                circuit: Circuit::Pool,
                state: CircuitPowerState::On,
            },
            Message::CircuitStateChangeRequest {
                circuit: Circuit::Spa,
                state: CircuitPowerState::Off,
            },
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn body_off_turns_jets_off_first() {
    let (bus, controller) = controller();
    establish_active(&bus, &controller, &[Circuit::Pool, Circuit::Aux3]).await;

    bus.enqueue_response(Message::StateChangeResponse);
    bus.enqueue_response(Message::StateChangeResponse);
    controller
        .set_body_power(Body::Pool, PowerState::Off)
        .await
        .unwrap();

    assert_eq!(
        bus.sent(),
        vec![
            Message::CircuitStateChangeRequest {
                circuit: Circuit::Aux3,
                state: CircuitPowerState::Off,
            },
            Message::CircuitStateChangeRequest {
                circuit: Circuit::Pool,
                state: CircuitPowerState::Off,
            },
        ]
    );
}

#[tokio::test]
async fn set_seek_temp_rewrites_only_the_targeted_body() {
    let (bus, controller) = controller();

    bus.enqueue_response(heat_status());
    bus.enqueue_response(Message::StateChangeResponse);
    controller.set_seek_temp(Body::Spa, 85).await.unwrap();

    assert_eq!(
        bus.sent(),
        vec![
            Message::HeatStatusQuery,
            Message::HeatConfigurationChangeRequest {
                pool_seek_temp: 78, // unchanged
                spa_seek_temp: 85,
                pool_heat_mode: HeatMode::SolarPreferred,
                spa_heat_mode: HeatMode::Heater,
            },
            // Opportunistic re-poll so subscribers see the change promptly.
            Message::HeatStatusQuery,
        ]
    );
}

#[tokio::test]
async fn set_heat_source_preserves_other_body_configuration() {
    let (bus, controller) = controller();

    bus.enqueue_response(heat_status());
    bus.enqueue_response(Message::StateChangeResponse);
    controller
        .set_heat_source(Body::Pool, poolside_core::HeatSource::Solar)
        .await
        .unwrap();

    assert_eq!(
        bus.sent(),
        vec![
            Message::HeatStatusQuery,
            Message::HeatConfigurationChangeRequest {
                pool_seek_temp: 78,
                spa_seek_temp: 102,
                pool_heat_mode: HeatMode::Solar,
                spa_heat_mode: HeatMode::Heater,
            },
            Message::HeatStatusQuery,
        ]
    );
}

#[tokio::test]
async fn rpc_repeats_exchange_until_response_kind_matches() {
    let (bus, controller) = controller();

    // Two collisions before the acknowledgement gets through.
    bus.enqueue_response(Message::PumpStatus(PumpStatus {
        speed_rpm: 2400,
        power_watts: 600,
    }));
    bus.enqueue_response(heat_status());
    bus.enqueue_response(Message::StateChangeResponse);

    controller
        .set_feature_power(Feature::Light, PowerState::On)
        .await
        .unwrap();

    assert_eq!(bus.receive_calls(), 3);
    let expected = Message::CircuitStateChangeRequest {
        circuit: Circuit::Aux1,
        state: CircuitPowerState::On,
    };
    assert_eq!(
        bus.sent(),
        vec![expected.clone(), expected.clone(), expected]
    );
}

#[tokio::test]
async fn synchronize_clock_sends_a_clock_change_request() {
    let (bus, controller) = controller();

    bus.enqueue_response(Message::StateChangeResponse);
    controller.synchronize_clock().await.unwrap();

    let sent = bus.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].kind(), MessageKind::ClockChangeRequest);

    controller.shutdown().await;
}

// ── Subscriptions and listeners ─────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn closed_subscription_receives_nothing_further() {
    let (bus, controller) = controller();
    let mut kept = controller.subscribe();
    let closing = controller.subscribe();

    bus.emit(system_status(&[]));
    bus.emit(heat_status());
    kept.recv().await.unwrap();
    closing.close();

    // A significant change right after the close.
    bus.emit(system_status(&[Circuit::Aux1]));
    let next = kept.recv().await.unwrap();
    assert!(matches!(*next, PoolStatus::Inactive(_)));
    // `closing` is gone; nothing to assert on it beyond not deadlocking —
    // the publisher-side registry test covers deregistration.
}

#[tokio::test(start_paused = true)]
async fn listener_callback_receives_updates() {
    let (bus, controller) = controller();
    let seen: Arc<Mutex<Vec<Arc<PoolStatus>>>> = Arc::new(Mutex::new(Vec::new()));
    {
        let seen = Arc::clone(&seen);
        controller
            .add_listener(move |status| seen.lock().unwrap().push(status))
            .await;
    }

    bus.emit(system_status(&[]));
    bus.emit(heat_status());
    tokio::time::sleep(Duration::from_millis(10)).await;

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(matches!(*seen[0], PoolStatus::Inactive(_)));

    drop(seen);
    controller.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_the_monitor() {
    let (bus, controller) = controller();
    controller.shutdown().await;

    // With the monitor gone, traffic produces no events and silence
    // produces no Unreachable.
    let mut updates = controller.subscribe();
    bus.emit(system_status(&[]));
    bus.emit(heat_status());
    let nothing = tokio::time::timeout(Duration::from_secs(30), updates.recv()).await;
    assert!(nothing.is_err());
}
