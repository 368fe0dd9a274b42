// ── Controller façade ──
//
// The main entry point for consumers. Construction spawns the reachability
// monitor; commands translate domain operations into bus request/response
// exchanges; observation goes through the status publisher.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Local;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use poolside_bus::{Bus, Circuit, CircuitPowerState, HeatStatus, Message, MessageKind};

use crate::config::ControllerConfig;
use crate::convert;
use crate::error::CoreError;
use crate::model::{Body, Feature, HeatSource, PoolStatus, PowerState};
use crate::monitor;
use crate::publisher::{StatusPublisher, Subscription};

/// A programmatic interface to a swimming pool system.
///
/// The pool system includes a spa, a variable-speed pump, a gas heater, a
/// solar heater, and a light. Cheaply cloneable via `Arc`; all methods take
/// `&self` and may be called from any task.
///
/// Creating a controller spawns a background task that monitors the bus for
/// inbound traffic for the controller's lifetime. Running multiple
/// controller instances against the same physical bus yields undefined
/// results. Call [`shutdown`](Self::shutdown) to stop the background tasks.
pub struct PoolController<B: Bus + ?Sized> {
    inner: Arc<ControllerInner<B>>,
}

// Derived Clone would demand B: Clone; cloning only bumps the Arc.
impl<B: Bus + ?Sized> Clone for PoolController<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct ControllerInner<B: Bus + ?Sized> {
    config: ControllerConfig,
    publisher: Arc<StatusPublisher>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
    /// Set once the recurring clock-sync task has been scheduled, so
    /// repeated `synchronize_clock` calls never stack schedules.
    clock_sync_scheduled: AtomicBool,
    bus: Arc<B>,
}

impl<B: Bus + ?Sized + 'static> PoolController<B> {
    /// Create a controller over `bus` with default timing.
    pub fn new(bus: Arc<B>) -> Self {
        Self::with_config(bus, ControllerConfig::default())
    }

    /// Create a controller over `bus` and spawn its reachability monitor.
    pub fn with_config(bus: Arc<B>, config: ControllerConfig) -> Self {
        let publisher = Arc::new(StatusPublisher::new());
        let cancel = CancellationToken::new();

        let feed = bus.subscribe();
        let monitor_handle = tokio::spawn(monitor::run(
            Arc::clone(&bus),
            feed,
            Arc::clone(&publisher),
            config.reachability_timeout,
            cancel.clone(),
        ));

        Self {
            inner: Arc::new(ControllerInner {
                config,
                publisher,
                cancel,
                task_handles: Mutex::new(vec![monitor_handle]),
                clock_sync_scheduled: AtomicBool::new(false),
                bus,
            }),
        }
    }

    // ── Observation ──────────────────────────────────────────────

    /// The most recent status event generated by this controller. If called
    /// before any status has come in, waits until one has — typically under
    /// three seconds, or up to the reachability timeout if the hardware is
    /// broken or missing.
    pub async fn status(&self) -> Arc<PoolStatus> {
        self.inner.publisher.current().await
    }

    /// The most recent status, or `None` before first contact. Never waits.
    pub fn latest_status(&self) -> Option<Arc<PoolStatus>> {
        self.inner.publisher.latest()
    }

    /// Subscribe to status updates.
    ///
    /// Every subsequent status event is delivered to the subscription's
    /// queue until it is closed or dropped. An unclosed subscription that
    /// stops draining grows without bound.
    pub fn subscribe(&self) -> Subscription {
        self.inner.publisher.subscribe()
    }

    /// Deliver status updates to a callback on a dedicated dispatch task.
    ///
    /// The task runs until the controller shuts down. Prefer
    /// [`subscribe`](Self::subscribe) when the consumer wants to control
    /// its own pacing.
    pub async fn add_listener<F>(&self, mut listener: F)
    where
        F: FnMut(Arc<PoolStatus>) + Send + 'static,
    {
        let mut subscription = self.subscribe();
        let cancel = self.inner.cancel.clone();
        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    status = subscription.recv() => match status {
                        Some(status) => listener(status),
                        None => break,
                    },
                }
            }
        });
        self.inner.task_handles.lock().await.push(handle);
    }

    // ── Commands ─────────────────────────────────────────────────

    /// Set the given feature to the given power state.
    ///
    /// Turning on the jets while neither body is active has no effect (the
    /// jets require circulating water). The same is true of turning on heat
    /// boost while the heat is off — the hardware ignores it.
    ///
    /// # Errors
    ///
    /// [`CoreError::HeaterNotSettable`] if `feature` is
    /// [`Feature::Heater`], whose state is derived and cannot be commanded;
    /// [`CoreError::Bus`] if the hardware cannot be reached.
    pub async fn set_feature_power(
        &self,
        feature: Feature,
        state: PowerState,
    ) -> Result<(), CoreError> {
        let Some(circuit) = convert::feature_circuit(feature) else {
            return Err(CoreError::HeaterNotSettable);
        };

        if feature == Feature::Jets && state == PowerState::On && self.active_body().is_none() {
            debug!("ignoring JETS on with no active body");
            return Ok(());
        }

        self.set_circuit(circuit, convert::power_circuit_state(state))
            .await
    }

    /// Set the given body to the given power state.
    ///
    /// The hardware keeps independent power states for pool and spa and
    /// prioritizes the spa: if both are on, the spa runs. This method hides
    /// that — turning the pool on also turns the spa off, so the pool
    /// actually starts. Turning a body off first turns off the jets if they
    /// are running (the jets keep the pump on even with both bodies off).
    pub async fn set_body_power(&self, body: Body, state: PowerState) -> Result<(), CoreError> {
        if state == PowerState::Off && self.jets_active() {
            self.set_feature_power(Feature::Jets, PowerState::Off).await?;
        }

        self.set_circuit(convert::body_circuit(body), convert::power_circuit_state(state))
            .await?;

        if body == Body::Pool && state == PowerState::On {
            self.set_circuit(Circuit::Spa, CircuitPowerState::Off).await?;
        }

        Ok(())
    }

    /// Set the given body's seek temperature.
    ///
    /// The hardware only accepts the full heat configuration, so this
    /// fetches the current configuration, changes one field, and resends
    /// the whole thing.
    pub async fn set_seek_temp(&self, body: Body, seek_temp: i32) -> Result<(), CoreError> {
        let current = self.refresh_heat_status().await?;
        let (pool_seek_temp, spa_seek_temp) = match body {
            Body::Pool => (seek_temp, current.spa_seek_temp),
            Body::Spa => (current.pool_seek_temp, seek_temp),
        };

        self.set_heat_configuration(
            pool_seek_temp,
            spa_seek_temp,
            current.pool_heat_mode,
            current.spa_heat_mode,
        )
        .await
    }

    /// Set the given body's heat source.
    pub async fn set_heat_source(&self, body: Body, source: HeatSource) -> Result<(), CoreError> {
        let current = self.refresh_heat_status().await?;
        let mode = convert::heat_source_mode(source);
        let (pool_heat_mode, spa_heat_mode) = match body {
            Body::Pool => (mode, current.spa_heat_mode),
            Body::Spa => (current.pool_heat_mode, mode),
        };

        self.set_heat_configuration(
            current.pool_seek_temp,
            current.spa_seek_temp,
            pool_heat_mode,
            spa_heat_mode,
        )
        .await
    }

    /// Set the pool hardware's real-time clock to the current local time,
    /// and resynchronize hourly for the controller's lifetime (correcting
    /// drift and daylight-saving transitions). The recurring schedule is
    /// started at most once; repeated calls just resend the one-shot.
    pub async fn synchronize_clock(&self) -> Result<(), CoreError> {
        self.rpc(
            Message::ClockChangeRequest(Local::now().naive_local()),
            MessageKind::StateChangeResponse,
        )
        .await?;

        if self.inner.clock_sync_scheduled.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let controller = self.clone();
        let cancel = self.inner.cancel.clone();
        let period = self.inner.config.clock_sync_interval;
        let handle = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut ticks = tokio::time::interval_at(start, period);
            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    _ = ticks.tick() => {
                        let request =
                            Message::ClockChangeRequest(Local::now().naive_local());
                        if let Err(error) = controller
                            .rpc(request, MessageKind::StateChangeResponse)
                            .await
                        {
                            warn!(%error, "could not synchronize clocks");
                        }
                    }
                }
            }
        });
        self.inner.task_handles.lock().await.push(handle);

        Ok(())
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Stop the reachability monitor, the clock-sync schedule, and all
    /// listener dispatch tasks, and release the bus feed.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        info!("pool controller shut down");
    }

    // ── Internals ────────────────────────────────────────────────

    /// Send `request` on the bus and read the next message; if its kind is
    /// not `expect`, log and repeat the send-and-read — without bound.
    ///
    /// A mismatched response models a collision on the shared line, an
    /// expected and recoverable condition: typically one resend suffices.
    /// Liveness comes from the reachability monitor, not from here.
    async fn rpc(&self, request: Message, expect: MessageKind) -> Result<Message, CoreError> {
        loop {
            self.inner.bus.send(request.clone()).await?;
            let response = self.inner.bus.receive().await?;
            if response.kind() == expect {
                return Ok(response);
            }
            debug!(?request, ?response, "mismatched response; repeating exchange");
        }
    }

    async fn set_circuit(
        &self,
        circuit: Circuit,
        state: CircuitPowerState,
    ) -> Result<(), CoreError> {
        self.rpc(
            Message::CircuitStateChangeRequest { circuit, state },
            MessageKind::StateChangeResponse,
        )
        .await?;
        Ok(())
    }

    /// Fetch the current heat configuration via a request/response round
    /// trip.
    async fn refresh_heat_status(&self) -> Result<HeatStatus, CoreError> {
        match self
            .rpc(Message::HeatStatusQuery, MessageKind::HeatStatus)
            .await?
        {
            Message::HeatStatus(status) => Ok(status),
            // rpc only returns once the kind matches.
            _ => unreachable!("rpc returned a non-HeatStatus message"),
        }
    }

    /// Send the full heat configuration, then opportunistically re-poll so
    /// subscribers see the change promptly rather than on the next natural
    /// poll cycle.
    async fn set_heat_configuration(
        &self,
        pool_seek_temp: i32,
        spa_seek_temp: i32,
        pool_heat_mode: poolside_bus::HeatMode,
        spa_heat_mode: poolside_bus::HeatMode,
    ) -> Result<(), CoreError> {
        self.rpc(
            Message::HeatConfigurationChangeRequest {
                pool_seek_temp,
                spa_seek_temp,
                pool_heat_mode,
                spa_heat_mode,
            },
            MessageKind::StateChangeResponse,
        )
        .await?;

        if let Err(error) = self.inner.bus.send(Message::HeatStatusQuery).await {
            warn!(%error, "failed to request prompt heat status refresh");
        }

        Ok(())
    }

    /// The active body per the latest published status. Before first
    /// contact nothing is known to be active.
    fn active_body(&self) -> Option<Body> {
        self.inner
            .publisher
            .latest()
            .and_then(|status| status.active_body())
    }

    /// Whether the jets are on per the latest published status.
    fn jets_active(&self) -> bool {
        self.inner
            .publisher
            .latest()
            .and_then(|status| status.active_features())
            .is_some_and(|features| features.contains(Feature::Jets))
    }
}
