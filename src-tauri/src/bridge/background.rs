//! Usage: Background execution controller (desired-state supervisor + heartbeat worker).
//!
//! The controller owns the OS-level background unit through a [`BackgroundHost`] and a
//! heartbeat task on the async runtime. Desired state is the source of truth: a re-arm
//! request recreates the unit whenever it should be running but the host or the heartbeat
//! reports it gone.

use super::errors::BridgeError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::MissedTickBehavior;

/// Text for the persistent "running in background" indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Indicator {
    pub(crate) title: String,
    pub(crate) body: String,
}

#[derive(Debug, Clone)]
pub(crate) struct BackgroundConfig {
    pub(crate) heartbeat_interval: Duration,
    pub(crate) indicator: Indicator,
}

/// OS side of the background unit.
pub(crate) trait BackgroundHost: Send + Sync {
    /// Create the unit and show its persistent indicator (if the platform has one).
    fn create_unit(&self, indicator: &Indicator) -> Result<(), String>;
    fn destroy_unit(&self);
    /// Whether the OS still hosts the unit created last.
    fn unit_alive(&self) -> bool;
    fn heartbeat(&self, beat: u64);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StartOutcome {
    Started,
    AlreadyRunning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StopOutcome {
    Stopped,
    NotRunning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RearmOutcome {
    NotDesired,
    StillLive,
    Rearmed,
    /// Recreation failed; desired state has been reverted to "not running".
    Failed(BridgeError),
}

struct AliveGuard(Arc<AtomicBool>);

impl Drop for AliveGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

struct RunningUnit {
    generation: u64,
    shutdown: Option<oneshot::Sender<()>>,
    heartbeat_alive: Arc<AtomicBool>,
}

impl RunningUnit {
    fn heartbeat_alive(&self) -> bool {
        self.heartbeat_alive.load(Ordering::SeqCst)
    }

    fn cancel(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

fn spawn_heartbeat(host: Arc<dyn BackgroundHost>, interval: Duration, generation: u64) -> RunningUnit {
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
    let heartbeat_alive = Arc::new(AtomicBool::new(true));
    let guard = AliveGuard(Arc::clone(&heartbeat_alive));

    tauri::async_runtime::spawn(async move {
        let _guard = guard;
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        let mut beat: u64 = 0;
        loop {
            tokio::select! {
                // Fires on explicit shutdown and when the sender is dropped.
                _ = &mut shutdown_rx => break,
                _ = ticker.tick() => {
                    beat += 1;
                    tracing::debug!(generation, beat, "background heartbeat");
                    host.heartbeat(beat);
                }
            }
        }

        tracing::debug!(generation, beats = beat, "background heartbeat stopped");
    });

    RunningUnit {
        generation,
        shutdown: Some(shutdown_tx),
        heartbeat_alive,
    }
}

pub(crate) struct BackgroundExecutionController {
    host: Arc<dyn BackgroundHost>,
    config: BackgroundConfig,
    desired_running: bool,
    unit: Option<RunningUnit>,
    next_generation: u64,
}

impl BackgroundExecutionController {
    pub(crate) fn new(host: Arc<dyn BackgroundHost>, config: BackgroundConfig) -> Self {
        Self {
            host,
            config,
            desired_running: false,
            unit: None,
            next_generation: 1,
        }
    }

    pub(crate) fn desired_running(&self) -> bool {
        self.desired_running
    }

    /// Generation of the live unit, if any. Each (re)creation bumps it.
    pub(crate) fn live_generation(&self) -> Option<u64> {
        if !self.unit_is_live() {
            return None;
        }
        self.unit.as_ref().map(|unit| unit.generation)
    }

    fn unit_is_live(&self) -> bool {
        self.unit
            .as_ref()
            .is_some_and(|unit| unit.heartbeat_alive())
            && self.host.unit_alive()
    }

    fn teardown_unit(&mut self) {
        if let Some(unit) = self.unit.take() {
            unit.cancel();
            self.host.destroy_unit();
        }
    }

    fn arm(&mut self) -> Result<(), BridgeError> {
        // Never leave a half-dead unit behind before creating a new one.
        self.teardown_unit();

        self.host
            .create_unit(&self.config.indicator)
            .map_err(BridgeError::BackgroundUnit)?;

        let generation = self.next_generation;
        self.next_generation += 1;
        self.unit = Some(spawn_heartbeat(
            Arc::clone(&self.host),
            self.config.heartbeat_interval,
            generation,
        ));
        tracing::info!(generation, "background unit created");
        Ok(())
    }

    pub(crate) fn start(&mut self) -> Result<StartOutcome, BridgeError> {
        if self.desired_running && self.unit_is_live() {
            return Ok(StartOutcome::AlreadyRunning);
        }

        // Desired state only turns on once a unit exists, so a host that unwinds out of
        // `arm` leaves it off.
        self.desired_running = false;
        match self.arm() {
            Ok(()) => {
                self.desired_running = true;
                Ok(StartOutcome::Started)
            }
            Err(err) => {
                tracing::warn!("background start failed: {}", err);
                Err(err)
            }
        }
    }

    pub(crate) fn stop(&mut self) -> StopOutcome {
        if !self.desired_running && self.unit.is_none() {
            return StopOutcome::NotRunning;
        }

        self.desired_running = false;
        self.teardown_unit();
        tracing::info!("background unit stopped");
        StopOutcome::Stopped
    }

    /// Reconcile after the OS tore down the hosting surface.
    pub(crate) fn rearm(&mut self) -> RearmOutcome {
        if !self.desired_running {
            return RearmOutcome::NotDesired;
        }
        if self.unit_is_live() {
            return RearmOutcome::StillLive;
        }

        tracing::info!("background unit lost while it should be running; re-arming");
        self.desired_running = false;
        match self.arm() {
            Ok(()) => {
                self.desired_running = true;
                RearmOutcome::Rearmed
            }
            Err(err) => {
                tracing::error!("background re-arm failed: {}", err);
                RearmOutcome::Failed(err)
            }
        }
    }
}
