//! Usage: In-memory hosts for bridge tests (record OS calls instead of touching the OS).

use super::background::{BackgroundConfig, BackgroundHost, Indicator};
use super::mode::{Capabilities, ModeSnapshot};
use super::restart::RestartHost;
use super::visibility::{AffordanceHost, WindowHost};
use super::{LifecycleBridge, ModeObserver};
use crate::shared::mutex_ext::MutexExt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

#[derive(Default)]
struct BackgroundCounters {
    created: usize,
    destroyed: usize,
    live: usize,
    last_indicator: Option<Indicator>,
}

#[derive(Default)]
pub(crate) struct FakeBackgroundHost {
    counters: Mutex<BackgroundCounters>,
    fail_create: AtomicBool,
    panic_on_beat: AtomicBool,
    beats: AtomicU64,
}

impl FakeBackgroundHost {
    pub(crate) fn fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    /// Make the next heartbeat unwind, ending the heartbeat task.
    pub(crate) fn panic_on_beat(&self, panic: bool) {
        self.panic_on_beat.store(panic, Ordering::SeqCst);
    }

    /// Simulate the OS killing the unit behind the controller's back.
    pub(crate) fn kill_unit(&self) {
        self.counters.lock_or_recover().live = 0;
    }

    pub(crate) fn created(&self) -> usize {
        self.counters.lock_or_recover().created
    }

    pub(crate) fn destroyed(&self) -> usize {
        self.counters.lock_or_recover().destroyed
    }

    pub(crate) fn live_units(&self) -> usize {
        self.counters.lock_or_recover().live
    }

    pub(crate) fn last_indicator(&self) -> Option<Indicator> {
        self.counters.lock_or_recover().last_indicator.clone()
    }

    pub(crate) fn beats(&self) -> u64 {
        self.beats.load(Ordering::SeqCst)
    }
}

impl BackgroundHost for FakeBackgroundHost {
    fn create_unit(&self, indicator: &Indicator) -> Result<(), String> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err("permission denied".to_string());
        }
        let mut counters = self.counters.lock_or_recover();
        counters.created += 1;
        counters.live += 1;
        counters.last_indicator = Some(indicator.clone());
        Ok(())
    }

    fn destroy_unit(&self) {
        let mut counters = self.counters.lock_or_recover();
        counters.destroyed += 1;
        counters.live = counters.live.saturating_sub(1);
    }

    fn unit_alive(&self) -> bool {
        self.counters.lock_or_recover().live > 0
    }

    fn heartbeat(&self, beat: u64) {
        self.beats.fetch_add(1, Ordering::SeqCst);
        if self.panic_on_beat.load(Ordering::SeqCst) {
            panic!("heartbeat {beat} failed");
        }
    }
}

pub(crate) struct FakeWindow {
    visible: AtomicBool,
    fail_hide: AtomicBool,
    hide_calls: AtomicUsize,
    show_calls: AtomicUsize,
}

impl Default for FakeWindow {
    fn default() -> Self {
        Self {
            visible: AtomicBool::new(true),
            fail_hide: AtomicBool::new(false),
            hide_calls: AtomicUsize::new(0),
            show_calls: AtomicUsize::new(0),
        }
    }
}

impl FakeWindow {
    pub(crate) fn visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_hide(&self, fail: bool) {
        self.fail_hide.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn hide_calls(&self) -> usize {
        self.hide_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn show_calls(&self) -> usize {
        self.show_calls.load(Ordering::SeqCst)
    }
}

impl WindowHost for FakeWindow {
    fn show(&self) -> Result<(), String> {
        self.show_calls.fetch_add(1, Ordering::SeqCst);
        self.visible.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn hide(&self) -> Result<(), String> {
        if self.fail_hide.load(Ordering::SeqCst) {
            return Err("window gone".to_string());
        }
        self.hide_calls.fetch_add(1, Ordering::SeqCst);
        self.visible.store(false, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeAffordance {
    attached: AtomicBool,
    fail_attach: AtomicBool,
}

impl FakeAffordance {
    pub(crate) fn fail_attach(&self, fail: bool) {
        self.fail_attach.store(fail, Ordering::SeqCst);
    }
}

impl AffordanceHost for FakeAffordance {
    fn attach(&self) -> Result<(), String> {
        if self.fail_attach.load(Ordering::SeqCst) {
            return Err("status bar unavailable".to_string());
        }
        self.attached.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub(crate) struct FakeRestartHost {
    calls: Mutex<Vec<&'static str>>,
    terminated: Condvar,
    fail_schedule: AtomicBool,
}

impl FakeRestartHost {
    pub(crate) fn fail_schedule(&self, fail: bool) {
        self.fail_schedule.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.calls.lock_or_recover().clone()
    }

    pub(crate) fn wait_terminated(&self, timeout: Duration) {
        let calls = self.calls.lock_or_recover();
        let _ = self
            .terminated
            .wait_timeout_while(calls, timeout, |calls| !calls.contains(&"terminate"));
    }

    fn record(&self, call: &'static str) {
        self.calls.lock_or_recover().push(call);
    }
}

impl RestartHost for FakeRestartHost {
    fn schedule_relaunch(&self) -> Result<(), String> {
        self.record("schedule_relaunch");
        if self.fail_schedule.load(Ordering::SeqCst) {
            return Err("spawn failed".to_string());
        }
        Ok(())
    }

    fn close_surface(&self) {
        self.record("close_surface");
    }

    fn terminate(&self) {
        self.record("terminate");
        self.terminated.notify_all();
    }
}

#[derive(Default)]
pub(crate) struct RecordingObserver {
    snapshots: Mutex<Vec<ModeSnapshot>>,
}

impl RecordingObserver {
    pub(crate) fn snapshots(&self) -> Vec<ModeSnapshot> {
        self.snapshots.lock_or_recover().clone()
    }
}

impl ModeObserver for RecordingObserver {
    fn mode_changed(&self, snapshot: &ModeSnapshot) {
        self.snapshots.lock_or_recover().push(snapshot.clone());
    }
}

/// One fake per OS surface, wired into a bridge with every capability.
pub(crate) struct FakeHosts {
    pub(crate) background: Arc<FakeBackgroundHost>,
    pub(crate) window: Arc<FakeWindow>,
    pub(crate) affordance: Arc<FakeAffordance>,
    pub(crate) restart: Arc<FakeRestartHost>,
    pub(crate) observer: Arc<RecordingObserver>,
}

impl Default for FakeHosts {
    fn default() -> Self {
        Self {
            background: Arc::new(FakeBackgroundHost::default()),
            window: Arc::new(FakeWindow::default()),
            affordance: Arc::new(FakeAffordance::default()),
            restart: Arc::new(FakeRestartHost::default()),
            observer: Arc::new(RecordingObserver::default()),
        }
    }
}

impl FakeHosts {
    pub(crate) fn background_config() -> BackgroundConfig {
        BackgroundConfig {
            heartbeat_interval: Duration::from_millis(10),
            indicator: Indicator {
                title: "App is running in the background".to_string(),
                body: "Click to return".to_string(),
            },
        }
    }

    pub(crate) fn bridge(&self) -> LifecycleBridge {
        self.bridge_with(Capabilities::ALL)
    }

    pub(crate) fn bridge_with(&self, capabilities: Capabilities) -> LifecycleBridge {
        LifecycleBridge::builder()
            .background(self.background.clone(), Self::background_config())
            .visibility(self.window.clone(), self.affordance.clone())
            .restart(self.restart.clone(), Duration::ZERO)
            .observer(self.observer.clone())
            .build(capabilities)
    }
}
