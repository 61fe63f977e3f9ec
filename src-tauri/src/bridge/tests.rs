use super::background::RearmOutcome;
use super::command::{Command, CommandResult};
use super::mode::{AppMode, Capabilities, Visibility};
use super::testing::FakeHosts;
use std::time::Duration;

fn send(bridge: &super::LifecycleBridge, name: &str) -> CommandResult {
    bridge.dispatch(&Command::new(name, None))
}

#[tokio::test]
async fn desired_state_follows_the_last_start_or_stop() {
    let hosts = FakeHosts::default();
    let bridge = hosts.bridge();

    let script = ["start", "start", "stop", "start", "stop", "stop", "start"];
    for name in script {
        assert!(send(&bridge, name).is_ok());
        let expected = name == "start";
        assert_eq!(bridge.mode().background_running, expected, "after {name}");
        assert_eq!(hosts.background.live_units(), usize::from(expected));

        // Surface removals never change the desired state.
        bridge.on_host_surface_removed();
        assert_eq!(bridge.mode().background_running, expected);
    }
}

#[tokio::test]
async fn repeated_surface_removal_rearms_once() {
    let hosts = FakeHosts::default();
    let bridge = hosts.bridge();
    send(&bridge, "start");

    hosts.background.kill_unit();
    assert_eq!(bridge.on_host_surface_removed(), Some(RearmOutcome::Rearmed));
    assert_eq!(bridge.on_host_surface_removed(), Some(RearmOutcome::StillLive));
    assert_eq!(bridge.on_host_surface_removed(), Some(RearmOutcome::StillLive));

    assert_eq!(hosts.background.created(), 2);
    assert_eq!(hosts.background.live_units(), 1);
    assert!(bridge.mode().background_running);
}

#[tokio::test]
async fn surface_removal_when_stopped_touches_nothing() {
    let hosts = FakeHosts::default();
    let bridge = hosts.bridge();

    assert_eq!(
        bridge.on_host_surface_removed(),
        Some(RearmOutcome::NotDesired)
    );
    assert_eq!(hosts.background.created(), 0);
}

#[tokio::test]
async fn failed_start_reports_and_leaves_mode_unchanged() {
    let hosts = FakeHosts::default();
    hosts.background.fail_create(true);
    let bridge = hosts.bridge();

    let result = send(&bridge, "start");
    assert!(matches!(
        result,
        CommandResult::Failed {
            error_code: "BRIDGE_BACKGROUND_UNIT",
            ..
        }
    ));
    assert_eq!(bridge.mode(), AppMode::default());
    assert!(hosts.observer.snapshots().is_empty());
}

#[test]
fn hide_then_affordance_returns_to_foreground() {
    let hosts = FakeHosts::default();
    let bridge = hosts.bridge();
    bridge.install_affordance().expect("affordance");

    assert_eq!(send(&bridge, "hide"), CommandResult::empty());
    assert_eq!(bridge.mode().visibility, Visibility::Hidden);
    assert!(!hosts.window.visible());

    assert!(bridge.on_affordance_activated().is_ok());
    assert_eq!(bridge.mode().visibility, Visibility::Visible);
    assert!(hosts.window.visible());

    let labels: Vec<&str> = hosts
        .observer
        .snapshots()
        .iter()
        .map(|s| s.mode)
        .collect();
    assert_eq!(labels, vec!["hidden", "foreground"]);
}

#[test]
fn show_twice_stays_foreground_and_publishes_nothing() {
    let hosts = FakeHosts::default();
    let bridge = hosts.bridge();

    assert!(send(&bridge, "show").is_ok());
    assert!(send(&bridge, "showApp").is_ok());
    assert_eq!(bridge.mode().visibility, Visibility::Visible);
    assert!(hosts.observer.snapshots().is_empty());
}

#[test]
fn hide_without_affordance_fails_and_stays_foreground() {
    let hosts = FakeHosts::default();
    hosts.affordance.fail_attach(true);
    let bridge = hosts.bridge();

    assert!(bridge.install_affordance().is_err());
    let result = send(&bridge, "hide");
    assert!(matches!(
        result,
        CommandResult::Failed {
            error_code: "BRIDGE_AFFORDANCE",
            ..
        }
    ));
    assert_eq!(bridge.mode().visibility, Visibility::Visible);
    assert!(hosts.window.visible());
}

#[test]
fn close_request_becomes_hide() {
    let hosts = FakeHosts::default();
    let bridge = hosts.bridge();

    assert!(bridge.on_close_requested().is_ok());
    assert_eq!(bridge.mode().visibility, Visibility::Hidden);
}

#[test]
fn restart_schedules_before_termination() {
    let hosts = FakeHosts::default();
    let bridge = hosts.bridge();

    assert_eq!(send(&bridge, "restartApp"), CommandResult::ok(true));
    hosts.restart.wait_terminated(Duration::from_secs(2));
    assert_eq!(
        hosts.restart.calls(),
        vec!["schedule_relaunch", "close_surface", "terminate"]
    );
}

#[test]
fn missing_capability_is_unimplemented() {
    let hosts = FakeHosts::default();
    let bridge = hosts.bridge_with(Capabilities {
        background: true,
        visibility: false,
        restart: false,
    });

    assert_eq!(send(&bridge, "hide"), CommandResult::unimplemented("hide"));
    assert_eq!(
        send(&bridge, "restart"),
        CommandResult::unimplemented("restart")
    );
    assert!(!bridge.capabilities().visibility);
    assert_eq!(hosts.window.hide_calls(), 0);
    assert!(hosts.restart.calls().is_empty());
}

#[test]
fn affordance_without_visibility_controller_is_a_noop() {
    let hosts = FakeHosts::default();
    let bridge = hosts.bridge_with(Capabilities {
        background: true,
        visibility: false,
        restart: false,
    });

    assert_eq!(bridge.on_affordance_activated(), CommandResult::empty());
    assert_eq!(bridge.mode(), AppMode::default());
    assert_eq!(hosts.window.show_calls(), 0);
    assert!(hosts.observer.snapshots().is_empty());
}

#[tokio::test]
async fn visibility_and_background_are_independent() {
    let hosts = FakeHosts::default();
    let bridge = hosts.bridge();

    send(&bridge, "start");
    send(&bridge, "hide");
    assert_eq!(
        bridge.mode(),
        AppMode {
            visibility: Visibility::Hidden,
            background_running: true,
        }
    );
    assert_eq!(bridge.snapshot().mode, "background_active");

    send(&bridge, "show");
    assert!(bridge.mode().background_running);
    assert_eq!(bridge.mode().visibility, Visibility::Visible);

    bridge.shutdown_background();
    assert!(!bridge.mode().background_running);
    assert_eq!(hosts.background.live_units(), 0);
}

mod panicking {
    use super::super::background::{BackgroundHost, Indicator, RearmOutcome};
    use super::super::command::Command;
    use super::super::errors::BridgeError;
    use super::super::mode::Capabilities;
    use super::super::LifecycleBridge;
    use super::FakeHosts;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    struct PanickingHost;

    impl BackgroundHost for PanickingHost {
        fn create_unit(&self, _indicator: &Indicator) -> Result<(), String> {
            panic!("host exploded");
        }
        fn destroy_unit(&self) {}
        fn unit_alive(&self) -> bool {
            false
        }
        fn heartbeat(&self, _beat: u64) {}
    }

    #[test]
    fn handler_panic_becomes_failed_result_and_bridge_keeps_working() {
        let bridge = LifecycleBridge::builder()
            .background(Arc::new(PanickingHost), FakeHosts::background_config())
            .build(Capabilities::ALL);

        let result = bridge.dispatch(&Command::new("start", None));
        match result {
            super::CommandResult::Failed {
                error_code,
                message,
            } => {
                assert_eq!(error_code, "BRIDGE_INTERNAL");
                assert!(message.contains("host exploded"));
            }
            other => panic!("unexpected result: {other:?}"),
        }

        // The poisoned lock is recovered for the next command.
        let result = bridge.dispatch(&Command::new("stop", None));
        assert!(result.is_ok());
    }

    #[derive(Default)]
    struct FlakyHost {
        panic_create: AtomicBool,
        alive: AtomicBool,
    }

    impl BackgroundHost for FlakyHost {
        fn create_unit(&self, _indicator: &Indicator) -> Result<(), String> {
            if self.panic_create.load(Ordering::SeqCst) {
                panic!("create exploded");
            }
            self.alive.store(true, Ordering::SeqCst);
            Ok(())
        }
        fn destroy_unit(&self) {
            self.alive.store(false, Ordering::SeqCst);
        }
        fn unit_alive(&self) -> bool {
            self.alive.load(Ordering::SeqCst)
        }
        fn heartbeat(&self, _beat: u64) {}
    }

    fn flaky_bridge(host: &Arc<FlakyHost>) -> LifecycleBridge {
        LifecycleBridge::builder()
            .background(host.clone(), FakeHosts::background_config())
            .build(Capabilities::ALL)
    }

    #[tokio::test]
    async fn start_that_unwinds_is_not_rearmed_later() {
        let host = Arc::new(FlakyHost::default());
        host.panic_create.store(true, Ordering::SeqCst);
        let bridge = flaky_bridge(&host);

        let result = bridge.dispatch(&Command::new("start", None));
        assert!(matches!(
            result,
            super::CommandResult::Failed {
                error_code: "BRIDGE_INTERNAL",
                ..
            }
        ));
        assert!(!bridge.mode().background_running);

        host.panic_create.store(false, Ordering::SeqCst);
        assert_eq!(
            bridge.on_host_surface_removed(),
            Some(RearmOutcome::NotDesired)
        );
        assert!(!bridge.mode().background_running);
        assert!(!host.unit_alive());

        let result = bridge.dispatch(&Command::new("start", None));
        assert_eq!(result, super::CommandResult::ok("Service Started"));
        assert!(bridge.mode().background_running);
    }

    #[tokio::test]
    async fn rearm_that_unwinds_is_reported_and_clears_running() {
        let host = Arc::new(FlakyHost::default());
        let bridge = flaky_bridge(&host);
        assert!(bridge.dispatch(&Command::new("start", None)).is_ok());

        host.alive.store(false, Ordering::SeqCst);
        host.panic_create.store(true, Ordering::SeqCst);
        match bridge.on_host_surface_removed() {
            Some(RearmOutcome::Failed(err @ BridgeError::Internal { .. })) => {
                assert_eq!(err.code(), "BRIDGE_INTERNAL");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(!bridge.mode().background_running);
        assert_eq!(bridge.snapshot().mode, "foreground");
    }
}

mod main_thread_reads {
    use super::super::background::{BackgroundHost, Indicator};
    use super::super::command::Command;
    use super::super::mode::{AppMode, Capabilities};
    use super::super::LifecycleBridge;
    use super::FakeHosts;
    use std::sync::{Arc, Barrier};

    /// Blocks inside `create_unit` the way a tray call waits on the main thread.
    struct GatedHost {
        gate: Arc<Barrier>,
    }

    impl BackgroundHost for GatedHost {
        fn create_unit(&self, _indicator: &Indicator) -> Result<(), String> {
            self.gate.wait();
            self.gate.wait();
            Ok(())
        }
        fn destroy_unit(&self) {}
        fn unit_alive(&self) -> bool {
            true
        }
        fn heartbeat(&self, _beat: u64) {}
    }

    #[test]
    fn mode_query_does_not_wait_for_a_command_in_flight() {
        let gate = Arc::new(Barrier::new(2));
        let bridge = Arc::new(
            LifecycleBridge::builder()
                .background(
                    Arc::new(GatedHost { gate: gate.clone() }),
                    FakeHosts::background_config(),
                )
                .build(Capabilities::ALL),
        );

        let worker = {
            let bridge = bridge.clone();
            std::thread::spawn(move || bridge.dispatch(&Command::new("start", None)))
        };

        // The worker now holds the bridge inside a host call.
        gate.wait();
        assert_eq!(bridge.mode(), AppMode::default());
        assert_eq!(bridge.snapshot().mode, "foreground");
        gate.wait();

        assert!(worker.join().expect("join").is_ok());
        assert!(bridge.mode().background_running);
    }
}
