//! Usage: Tauri-managed bridge state and the wiring of platform hosts into the bridge.

use super::background_host::ShellBackgroundHost;
use super::events::ModeEventEmitter;
use crate::bridge::channel::CommandChannel;
use crate::bridge::mode::Capabilities;
use crate::bridge::LifecycleBridge;
use crate::settings::AppSettings;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub(crate) struct BridgeState {
    bridge: Arc<LifecycleBridge>,
    channel: CommandChannel,
    close_to_tray: AtomicBool,
}

impl BridgeState {
    pub(crate) fn new(
        bridge: Arc<LifecycleBridge>,
        channel: CommandChannel,
        settings: &AppSettings,
    ) -> Self {
        Self {
            bridge,
            channel,
            close_to_tray: AtomicBool::new(settings.close_to_tray),
        }
    }

    pub(crate) fn bridge(&self) -> Arc<LifecycleBridge> {
        Arc::clone(&self.bridge)
    }

    pub(crate) fn channel(&self) -> &CommandChannel {
        &self.channel
    }

    pub(crate) fn close_to_tray(&self) -> bool {
        self.close_to_tray.load(Ordering::Relaxed)
    }

    pub(crate) fn set_close_to_tray(&self, enabled: bool) {
        self.close_to_tray.store(enabled, Ordering::Relaxed);
    }
}

pub(crate) fn build_bridge(app: &tauri::AppHandle, settings: &AppSettings) -> LifecycleBridge {
    let builder = LifecycleBridge::builder()
        .background(
            Arc::new(ShellBackgroundHost::new(app.clone())),
            settings.background_config(),
        )
        .observer(Arc::new(ModeEventEmitter::new(app.clone())));

    #[cfg(desktop)]
    let builder = builder
        .visibility(
            Arc::new(super::resident::MainWindow::new(app.clone())),
            Arc::new(super::resident::TrayAffordance::new(app.clone())),
        )
        .restart(
            Arc::new(super::relaunch::ProcessRelauncher::new(app.clone())),
            settings.restart_grace(),
        );

    let capabilities = Capabilities::for_current_target();
    let bridge = builder.build(capabilities);
    tracing::info!(capabilities = ?bridge.capabilities(), "lifecycle bridge ready");
    bridge
}
