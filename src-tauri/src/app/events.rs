//! Events pushed to the UI (mode changes, background status, heartbeat).
//!
//! Usage:
//! - Frontend: `listen("app_mode:changed", ...)` to keep its view of the mode current
//! - Rust: the bridge publishes through [`ModeEventEmitter`]; background hosts call `emit_*`

use crate::bridge::background::Indicator;
use crate::bridge::mode::ModeSnapshot;
use crate::bridge::ModeObserver;
use tauri::Emitter;

pub(crate) const APP_MODE_CHANGED_EVENT: &str = "app_mode:changed";
pub(crate) const BACKGROUND_STATUS_EVENT: &str = "background:status";
pub(crate) const BACKGROUND_HEARTBEAT_EVENT: &str = "background:heartbeat";

#[derive(Debug, Clone, serde::Serialize)]
pub(crate) struct BackgroundStatusPayload {
    pub running: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl BackgroundStatusPayload {
    pub(crate) fn running(indicator: &Indicator) -> Self {
        Self {
            running: true,
            title: Some(indicator.title.clone()),
            body: Some(indicator.body.clone()),
        }
    }

    pub(crate) fn stopped() -> Self {
        Self {
            running: false,
            title: None,
            body: None,
        }
    }
}

#[derive(Debug, Clone, Copy, serde::Serialize)]
pub(crate) struct HeartbeatPayload {
    pub beat: u64,
}

pub(crate) fn emit_background_status(
    app: &tauri::AppHandle,
    payload: BackgroundStatusPayload,
) -> Result<(), String> {
    app.emit(BACKGROUND_STATUS_EVENT, payload)
        .map_err(|e| format!("BACKGROUND_STATUS_EMIT: {e}"))
}

pub(crate) fn emit_heartbeat(app: &tauri::AppHandle, beat: u64) -> Result<(), String> {
    app.emit(BACKGROUND_HEARTBEAT_EVENT, HeartbeatPayload { beat })
        .map_err(|e| format!("BACKGROUND_HEARTBEAT_EMIT: {e}"))
}

pub(crate) struct ModeEventEmitter {
    app: tauri::AppHandle,
}

impl ModeEventEmitter {
    pub(crate) fn new(app: tauri::AppHandle) -> Self {
        Self { app }
    }
}

impl ModeObserver for ModeEventEmitter {
    fn mode_changed(&self, snapshot: &ModeSnapshot) {
        if let Err(err) = self.app.emit(APP_MODE_CHANGED_EVENT, snapshot.clone()) {
            tracing::warn!("APP_MODE_EMIT: {}", err);
        }
    }
}
