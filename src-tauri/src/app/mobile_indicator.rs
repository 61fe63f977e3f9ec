//! Usage: Persistent "running in background" notification on mobile targets.

use crate::bridge::background::Indicator;
use tauri::plugin::PermissionState;
use tauri_plugin_notification::NotificationExt;

const INDICATOR_NOTIFICATION_ID: i32 = 7_001;

fn ensure_permission(app: &tauri::AppHandle) -> Result<(), String> {
    let notification = app.notification();
    let state = notification
        .permission_state()
        .map_err(|e| format!("failed to query notification permission: {e}"))?;
    if state == PermissionState::Granted {
        return Ok(());
    }

    match notification
        .request_permission()
        .map_err(|e| format!("failed to request notification permission: {e}"))?
    {
        PermissionState::Granted => Ok(()),
        other => Err(format!("notification permission {other}")),
    }
}

/// Post the ongoing indicator. Without notification permission there is no indicator,
/// so the unit is refused.
pub(crate) fn show(app: &tauri::AppHandle, indicator: &Indicator) -> Result<(), String> {
    ensure_permission(app)?;

    app.notification()
        .builder()
        .id(INDICATOR_NOTIFICATION_ID)
        .title(&indicator.title)
        .body(&indicator.body)
        .ongoing()
        .show()
        .map_err(|e| format!("failed to show background indicator: {e}"))
}

pub(crate) fn clear(app: &tauri::AppHandle) {
    if let Err(err) = app
        .notification()
        .remove_active(vec![INDICATOR_NOTIFICATION_ID])
    {
        tracing::warn!("failed to remove background indicator: {}", err);
    }
}
