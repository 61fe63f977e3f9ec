//! Usage: Settings commands (read / persist `settings.json`).

use crate::app_state::BridgeState;
use crate::settings::{self, AppSettings};

#[tauri::command]
pub(crate) async fn settings_get(app: tauri::AppHandle) -> Result<AppSettings, String> {
    tauri::async_runtime::spawn_blocking(move || settings::read(&app))
        .await
        .map_err(|e| format!("SETTINGS_TASK_JOIN: {e}"))?
}

/// Persist new settings. `close_to_tray` applies immediately; the rest takes effect on next launch.
#[tauri::command]
pub(crate) async fn settings_set(
    app: tauri::AppHandle,
    state: tauri::State<'_, BridgeState>,
    settings: AppSettings,
) -> Result<AppSettings, String> {
    let saved = tauri::async_runtime::spawn_blocking(move || settings::write(&app, &settings))
        .await
        .map_err(|e| format!("SETTINGS_TASK_JOIN: {e}"))??;

    state.set_close_to_tray(saved.close_to_tray);
    tracing::info!(close_to_tray = saved.close_to_tray, "settings saved");
    Ok(saved)
}
