//! Usage: Best-effort cleanup hooks for app lifecycle events (exit).

use super::app_state::BridgeState;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tauri::Manager;

static CLEANUP_STARTED: AtomicBool = AtomicBool::new(false);

const STOP_TIMEOUT: Duration = Duration::from_secs(3);

pub(crate) async fn cleanup_before_exit(app: &tauri::AppHandle) {
    if CLEANUP_STARTED.swap(true, Ordering::SeqCst) {
        return;
    }

    stop_background_best_effort(app).await;
}

async fn stop_background_best_effort(app: &tauri::AppHandle) {
    let Some(state) = app.try_state::<BridgeState>() else {
        return;
    };
    let bridge = state.bridge();

    let stop = tauri::async_runtime::spawn_blocking(move || bridge.shutdown_background());
    match tokio::time::timeout(STOP_TIMEOUT, stop).await {
        Ok(Ok(())) => tracing::info!("exit cleanup: background unit stopped"),
        Ok(Err(err)) => tracing::warn!("exit cleanup: background stop task failed: {}", err),
        Err(_) => tracing::warn!("exit cleanup: background stop timed out"),
    }
}
