//! Usage: Process relaunch host for `restart` (spawn a fresh instance, then tear this one down).

use super::resident::MAIN_WINDOW_LABEL;
use crate::bridge::restart::RestartHost;
use std::process::Stdio;
use tauri::Manager;

pub(crate) struct ProcessRelauncher {
    app: tauri::AppHandle,
}

impl ProcessRelauncher {
    pub(crate) fn new(app: tauri::AppHandle) -> Self {
        Self { app }
    }
}

impl RestartHost for ProcessRelauncher {
    fn schedule_relaunch(&self) -> Result<(), String> {
        let binary = tauri::process::current_binary(&self.app.env())
            .map_err(|e| format!("failed to resolve current binary: {e}"))?;

        let child = std::process::Command::new(&binary)
            .args(std::env::args_os().skip(1))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| format!("failed to spawn {}: {e}", binary.display()))?;

        tracing::info!(pid = child.id(), binary = %binary.display(), "relaunch scheduled");
        Ok(())
    }

    fn close_surface(&self) {
        if let Some(window) = self.app.get_webview_window(MAIN_WINDOW_LABEL) {
            if let Err(err) = window.destroy() {
                tracing::warn!("failed to destroy main window before restart: {}", err);
            }
        }
    }

    fn terminate(&self) {
        tracing::info!("terminating for restart");
        std::process::exit(0);
    }
}
