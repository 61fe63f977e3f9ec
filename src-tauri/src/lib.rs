mod app;
mod bridge;
mod commands;
mod infra;
mod shared;

pub(crate) use app::{app_state, resident};
pub(crate) use infra::{app_paths, settings};

use app_state::BridgeState;
use commands::*;
use std::sync::Arc;
use tauri::Manager;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let builder = tauri::Builder::default();

    #[cfg(mobile)]
    let builder = builder.plugin(tauri_plugin_notification::init());

    let app = builder
        .on_window_event(resident::on_window_event)
        .setup(|app| {
            crate::app::logging::init(app.handle());

            #[cfg(debug_assertions)]
            {
                let identifier = &app.config().identifier;
                tracing::debug!(identifier = %identifier, "[dev] tauri identifier");
                if let Ok(dir) = app_paths::app_data_dir(app.handle()) {
                    tracing::debug!(dir = %dir.display(), "[dev] app data dir");
                }
            }

            let settings = match settings::read(app.handle()) {
                Ok(cfg) => cfg,
                Err(err) => {
                    tracing::warn!("settings read failed, using defaults: {}", err);
                    settings::AppSettings::default()
                }
            };

            let bridge = Arc::new(app_state::build_bridge(app.handle(), &settings));
            if let Err(err) = bridge.install_affordance() {
                tracing::error!(error_code = err.code(), "tray setup failed: {}", err);
            }

            let (channel, _dispatcher) = bridge::channel::start_dispatcher(Arc::clone(&bridge));
            app.manage(BridgeState::new(bridge, channel, &settings));

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            app_mode_invoke,
            app_mode_get,
            settings_get,
            settings_set
        ])
        .build(tauri::generate_context!())
        .expect("error while building tauri application");

    app.run(|app_handle, event| {
        if let tauri::RunEvent::ExitRequested { api, code, .. } = &event {
            // `prevent_exit` is ignored for restart requests.
            if *code != Some(tauri::RESTART_EXIT_CODE) {
                tracing::info!("exit requested, running cleanup");
                api.prevent_exit();

                let app_handle = app_handle.clone();
                tauri::async_runtime::spawn(async move {
                    crate::app::cleanup::cleanup_before_exit(&app_handle).await;
                    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                    std::process::exit(0);
                });
            }
            return;
        }

        #[cfg(target_os = "macos")]
        if let tauri::RunEvent::Reopen {
            has_visible_windows,
            ..
        } = event
        {
            resident::on_reopen(app_handle, has_visible_windows);
        }
    });
}
