//! Usage: Resident mode (tray affordance, main window host, window lifecycle hooks).
//!
//! Tray and window callbacks arrive on the main thread. They never take the bridge lock
//! there: the work is handed to a blocking worker, because bridge-held OS calls (tray
//! tooltip, tray creation) wait on the main thread themselves.

use super::app_state::BridgeState;
use std::sync::Arc;
use tauri::Manager;

pub(crate) const MAIN_WINDOW_LABEL: &str = "main";

fn bridge_of(app: &tauri::AppHandle) -> Option<Arc<crate::bridge::LifecycleBridge>> {
    app.try_state::<BridgeState>().map(|state| state.bridge())
}

/// Dock reopen (macOS): re-arm the background unit, and bring the window back when none is visible.
#[cfg(target_os = "macos")]
pub(crate) fn on_reopen(app: &tauri::AppHandle, has_visible_windows: bool) {
    let Some(bridge) = bridge_of(app) else {
        return;
    };
    tauri::async_runtime::spawn_blocking(move || {
        bridge.on_host_surface_removed();
        if has_visible_windows {
            return;
        }
        let result = bridge.on_affordance_activated();
        if !result.is_ok() {
            tracing::warn!(result = ?result, "reopen activation failed");
        }
    });
}

pub(crate) fn on_window_event(window: &tauri::Window, event: &tauri::WindowEvent) {
    if window.label() != MAIN_WINDOW_LABEL {
        return;
    }
    let app = window.app_handle().clone();

    match event {
        #[cfg(desktop)]
        tauri::WindowEvent::CloseRequested { api, .. } => {
            let Some(state) = app.try_state::<BridgeState>() else {
                return;
            };
            if !state.close_to_tray() {
                return;
            }

            api.prevent_close();
            let bridge = state.bridge();
            tauri::async_runtime::spawn_blocking(move || {
                let result = bridge.on_close_requested();
                if result.is_ok() {
                    return;
                }
                // Hiding would leave the app unreachable; let the close go through.
                tracing::warn!(result = ?result, "close-to-tray refused, closing main window");
                if let Some(window) = app.get_webview_window(MAIN_WINDOW_LABEL) {
                    let _ = window.destroy();
                }
            });
        }
        tauri::WindowEvent::Destroyed => {
            let Some(bridge) = bridge_of(&app) else {
                return;
            };
            tauri::async_runtime::spawn_blocking(move || {
                bridge.on_host_surface_removed();
            });
        }
        _ => {}
    }
}

#[cfg(desktop)]
pub(crate) use desktop::{set_tray_indicator, MainWindow, TrayAffordance};

#[cfg(desktop)]
mod desktop {
    use super::{bridge_of, MAIN_WINDOW_LABEL};
    use crate::bridge::background::Indicator;
    use crate::bridge::visibility::{AffordanceHost, WindowHost};
    use tauri::menu::{Menu, MenuItem, PredefinedMenuItem};
    use tauri::tray::{MouseButton, MouseButtonState, TrayIconBuilder, TrayIconEvent};
    use tauri::Manager;

    const TRAY_ID: &str = "main-tray";
    const TRAY_TOOLTIP: &str = "App Shell";
    const TRAY_MENU_SHOW_ID: &str = "tray.show";
    const TRAY_MENU_HIDE_ID: &str = "tray.hide";
    const TRAY_MENU_QUIT_ID: &str = "tray.quit";

    /// Show the main window from the tray (left click or `Show`).
    fn activate_from_affordance(app: &tauri::AppHandle) {
        let Some(bridge) = bridge_of(app) else {
            return;
        };
        tauri::async_runtime::spawn_blocking(move || {
            let result = bridge.on_affordance_activated();
            if !result.is_ok() {
                tracing::warn!(result = ?result, "affordance activation failed");
            }
        });
    }

    fn hide_from_tray(app: &tauri::AppHandle) {
        let Some(bridge) = bridge_of(app) else {
            return;
        };
        tauri::async_runtime::spawn_blocking(move || {
            let result = bridge.on_close_requested();
            if !result.is_ok() {
                tracing::warn!(result = ?result, "hide from tray failed");
            }
        });
    }

    fn setup_tray(app: &tauri::AppHandle) -> Result<(), String> {
        let show_item = MenuItem::with_id(app, TRAY_MENU_SHOW_ID, "Show", true, None::<&str>)
            .map_err(|e| format!("failed to create tray show menu item: {e}"))?;
        let hide_item = MenuItem::with_id(app, TRAY_MENU_HIDE_ID, "Hide", true, None::<&str>)
            .map_err(|e| format!("failed to create tray hide menu item: {e}"))?;
        let quit_item = MenuItem::with_id(app, TRAY_MENU_QUIT_ID, "Quit", true, Some("CmdOrCtrl+Q"))
            .map_err(|e| format!("failed to create tray quit menu item: {e}"))?;
        let separator = PredefinedMenuItem::separator(app)
            .map_err(|e| format!("failed to create tray menu separator: {e}"))?;

        let menu = Menu::with_items(app, &[&show_item, &hide_item, &separator, &quit_item])
            .map_err(|e| format!("failed to create tray menu: {e}"))?;

        let show_id = show_item.id().clone();
        let hide_id = hide_item.id().clone();
        let quit_id = quit_item.id().clone();

        let icon = tauri::image::Image::from_bytes(include_bytes!("../../icons/32x32.png"))
            .map_err(|e| format!("failed to load tray icon: {e}"))?;

        TrayIconBuilder::with_id(TRAY_ID)
            .icon(icon)
            .tooltip(TRAY_TOOLTIP)
            .menu(&menu)
            .show_menu_on_left_click(false)
            .on_menu_event(move |app, event| {
                if event.id == quit_id {
                    app.exit(0);
                    return;
                }
                if event.id == show_id {
                    activate_from_affordance(app);
                    return;
                }
                if event.id == hide_id {
                    hide_from_tray(app);
                }
            })
            .on_tray_icon_event(|tray, event| {
                if let TrayIconEvent::Click {
                    button,
                    button_state,
                    ..
                } = event
                {
                    if button == MouseButton::Left && button_state == MouseButtonState::Up {
                        activate_from_affordance(tray.app_handle());
                    }
                }
            })
            .build(app)
            .map_err(|e| format!("failed to build tray icon: {e}"))?;

        Ok(())
    }

    /// Reflect the background indicator in the tray tooltip. No tray, no indicator.
    pub(crate) fn set_tray_indicator(app: &tauri::AppHandle, indicator: Option<&Indicator>) {
        let Some(tray) = app.tray_by_id(TRAY_ID) else {
            return;
        };
        let tooltip = match indicator {
            Some(indicator) => format!("{TRAY_TOOLTIP} · {} · {}", indicator.title, indicator.body),
            None => TRAY_TOOLTIP.to_string(),
        };
        if let Err(err) = tray.set_tooltip(Some(tooltip)) {
            tracing::warn!("failed to update tray tooltip: {}", err);
        }
    }

    pub(crate) struct TrayAffordance {
        app: tauri::AppHandle,
    }

    impl TrayAffordance {
        pub(crate) fn new(app: tauri::AppHandle) -> Self {
            Self { app }
        }
    }

    impl AffordanceHost for TrayAffordance {
        fn attach(&self) -> Result<(), String> {
            if self.is_attached() {
                return Ok(());
            }
            setup_tray(&self.app)
        }

        fn is_attached(&self) -> bool {
            self.app.tray_by_id(TRAY_ID).is_some()
        }
    }

    pub(crate) struct MainWindow {
        app: tauri::AppHandle,
    }

    impl MainWindow {
        pub(crate) fn new(app: tauri::AppHandle) -> Self {
            Self { app }
        }

        fn window(&self) -> Result<tauri::WebviewWindow, String> {
            self.app
                .get_webview_window(MAIN_WINDOW_LABEL)
                .ok_or_else(|| format!("window `{MAIN_WINDOW_LABEL}` not found"))
        }
    }

    impl WindowHost for MainWindow {
        fn show(&self) -> Result<(), String> {
            #[cfg(target_os = "macos")]
            if let Err(err) = self
                .app
                .set_activation_policy(tauri::ActivationPolicy::Regular)
            {
                tracing::warn!("failed to restore regular activation policy: {}", err);
            }

            let window = self.window()?;
            window
                .show()
                .map_err(|e| format!("failed to show main window: {e}"))?;
            let _ = window.unminimize();
            let _ = window.set_focus();
            Ok(())
        }

        fn hide(&self) -> Result<(), String> {
            let window = self.window()?;
            window
                .hide()
                .map_err(|e| format!("failed to hide main window: {e}"))?;

            // Drop the dock icon while hidden; the tray stays as the way back.
            #[cfg(target_os = "macos")]
            if let Err(err) = self
                .app
                .set_activation_policy(tauri::ActivationPolicy::Accessory)
            {
                tracing::warn!("failed to switch to accessory activation policy: {}", err);
            }
            Ok(())
        }
    }
}
