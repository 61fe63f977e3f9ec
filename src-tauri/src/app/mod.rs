//! Usage: Application layer (Tauri-managed state, tray/window lifecycle, platform hosts, startup wiring).

pub(crate) mod app_state;
pub(crate) mod background_host;
pub(crate) mod cleanup;
pub(crate) mod events;
pub(crate) mod logging;
#[cfg(mobile)]
pub(crate) mod mobile_indicator;
#[cfg(desktop)]
pub(crate) mod relaunch;
pub(crate) mod resident;
