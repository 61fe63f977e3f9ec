//! Usage: UI-facing `#[tauri::command]`s, re-exported for `generate_handler!`.

mod app_mode;
mod settings;

pub(crate) use app_mode::*;
pub(crate) use settings::*;
