//! Usage: Persisted application settings (schema + read/write helpers).

use crate::app_paths;
use crate::bridge::background::{BackgroundConfig, Indicator};
use crate::shared::fs::{read_optional_file, write_file_atomic};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const SCHEMA_VERSION: u32 = 2;
const SCHEMA_VERSION_ADD_INDICATOR_TEXT: u32 = 2;
pub const DEFAULT_HEARTBEAT_INTERVAL_SECONDS: u32 = 5;
const MAX_HEARTBEAT_INTERVAL_SECONDS: u32 = 60 * 60;
pub const DEFAULT_RESTART_GRACE_MS: u32 = 200;
const MAX_RESTART_GRACE_MS: u32 = 5_000;
const DEFAULT_CLOSE_TO_TRAY: bool = true;
const DEFAULT_INDICATOR_TITLE: &str = "App is running in the background";
const DEFAULT_INDICATOR_BODY: &str = "Click to return to the app";
const SETTINGS_FILE_NAME: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub schema_version: u32,
    pub heartbeat_interval_seconds: u32,
    pub restart_grace_ms: u32,
    // Main window close hides to tray instead of closing (desktop only).
    pub close_to_tray: bool,
    // Persistent indicator text while background execution runs.
    pub indicator_title: String,
    pub indicator_body: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            heartbeat_interval_seconds: DEFAULT_HEARTBEAT_INTERVAL_SECONDS,
            restart_grace_ms: DEFAULT_RESTART_GRACE_MS,
            close_to_tray: DEFAULT_CLOSE_TO_TRAY,
            indicator_title: DEFAULT_INDICATOR_TITLE.to_string(),
            indicator_body: DEFAULT_INDICATOR_BODY.to_string(),
        }
    }
}

impl AppSettings {
    pub(crate) fn background_config(&self) -> BackgroundConfig {
        BackgroundConfig {
            heartbeat_interval: Duration::from_secs(u64::from(
                self.heartbeat_interval_seconds.max(1),
            )),
            indicator: Indicator {
                title: self.indicator_title.clone(),
                body: self.indicator_body.clone(),
            },
        }
    }

    pub(crate) fn restart_grace(&self) -> Duration {
        Duration::from_millis(u64::from(self.restart_grace_ms.min(MAX_RESTART_GRACE_MS)))
    }
}

fn sanitize_heartbeat_interval(settings: &mut AppSettings) -> bool {
    if settings.heartbeat_interval_seconds == 0 {
        settings.heartbeat_interval_seconds = DEFAULT_HEARTBEAT_INTERVAL_SECONDS;
        return true;
    }
    if settings.heartbeat_interval_seconds > MAX_HEARTBEAT_INTERVAL_SECONDS {
        settings.heartbeat_interval_seconds = MAX_HEARTBEAT_INTERVAL_SECONDS;
        return true;
    }
    false
}

fn sanitize_restart_grace(settings: &mut AppSettings) -> bool {
    if settings.restart_grace_ms > MAX_RESTART_GRACE_MS {
        settings.restart_grace_ms = MAX_RESTART_GRACE_MS;
        return true;
    }
    false
}

fn sanitize_indicator_text(settings: &mut AppSettings) -> bool {
    let mut changed = false;

    if settings.indicator_title.trim().is_empty() {
        settings.indicator_title = DEFAULT_INDICATOR_TITLE.to_string();
        changed = true;
    }
    if settings.indicator_body.trim().is_empty() {
        settings.indicator_body = DEFAULT_INDICATOR_BODY.to_string();
        changed = true;
    }

    changed
}

fn migrate_add_indicator_text(settings: &mut AppSettings, schema_version_present: bool) -> bool {
    // v2: indicator title/body became configurable; older files carry neither.
    if schema_version_present && settings.schema_version >= SCHEMA_VERSION_ADD_INDICATOR_TEXT {
        return false;
    }

    // A missing schema_version forces one write so the migration doesn't rerun every startup.
    let mut changed = !schema_version_present;

    if settings.schema_version != SCHEMA_VERSION_ADD_INDICATOR_TEXT {
        settings.schema_version = SCHEMA_VERSION_ADD_INDICATOR_TEXT;
        changed = true;
    }

    changed
}

fn repair(settings: &mut AppSettings, schema_version_present: bool) -> bool {
    let mut repaired = false;
    repaired |= migrate_add_indicator_text(settings, schema_version_present);
    repaired |= sanitize_heartbeat_interval(settings);
    repaired |= sanitize_restart_grace(settings);
    repaired |= sanitize_indicator_text(settings);
    repaired
}

fn validate(settings: &AppSettings) -> Result<(), String> {
    if settings.heartbeat_interval_seconds == 0 {
        return Err("heartbeat_interval_seconds must be >= 1".to_string());
    }
    if settings.heartbeat_interval_seconds > MAX_HEARTBEAT_INTERVAL_SECONDS {
        return Err(format!(
            "heartbeat_interval_seconds must be <= {MAX_HEARTBEAT_INTERVAL_SECONDS}"
        ));
    }
    if settings.restart_grace_ms > MAX_RESTART_GRACE_MS {
        return Err(format!("restart_grace_ms must be <= {MAX_RESTART_GRACE_MS}"));
    }
    if settings.indicator_title.trim().is_empty() {
        return Err("indicator_title must not be empty".to_string());
    }
    if settings.indicator_body.trim().is_empty() {
        return Err("indicator_body must not be empty".to_string());
    }
    Ok(())
}

fn parse_settings_json(content: &[u8]) -> Result<(AppSettings, bool), String> {
    let raw: serde_json::Value = serde_json::from_slice(content)
        .map_err(|e| format!("failed to parse settings.json: {e}"))?;
    let schema_version_present = raw.get("schema_version").is_some();
    let settings: AppSettings =
        serde_json::from_value(raw).map_err(|e| format!("failed to parse settings.json: {e}"))?;
    Ok((settings, schema_version_present))
}

fn settings_path(app: &tauri::AppHandle) -> Result<PathBuf, String> {
    Ok(app_paths::app_data_dir(app)?.join(SETTINGS_FILE_NAME))
}

pub(crate) fn read_from(path: &Path) -> Result<AppSettings, String> {
    let Some(content) = read_optional_file(path)? else {
        let settings = AppSettings::default();
        // Best-effort: create default settings.json on first read to make the config discoverable/editable.
        let _ = write_to(path, &settings);
        return Ok(settings);
    };

    let (mut settings, schema_version_present) = parse_settings_json(&content)?;
    if repair(&mut settings, schema_version_present) {
        // Best-effort: persist repaired values while keeping read semantics.
        let _ = write_to(path, &settings);
    }

    Ok(settings)
}

pub(crate) fn write_to(path: &Path, settings: &AppSettings) -> Result<AppSettings, String> {
    validate(settings)?;

    let mut settings = settings.clone();
    settings.schema_version = SCHEMA_VERSION;

    let content = serde_json::to_vec_pretty(&settings)
        .map_err(|e| format!("failed to serialize settings: {e}"))?;
    write_file_atomic(path, &content)?;

    Ok(settings)
}

pub fn read(app: &tauri::AppHandle) -> Result<AppSettings, String> {
    read_from(&settings_path(app)?)
}

pub fn write(app: &tauri::AppHandle, settings: &AppSettings) -> Result<AppSettings, String> {
    write_to(&settings_path(app)?, settings)
}
