//! Usage: Application mode model (visibility x background) and per-target capabilities.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Visibility {
    Visible,
    Hidden,
}

/// Logical application mode.
///
/// Visibility and background execution are independent axes; `background_running`
/// tracks the desired state of the background controller, not what the OS last reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) struct AppMode {
    pub(crate) visibility: Visibility,
    pub(crate) background_running: bool,
}

impl Default for AppMode {
    fn default() -> Self {
        Self {
            visibility: Visibility::Visible,
            background_running: false,
        }
    }
}

impl AppMode {
    /// Single-word view for UIs that only want one mode.
    pub(crate) fn label(&self) -> &'static str {
        if self.background_running {
            return "background_active";
        }
        match self.visibility {
            Visibility::Visible => "foreground",
            Visibility::Hidden => "hidden",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) struct Capabilities {
    pub(crate) background: bool,
    pub(crate) visibility: bool,
    pub(crate) restart: bool,
}

impl Capabilities {
    pub(crate) const ALL: Self = Self {
        background: true,
        visibility: true,
        restart: true,
    };

    /// Desktop gets tray, window and relaunch; mobile targets only keep background execution.
    pub(crate) fn for_current_target() -> Self {
        if cfg!(any(target_os = "android", target_os = "ios")) {
            return Self {
                background: true,
                visibility: false,
                restart: false,
            };
        }
        Self::ALL
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ModeSnapshot {
    pub(crate) mode: &'static str,
    pub(crate) visibility: Visibility,
    pub(crate) background_running: bool,
    pub(crate) capabilities: Capabilities,
}

impl ModeSnapshot {
    pub(crate) fn new(mode: AppMode, capabilities: Capabilities) -> Self {
        Self {
            mode: mode.label(),
            visibility: mode.visibility,
            background_running: mode.background_running,
            capabilities,
        }
    }
}
