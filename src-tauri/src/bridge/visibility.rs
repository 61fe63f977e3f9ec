//! Usage: Window visibility controller (main window + tray affordance as the reentry point).

use super::errors::BridgeError;
use std::sync::Arc;

pub(crate) trait WindowHost: Send + Sync {
    /// Bring the window to front with normal activation.
    fn show(&self) -> Result<(), String>;
    /// Make the window invisible and non-interactive.
    fn hide(&self) -> Result<(), String>;
}

/// The always-reachable entry point (tray icon + menu).
pub(crate) trait AffordanceHost: Send + Sync {
    /// Create the affordance, or re-attach it; a no-op once attached.
    fn attach(&self) -> Result<(), String>;
    fn is_attached(&self) -> bool;
}

pub(crate) struct VisibilityController {
    window: Arc<dyn WindowHost>,
    affordance: Arc<dyn AffordanceHost>,
}

impl VisibilityController {
    pub(crate) fn new(window: Arc<dyn WindowHost>, affordance: Arc<dyn AffordanceHost>) -> Self {
        Self { window, affordance }
    }

    /// Create the affordance once at startup. Failure is not fatal: `hide` retries.
    pub(crate) fn install_affordance(&self) -> Result<(), BridgeError> {
        self.affordance.attach().map_err(BridgeError::Affordance)
    }

    pub(crate) fn show(&self) -> Result<(), BridgeError> {
        self.window.show().map_err(BridgeError::Window)
    }

    /// Hide the window. Refuses (and re-shows the window) when no affordance can be
    /// attached, since the app would otherwise be unreachable.
    pub(crate) fn hide(&self) -> Result<(), BridgeError> {
        if !self.affordance.is_attached() {
            if let Err(err) = self.affordance.attach() {
                self.revert_to_foreground();
                return Err(BridgeError::Affordance(err));
            }
        }

        if let Err(err) = self.window.hide() {
            self.revert_to_foreground();
            return Err(BridgeError::Window(err));
        }

        Ok(())
    }

    fn revert_to_foreground(&self) {
        if let Err(err) = self.window.show() {
            tracing::warn!("failed to restore window after aborted hide: {}", err);
        }
    }
}
