//! Usage: Bridge error taxonomy and the stable error codes surfaced to the UI.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum BridgeError {
    /// The OS-level background unit could not be created.
    #[error("failed to create background unit: {0}")]
    BackgroundUnit(String),

    /// The tray affordance could not be created or attached.
    #[error("tray affordance unavailable: {0}")]
    Affordance(String),

    #[error("window operation failed: {0}")]
    Window(String),

    /// Scheduling the replacement process failed; the current process keeps running.
    #[error("failed to schedule relaunch: {0}")]
    Relaunch(String),

    /// A handler panicked; caught at the dispatch boundary.
    #[error("internal fault while handling `{command}`: {reason}")]
    Internal { command: String, reason: String },

    #[error("command channel closed")]
    ChannelClosed,
}

impl BridgeError {
    pub(crate) fn code(&self) -> &'static str {
        match self {
            Self::BackgroundUnit(_) => "BRIDGE_BACKGROUND_UNIT",
            Self::Affordance(_) => "BRIDGE_AFFORDANCE",
            Self::Window(_) => "BRIDGE_WINDOW",
            Self::Relaunch(_) => "BRIDGE_RELAUNCH",
            Self::Internal { .. } => "BRIDGE_INTERNAL",
            Self::ChannelClosed => "BRIDGE_CHANNEL_CLOSED",
        }
    }
}
