//! Usage: Command names accepted on the app-mode channel and the result envelope returned to the UI.

use super::errors::BridgeError;
use serde::Serialize;
use serde_json::Value;

pub(crate) const STATUS_STARTED: &str = "Service Started";
pub(crate) const STATUS_ALREADY_RUNNING: &str = "Service Already Running";
pub(crate) const STATUS_STOPPED: &str = "Service Stopped";
pub(crate) const STATUS_NOT_RUNNING: &str = "Service Not Running";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CommandName {
    Start,
    Stop,
    Show,
    Hide,
    Restart,
}

impl CommandName {
    /// Canonical names plus the method names older platform channels used.
    pub(crate) fn parse(name: &str) -> Option<Self> {
        match name.trim() {
            "start" | "startService" => Some(Self::Start),
            "stop" | "stopService" => Some(Self::Stop),
            "show" | "showApp" => Some(Self::Show),
            "hide" | "hideToTray" => Some(Self::Hide),
            "restart" | "restartApp" => Some(Self::Restart),
            _ => None,
        }
    }

    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Show => "show",
            Self::Hide => "hide",
            Self::Restart => "restart",
        }
    }
}

/// A request from the UI. `args` is opaque; it is logged at debug and no command reads it.
#[derive(Debug, Clone)]
pub(crate) struct Command {
    pub(crate) name: String,
    pub(crate) args: Value,
}

impl Command {
    pub(crate) fn new(name: impl Into<String>, args: Option<Value>) -> Self {
        Self {
            name: name.into(),
            args: args.unwrap_or(Value::Null),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub(crate) enum CommandResult {
    Ok {
        payload: Value,
    },
    Failed {
        error_code: &'static str,
        message: String,
    },
    Unimplemented {
        command: String,
    },
}

impl CommandResult {
    pub(crate) fn ok(payload: impl Into<Value>) -> Self {
        Self::Ok {
            payload: payload.into(),
        }
    }

    pub(crate) fn empty() -> Self {
        Self::Ok {
            payload: Value::Null,
        }
    }

    pub(crate) fn unimplemented(command: &str) -> Self {
        Self::Unimplemented {
            command: command.to_string(),
        }
    }

    pub(crate) fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }
}

impl From<BridgeError> for CommandResult {
    fn from(err: BridgeError) -> Self {
        Self::Failed {
            error_code: err.code(),
            message: err.to_string(),
        }
    }
}
