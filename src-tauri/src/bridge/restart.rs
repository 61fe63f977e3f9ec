//! Usage: Hard restart (schedule a replacement process, then tear the current one down).

use super::errors::BridgeError;
use std::sync::Arc;
use std::time::Duration;

pub(crate) trait RestartHost: Send + Sync {
    /// Launch a fresh instance of the app. Must not depend on this process staying alive.
    fn schedule_relaunch(&self) -> Result<(), String>;
    /// Ask the current window/process surface to close.
    fn close_surface(&self);
    /// Unconditionally terminate the current process image.
    fn terminate(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RestartOutcome {
    Scheduled,
    AlreadyPending,
}

pub(crate) struct RestartController {
    host: Arc<dyn RestartHost>,
    grace: Duration,
    pending: bool,
}

impl RestartController {
    pub(crate) fn new(host: Arc<dyn RestartHost>, grace: Duration) -> Self {
        Self {
            host,
            grace,
            pending: false,
        }
    }

    /// Relaunch is scheduled synchronously; teardown follows on its own thread after
    /// `grace` so the acknowledgement can reach the caller first. Nothing is torn down
    /// when scheduling fails.
    pub(crate) fn restart(&mut self) -> Result<RestartOutcome, BridgeError> {
        if self.pending {
            return Ok(RestartOutcome::AlreadyPending);
        }

        self.host
            .schedule_relaunch()
            .map_err(BridgeError::Relaunch)?;
        self.pending = true;
        tracing::info!(grace_ms = self.grace.as_millis() as u64, "relaunch scheduled; tearing down");

        let host = Arc::clone(&self.host);
        let grace = self.grace;
        let teardown = move || {
            if !grace.is_zero() {
                std::thread::sleep(grace);
            }
            host.close_surface();
            host.terminate();
        };

        if let Err(err) = std::thread::Builder::new()
            .name("restart-teardown".to_string())
            .spawn(teardown.clone())
        {
            tracing::warn!("failed to spawn teardown thread, tearing down inline: {}", err);
            teardown();
        }

        Ok(RestartOutcome::Scheduled)
    }
}
