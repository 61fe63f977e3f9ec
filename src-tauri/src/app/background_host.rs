//! Usage: Background unit host for the Tauri shell (status indicator + UI events).
//!
//! The unit itself is the bridge's heartbeat task, which lives as long as this process;
//! the host only surfaces the persistent indicator (tray tooltip on desktop, ongoing
//! notification on mobile) and events.

use super::events::{self, BackgroundStatusPayload};
use crate::bridge::background::{BackgroundHost, Indicator};

pub(crate) struct ShellBackgroundHost {
    app: tauri::AppHandle,
}

impl ShellBackgroundHost {
    pub(crate) fn new(app: tauri::AppHandle) -> Self {
        Self { app }
    }
}

impl BackgroundHost for ShellBackgroundHost {
    fn create_unit(&self, indicator: &Indicator) -> Result<(), String> {
        #[cfg(desktop)]
        super::resident::set_tray_indicator(&self.app, Some(indicator));
        #[cfg(mobile)]
        super::mobile_indicator::show(&self.app, indicator)?;

        if let Err(err) =
            events::emit_background_status(&self.app, BackgroundStatusPayload::running(indicator))
        {
            tracing::warn!("{}", err);
        }
        Ok(())
    }

    fn destroy_unit(&self) {
        #[cfg(desktop)]
        super::resident::set_tray_indicator(&self.app, None);
        #[cfg(mobile)]
        super::mobile_indicator::clear(&self.app);

        if let Err(err) =
            events::emit_background_status(&self.app, BackgroundStatusPayload::stopped())
        {
            tracing::warn!("{}", err);
        }
    }

    fn unit_alive(&self) -> bool {
        true
    }

    fn heartbeat(&self, beat: u64) {
        tracing::trace!(beat, "background service is executing");
        let _ = events::emit_heartbeat(&self.app, beat);
    }
}
