//! Usage: Lifecycle bridge (single owner of `AppMode`, routes UI commands and OS callbacks).
//!
//! Every mode mutation, whether it comes from the command channel or from an OS callback
//! (tray click, window destroyed, dock reopen), runs inside one critical section. Each
//! controller is optional and only exists when the target advertises the capability.
//!
//! The critical section spans host calls, and desktop tray hosts wait on the main thread.
//! Code running on the main thread must therefore never take `inner`; mode queries read
//! `view`, a copy refreshed on every change and only locked for the copy itself.

pub(crate) mod background;
pub(crate) mod channel;
pub(crate) mod command;
pub(crate) mod errors;
pub(crate) mod mode;
pub(crate) mod restart;
pub(crate) mod visibility;

#[cfg(test)]
pub(crate) mod testing;
#[cfg(test)]
mod tests;

use crate::shared::mutex_ext::MutexExt;
use background::{
    BackgroundConfig, BackgroundExecutionController, BackgroundHost, RearmOutcome, StartOutcome,
    StopOutcome,
};
use command::{Command, CommandName, CommandResult};
use errors::BridgeError;
use mode::{AppMode, Capabilities, ModeSnapshot, Visibility};
use restart::{RestartController, RestartHost};
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use visibility::{AffordanceHost, VisibilityController, WindowHost};

/// Receives every mode change. Called inside the bridge's critical section, so it must
/// not call back into the bridge.
pub(crate) trait ModeObserver: Send + Sync {
    fn mode_changed(&self, snapshot: &ModeSnapshot);
}

struct BridgeInner {
    mode: AppMode,
    background: Option<BackgroundExecutionController>,
    visibility: Option<VisibilityController>,
    restart: Option<RestartController>,
}

pub(crate) struct LifecycleBridge {
    capabilities: Capabilities,
    inner: Mutex<BridgeInner>,
    view: Mutex<AppMode>,
    observer: Option<Arc<dyn ModeObserver>>,
}

#[derive(Default)]
pub(crate) struct BridgeBuilder {
    background: Option<(Arc<dyn BackgroundHost>, BackgroundConfig)>,
    visibility: Option<(Arc<dyn WindowHost>, Arc<dyn AffordanceHost>)>,
    restart: Option<(Arc<dyn RestartHost>, Duration)>,
    observer: Option<Arc<dyn ModeObserver>>,
}

impl BridgeBuilder {
    pub(crate) fn background(
        mut self,
        host: Arc<dyn BackgroundHost>,
        config: BackgroundConfig,
    ) -> Self {
        self.background = Some((host, config));
        self
    }

    pub(crate) fn visibility(
        mut self,
        window: Arc<dyn WindowHost>,
        affordance: Arc<dyn AffordanceHost>,
    ) -> Self {
        self.visibility = Some((window, affordance));
        self
    }

    pub(crate) fn restart(mut self, host: Arc<dyn RestartHost>, grace: Duration) -> Self {
        self.restart = Some((host, grace));
        self
    }

    pub(crate) fn observer(mut self, observer: Arc<dyn ModeObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Controllers are created only where both the capability flag and a host are present.
    pub(crate) fn build(self, capabilities: Capabilities) -> LifecycleBridge {
        let background = self
            .background
            .filter(|_| capabilities.background)
            .map(|(host, config)| BackgroundExecutionController::new(host, config));
        let visibility = self
            .visibility
            .filter(|_| capabilities.visibility)
            .map(|(window, affordance)| VisibilityController::new(window, affordance));
        let restart = self
            .restart
            .filter(|_| capabilities.restart)
            .map(|(host, grace)| RestartController::new(host, grace));

        let effective = Capabilities {
            background: background.is_some(),
            visibility: visibility.is_some(),
            restart: restart.is_some(),
        };

        LifecycleBridge {
            capabilities: effective,
            inner: Mutex::new(BridgeInner {
                mode: AppMode::default(),
                background,
                visibility,
                restart,
            }),
            view: Mutex::new(AppMode::default()),
            observer: self.observer,
        }
    }
}

fn panic_reason(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        return (*s).to_string();
    }
    if let Some(s) = payload.downcast_ref::<String>() {
        return s.clone();
    }
    "unknown panic".to_string()
}

impl LifecycleBridge {
    pub(crate) fn builder() -> BridgeBuilder {
        BridgeBuilder::default()
    }

    pub(crate) fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Last published mode. Never waits on a command in flight.
    pub(crate) fn mode(&self) -> AppMode {
        *self.view.lock_or_recover()
    }

    pub(crate) fn snapshot(&self) -> ModeSnapshot {
        ModeSnapshot::new(self.mode(), self.capabilities)
    }

    /// Handle one UI command. Never panics: handler faults become a failed result.
    pub(crate) fn dispatch(&self, command: &Command) -> CommandResult {
        let Some(name) = CommandName::parse(&command.name) else {
            tracing::debug!(command = %command.name, "unimplemented app mode command");
            return CommandResult::unimplemented(&command.name);
        };
        if !command.args.is_null() {
            tracing::debug!(
                command = name.as_str(),
                args = %command.args,
                "ignoring command arguments"
            );
        }
        self.run(name)
    }

    fn run(&self, name: CommandName) -> CommandResult {
        match std::panic::catch_unwind(AssertUnwindSafe(|| self.handle(name))) {
            Ok(result) => result,
            Err(payload) => self.recover_from_fault(name.as_str(), payload.as_ref()).into(),
        }
    }

    /// A handler unwound mid-transition: realign the mode with what the controllers now want.
    fn recover_from_fault(
        &self,
        command: &str,
        payload: &(dyn std::any::Any + Send),
    ) -> BridgeError {
        let reason = panic_reason(payload);
        tracing::error!(command, "app mode handler panicked: {}", reason);

        let mut guard = self.inner.lock_or_recover();
        let inner = &mut *guard;
        let before = inner.mode;
        if let Some(background) = inner.background.as_ref() {
            inner.mode.background_running = background.desired_running();
        }
        self.publish_if_changed(before, inner.mode);

        BridgeError::Internal {
            command: command.to_string(),
            reason,
        }
    }

    fn handle(&self, name: CommandName) -> CommandResult {
        let mut guard = self.inner.lock_or_recover();
        let inner = &mut *guard;
        let before = inner.mode;
        tracing::info!(command = name.as_str(), mode = before.label(), "app mode command");

        let result = match name {
            CommandName::Start => {
                let Some(background) = inner.background.as_mut() else {
                    return CommandResult::unimplemented(name.as_str());
                };
                let outcome = background.start();
                inner.mode.background_running = background.desired_running();
                match outcome {
                    Ok(StartOutcome::Started) => CommandResult::ok(command::STATUS_STARTED),
                    Ok(StartOutcome::AlreadyRunning) => {
                        CommandResult::ok(command::STATUS_ALREADY_RUNNING)
                    }
                    Err(err) => err.into(),
                }
            }
            CommandName::Stop => {
                let Some(background) = inner.background.as_mut() else {
                    return CommandResult::unimplemented(name.as_str());
                };
                let outcome = background.stop();
                inner.mode.background_running = background.desired_running();
                match outcome {
                    StopOutcome::Stopped => CommandResult::ok(command::STATUS_STOPPED),
                    StopOutcome::NotRunning => CommandResult::ok(command::STATUS_NOT_RUNNING),
                }
            }
            CommandName::Show => {
                let Some(visibility) = inner.visibility.as_ref() else {
                    return CommandResult::unimplemented(name.as_str());
                };
                match visibility.show() {
                    Ok(()) => {
                        inner.mode.visibility = Visibility::Visible;
                        CommandResult::empty()
                    }
                    Err(err) => err.into(),
                }
            }
            CommandName::Hide => {
                let Some(visibility) = inner.visibility.as_ref() else {
                    return CommandResult::unimplemented(name.as_str());
                };
                match visibility.hide() {
                    Ok(()) => {
                        inner.mode.visibility = Visibility::Hidden;
                        CommandResult::empty()
                    }
                    Err(err) => {
                        // The controller has already put the window back in front.
                        inner.mode.visibility = Visibility::Visible;
                        tracing::warn!("hide refused: {}", err);
                        err.into()
                    }
                }
            }
            CommandName::Restart => {
                let Some(restart) = inner.restart.as_mut() else {
                    return CommandResult::unimplemented(name.as_str());
                };
                match restart.restart() {
                    Ok(_) => CommandResult::ok(true),
                    Err(err) => err.into(),
                }
            }
        };

        self.publish_if_changed(before, inner.mode);
        result
    }

    fn publish_if_changed(&self, before: AppMode, after: AppMode) {
        if before == after {
            return;
        }
        *self.view.lock_or_recover() = after;
        tracing::info!(from = before.label(), to = after.label(), "app mode changed");
        if let Some(observer) = self.observer.as_ref() {
            observer.mode_changed(&ModeSnapshot::new(after, self.capabilities));
        }
    }

    /// Create the tray affordance at startup. Logged, not fatal.
    pub(crate) fn install_affordance(&self) -> Result<(), BridgeError> {
        let guard = self.inner.lock_or_recover();
        let Some(visibility) = guard.visibility.as_ref() else {
            return Ok(());
        };
        visibility.install_affordance()
    }

    /// OS tore down the surface hosting the background unit.
    pub(crate) fn on_host_surface_removed(&self) -> Option<RearmOutcome> {
        match std::panic::catch_unwind(AssertUnwindSafe(|| self.rearm_background())) {
            Ok(outcome) => outcome,
            Err(payload) => Some(RearmOutcome::Failed(
                self.recover_from_fault("rearm", payload.as_ref()),
            )),
        }
    }

    fn rearm_background(&self) -> Option<RearmOutcome> {
        let mut guard = self.inner.lock_or_recover();
        let inner = &mut *guard;
        let before = inner.mode;

        let background = inner.background.as_mut()?;
        let outcome = background.rearm();
        inner.mode.background_running = background.desired_running();
        tracing::info!(outcome = ?outcome, "host surface removed");

        self.publish_if_changed(before, inner.mode);
        Some(outcome)
    }

    /// Tray icon / menu / dock reopen asked for the window. Same as `show`; a logged
    /// no-op on targets without a visibility controller.
    pub(crate) fn on_affordance_activated(&self) -> CommandResult {
        if !self.capabilities.visibility {
            tracing::debug!("affordance activated without a visibility controller; ignored");
            return CommandResult::empty();
        }
        tracing::debug!("affordance activated");
        self.run(CommandName::Show)
    }

    /// OS asked to close the main window; treated as `hide`.
    pub(crate) fn on_close_requested(&self) -> CommandResult {
        self.run(CommandName::Hide)
    }

    /// Best-effort stop before exit.
    pub(crate) fn shutdown_background(&self) {
        let result = self.run(CommandName::Stop);
        tracing::info!(result = ?result, "background shut down for exit");
    }
}
