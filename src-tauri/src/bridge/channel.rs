//! Usage: Request/response command channel between the UI and the lifecycle bridge.
//!
//! Requests are queued and handled one at a time, in arrival order, by a dispatcher on a
//! blocking worker; each request gets at most one reply through its own `oneshot`.

use super::command::{Command, CommandResult};
use super::errors::BridgeError;
use super::LifecycleBridge;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

const CHANNEL_CAPACITY: usize = 64;

struct Envelope {
    command: Command,
    reply: oneshot::Sender<CommandResult>,
}

#[derive(Clone)]
pub(crate) struct CommandChannel {
    tx: mpsc::Sender<Envelope>,
}

impl CommandChannel {
    pub(crate) async fn send(&self, name: &str, args: Option<Value>) -> CommandResult {
        let (reply_tx, reply_rx) = oneshot::channel();
        let envelope = Envelope {
            command: Command::new(name, args),
            reply: reply_tx,
        };

        if self.tx.send(envelope).await.is_err() {
            return BridgeError::ChannelClosed.into();
        }

        reply_rx
            .await
            .unwrap_or_else(|_| BridgeError::ChannelClosed.into())
    }
}

pub(crate) fn start_dispatcher(
    bridge: Arc<LifecycleBridge>,
) -> (CommandChannel, tauri::async_runtime::JoinHandle<()>) {
    let (tx, rx) = mpsc::channel::<Envelope>(CHANNEL_CAPACITY);
    let task = tauri::async_runtime::spawn_blocking(move || {
        dispatch_loop(bridge, rx);
    });
    (CommandChannel { tx }, task)
}

fn dispatch_loop(bridge: Arc<LifecycleBridge>, mut rx: mpsc::Receiver<Envelope>) {
    while let Some(envelope) = rx.blocking_recv() {
        let result = bridge.dispatch(&envelope.command);
        // The caller may have gone away; the result is simply dropped then.
        let _ = envelope.reply.send(result);
    }
    tracing::debug!("app mode dispatcher stopped");
}
