//! Usage: App mode commands (lifecycle command channel + mode snapshot).

use crate::app_state::BridgeState;
use crate::bridge::command::CommandResult;
use crate::bridge::mode::ModeSnapshot;

/// Submit one lifecycle command (`start`, `stop`, `show`, `hide`, `restart`) and wait for its result.
///
/// Failures travel inside [`CommandResult`]; the outer `Err` is reserved for invoke-level problems.
#[tauri::command]
pub(crate) async fn app_mode_invoke(
    state: tauri::State<'_, BridgeState>,
    method: String,
    args: Option<serde_json::Value>,
) -> Result<CommandResult, String> {
    let channel = state.channel().clone();
    let result = channel.send(&method, args).await;
    if !result.is_ok() {
        tracing::debug!(method = %method, result = ?result, "app mode command did not succeed");
    }
    Ok(result)
}

/// Current mode snapshot. Async so it never runs on the main thread.
#[tauri::command]
pub(crate) async fn app_mode_get(
    state: tauri::State<'_, BridgeState>,
) -> Result<ModeSnapshot, String> {
    Ok(state.bridge().snapshot())
}
