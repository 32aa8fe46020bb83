use nerevar_core::ProcessEvent;
use tauri::{AppHandle, Emitter};
use tokio::sync::mpsc::UnboundedReceiver;

/// Republishes supervisor events to the webview, each under its tool's own
/// event name.
pub fn forward_process_events(app: AppHandle, mut rx: UnboundedReceiver<ProcessEvent>) {
    tauri::async_runtime::spawn(async move {
        while let Some(event) = rx.recv().await {
            let channel = event.channel();
            let sent = match &event {
                ProcessEvent::Started { pid, .. } => app.emit(channel, pid),
                ProcessEvent::Exited { payload, .. } => app.emit(channel, payload),
            };
            if let Err(e) = sent {
                tracing::error!(channel, error = %e, "failed to emit process event");
            }
        }
        tracing::debug!("process event channel closed");
    });
}
