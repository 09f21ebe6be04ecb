//! Desktop notification side channel via `notify-send`.

use std::process::Stdio;

use mediaq_core::traits::Notifier;
use tokio::process::Command;

/// Best-effort desktop notifications. A missing `notify-send` binary is
/// logged and otherwise ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotifySend;

impl Notifier for NotifySend {
    async fn notify(&self, message: &str) {
        let result = Command::new("notify-send")
            .arg("mediaq")
            .arg(message)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to send desktop notification");
        }
    }
}
