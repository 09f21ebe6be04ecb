//! External player egress: one mpv invocation per closed batch.

use std::process::Stdio;

use mediaq_core::error::AppError;
use mediaq_core::traits::PlayerLauncher;
use tokio::process::Command;

/// The fixed audio dynamics filter applied to every playlist.
const AUDIO_FILTER: &str = "acompressor=threshold=-27dB:ratio=4:attack=10:release=100:makeup=4";

/// Launches mpv with the final ordered playlist as its argument list.
///
/// Fire-and-forget: the child is spawned and never awaited, so a stuck
/// player cannot stall the daemon loop.
#[derive(Debug, Clone)]
pub struct MpvLauncher {
    program: String,
    title: String,
}

impl MpvLauncher {
    pub fn new() -> Self {
        Self {
            program: "mpv".to_string(),
            title: "gPodder mpv video stream".to_string(),
        }
    }

    /// Override the player binary, e.g. for a wrapper script.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn command(&self, links: &[String]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--no-terminal")
            .arg(format!("--title={}", self.title))
            .arg("-af")
            .arg(AUDIO_FILTER)
            .arg("--player-operation-mode=pseudo-gui")
            .arg("--")
            .args(links)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }
}

impl Default for MpvLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerLauncher for MpvLauncher {
    async fn launch(&self, links: &[String]) -> Result<(), AppError> {
        let mut cmd = self.command(links);
        cmd.spawn()
            .map(|_child| ())
            .map_err(|e| AppError::LaunchError(format!("Failed to spawn {}: {e}", self.program)))
    }
}
