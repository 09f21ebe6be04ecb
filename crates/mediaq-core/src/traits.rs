use std::future::Future;

use tokio::time::Instant;

use crate::error::AppError;

/// Fetches the raw content of a URL.
pub trait Fetcher: Send + Sync + Clone {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// Source of incoming link submissions.
///
/// `recv` resolves to one `(text, arrival-time)` pair per accepted
/// submission, with decoding and whitespace trimming already applied.
/// `None` means the source is closed and no further links will arrive;
/// network-backed sources never return it.
pub trait LinkReceiver: Send {
    fn recv(&mut self) -> impl Future<Output = Option<(String, Instant)>> + Send;
}

/// Invokes the external media player once with an ordered playlist.
///
/// Fire-and-forget: implementations must not await player exit.
pub trait PlayerLauncher: Send + Sync {
    fn launch(&self, links: &[String]) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// Side channel for one-shot user notifications (e.g. "enumeration in
/// progress"). Best-effort: failures are the implementation's problem.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str) -> impl Future<Output = ()> + Send;
}

/// A no-op Notifier for use when notifications are not wanted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    async fn notify(&self, _message: &str) {}
}
