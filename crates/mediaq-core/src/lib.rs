pub mod config;
pub mod daemon;
pub mod enrich;
pub mod error;
pub mod link;
pub mod order;
pub mod testutil;
pub mod traits;
pub mod window;

pub use config::DaemonConfig;
pub use daemon::{Daemon, DaemonReporter, TracingDaemonReporter};
pub use error::AppError;
pub use link::{Batch, Entry, LinkKind, classify};
pub use order::OrderMode;
pub use traits::{Fetcher, LinkReceiver, Notifier, NullNotifier, PlayerLauncher};
pub use window::{BatchState, BatchWindow};
