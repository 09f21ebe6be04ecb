use std::net::SocketAddr;
use std::time::Duration;

/// Configuration for the aggregation daemon, fixed at startup.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Local endpoint link submissions are addressed to.
    pub listen_addr: SocketAddr,
    /// Maximum idle time after the last arrival before a batch closes.
    pub wait_period: Duration,
    /// Recurse into directory-style links to resolve concrete media URIs.
    pub recurse_directories: bool,
    /// Send a one-shot desktop notification when directory enumeration is
    /// about to delay dispatch.
    pub notify_on_enumerate: bool,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            listen_addr: ([127, 0, 0, 1], 8099).into(),
            wait_period: Duration::from_secs(2),
            recurse_directories: true,
            notify_on_enumerate: false,
        }
    }
}

impl DaemonConfig {
    pub fn with_listen_addr(mut self, addr: SocketAddr) -> Self {
        self.listen_addr = addr;
        self
    }

    pub fn with_wait_period(mut self, period: Duration) -> Self {
        self.wait_period = period;
        self
    }

    pub fn with_recurse_directories(mut self, recurse: bool) -> Self {
        self.recurse_directories = recurse;
        self
    }

    pub fn with_notify_on_enumerate(mut self, notify: bool) -> Self {
        self.notify_on_enumerate = notify;
        self
    }
}
