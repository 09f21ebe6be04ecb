pub mod fetcher;
pub mod notify;
pub mod player;
pub mod udp;

pub use fetcher::HttpFetcher;
pub use notify::NotifySend;
pub use player::MpvLauncher;
pub use udp::{UdpReceiver, send_link};
