//! UDP ingress: one datagram per link submission.
//!
//! Fire-and-forget on both sides. The sender never learns whether the
//! daemon received the link, and the daemon drops undecodable datagrams
//! silently.

use std::net::SocketAddr;

use mediaq_core::error::AppError;
use mediaq_core::traits::LinkReceiver;
use tokio::net::UdpSocket;
use tokio::time::Instant;

/// Largest accepted datagram; links are short.
const MAX_DATAGRAM: usize = 1024;

/// Receives link submissions on a bound UDP socket.
///
/// This source never closes: receive errors are logged and the next
/// datagram is awaited.
pub struct UdpReceiver {
    socket: UdpSocket,
    buf: [u8; MAX_DATAGRAM],
}

impl UdpReceiver {
    pub async fn bind(addr: SocketAddr) -> Result<Self, AppError> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|e| AppError::NetworkError(format!("Failed to bind {addr}: {e}")))?;
        tracing::info!(%addr, "Listening for link submissions");
        Ok(Self {
            socket,
            buf: [0; MAX_DATAGRAM],
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, AppError> {
        self.socket
            .local_addr()
            .map_err(|e| AppError::NetworkError(e.to_string()))
    }
}

impl LinkReceiver for UdpReceiver {
    async fn recv(&mut self) -> Option<(String, Instant)> {
        loop {
            match self.socket.recv_from(&mut self.buf).await {
                Ok((len, peer)) => match std::str::from_utf8(&self.buf[..len]) {
                    Ok(text) => {
                        let text = text.trim_end().to_string();
                        if text.is_empty() {
                            tracing::debug!(%peer, "Dropping empty datagram");
                            continue;
                        }
                        return Some((text, Instant::now()));
                    }
                    Err(_) => {
                        tracing::debug!(%peer, "Dropping undecodable datagram");
                        continue;
                    }
                },
                Err(e) => {
                    tracing::warn!(error = %e, "UDP receive failed");
                    continue;
                }
            }
        }
    }
}

/// Send one link to a running daemon. Fire-and-forget.
pub async fn send_link(addr: SocketAddr, link: &str) -> Result<(), AppError> {
    let socket = UdpSocket::bind("0.0.0.0:0")
        .await
        .map_err(|e| AppError::NetworkError(format!("Failed to bind sender socket: {e}")))?;
    socket
        .send_to(link.as_bytes(), addr)
        .await
        .map_err(|e| AppError::NetworkError(format!("Failed to send to {addr}: {e}")))?;
    Ok(())
}
