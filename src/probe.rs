use async_trait::async_trait;
use std::io;
use std::net::SocketAddr;
use tokio::net::TcpStream;

/// A single connection-attempt strategy.
///
/// The scheduler owns the deadline and the classification; a `Probe` only
/// reports whether a handshake to `addr` completed. Swappable so tests can
/// substitute an instrumented double for the real network.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn connect(&self, addr: SocketAddr) -> io::Result<()>;
}

/// The real strategy: a full TCP handshake via `TcpStream::connect`. The
/// stream exists only to prove reachability and is closed immediately.
pub struct TcpProbe;

#[async_trait]
impl Probe for TcpProbe {
    async fn connect(&self, addr: SocketAddr) -> io::Result<()> {
        let stream = TcpStream::connect(addr).await?;
        drop(stream);
        Ok(())
    }
}
