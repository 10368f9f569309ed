//! OSC over UDP.

use super::{Transport, TransportError};
use rosc::{OscMessage, OscPacket, OscType};
use std::net::SocketAddr;
use tokio::net::UdpSocket;

/// Sends OSC messages carrying one `int32` to a fixed host and port.
///
/// The host is resolved on every send, so a receiver that comes up late or
/// changes address is picked up without a restart.
pub struct OscTransport {
    host: String,
    port: u16,
    socket: UdpSocket,
}

impl OscTransport {
    /// Bind a local UDP socket for sending to `host:port`.
    pub async fn bind(host: impl Into<String>, port: u16) -> Result<Self, TransportError> {
        let socket = UdpSocket::bind(("0.0.0.0", 0)).await?;
        Ok(Self {
            host: host.into(),
            port,
            socket,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    async fn resolve(&self) -> Result<SocketAddr, TransportError> {
        let mut addrs = tokio::net::lookup_host((self.host.as_str(), self.port))
            .await
            .map_err(|e| TransportError::Resolve(format!("{}:{}: {e}", self.host, self.port)))?;

        // The socket is IPv4, so skip IPv6 results such as ::1 for localhost
        addrs.find(SocketAddr::is_ipv4).ok_or_else(|| {
            TransportError::Resolve(format!(
                "{}:{}: no IPv4 address found",
                self.host, self.port
            ))
        })
    }
}

/// Encode a single-int OSC message.
pub fn encode_message(address: &str, value: i32) -> Result<Vec<u8>, TransportError> {
    let packet = OscPacket::Message(OscMessage {
        addr: address.to_string(),
        args: vec![OscType::Int(value)],
    });
    rosc::encoder::encode(&packet).map_err(|e| TransportError::Encode(format!("{e:?}")))
}

#[async_trait::async_trait]
impl Transport for OscTransport {
    async fn send(&self, address: &str, value: i32) -> Result<(), TransportError> {
        let buf = encode_message(address, value)?;
        let target = self.resolve().await?;
        self.socket.send_to(&buf, target).await?;
        Ok(())
    }
}
