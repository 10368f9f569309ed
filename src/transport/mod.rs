//! Downstream transport.
//!
//! The publisher hands one integer and an address path to a [`Transport`]
//! every tick. Delivery is fire-and-forget.

pub mod osc;

pub use osc::OscTransport;

/// Transport errors.
#[derive(Debug)]
pub enum TransportError {
    /// Host name did not resolve to a usable address
    Resolve(String),
    /// Socket error
    Io(std::io::Error),
    /// Message could not be encoded
    Encode(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Resolve(msg) => write!(f, "Transport resolve error: {msg}"),
            TransportError::Io(e) => write!(f, "Transport IO error: {e}"),
            TransportError::Encode(msg) => write!(f, "Transport encode error: {msg}"),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TransportError {
    fn from(e: std::io::Error) -> Self {
        TransportError::Io(e)
    }
}

/// Sends a single numeric argument to an address path.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, address: &str, value: i32) -> Result<(), TransportError>;
}
