//! Port-specific error types.

use thiserror::Error;

/// Errors that can occur during serial port operations.
///
/// A read timeout with no data is deliberately *not* represented here; the
/// controller reports it as a normal "no data" outcome that drives the
/// rate-cycling policy.
#[derive(Debug, Error)]
pub enum PortError {
    /// The serial device could not be opened (missing, busy, or no permission).
    #[error("Serial port unavailable: {0}")]
    Unavailable(String),

    /// An I/O error occurred during port operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Port configuration failed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A serialport-specific error occurred.
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),
}

impl PortError {
    /// Create an Unavailable error from a port name.
    pub fn unavailable(port_name: impl Into<String>) -> Self {
        Self::Unavailable(port_name.into())
    }

    /// Create a Config error from a message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
