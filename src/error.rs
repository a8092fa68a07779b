//! Unified application error type.

use crate::port::PortError;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level errors surfaced to the operator.
///
/// Cancellation and no-data timeouts are *not* errors; they are modelled as
/// normal outcomes of the detection loop.
#[derive(Debug, Error)]
pub enum AppError {
    /// A serial port failure. Fatal at open time; detection never retries
    /// opening the device.
    #[error(transparent)]
    Port(#[from] PortError),

    /// Saving the minicom configuration failed. The detection result is
    /// unaffected; the rendered text is printed as a fallback.
    #[error("failed to save minicom configuration to {path}: {source}")]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Any other I/O failure (terminal setup, prompting, launching minicom).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_error_is_transparent() {
        let err: AppError = PortError::unavailable("/dev/ttyUSB0").into();
        assert_eq!(err.to_string(), "Serial port unavailable: /dev/ttyUSB0");
    }

    #[test]
    fn test_config_write_display() {
        let err = AppError::ConfigWrite {
            path: PathBuf::from("/etc/minicom/minirc.dev"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/etc/minicom/minirc.dev"));
        assert!(msg.contains("denied"));
    }
}
