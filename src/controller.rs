//! Port controller: owns the live serial connection and applies candidate
//! rates to it.

use crate::port::{PortConfiguration, PortError, SerialPortAdapter, SyncSerialPort};
use std::time::Duration;
use tracing::{debug, trace};

/// Owns the open serial port and mediates every operation the detection
/// engine performs on it.
#[derive(Debug)]
pub struct PortController {
    port: Box<dyn SerialPortAdapter>,
    /// Suppress the operator-facing rate banner (used in tests).
    quiet_banner: bool,
}

impl PortController {
    /// Open the serial device at `path` with 8N1 framing and the given read
    /// timeout.
    ///
    /// Failure here is fatal to detection; there is no retry.
    pub fn open(path: &str, timeout: Duration) -> Result<Self, PortError> {
        let config = PortConfiguration {
            timeout,
            ..PortConfiguration::default()
        };
        let port = SyncSerialPort::open(path, config)?;
        debug!(path, ?timeout, "opened serial port");
        Ok(Self {
            port: Box::new(port),
            quiet_banner: false,
        })
    }

    /// Wrap an already-constructed adapter (dependency injection for tests).
    pub fn with_adapter(port: Box<dyn SerialPortAdapter>) -> Self {
        Self {
            port,
            quiet_banner: true,
        }
    }

    /// Apply a candidate baud rate to the live port.
    ///
    /// Flushes before and after the change so the hardware settles, and
    /// announces the new rate on stderr. The announcement is required
    /// operator feedback during manual override.
    pub fn apply_rate(&mut self, rate: u32) -> Result<(), PortError> {
        if !self.quiet_banner {
            eprintln!("\n\n@@@@@@@@@@@@@@@@@@@@@ Baudrate: {rate} @@@@@@@@@@@@@@@@@@@@@\n");
        }
        self.port.flush()?;
        self.port.set_baud_rate(rate)?;
        self.port.flush()?;
        debug!(rate, "applied baud rate");
        Ok(())
    }

    /// Read a single byte, blocking for at most the configured timeout.
    ///
    /// `Ok(None)` means the timeout expired with no data; the caller treats
    /// that as a detection-timeout tick, not an error.
    pub fn read_byte(&mut self) -> Result<Option<u8>, PortError> {
        let mut buf = [0u8; 1];
        match self.port.read_bytes(&mut buf) {
            Ok(0) => Ok(None),
            Ok(_) => {
                trace!(byte = buf[0], "received byte");
                Ok(Some(buf[0]))
            }
            Err(PortError::Io(e))
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
                ) =>
            {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Name/path of the underlying port.
    pub fn port_name(&self) -> &str {
        self.port.name()
    }

    /// Currently configured baud rate, if the backend reports one.
    pub fn current_rate(&self) -> Option<u32> {
        self.port.baud_rate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::MockSerialPort;

    #[test]
    fn test_apply_rate_flushes_around_change() {
        let mock = MockSerialPort::new("MOCK0");
        let mut controller = PortController::with_adapter(Box::new(mock.clone()));

        controller.apply_rate(57600).unwrap();

        assert_eq!(mock.applied_rates(), vec![57600]);
        assert_eq!(mock.flush_count(), 2);
        // The controller reports whatever rate is live on the port.
        assert_eq!(controller.current_rate(), Some(57600));
    }

    #[test]
    fn test_read_byte_returns_data() {
        let mut mock = MockSerialPort::new("MOCK0");
        mock.enqueue_read(b"A");
        let mut controller = PortController::with_adapter(Box::new(mock));

        assert_eq!(controller.read_byte().unwrap(), Some(b'A'));
    }

    #[test]
    fn test_read_byte_timeout_is_not_an_error() {
        let mock = MockSerialPort::new("MOCK0");
        let mut controller = PortController::with_adapter(Box::new(mock));

        assert_eq!(controller.read_byte().unwrap(), None);
    }

    #[test]
    fn test_read_byte_propagates_hard_errors() {
        let mut mock = MockSerialPort::new("MOCK0");
        mock.set_empty_read_kind(std::io::ErrorKind::BrokenPipe);
        let mut controller = PortController::with_adapter(Box::new(mock));

        assert!(controller.read_byte().is_err());
    }
}
