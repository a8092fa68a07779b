//! Mock serial port implementation for testing.
//!
//! Provides a `MockSerialPort` that simulates serial port behavior without
//! requiring actual hardware. Reads drain a scripted byte queue, and every
//! applied baud rate and flush is logged for verification.

use super::error::PortError;
use super::traits::SerialPortAdapter;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Inner state of the mock port, protected by a mutex for interior mutability.
#[derive(Debug)]
struct MockPortState {
    /// Queue of bytes to be returned by read operations.
    read_queue: VecDeque<u8>,
    /// Every baud rate applied via `set_baud_rate`, in order.
    baud_log: Vec<u32>,
    /// Currently configured baud rate.
    baud_rate: Option<u32>,
    /// Number of `flush` calls observed.
    flush_count: usize,
    /// Whether buffers have been cleared.
    buffers_cleared: bool,
    /// If set, reads fail with this I/O error kind once the queue is empty
    /// (instead of the default `TimedOut`).
    empty_read_kind: std::io::ErrorKind,
}

impl Default for MockPortState {
    fn default() -> Self {
        Self {
            read_queue: VecDeque::new(),
            baud_log: Vec::new(),
            baud_rate: None,
            flush_count: 0,
            buffers_cleared: false,
            empty_read_kind: std::io::ErrorKind::TimedOut,
        }
    }
}

/// Mock serial port implementation for testing.
///
/// Clones share state, so a test can hand a clone to the detection engine
/// and keep one to inspect afterwards.
///
/// # Example
/// ```
/// use baudscan::port::{MockSerialPort, SerialPortAdapter};
///
/// let mut port = MockSerialPort::new("MOCK0");
/// port.enqueue_read(b"hello");
///
/// let mut buffer = [0u8; 8];
/// let n = port.read_bytes(&mut buffer).unwrap();
/// assert_eq!(&buffer[..n], b"hello");
///
/// port.set_baud_rate(19200).unwrap();
/// assert_eq!(port.applied_rates(), vec![19200]);
/// ```
#[derive(Clone)]
pub struct MockSerialPort {
    name: String,
    state: Arc<Mutex<MockPortState>>,
}

impl MockSerialPort {
    /// Create a new mock serial port with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(MockPortState {
                empty_read_kind: std::io::ErrorKind::TimedOut,
                ..Default::default()
            })),
        }
    }

    /// Enqueue bytes to be returned by subsequent read operations.
    pub fn enqueue_read(&mut self, data: &[u8]) {
        let mut state = self.state.lock().unwrap();
        state.read_queue.extend(data);
    }

    /// Change the I/O error kind reported once the read queue is empty.
    ///
    /// The default is `TimedOut`, which the controller treats as a normal
    /// no-data tick. Setting e.g. `BrokenPipe` simulates a vanished device.
    pub fn set_empty_read_kind(&mut self, kind: std::io::ErrorKind) {
        let mut state = self.state.lock().unwrap();
        state.empty_read_kind = kind;
    }

    /// Every baud rate applied to the port, in order.
    pub fn applied_rates(&self) -> Vec<u32> {
        let state = self.state.lock().unwrap();
        state.baud_log.clone()
    }

    /// Number of flushes observed.
    pub fn flush_count(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.flush_count
    }

    /// Get whether buffers have been cleared since the last reset.
    pub fn was_cleared(&self) -> bool {
        let state = self.state.lock().unwrap();
        state.buffers_cleared
    }

    /// Get the number of bytes available to read.
    pub fn available_bytes(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.read_queue.len()
    }
}

impl SerialPortAdapter for MockSerialPort {
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        let mut state = self.state.lock().unwrap();

        let mut bytes_read = 0;
        for byte in buffer.iter_mut() {
            if let Some(queued) = state.read_queue.pop_front() {
                *byte = queued;
                bytes_read += 1;
            } else {
                break;
            }
        }

        if bytes_read == 0 {
            Err(PortError::Io(std::io::Error::new(
                state.empty_read_kind,
                "no data available",
            )))
        } else {
            Ok(bytes_read)
        }
    }

    fn set_baud_rate(&mut self, baud_rate: u32) -> Result<(), PortError> {
        let mut state = self.state.lock().unwrap();
        state.baud_rate = Some(baud_rate);
        state.baud_log.push(baud_rate);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), PortError> {
        let mut state = self.state.lock().unwrap();
        state.flush_count += 1;
        Ok(())
    }

    fn clear_buffers(&mut self) -> Result<(), PortError> {
        let mut state = self.state.lock().unwrap();
        state.read_queue.clear();
        state.buffers_cleared = true;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn baud_rate(&self) -> Option<u32> {
        let state = self.state.lock().unwrap();
        state.baud_rate
    }
}

impl std::fmt::Debug for MockSerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSerialPort")
            .field("name", &self.name)
            .field("available_bytes", &self.available_bytes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enqueue_and_read() {
        let mut port = MockSerialPort::new("MOCK0");
        port.enqueue_read(b"Hello");

        let mut buffer = [0u8; 10];
        let n = port.read_bytes(&mut buffer).unwrap();
        assert_eq!(n, 5);
        assert_eq!(&buffer[..n], b"Hello");
    }

    #[test]
    fn test_empty_read_times_out() {
        let mut port = MockSerialPort::new("MOCK0");
        let mut buffer = [0u8; 1];

        let result = port.read_bytes(&mut buffer);
        match result {
            Err(PortError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::TimedOut),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_read_kind_override() {
        let mut port = MockSerialPort::new("MOCK0");
        port.set_empty_read_kind(std::io::ErrorKind::BrokenPipe);

        let mut buffer = [0u8; 1];
        match port.read_bytes(&mut buffer) {
            Err(PortError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::BrokenPipe),
            other => panic!("expected broken pipe, got {other:?}"),
        }
    }

    #[test]
    fn test_baud_rate_logging() {
        let mut port = MockSerialPort::new("MOCK0");
        port.set_baud_rate(115200).unwrap();
        port.set_baud_rate(57600).unwrap();

        assert_eq!(port.applied_rates(), vec![115200, 57600]);
        assert_eq!(port.baud_rate(), Some(57600));
    }

    #[test]
    fn test_clones_share_state() {
        let mut port = MockSerialPort::new("MOCK0");
        let mut clone = port.clone();

        port.enqueue_read(b"x");
        let mut buffer = [0u8; 1];
        assert_eq!(clone.read_bytes(&mut buffer).unwrap(), 1);
        assert_eq!(port.available_bytes(), 0);
    }

    #[test]
    fn test_clear_buffers() {
        let mut port = MockSerialPort::new("MOCK0");
        port.enqueue_read(b"stale data");

        port.clear_buffers().unwrap();
        assert!(port.was_cleared());
        assert_eq!(port.available_bytes(), 0);
    }

    #[test]
    fn test_partial_read() {
        let mut port = MockSerialPort::new("MOCK0");
        port.enqueue_read(b"Hello, World!");

        let mut buffer = [0u8; 5];
        let n = port.read_bytes(&mut buffer).unwrap();
        assert_eq!(n, 5);
        assert_eq!(&buffer[..n], b"Hello");
        assert_eq!(port.available_bytes(), 8);
    }

    #[test]
    fn test_flush_counting() {
        let mut port = MockSerialPort::new("MOCK0");
        port.flush().unwrap();
        port.flush().unwrap();
        assert_eq!(port.flush_count(), 2);
    }
}
