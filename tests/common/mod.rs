//! Shared test support: a scripted serial port adapter.

use baudscan::port::{PortError, SerialPortAdapter};
use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// One scripted read outcome.
#[derive(Debug, Clone)]
pub enum Step {
    /// Deliver this byte.
    Byte(u8),
    /// One no-data tick (read timeout).
    Empty,
    /// A no-data tick that also trips the shared cancellation flag, as the
    /// override listener would.
    EmptyAndCancel,
}

/// What the port does once the script runs out.
#[derive(Debug, Clone, Copy)]
pub enum Exhausted {
    /// Trip the cancellation flag and keep timing out (bounded tests).
    CancelAndTimeout,
    /// Keep timing out; something else must stop the engine.
    TimeoutForever,
}

#[derive(Debug)]
struct ScriptState {
    steps: VecDeque<Step>,
    baud_log: Vec<u32>,
}

/// Serial port adapter that replays a fixed script of read outcomes and
/// records every applied baud rate. Clones share state.
#[derive(Debug, Clone)]
pub struct ScriptedPort {
    state: Arc<Mutex<ScriptState>>,
    cancel: Arc<AtomicBool>,
    on_exhausted: Exhausted,
}

impl ScriptedPort {
    pub fn new(
        steps: impl IntoIterator<Item = Step>,
        cancel: Arc<AtomicBool>,
        on_exhausted: Exhausted,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(ScriptState {
                steps: steps.into_iter().collect(),
                baud_log: Vec::new(),
            })),
            cancel,
            on_exhausted,
        }
    }

    /// Script steps delivering `text` byte by byte.
    pub fn bytes(text: &[u8]) -> Vec<Step> {
        text.iter().copied().map(Step::Byte).collect()
    }

    pub fn applied_rates(&self) -> Vec<u32> {
        self.state.lock().unwrap().baud_log.clone()
    }
}

fn timed_out() -> PortError {
    PortError::Io(io::Error::new(io::ErrorKind::TimedOut, "no data"))
}

impl SerialPortAdapter for ScriptedPort {
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        let step = self.state.lock().unwrap().steps.pop_front();
        match step {
            Some(Step::Byte(b)) => {
                buffer[0] = b;
                Ok(1)
            }
            Some(Step::Empty) => Err(timed_out()),
            Some(Step::EmptyAndCancel) => {
                self.cancel.store(true, Ordering::SeqCst);
                Err(timed_out())
            }
            None => {
                if matches!(self.on_exhausted, Exhausted::CancelAndTimeout) {
                    self.cancel.store(true, Ordering::SeqCst);
                }
                Err(timed_out())
            }
        }
    }

    fn set_baud_rate(&mut self, baud_rate: u32) -> Result<(), PortError> {
        self.state.lock().unwrap().baud_log.push(baud_rate);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), PortError> {
        Ok(())
    }

    fn clear_buffers(&mut self) -> Result<(), PortError> {
        self.state.lock().unwrap().steps.clear();
        Ok(())
    }

    fn name(&self) -> &str {
        "SCRIPTED0"
    }

    fn baud_rate(&self) -> Option<u32> {
        self.state.lock().unwrap().baud_log.last().copied()
    }
}
