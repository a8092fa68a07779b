//! baudscan library
//!
//! Discovers the baud rate of an unknown serial data source by cycling
//! through candidate rates and statistically testing whether the incoming
//! bytes resemble printable text.
//!
//! # Modules
//!
//! - `chars`: byte classification for the text heuristic
//! - `cycle`: the candidate rate list and wrap-around cursor
//! - `port`: serial port abstraction (real + mock implementations)
//! - `controller`: owns the live port, applies rates, bounded reads
//! - `input`: manual-override keystroke listener
//! - `detector`: the detection state machine
//! - `minicom`: configuration rendering, persistence and hand-off
//! - `error`: unified error handling

pub mod chars;
pub mod controller;
pub mod cycle;
pub mod detector;
pub mod error;
pub mod input;
pub mod minicom;
pub mod port;

// Re-export commonly used types for convenience
pub use chars::{classify, CharClass};
pub use controller::PortController;
pub use cycle::{BaudCycle, BAUD_CANDIDATES};
pub use detector::{
    DetectionEngine, DetectionMode, DetectionOutcome, DetectorConfig, DEFAULT_THRESHOLD,
    DEFAULT_TIMEOUT_SECS,
};
pub use error::AppError;
pub use input::{
    Direction, Key, ManualOverrideListener, RawKeySource, RawModeGuard, TerminalKeySource,
};
pub use minicom::MinicomProfile;
pub use port::{MockSerialPort, PortConfiguration, PortError, SerialPortAdapter, SyncSerialPort};
