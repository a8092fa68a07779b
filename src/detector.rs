//! The detection engine: read bytes, score them, and cycle baud rates until
//! one produces believable text or the operator intervenes.

use crate::chars::{classify, CharClass};
use crate::controller::PortController;
use crate::cycle::BaudCycle;
use crate::input::Direction;
use crate::port::PortError;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Detection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionMode {
    /// Classify incoming bytes and cycle rates on timeout.
    Automatic,
    /// Echo bytes only; the operator cycles rates by keystroke.
    Manual,
}

/// Terminal result of one detection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionOutcome {
    /// The rate at which the stream looked like text.
    Detected(u32),
    /// The operator cancelled; no rate was selected.
    Cancelled,
}

/// Tunables for a detection run.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    pub mode: DetectionMode,
    /// Minimum valid-byte count before a rate can be accepted.
    pub threshold: u32,
    /// Attempt window; also the bound on each blocking read.
    pub timeout: Duration,
    /// Echo received bytes to stderr for the operator.
    pub echo: bool,
}

/// Default minimum number of valid characters per accumulation window.
pub const DEFAULT_THRESHOLD: u32 = 25;

/// Default attempt timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            mode: DetectionMode::Automatic,
            threshold: DEFAULT_THRESHOLD,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            echo: true,
        }
    }
}

/// Per-attempt classification counters.
///
/// Scoped to one accumulation window at one rate: reset on every rate change
/// and on every invalid byte, so evidence never leaks across windows.
#[derive(Debug, Default)]
struct ClassificationCounters {
    total: u32,
    whitespace: u32,
    punctuation: u32,
    vowels: u32,
}

impl ClassificationCounters {
    /// Fold one classified byte into the window. An invalid byte discards
    /// the whole window (it does not advance the rate or restart the timer).
    fn record(&mut self, class: CharClass) {
        match class {
            CharClass::Invalid => {
                self.reset();
                return;
            }
            CharClass::Whitespace => self.whitespace += 1,
            CharClass::Punctuation => self.punctuation += 1,
            CharClass::Vowel => self.vowels += 1,
            CharClass::OtherValid => {}
        }
        self.total += 1;
    }

    /// True once the window holds enough valid bytes with at least one
    /// whitespace, one punctuation and one vowel.
    fn confirmed(&self, threshold: u32) -> bool {
        self.total >= threshold && self.whitespace > 0 && self.punctuation > 0 && self.vowels > 0
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Orchestrates the port controller, the rate cycle and the classifier
/// under a time budget.
#[derive(Debug)]
pub struct DetectionEngine {
    controller: PortController,
    cycle: BaudCycle,
    config: DetectorConfig,
    cancel: Arc<AtomicBool>,
    signals: mpsc::Receiver<Direction>,
}

impl DetectionEngine {
    /// Build an engine over an opened controller.
    ///
    /// `cancel` and `signals` are the only state shared with the manual
    /// override listener; in automatic mode the sender side of `signals` is
    /// simply dropped.
    pub fn new(
        controller: PortController,
        config: DetectorConfig,
        cancel: Arc<AtomicBool>,
        signals: mpsc::Receiver<Direction>,
    ) -> Self {
        Self {
            controller,
            cycle: BaudCycle::new(),
            config,
            cancel,
            signals,
        }
    }

    /// Run detection until a rate is accepted or the run is cancelled.
    ///
    /// Applies the starting candidate first, then loops: read one byte
    /// (bounded by the configured timeout), classify it in automatic mode,
    /// and on a timeout tick step the cycle backward and reapply. Manual
    /// mode leaves cycling entirely to the listener's signals. Cancellation
    /// is cooperative, checked once per iteration, so it takes effect within
    /// one timeout period.
    pub fn detect(&mut self) -> Result<DetectionOutcome, PortError> {
        self.controller.apply_rate(self.cycle.current())?;
        info!(
            port = self.controller.port_name(),
            rate = self.cycle.current(),
            mode = ?self.config.mode,
            "starting baud rate detection"
        );

        let mut counters = ClassificationCounters::default();
        let mut attempt_start = Instant::now();

        loop {
            let mut timed_out = false;

            match self.controller.read_byte()? {
                Some(byte) => {
                    if self.config.echo {
                        let _ = std::io::stderr().write_all(&[byte]);
                    }

                    if self.config.mode == DetectionMode::Automatic {
                        counters.record(classify(byte));

                        if counters.confirmed(self.config.threshold) {
                            let rate = self.cycle.current();
                            info!(rate, total = counters.total, "stream looks like text");
                            return Ok(DetectionOutcome::Detected(rate));
                        }
                        if attempt_start.elapsed() >= self.config.timeout {
                            timed_out = true;
                        }
                    }
                }
                None => timed_out = true,
            }

            if timed_out && self.config.mode == DetectionMode::Automatic {
                // The cycle steps backward on timeout, trying earlier (more
                // common) candidates first.
                let rate = self.cycle.advance(-1);
                debug!(rate, "attempt timed out, cycling");
                self.controller.apply_rate(rate)?;
                counters.reset();
                attempt_start = Instant::now();
            }

            while let Ok(direction) = self.signals.try_recv() {
                let rate = self.cycle.advance(direction.delta());
                debug!(rate, ?direction, "manual override");
                self.controller.apply_rate(rate)?;
                counters.reset();
                attempt_start = Instant::now();
            }

            if self.cancel.load(Ordering::SeqCst) {
                info!("detection cancelled");
                return Ok(DetectionOutcome::Cancelled);
            }
        }
    }
}
