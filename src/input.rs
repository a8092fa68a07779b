//! Manual override input: a background thread turning raw keystrokes into
//! cycle-advance signals and a cancellation flag.
//!
//! Only active in manual mode. The listener never touches the cycle or the
//! counters itself; it communicates with the detection engine exclusively
//! through an mpsc channel and a shared atomic flag.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use tracing::{debug, warn};

/// Direction to move the baud rate cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Cursor delta for this direction.
    pub fn delta(self) -> i32 {
        match self {
            Direction::Up => 1,
            Direction::Down => -1,
        }
    }
}

/// A decoded keystroke, reduced to what the listener cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Up,
    Down,
    /// Ctrl+C / ASCII 0x03.
    Interrupt,
    Other,
}

/// Capability contract: read exactly one keystroke, no echo, no line
/// buffering.
///
/// The production implementation is [`TerminalKeySource`]; tests substitute
/// a scripted source.
pub trait RawKeySource: Send {
    fn read_key(&mut self) -> io::Result<Key>;
}

/// RAII guard for terminal raw mode.
///
/// Held by the caller that drives detection, *not* by the listener thread:
/// the listener blocks in an event read and is killed without unwinding when
/// the process exits, so a guard moved into it would never run its drop. On
/// the caller's stack it restores the terminal on every exit path, including
/// error propagation out of the detection loop.
pub struct RawModeGuard {
    _private: (),
}

impl RawModeGuard {
    pub fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self { _private: () })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            warn!(error = %e, "failed to restore terminal mode");
        }
    }
}

/// Terminal key source backed by crossterm.
///
/// Crossterm selects the platform mechanism (termios on unix, the console
/// API on windows) behind one interface. Raw mode itself belongs to a
/// [`RawModeGuard`]; this type only decodes events.
#[derive(Debug, Default)]
pub struct TerminalKeySource;

impl TerminalKeySource {
    pub fn new() -> Self {
        Self
    }
}

impl RawKeySource for TerminalKeySource {
    fn read_key(&mut self) -> io::Result<Key> {
        loop {
            match crossterm::event::read()? {
                // Windows reports key releases as separate events.
                Event::Key(KeyEvent {
                    code,
                    modifiers,
                    kind: KeyEventKind::Press,
                    ..
                }) => {
                    let key = match code {
                        KeyCode::Up => Key::Up,
                        KeyCode::Down => Key::Down,
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            Key::Interrupt
                        }
                        KeyCode::Char(c) => Key::Char(c),
                        _ => Key::Other,
                    };
                    return Ok(key);
                }
                // Resize/focus/mouse events are irrelevant here.
                _ => continue,
            }
        }
    }
}

/// Background listener translating keystrokes into engine signals.
///
/// * `u`/`U`/Up-arrow: advance the cycle forward.
/// * `d`/`D`/Down-arrow: advance the cycle backward.
/// * Ctrl+C: set the cancellation flag and terminate.
pub struct ManualOverrideListener {
    handle: thread::JoinHandle<()>,
}

impl ManualOverrideListener {
    /// Spawn the listener thread.
    ///
    /// The engine reads advances from the receiving end of `signals` and
    /// observes cancellation through `cancel`.
    pub fn spawn(
        mut source: impl RawKeySource + 'static,
        signals: mpsc::Sender<Direction>,
        cancel: Arc<AtomicBool>,
    ) -> Self {
        let handle = thread::spawn(move || {
            while !cancel.load(Ordering::SeqCst) {
                let key = match source.read_key() {
                    Ok(key) => key,
                    Err(e) => {
                        warn!(error = %e, "keystroke read failed, stopping listener");
                        cancel.store(true, Ordering::SeqCst);
                        break;
                    }
                };

                match key {
                    Key::Up | Key::Char('u') | Key::Char('U') => {
                        if signals.send(Direction::Up).is_err() {
                            break;
                        }
                    }
                    Key::Down | Key::Char('d') | Key::Char('D') => {
                        if signals.send(Direction::Down).is_err() {
                            break;
                        }
                    }
                    Key::Interrupt => {
                        debug!("interrupt key received");
                        cancel.store(true, Ordering::SeqCst);
                        break;
                    }
                    _ => {}
                }
            }
        });

        Self { handle }
    }

    /// Wait for the listener thread to finish.
    pub fn join(self) {
        let _ = self.handle.join();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Scripted key source: replays a fixed sequence, then reports EOF.
    struct ScriptedKeys {
        keys: VecDeque<Key>,
    }

    impl ScriptedKeys {
        fn new(keys: impl IntoIterator<Item = Key>) -> Self {
            Self {
                keys: keys.into_iter().collect(),
            }
        }
    }

    impl RawKeySource for ScriptedKeys {
        fn read_key(&mut self) -> io::Result<Key> {
            self.keys
                .pop_front()
                .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
        }
    }

    #[test]
    fn test_up_and_down_keys_emit_signals() {
        let (tx, rx) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let listener = ManualOverrideListener::spawn(
            ScriptedKeys::new([
                Key::Char('u'),
                Key::Up,
                Key::Char('D'),
                Key::Down,
                Key::Interrupt,
            ]),
            tx,
            cancel.clone(),
        );
        listener.join();

        let signals: Vec<Direction> = rx.try_iter().collect();
        assert_eq!(
            signals,
            vec![
                Direction::Up,
                Direction::Up,
                Direction::Down,
                Direction::Down
            ]
        );
        assert!(cancel.load(Ordering::SeqCst));
    }

    #[test]
    fn test_unmapped_keys_are_ignored() {
        let (tx, rx) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let listener = ManualOverrideListener::spawn(
            ScriptedKeys::new([Key::Char('x'), Key::Other, Key::Interrupt]),
            tx,
            cancel.clone(),
        );
        listener.join();

        assert_eq!(rx.try_iter().count(), 0);
        assert!(cancel.load(Ordering::SeqCst));
    }

    #[test]
    fn test_read_failure_sets_cancel() {
        let (tx, _rx) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let listener = ManualOverrideListener::spawn(ScriptedKeys::new([]), tx, cancel.clone());
        listener.join();

        assert!(cancel.load(Ordering::SeqCst));
    }

    #[test]
    fn test_direction_delta() {
        assert_eq!(Direction::Up.delta(), 1);
        assert_eq!(Direction::Down.delta(), -1);
    }
}
