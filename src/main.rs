//! baudscan command-line interface.
//!
//! Thin glue around the detection engine: argument parsing, the rate table
//! listing, and the post-detection minicom hand-off.

use baudscan::{
    minicom, AppError, DetectionEngine, DetectionMode, DetectionOutcome, DetectorConfig,
    ManualOverrideListener, MinicomProfile, PortController, RawModeGuard, TerminalKeySource,
    DEFAULT_THRESHOLD, DEFAULT_TIMEOUT_SECS,
};
use clap::Parser;
use std::io::{self, Write};
use std::sync::atomic::AtomicBool;
use std::sync::{mpsc, Arc};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Detect the baud rate of an unknown serial data source.",
    long_about = "Cycles through candidate baud rates on a serial port and statistically tests \
whether the incoming bytes resemble printable text. Without --auto the rate is cycled manually \
with the u/d keys (or arrow keys); Ctrl+C quits."
)]
struct Args {
    /// Serial port to probe.
    #[arg(short, long, default_value = "/dev/ttyUSB0")]
    port: String,

    /// Timeout in seconds used when switching baud rates in auto detect mode.
    #[arg(short, long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Minimum valid-character threshold used during auto detect mode.
    #[arg(short = 'c', long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: u32,

    /// Save the resulting configuration as NAME and launch minicom on it
    /// (implies --auto).
    #[arg(short, long)]
    name: Option<String>,

    /// Enable auto detect mode.
    #[arg(short, long)]
    auto: bool,

    /// Display supported baud rates and exit.
    #[arg(short = 'b', long)]
    list: bool,

    /// Do not echo data read from the serial port.
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    if args.list {
        println!();
        for rate in baudscan::BAUD_CANDIDATES {
            println!("\t{rate}");
        }
        println!();
        return;
    }

    if let Err(e) = run(args) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), AppError> {
    // -n implies unattended automatic detection.
    let auto = args.auto || args.name.is_some();

    println!();
    println!(
        "Starting baudrate detection on {}, turn on your serial device now.",
        args.port
    );
    println!("Press Ctrl+C to quit.");
    println!();

    let controller = PortController::open(&args.port, Duration::from_secs(args.timeout))?;

    let cancel = Arc::new(AtomicBool::new(false));
    let (signal_tx, signal_rx) = mpsc::channel();

    // The raw-mode guard stays on this stack frame so the terminal is
    // restored on every exit path, error propagation included. The listener
    // thread only reads events and may be killed without unwinding.
    let (_raw_guard, listener) = if auto {
        // No override listener; the engine cycles rates on timeout. The
        // dropped sender leaves the engine's signal drain permanently empty.
        drop(signal_tx);
        (None, None)
    } else {
        let guard = RawModeGuard::new()?;
        let listener = ManualOverrideListener::spawn(
            TerminalKeySource::new(),
            signal_tx,
            Arc::clone(&cancel),
        );
        (Some(guard), Some(listener))
    };

    let config = DetectorConfig {
        mode: if auto {
            DetectionMode::Automatic
        } else {
            DetectionMode::Manual
        },
        threshold: args.threshold,
        timeout: Duration::from_secs(args.timeout),
        echo: !args.quiet,
    };

    let mut engine = DetectionEngine::new(controller, config, Arc::clone(&cancel), signal_rx);

    match engine.detect()? {
        DetectionOutcome::Cancelled => {
            if let Some(listener) = listener {
                // The listener set the flag, so it has already exited.
                listener.join();
            }
            println!("\nDetection cancelled; no baudrate selected.");
            Ok(())
        }
        DetectionOutcome::Detected(rate) => {
            println!("\nDetected baudrate: {rate}");
            emit_config(&args.port, rate, args.name)
        }
    }
}

/// Post-detection hand-off: render the minicom profile, optionally save it
/// under a name, and optionally launch minicom. A failed save is reported
/// with the rendered text as a fallback and never fails the run.
fn emit_config(port: &str, rate: u32, name_arg: Option<String>) -> Result<(), AppError> {
    let unattended = name_arg.is_some();
    let name = match name_arg {
        Some(name) => name,
        None => {
            print!("\nSave minicom configuration as (leave blank to skip): ");
            io::stdout().flush()?;
            let mut line = String::new();
            io::stdin().read_line(&mut line)?;
            line.trim().to_string()
        }
    };

    let profile = MinicomProfile::new(port, rate);

    if name.is_empty() {
        println!("\n{}", profile.render());
        return Ok(());
    }

    match profile.save(&name) {
        Ok(path) => {
            println!("Configuration saved to {}.", path.display());

            let run_minicom = if unattended {
                true
            } else {
                print!("Run minicom now [n/Y]? ");
                io::stdout().flush()?;
                let mut line = String::new();
                io::stdin().read_line(&mut line)?;
                let answer = line.trim().to_ascii_lowercase();
                answer.is_empty() || answer.starts_with('y')
            };

            if run_minicom {
                minicom::launch(&name)?;
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("{e}");
            println!("\n{}", profile.render());
            Ok(())
        }
    }
}
