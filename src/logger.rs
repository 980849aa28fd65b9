//! Structured terminal logging with box-drawing output.
//!
//! All user-facing output of the binary goes through these macros so the
//! session log reads as one continuous block diagram. Logging can be switched
//! off at runtime (tests, `--json` output) and routed to a file for
//! simulation runs.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Sender, channel};
use std::sync::{Arc, OnceLock};

use crate::time::source::TimeSource;

static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);

// Clock used for timestamp prefixes while a simulated clock drives the session
static SIMULATION_CLOCK: OnceLock<Arc<dyn TimeSource>> = OnceLock::new();

// Channel for routing output to file when --log is active
static LOG_CHANNEL: OnceLock<Sender<LogMessage>> = OnceLock::new();

enum LogMessage {
    Formatted(String),
    Shutdown,
}

/// Main logging interface.
///
/// ## Conventions
///
/// - **`log_block_start!`** opens a new block for a major event (session
///   start, phase change, settings loaded). Prints a spacer pipe then `┣ message`.
/// - **`log_decorated!`** continues the current block with `┣ message`.
/// - **`log_indented!`** prints details under the previous line: `┃   message`.
/// - **`log_pipe!`** inserts an empty `┃` line, typically before a semantic
///   `log_warning!`/`log_error!`/`log_info!`/`log_debug!` that starts its own block.
/// - **`log_version!`** prints the startup header, **`log_end!`** the final `╹`.
pub struct Log;

impl Log {
    /// Enable or disable logging.
    pub fn set_enabled(enabled: bool) {
        LOGGING_ENABLED.store(enabled, Ordering::SeqCst);
    }

    /// Check if logging is currently enabled.
    pub fn is_enabled() -> bool {
        LOGGING_ENABLED.load(Ordering::SeqCst)
    }

    /// Register the simulated clock whose time prefixes every line.
    /// Only the first registration wins.
    pub fn set_simulation_clock(clock: Arc<dyn TimeSource>) {
        let _ = SIMULATION_CLOCK.set(clock);
    }

    /// Start routing all output to `file_path` until the guard is dropped.
    pub fn start_file_logging(file_path: String) -> anyhow::Result<LoggerGuard> {
        let (tx, rx) = channel();

        LOG_CHANNEL
            .set(tx.clone())
            .map_err(|_| anyhow::anyhow!("Logger channel already initialized"))?;

        let handle = std::thread::spawn(move || {
            let mut file = std::fs::File::create(&file_path)?;

            loop {
                match rx.recv() {
                    Ok(LogMessage::Formatted(text)) => {
                        file.write_all(text.as_bytes())?;
                    }
                    Ok(LogMessage::Shutdown) | Err(_) => {
                        file.flush()?;
                        break;
                    }
                }
            }

            Ok::<(), anyhow::Error>(())
        });

        Ok(LoggerGuard {
            tx,
            handle: Some(handle),
        })
    }

    /// `[HH:MM:SS] ` of the simulated clock, or an empty string in real time.
    pub fn get_timestamp_prefix() -> String {
        match SIMULATION_CLOCK.get() {
            Some(clock) if clock.is_simulated() => {
                format!("[{}] ", clock.now().format("%H:%M:%S"))
            }
            _ => String::new(),
        }
    }
}

/// Guard for file logging that flushes and joins the writer on drop.
pub struct LoggerGuard {
    tx: Sender<LogMessage>,
    handle: Option<std::thread::JoinHandle<anyhow::Result<()>>>,
}

impl Drop for LoggerGuard {
    fn drop(&mut self) {
        let _ = self.tx.send(LogMessage::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

// Strip ANSI color sequences (ESC [ ... m) for file output
fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == 'm' {
                    break;
                }
            }
        } else {
            result.push(ch);
        }
    }

    result
}

// Routes formatted output to the log file or stdout
fn write_output(text: &str) {
    if let Some(tx) = LOG_CHANNEL.get() {
        let _ = tx.send(LogMessage::Formatted(strip_ansi_codes(text)));
    } else {
        print!("{text}");
        let _ = std::io::stdout().flush();
    }
}

/// Line shapes produced by the logging macros.
#[doc(hidden)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Layout {
    Decorated,
    Indented,
    BlockStart,
    Warning,
    Error,
    ErrorExit,
    Info,
    Debug,
}

/// Render one message in the given layout, without the timestamp prefix.
fn render(layout: Layout, prefix: &str, message: &str) -> String {
    match layout {
        Layout::Decorated => format!("{prefix}┣ {message}\n"),
        Layout::Indented => format!("{prefix}┃   {message}\n"),
        Layout::BlockStart => format!("{prefix}┃\n{prefix}┣ {message}\n"),
        Layout::Warning => format!("{prefix}┣[\x1b[33mWARNING\x1b[0m] {message}\n"),
        Layout::Error => format!("{prefix}┣[\x1b[31mERROR\x1b[0m] {message}\n"),
        Layout::ErrorExit => format!("{prefix}┃\n{prefix}┗[\x1b[31mERROR\x1b[0m] {message}\n"),
        Layout::Info => format!("{prefix}┣[\x1b[32mINFO\x1b[0m] {message}\n"),
        Layout::Debug => format!("{prefix}┣[\x1b[32mDEBUG\x1b[0m] {message}\n"),
    }
}

// Entry point for the macros
#[doc(hidden)]
pub fn emit(layout: Layout, message: &str) {
    if Log::is_enabled() {
        write_output(&render(layout, &Log::get_timestamp_prefix(), message));
    }
}

// Entry point for the fixed-shape macros (pipe, version, end)
#[doc(hidden)]
pub fn emit_raw(body: &str) {
    if Log::is_enabled() {
        let prefix = Log::get_timestamp_prefix();
        write_output(&format!("{prefix}{body}\n"));
    }
}

// # Logging Macros
//
// Every message macro accepts either a format string with arguments or a
// single expression implementing Display.

#[doc(hidden)]
#[macro_export]
macro_rules! __log_layout {
    ($layout:ident, $fmt:literal $($arg:tt)*) => {
        $crate::logger::emit($crate::logger::Layout::$layout, &format!($fmt $($arg)*))
    };
    ($layout:ident, $expr:expr) => {
        $crate::logger::emit($crate::logger::Layout::$layout, &format!("{}", $expr))
    };
}

/// Continue the current block: `┣ message`.
#[macro_export]
macro_rules! log_decorated {
    ($($t:tt)+) => { $crate::__log_layout!(Decorated, $($t)+) };
}

/// Detail line under the previous message: `┃   message`.
#[macro_export]
macro_rules! log_indented {
    ($($t:tt)+) => { $crate::__log_layout!(Indented, $($t)+) };
}

/// Start a new block: spacer pipe, then `┣ message`.
#[macro_export]
macro_rules! log_block_start {
    ($($t:tt)+) => { $crate::__log_layout!(BlockStart, $($t)+) };
}

/// Yellow `[WARNING]` line.
#[macro_export]
macro_rules! log_warning {
    ($($t:tt)+) => { $crate::__log_layout!(Warning, $($t)+) };
}

/// Red `[ERROR]` line.
#[macro_export]
macro_rules! log_error {
    ($($t:tt)+) => { $crate::__log_layout!(Error, $($t)+) };
}

/// Red `[ERROR]` line closing the diagram with `┗`.
#[macro_export]
macro_rules! log_error_exit {
    ($($t:tt)+) => { $crate::__log_layout!(ErrorExit, $($t)+) };
}

/// Green `[INFO]` line.
#[macro_export]
macro_rules! log_info {
    ($($t:tt)+) => { $crate::__log_layout!(Info, $($t)+) };
}

/// Green `[DEBUG]` line.
#[macro_export]
macro_rules! log_debug {
    ($($t:tt)+) => { $crate::__log_layout!(Debug, $($t)+) };
}

/// Empty `┃` line for vertical spacing.
#[macro_export]
macro_rules! log_pipe {
    () => {
        $crate::logger::emit_raw("┃")
    };
}

/// Startup header: `┏ nightlight vX.Y.Z ━━╸`.
#[macro_export]
macro_rules! log_version {
    () => {
        $crate::logger::emit_raw(&format!("┏ nightlight v{} ━━╸", env!("CARGO_PKG_VERSION")))
    };
}

/// Final `╹` marker.
#[macro_export]
macro_rules! log_end {
    () => {
        $crate::logger::emit_raw("╹")
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_strip_ansi_codes() {
        let colored = "┣[\x1b[33mWARNING\x1b[0m] store unreadable";
        assert_eq!(strip_ansi_codes(colored), "┣[WARNING] store unreadable");
    }

    #[test]
    fn test_strip_ansi_codes_keeps_plain_text() {
        assert_eq!(strip_ansi_codes("┃   wake 06:30"), "┃   wake 06:30");
    }

    #[test]
    fn test_render_layouts() {
        assert_eq!(render(Layout::Decorated, "", "night"), "┣ night\n");
        assert_eq!(render(Layout::Indented, "", "06:30"), "┃   06:30\n");
        assert_eq!(
            render(Layout::BlockStart, "[05:00:00] ", "start"),
            "[05:00:00] ┃\n[05:00:00] ┣ start\n"
        );
        assert_eq!(
            strip_ansi_codes(&render(Layout::Info, "", "saved")),
            "┣[INFO] saved\n"
        );
    }

    #[test]
    #[serial]
    fn test_enable_toggle() {
        Log::set_enabled(false);
        assert!(!Log::is_enabled());
        Log::set_enabled(true);
        assert!(Log::is_enabled());
    }
}
