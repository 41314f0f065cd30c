//! Logger initialisation
//!
//! Records go to both the terminal and the session's log file. Dashboard telemetry (records with
//! the [`TELEMETRY_TARGET`] target) is written to the log file only, since it arrives several
//! times a second and would drown out the scheduler's output on the terminal.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use log::{self, info, Level};
use fern::Dispatch;
use colored::{ColoredString, Colorize};
use thiserror::Error;

// Internal imports
use crate::session::{self, Session};

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Log target used for dashboard telemetry records.
pub const TELEMETRY_TARGET: &str = "telemetry";

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Expected a log level of at least `INFO`, found `{0}`")]
    InvalidMinLogLevel(LevelFilter),

    #[error("Could not open the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("A logger has already been set: {0}")]
    FernInitError(log::SetLoggerError)
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// `min_level` must let `Info` records through. Must only be called once per process, after the
/// session has been created.
pub fn logger_init(min_level: LevelFilter, session: &Session) -> Result<(), LoggerInitError> {
    if min_level < Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level))
    }

    let log_file = fern::log_file(&session.log_file_path)
        .map_err(LoggerInitError::LogFileInitError)?;

    let terminal = Dispatch::new()
        .filter(|meta| meta.target() != TELEMETRY_TARGET)
        .chain(std::io::stdout());

    let file = Dispatch::new()
        .chain(log_file);

    Dispatch::new()
        .format(|out, message, record| {
            let thread = std::thread::current();

            out.finish(format_args!(
                "{}",
                format_record(
                    session::get_elapsed_seconds(),
                    record.level(),
                    thread.name(),
                    record.target(),
                    message
                )
            ))
        })
        .level(min_level)
        .chain(terminal)
        .chain(file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    if let Some(epoch) = session::get_epoch() {
        info!("    Session epoch: {}", epoch);
    }
    info!("    Log level: {:?}", min_level);
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Build one log line.
///
/// Records from threads other than the main one carry the thread name, and the target is only
/// shown for records finer than `Info`.
fn format_record(
    elapsed_s: f64,
    level: Level,
    thread_name: Option<&str>,
    target: &str,
    message: &std::fmt::Arguments
) -> String {
    let thread_tag = match thread_name {
        Some("main") | None => String::new(),
        Some(n) => format!(" <{}>", n)
    };

    if level > Level::Info {
        format!("[{:10.6} {}]{} {}: {}", elapsed_s, level_tag(level), thread_tag, target, message)
    }
    else {
        format!("[{:10.6} {}]{} {}", elapsed_s, level_tag(level), thread_tag, message)
    }
}

/// Three letter tag for a log level
fn level_tag(level: Level) -> ColoredString {
    match level {
        Level::Trace => "TRC".dimmed().italic(),
        Level::Debug => "DBG".dimmed(),
        Level::Info  => "INF".normal(),
        Level::Warn  => "WRN".yellow(),
        Level::Error => "ERR".red().bold()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_format_record() {
        colored::control::set_override(false);

        let line = format_record(1.5, Level::Info, Some("main"), "robot", &format_args!("hi"));
        assert_eq!(line, "[  1.500000 INF] hi");

        let line = format_record(
            0.25, Level::Debug, Some("dashboard"), "telemetry", &format_args!("x = 1")
        );
        assert_eq!(line, "[  0.250000 DBG] <dashboard> telemetry: x = 1");
    }
}
