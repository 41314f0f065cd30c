//! Session management
//!
//! A session is one execution of a robot executable. Each session gets its own directory under
//! `$ROBOT_SW_ROOT/sessions` holding the log file. The moment the session starts is the process
//! wide epoch that log records are stamped against.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use chrono::{DateTime, Duration, Utc};
use conquer_once::OnceCell;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// STATICS
// ---------------------------------------------------------------------------

static SESSION_EPOCH: OnceCell<DateTime<Utc>> = OnceCell::uninit();

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// strftime format of the timestamp in session directory names.
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct Session {
    /// Directory holding everything produced by this session
    pub session_root: PathBuf,

    pub log_file_path: PathBuf,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("The software root environment variable (ROBOT_SW_ROOT) is not set")]
    SwRootNotSet,

    #[error("Cannot create the session directory: {0}")]
    CannotCreateDir(std::io::Error),

    #[error("A session has already been started in this process ({0})")]
    AlreadyStarted(conquer_once::TryInitError),

    #[error("The session epoch is being initialised by another thread")]
    EpochUnavailable,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Session {
    /// Start the session for `exec_name`, in `$ROBOT_SW_ROOT/<sessions_dir>`.
    ///
    /// Only one session can be started per process.
    pub fn new(exec_name: &str, sessions_dir: &str) -> Result<Self, SessionError> {
        SESSION_EPOCH
            .try_init_once(Utc::now)
            .map_err(SessionError::AlreadyStarted)?;

        let epoch = SESSION_EPOCH.get().ok_or(SessionError::EpochUnavailable)?;

        let mut sessions = crate::host::get_sw_root().map_err(|_| SessionError::SwRootNotSet)?;
        sessions.push(sessions_dir);

        Self::create_in(&sessions, exec_name, epoch)
    }

    /// Create the directory of a session started at `start` under `sessions`.
    fn create_in(sessions: &Path, exec_name: &str, start: &DateTime<Utc>)
        -> Result<Self, SessionError>
    {
        let session_root = sessions.join(
            format!("{}_{}", exec_name, start.format(TIMESTAMP_FORMAT))
        );

        fs::create_dir_all(&session_root).map_err(SessionError::CannotCreateDir)?;

        Ok(Session {
            log_file_path: session_root.join(format!("{}.log", exec_name)),
            session_root,
        })
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Seconds elapsed since the session started, `NAN` before the session is
/// started.
pub fn get_elapsed_seconds() -> f64 {
    match SESSION_EPOCH.get() {
        Some(e) => duration_to_seconds(Utc::now() - *e).unwrap_or(std::f64::NAN),
        None => std::f64::NAN,
    }
}

/// The session's start time, `None` before the session is started.
pub fn get_epoch() -> Option<&'static DateTime<Utc>> {
    SESSION_EPOCH.get()
}

/// Convert a duration into a number of seconds, or `None` if overflow
pub fn duration_to_seconds(duration: Duration) -> Option<f64> {
    duration
        .num_microseconds()
        .map(|us| us as f64 / 1e6)
}
