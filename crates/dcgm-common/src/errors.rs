//! Error types for the DCGM lifecycle crates.
//!
//! [`Error`] is the taxonomy surfaced by session bring-up and tear-down.
//! Every native call result that is not `DCGM_ST_OK` becomes a
//! [`NativeError`] (status code plus the library's own message) wrapped in
//! the variant naming the step that failed.
//!
//! [`ProcessError`] is the narrower type returned by the low-level process
//! primitives; the lifecycle layer maps it into the step-specific variants.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for lifecycle operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A failed native library call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (status {code})")]
pub struct NativeError {
    /// Raw `dcgmReturn_t` value.
    pub code: i32,
    /// Text from the library's `errorString`, or a fallback when it has none.
    pub message: String,
}

impl NativeError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Main error type for session bring-up and tear-down.
#[derive(Debug, Error)]
pub enum Error {
    /// The native shared library (or one of its entry points) could not be resolved.
    #[error("{library} not found: {reason}")]
    LibraryNotFound { library: String, reason: String },

    /// Closing the native library failed. Logged during shutdown, never returned from it.
    #[error("error unloading {library}: {reason}")]
    LibraryUnload { library: String, reason: String },

    /// Standalone arguments were missing or malformed.
    #[error("{message}")]
    ArgumentParse { message: String },

    /// The host engine binary is not on the search path.
    #[error("error finding {executable}: {reason}")]
    ExecutableNotFound { executable: String, reason: String },

    /// The scratch file reserving the socket path could not be created.
    #[error("error creating temporary file in {} directory: {source}", directory.display())]
    ScratchFile {
        directory: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Spawning the host engine child failed.
    #[error("error fork-execing {executable}: {reason}")]
    ForkExec { executable: String, reason: String },

    #[error("error initializing DCGM: {0}")]
    NativeInit(#[source] NativeError),

    #[error("error starting nv-hostengine: {0}")]
    NativeStart(#[source] NativeError),

    #[error("error connecting to nv-hostengine: {0}")]
    NativeConnect(#[source] NativeError),

    #[error("error disconnecting from nv-hostengine: {0}")]
    NativeDisconnect(#[source] NativeError),

    #[error("error stopping nv-hostengine: {0}")]
    NativeStop(#[source] NativeError),

    #[error("error shutting down DCGM: {0}")]
    NativeShutdown(#[source] NativeError),

    /// The host engine's own `--term` command failed.
    #[error("error terminating {executable}: {reason}")]
    TerminationCommand { executable: String, reason: String },

    /// SIGKILL to the recorded child pid failed.
    #[error("error killing host engine process {pid}: {reason}")]
    ForceKill { pid: u32, reason: String },
}

/// Fieldless discriminant of [`Error`], handy for assertions and metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    LibraryNotFound,
    LibraryUnload,
    ArgumentParse,
    ExecutableNotFound,
    ScratchFile,
    ForkExec,
    NativeInit,
    NativeStart,
    NativeConnect,
    NativeDisconnect,
    NativeStop,
    NativeShutdown,
    TerminationCommand,
    ForceKill,
}

impl Error {
    pub fn library_not_found(library: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::LibraryNotFound {
            library: library.into(),
            reason: reason.into(),
        }
    }

    pub fn argument_parse(message: impl Into<String>) -> Self {
        Self::ArgumentParse {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::LibraryNotFound { .. } => ErrorKind::LibraryNotFound,
            Error::LibraryUnload { .. } => ErrorKind::LibraryUnload,
            Error::ArgumentParse { .. } => ErrorKind::ArgumentParse,
            Error::ExecutableNotFound { .. } => ErrorKind::ExecutableNotFound,
            Error::ScratchFile { .. } => ErrorKind::ScratchFile,
            Error::ForkExec { .. } => ErrorKind::ForkExec,
            Error::NativeInit(_) => ErrorKind::NativeInit,
            Error::NativeStart(_) => ErrorKind::NativeStart,
            Error::NativeConnect(_) => ErrorKind::NativeConnect,
            Error::NativeDisconnect(_) => ErrorKind::NativeDisconnect,
            Error::NativeStop(_) => ErrorKind::NativeStop,
            Error::NativeShutdown(_) => ErrorKind::NativeShutdown,
            Error::TerminationCommand { .. } => ErrorKind::TerminationCommand,
            Error::ForceKill { .. } => ErrorKind::ForceKill,
        }
    }

    /// The native status behind this error, if it came from a library call.
    pub fn native(&self) -> Option<&NativeError> {
        match self {
            Error::NativeInit(e)
            | Error::NativeStart(e)
            | Error::NativeConnect(e)
            | Error::NativeDisconnect(e)
            | Error::NativeStop(e)
            | Error::NativeShutdown(e) => Some(e),
            _ => None,
        }
    }
}

// ==============================================================================
// Process Errors
// ==============================================================================

/// Errors from the low-level process primitives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessError {
    #[error("Executable not found: {executable} - {reason}")]
    NotFound { executable: String, reason: String },

    #[error("Process spawn failed: {executable} - {reason}")]
    SpawnFailed { executable: String, reason: String },

    #[error("Command failed: {executable} - {reason}")]
    CommandFailed { executable: String, reason: String },

    #[error("Signal failed: pid {pid} - {reason}")]
    SignalFailed { pid: u32, reason: String },

    #[error("Process configuration error: {id} - {reason}")]
    Configuration { id: String, reason: String },
}

impl ProcessError {
    pub fn not_found(executable: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::NotFound {
            executable: executable.into(),
            reason: reason.into(),
        }
    }

    pub fn spawn_failed(executable: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SpawnFailed {
            executable: executable.into(),
            reason: reason.into(),
        }
    }

    pub fn command_failed(executable: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CommandFailed {
            executable: executable.into(),
            reason: reason.into(),
        }
    }

    pub fn signal_failed(pid: u32, reason: impl Into<String>) -> Self {
        Self::SignalFailed {
            pid,
            reason: reason.into(),
        }
    }

    /// The human-readable cause without the variant prefix.
    pub fn reason(&self) -> &str {
        match self {
            ProcessError::NotFound { reason, .. }
            | ProcessError::SpawnFailed { reason, .. }
            | ProcessError::CommandFailed { reason, .. }
            | ProcessError::SignalFailed { reason, .. }
            | ProcessError::Configuration { reason, .. } => reason,
        }
    }
}

/// Result type for process operations.
pub type ProcessResult<T> = std::result::Result<T, ProcessError>;
