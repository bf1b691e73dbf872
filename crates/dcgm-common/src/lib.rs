//! # DCGM Common
//!
//! Types shared by every crate in the workspace: the error taxonomy used by
//! the lifecycle manager, the low-level process error type, and the
//! connection mode / handle types that tie a session together.

pub mod errors;
pub mod types;

// Re-export commonly used items
pub use errors::{Error, ErrorKind, NativeError, ProcessError, ProcessResult, Result};
pub use types::{ConnectionHandle, Mode, ParseModeError, RawHandle};
