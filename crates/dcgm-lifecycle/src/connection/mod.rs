//! Per-mode connection strategies.
//!
//! Each variant of [`Connection`] pairs one startup path with its teardown:
//! - `EmbeddedConnection`: host engine inside this process
//! - `StandaloneConnection`: client of a host engine that is already running
//! - `ManagedChildConnection`: client of a host engine child this process owns

pub mod embedded;
pub mod managed_child;
pub mod standalone;

pub use embedded::EmbeddedConnection;
pub use managed_child::{ChildRecord, ManagedChildConnection, DOMAIN_SOCKET_FLAG, TERM_FLAG};
pub use standalone::{StandaloneConnection, StandaloneTarget};

use dcgm_common::{ConnectionHandle, Error, Mode, Result};
use dcgm_native::NativeApi;
use tracing::warn;

/// A live connection, tagged by the mode that created it.
#[derive(Debug)]
pub enum Connection {
    Embedded(EmbeddedConnection),
    Standalone(StandaloneConnection),
    ManagedChild(ManagedChildConnection),
}

impl Connection {
    pub fn mode(&self) -> Mode {
        match self {
            Connection::Embedded(_) => Mode::Embedded,
            Connection::Standalone(_) => Mode::Standalone,
            Connection::ManagedChild(_) => Mode::ManagedChild,
        }
    }

    pub fn handle(&self) -> &ConnectionHandle {
        match self {
            Connection::Embedded(c) => c.handle(),
            Connection::Standalone(c) => c.handle(),
            Connection::ManagedChild(c) => c.handle(),
        }
    }

    pub fn child(&self) -> Option<&ChildRecord> {
        match self {
            Connection::ManagedChild(c) => Some(c.child()),
            Connection::Embedded(_) | Connection::Standalone(_) => None,
        }
    }
}

/// Run `dcgmInit`, then `start`.
///
/// If `start` fails the library is shut down again before the error is
/// returned; a failure of that shutdown is only logged.
pub(crate) fn with_native_init<T>(
    native: &dyn NativeApi,
    start: impl FnOnce() -> Result<T>,
) -> Result<T> {
    native.init().map_err(Error::NativeInit)?;

    start().map_err(|err| {
        if let Err(shutdown_err) = native.shutdown() {
            warn!("Native shutdown after failed start also failed: {}", shutdown_err);
        }
        err
    })
}
