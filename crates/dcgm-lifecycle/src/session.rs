//! A live host engine session.

use crate::connection::{ChildRecord, Connection};
use dcgm_common::{ConnectionHandle, Mode, Result};
use dcgm_native::NativeApi;
use std::fmt;
use tracing::{debug, info, warn};

/// Everything needed to reverse a successful
/// [`initialize`](crate::LifecycleManager::initialize).
///
/// A session owns the loaded library, the connection handle and, in
/// managed-child mode, the child process record. It cannot be cloned, and
/// [`shutdown`](Session::shutdown) consumes it, so a session is torn down at
/// most once.
///
/// Dropping a session without calling `shutdown` still unloads the library
/// and removes a reserved socket path, but skips the native teardown calls
/// and leaves a managed child running.
pub struct Session {
    mode: Mode,
    native: Box<dyn NativeApi>,
    connection: Connection,
}

impl Session {
    pub(crate) fn new(mode: Mode, native: Box<dyn NativeApi>, connection: Connection) -> Self {
        Self {
            mode,
            native,
            connection,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Handle to pass to further native calls made through [`native`](Session::native).
    pub fn handle(&self) -> &ConnectionHandle {
        self.connection.handle()
    }

    /// The loaded library.
    pub fn native(&self) -> &dyn NativeApi {
        self.native.as_ref()
    }

    /// The host engine child, in managed-child mode.
    pub fn child(&self) -> Option<&ChildRecord> {
        self.connection.child()
    }

    /// Reverse the startup path recorded in this session, then unload the library.
    ///
    /// The library is unloaded even when the mode-specific teardown fails. The
    /// returned error is always the teardown's; an unload failure is logged.
    pub fn shutdown(self) -> Result<()> {
        let Session {
            mode,
            native,
            connection,
        } = self;
        info!("Shutting down {} session", mode);

        let outcome = match (mode, connection) {
            (Mode::Embedded, Connection::Embedded(c)) => c.stop(native.as_ref()),
            (Mode::Standalone, Connection::Standalone(c)) => c.disconnect(native.as_ref()),
            (Mode::ManagedChild, Connection::ManagedChild(c)) => c.stop(native.as_ref()),
            (mode, connection) => unreachable!(
                "session recorded mode {} but holds a {} connection",
                mode,
                connection.mode()
            ),
        };

        release_library(native);

        match &outcome {
            Ok(()) => info!("{} session shut down", mode),
            Err(e) => warn!("{} session shut down with error: {}", mode, e),
        }
        outcome
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("mode", &self.mode)
            .field("library", &self.native.library_name())
            .field("connection", &self.connection)
            .finish()
    }
}

/// Unload `native`, logging rather than returning a failure.
pub(crate) fn release_library(native: Box<dyn NativeApi>) {
    let name = native.library_name().to_string();
    match native.unload() {
        Ok(()) => debug!("Unloaded {}", name),
        Err(e) => warn!("{}", e),
    }
}
