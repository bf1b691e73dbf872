//! Embedded host engine.

use super::with_native_init;
use dcgm_common::{ConnectionHandle, Error, Result};
use dcgm_native::{NativeApi, OperationMode};
use tracing::{debug, info};

/// Host engine running inside this process in automatic operation mode.
#[derive(Debug)]
pub struct EmbeddedConnection {
    handle: ConnectionHandle,
}

impl EmbeddedConnection {
    pub(crate) fn start(native: &dyn NativeApi) -> Result<Self> {
        let handle = with_native_init(native, || {
            native
                .start_embedded(OperationMode::Auto)
                .map_err(Error::NativeStart)
        })?;

        info!("Started embedded host engine (handle {})", handle);
        Ok(Self { handle })
    }

    pub fn handle(&self) -> &ConnectionHandle {
        &self.handle
    }

    /// Stop the embedded engine, then shut the library down.
    ///
    /// The library shutdown is skipped when stopping fails.
    pub(crate) fn stop(self, native: &dyn NativeApi) -> Result<()> {
        native.stop_embedded(&self.handle).map_err(Error::NativeStop)?;
        debug!("Stopped embedded host engine (handle {})", self.handle);

        native.shutdown().map_err(Error::NativeShutdown)
    }
}
