//! Traits separating the lifecycle manager from the vendor library.

use crate::ffi::{ConnectV2Params, OperationMode};
use dcgm_common::{ConnectionHandle, NativeError, Result};
use std::ffi::CStr;

/// Result of a single native call.
pub type NativeResult<T> = std::result::Result<T, NativeError>;

/// The lifecycle entry points of a loaded DCGM library.
///
/// One value corresponds to one loaded copy of the library. Dropping it
/// unloads the library; [`unload`](NativeApi::unload) does the same but
/// reports whether the unload itself succeeded.
pub trait NativeApi: Send {
    /// Filename the library was loaded from.
    fn library_name(&self) -> &str;

    /// `dcgmInit`
    fn init(&self) -> NativeResult<()>;

    /// `dcgmShutdown`
    fn shutdown(&self) -> NativeResult<()>;

    /// `dcgmStartEmbedded`
    fn start_embedded(&self, mode: OperationMode) -> NativeResult<ConnectionHandle>;

    /// `dcgmStopEmbedded`
    fn stop_embedded(&self, handle: &ConnectionHandle) -> NativeResult<()>;

    /// `dcgmConnect_v2`
    fn connect(&self, address: &CStr, params: &mut ConnectV2Params) -> NativeResult<ConnectionHandle>;

    /// `dcgmDisconnect`
    fn disconnect(&self, handle: &ConnectionHandle) -> NativeResult<()>;

    /// Unload the library, reporting failure as `Error::LibraryUnload`.
    fn unload(self: Box<Self>) -> Result<()>;
}

/// Resolves a library filename to a loaded [`NativeApi`].
pub trait LibraryLoader {
    /// Load `name`; failure is `Error::LibraryNotFound`.
    fn load(&self, name: &str) -> Result<Box<dyn NativeApi>>;
}

impl<L: LibraryLoader + ?Sized> LibraryLoader for &L {
    fn load(&self, name: &str) -> Result<Box<dyn NativeApi>> {
        (**self).load(name)
    }
}
