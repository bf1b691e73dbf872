//! dlopen-backed implementation of [`NativeApi`].

use crate::api::{LibraryLoader, NativeApi, NativeResult};
use crate::ffi::{ConnectV2Params, DcgmReturn, OperationMode};
use crate::status::Status;
use dcgm_common::{ConnectionHandle, Error, RawHandle, Result};
use libloading::os::unix::{Library, Symbol, RTLD_GLOBAL, RTLD_LAZY};
use std::ffi::{c_char, c_int, CStr};
use tracing::debug;

type InitFn = unsafe extern "C" fn() -> DcgmReturn;
type ShutdownFn = unsafe extern "C" fn() -> DcgmReturn;
type StartEmbeddedFn = unsafe extern "C" fn(c_int, *mut RawHandle) -> DcgmReturn;
type StopEmbeddedFn = unsafe extern "C" fn(RawHandle) -> DcgmReturn;
type ConnectV2Fn =
    unsafe extern "C" fn(*const c_char, *mut ConnectV2Params, *mut RawHandle) -> DcgmReturn;
type DisconnectFn = unsafe extern "C" fn(RawHandle) -> DcgmReturn;
type ErrorStringFn = unsafe extern "C" fn(DcgmReturn) -> *const c_char;

/// Loads DCGM with `dlopen(name, RTLD_LAZY | RTLD_GLOBAL)`.
///
/// `RTLD_GLOBAL` makes the library's symbols visible to code that links
/// against the remaining DCGM entry points at runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct DynamicLoader;

impl LibraryLoader for DynamicLoader {
    fn load(&self, name: &str) -> Result<Box<dyn NativeApi>> {
        Ok(Box::new(DcgmLibrary::open(name)?))
    }
}

/// Resolved lifecycle symbols. Declared before `library` in [`DcgmLibrary`]
/// so they are dropped while the library is still mapped.
struct Symbols {
    init: Symbol<InitFn>,
    shutdown: Symbol<ShutdownFn>,
    start_embedded: Symbol<StartEmbeddedFn>,
    stop_embedded: Symbol<StopEmbeddedFn>,
    connect_v2: Symbol<ConnectV2Fn>,
    disconnect: Symbol<DisconnectFn>,
    error_string: Symbol<ErrorStringFn>,
}

/// A loaded copy of `libdcgm`.
pub struct DcgmLibrary {
    symbols: Symbols,
    library: Library,
    name: String,
}

impl DcgmLibrary {
    pub fn open(name: &str) -> Result<Self> {
        // SAFETY: loading runs the library's initialisers; libdcgm has no
        // preconditions on them.
        let library = unsafe { Library::open(Some(name), RTLD_LAZY | RTLD_GLOBAL) }
            .map_err(|e| Error::library_not_found(name, e.to_string()))?;

        let symbols = Self::resolve(&library, name)?;
        debug!("Loaded {} and resolved lifecycle symbols", name);

        Ok(Self {
            symbols,
            library,
            name: name.to_string(),
        })
    }

    fn resolve(library: &Library, name: &str) -> Result<Symbols> {
        fn get<T>(library: &Library, library_name: &str, symbol: &[u8]) -> Result<Symbol<T>> {
            // SAFETY: every `T` used below is the prototype from dcgm_agent.h.
            unsafe { library.get::<T>(symbol) }.map_err(|e| {
                Error::library_not_found(library_name, format!("missing symbol: {}", e))
            })
        }

        Ok(Symbols {
            init: get(library, name, b"dcgmInit\0")?,
            shutdown: get(library, name, b"dcgmShutdown\0")?,
            start_embedded: get(library, name, b"dcgmStartEmbedded\0")?,
            stop_embedded: get(library, name, b"dcgmStopEmbedded\0")?,
            connect_v2: get(library, name, b"dcgmConnect_v2\0")?,
            disconnect: get(library, name, b"dcgmDisconnect\0")?,
            error_string: get(library, name, b"errorString\0")?,
        })
    }

    fn check(&self, result: DcgmReturn) -> NativeResult<()> {
        Status(result).check(|status| {
            // SAFETY: errorString returns a static string or null.
            let text = unsafe { (self.symbols.error_string)(status.0) };
            if text.is_null() {
                None
            } else {
                // SAFETY: non-null results are NUL-terminated static strings.
                Some(unsafe { CStr::from_ptr(text) }.to_string_lossy().into_owned())
            }
        })
    }
}

impl NativeApi for DcgmLibrary {
    fn library_name(&self) -> &str {
        &self.name
    }

    fn init(&self) -> NativeResult<()> {
        // SAFETY: no arguments; safe to call at any time.
        self.check(unsafe { (self.symbols.init)() })
    }

    fn shutdown(&self) -> NativeResult<()> {
        // SAFETY: no arguments; safe to call at any time.
        self.check(unsafe { (self.symbols.shutdown)() })
    }

    fn start_embedded(&self, mode: OperationMode) -> NativeResult<ConnectionHandle> {
        let mut raw: RawHandle = 0;
        // SAFETY: `raw` is a valid out-pointer for the duration of the call.
        self.check(unsafe { (self.symbols.start_embedded)(mode as c_int, &mut raw) })?;
        Ok(ConnectionHandle::from_raw(raw))
    }

    fn stop_embedded(&self, handle: &ConnectionHandle) -> NativeResult<()> {
        // SAFETY: the handle came from start_embedded on this library.
        self.check(unsafe { (self.symbols.stop_embedded)(handle.as_raw()) })
    }

    fn connect(&self, address: &CStr, params: &mut ConnectV2Params) -> NativeResult<ConnectionHandle> {
        let mut raw: RawHandle = 0;
        // SAFETY: `address` is NUL-terminated, `params` and `raw` outlive the call.
        self.check(unsafe { (self.symbols.connect_v2)(address.as_ptr(), params, &mut raw) })?;
        Ok(ConnectionHandle::from_raw(raw))
    }

    fn disconnect(&self, handle: &ConnectionHandle) -> NativeResult<()> {
        // SAFETY: the handle came from connect on this library.
        self.check(unsafe { (self.symbols.disconnect)(handle.as_raw()) })
    }

    fn unload(self: Box<Self>) -> Result<()> {
        let DcgmLibrary {
            symbols,
            library,
            name,
        } = *self;
        drop(symbols);
        library.close().map_err(|e| Error::LibraryUnload {
            library: name,
            reason: e.to_string(),
        })
    }
}
