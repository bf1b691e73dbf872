//! In-memory stand-in for `libdcgm`.
//!
//! `MockLoader` hands out `MockNative` instances that share one call journal,
//! so a test can assert the exact native call sequence of a session and
//! whether the library was unloaded afterwards.

use crate::api::{LibraryLoader, NativeApi, NativeResult};
use crate::ffi::{ConnectV2Params, OperationMode};
use dcgm_common::{ConnectionHandle, Error, NativeError, RawHandle, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::ffi::CStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Handle value returned by successful start/connect calls.
pub const MOCK_HANDLE: RawHandle = 0xd0c6;

/// One recorded native interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeCall {
    Load(String),
    Init,
    Shutdown,
    StartEmbedded(OperationMode),
    StopEmbedded(RawHandle),
    Connect {
        address: String,
        address_is_unix_socket: u32,
        version: u32,
    },
    Disconnect(RawHandle),
    Unload,
}

/// Call sites that can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    Init,
    Shutdown,
    StartEmbedded,
    StopEmbedded,
    Connect,
    Disconnect,
    Unload,
}

#[derive(Debug, Default)]
struct Shared {
    calls: Mutex<Vec<NativeCall>>,
    failures: Mutex<HashMap<FailPoint, i32>>,
    live: AtomicUsize,
}

impl Shared {
    fn record(&self, call: NativeCall) {
        self.calls.lock().push(call);
    }

    fn outcome(&self, point: FailPoint) -> NativeResult<()> {
        match self.failures.lock().get(&point) {
            Some(&code) => Err(NativeError::new(code, format!("mock {:?} failure", point))),
            None => Ok(()),
        }
    }
}

/// Loader producing [`MockNative`] libraries.
#[derive(Debug, Clone, Default)]
pub struct MockLoader {
    shared: Arc<Shared>,
    missing: bool,
}

impl MockLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// A loader for which the library is absent.
    pub fn missing() -> Self {
        Self {
            missing: true,
            ..Self::default()
        }
    }

    /// Make `point` return `code`.
    pub fn fail(self, point: FailPoint, code: i32) -> Self {
        self.shared.failures.lock().insert(point, code);
        self
    }

    /// All calls recorded so far, in order.
    pub fn calls(&self) -> Vec<NativeCall> {
        self.shared.calls.lock().clone()
    }

    /// Recorded calls, without the `Load` entries.
    pub fn native_calls(&self) -> Vec<NativeCall> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, NativeCall::Load(_)))
            .collect()
    }

    /// Number of loaded instances that have not been dropped yet.
    pub fn live_instances(&self) -> usize {
        self.shared.live.load(Ordering::SeqCst)
    }
}

impl LibraryLoader for MockLoader {
    fn load(&self, name: &str) -> Result<Box<dyn NativeApi>> {
        if self.missing {
            return Err(Error::library_not_found(
                name,
                "cannot open shared object file: No such file or directory",
            ));
        }
        self.shared.record(NativeCall::Load(name.to_string()));
        self.shared.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockNative {
            name: name.to_string(),
            shared: Arc::clone(&self.shared),
        }))
    }
}

/// A fake loaded library.
#[derive(Debug)]
pub struct MockNative {
    name: String,
    shared: Arc<Shared>,
}

impl NativeApi for MockNative {
    fn library_name(&self) -> &str {
        &self.name
    }

    fn init(&self) -> NativeResult<()> {
        self.shared.record(NativeCall::Init);
        self.shared.outcome(FailPoint::Init)
    }

    fn shutdown(&self) -> NativeResult<()> {
        self.shared.record(NativeCall::Shutdown);
        self.shared.outcome(FailPoint::Shutdown)
    }

    fn start_embedded(&self, mode: OperationMode) -> NativeResult<ConnectionHandle> {
        self.shared.record(NativeCall::StartEmbedded(mode));
        self.shared.outcome(FailPoint::StartEmbedded)?;
        Ok(ConnectionHandle::from_raw(MOCK_HANDLE))
    }

    fn stop_embedded(&self, handle: &ConnectionHandle) -> NativeResult<()> {
        self.shared.record(NativeCall::StopEmbedded(handle.as_raw()));
        self.shared.outcome(FailPoint::StopEmbedded)
    }

    fn connect(&self, address: &CStr, params: &mut ConnectV2Params) -> NativeResult<ConnectionHandle> {
        self.shared.record(NativeCall::Connect {
            address: address.to_string_lossy().into_owned(),
            address_is_unix_socket: params.address_is_unix_socket,
            version: params.version,
        });
        self.shared.outcome(FailPoint::Connect)?;
        Ok(ConnectionHandle::from_raw(MOCK_HANDLE))
    }

    fn disconnect(&self, handle: &ConnectionHandle) -> NativeResult<()> {
        self.shared.record(NativeCall::Disconnect(handle.as_raw()));
        self.shared.outcome(FailPoint::Disconnect)
    }

    fn unload(self: Box<Self>) -> Result<()> {
        self.shared.record(NativeCall::Unload);
        self.shared.outcome(FailPoint::Unload).map_err(|e| Error::LibraryUnload {
            library: self.name.clone(),
            reason: e.to_string(),
        })
    }
}

impl Drop for MockNative {
    fn drop(&mut self) {
        self.shared.live.fetch_sub(1, Ordering::SeqCst);
    }
}
