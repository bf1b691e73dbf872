//! # DCGM Native
//!
//! The seam between the lifecycle manager and the vendor `libdcgm` library.
//!
//! **Architecture:**
//! ```text
//! LifecycleManager
//!       ↓ uses
//! LibraryLoader trait ──► Box<dyn NativeApi>
//!       ↓ implemented by
//! DynamicLoader (dlopen via libloading)   MockLoader (feature `mock`)
//! ```
//!
//! Only the lifecycle entry points are bound here. Everything a session does
//! after it is up goes straight to the library with the session's handle.

pub mod api;
pub mod dynamic;
pub mod ffi;
pub mod status;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use api::{LibraryLoader, NativeApi, NativeResult};
pub use dynamic::{DcgmLibrary, DynamicLoader};
pub use ffi::{ConnectV2Params, OperationMode, CONNECT_V2_PARAMS_VERSION};
pub use status::Status;

/// Versioned filename the loader resolves by default.
pub const DCGM_LIBRARY: &str = "libdcgm.so.4";
