//! Runtime options for the lifecycle manager.

use dcgm_native::DCGM_LIBRARY;
use std::ffi::OsString;
use std::path::PathBuf;

/// Default host engine binary name, looked up on the search path.
pub const DEFAULT_HOSTENGINE: &str = "nv-hostengine";

/// Default directory for reserving the managed child's socket path.
pub const DEFAULT_SCRATCH_DIRECTORY: &str = "/tmp";

/// Default file-name prefix of the reserved socket path.
pub const DEFAULT_SOCKET_PREFIX: &str = "dcgm";

/// Options used by [`LifecycleManager`](crate::LifecycleManager).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleOptions {
    /// Versioned filename handed to the loader.
    pub library: String,
    pub hostengine: HostengineOptions,
}

/// Where and how the managed child is started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostengineOptions {
    /// Binary name (or path) of the host engine.
    pub executable: String,
    /// Colon-separated directories searched instead of `PATH`.
    pub search_path: Option<OsString>,
    pub scratch_directory: PathBuf,
    pub socket_prefix: String,
}

impl Default for LifecycleOptions {
    fn default() -> Self {
        Self {
            library: DCGM_LIBRARY.to_string(),
            hostengine: HostengineOptions::default(),
        }
    }
}

impl Default for HostengineOptions {
    fn default() -> Self {
        Self {
            executable: DEFAULT_HOSTENGINE.to_string(),
            search_path: None,
            scratch_directory: PathBuf::from(DEFAULT_SCRATCH_DIRECTORY),
            socket_prefix: DEFAULT_SOCKET_PREFIX.to_string(),
        }
    }
}
