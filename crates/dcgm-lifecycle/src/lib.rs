//! # DCGM Lifecycle
//!
//! Brings a DCGM host engine session up and tears it down again.
//!
//! This crate provides:
//! - `LifecycleManager` - loads the native library and starts a session in
//!   one of the three [`Mode`]s
//! - `Session` - the move-only result of a successful start; `shutdown`
//!   reverses exactly what startup did
//! - Configuration loading (YAML)
//!
//! **Architecture:**
//! ```text
//! LifecycleManager::initialize(mode, args)
//!       ↓ loads via LibraryLoader, dispatches on Mode
//! Connection::{Embedded, Standalone, ManagedChild}
//!       ↓ owned by
//! Session ── shutdown() ──► mode-specific teardown, then library unload
//! ```

pub mod config;
pub mod connection;
pub mod manager;
pub mod options;
pub mod session;

pub use config::{HostengineConfig, LibraryConfig, LifecycleConfig, StandaloneConfig};
pub use connection::{ChildRecord, StandaloneTarget, DOMAIN_SOCKET_FLAG, TERM_FLAG};
pub use manager::LifecycleManager;
pub use options::{HostengineOptions, LifecycleOptions};
pub use session::Session;

pub use dcgm_common::{ConnectionHandle, Error, ErrorKind, Mode, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
