//! C ABI types shared with `dcgm_structs.h`.

use std::ffi::{c_int, c_uint};
use std::mem::size_of;

/// `dcgmReturn_t`
pub type DcgmReturn = c_int;

/// `dcgmOperationMode_t`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationMode {
    /// The host engine schedules field updates itself.
    Auto = 1,
    /// The caller drives updates with `dcgmUpdateAllFields`.
    Manual = 2,
}

/// Builds a struct version word: `sizeof(struct) | (version << 24)`.
pub const fn make_version(size: usize, version: u32) -> c_uint {
    (size as c_uint) | (version << 24)
}

/// `dcgmConnectV2Params_v2`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectV2Params {
    pub version: c_uint,
    /// Keep host engine state after this client disconnects (0 = no).
    pub persist_after_disconnect: c_uint,
    /// Connect timeout in milliseconds; 0 selects the library default.
    pub timeout_ms: c_uint,
    /// Nonzero when the address is a unix socket path rather than host:port.
    pub address_is_unix_socket: c_uint,
}

pub const CONNECT_V2_PARAMS_VERSION: c_uint = make_version(size_of::<ConnectV2Params>(), 2);

impl ConnectV2Params {
    pub fn new(address_is_unix_socket: u32) -> Self {
        Self {
            version: CONNECT_V2_PARAMS_VERSION,
            persist_after_disconnect: 0,
            timeout_ms: 0,
            address_is_unix_socket,
        }
    }

    pub fn is_unix_socket(&self) -> bool {
        self.address_is_unix_socket != 0
    }
}
