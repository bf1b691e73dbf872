//! Translation of `dcgmReturn_t` values.

use crate::ffi::DcgmReturn;
use dcgm_common::NativeError;
use std::fmt;

/// A `dcgmReturn_t` status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status(pub DcgmReturn);

impl Status {
    pub const OK: Status = Status(0);
    pub const BADPARAM: Status = Status(-1);
    pub const GENERIC_ERROR: Status = Status(-3);
    pub const INIT_ERROR: Status = Status(-7);
    pub const TIMEOUT: Status = Status(-11);
    pub const CONNECTION_NOT_VALID: Status = Status(-21);

    pub fn is_ok(self) -> bool {
        self == Status::OK
    }

    /// Converts to `Ok(())` or a [`NativeError`] carrying `describe`'s text.
    ///
    /// `describe` is only called on failure; an empty description falls back
    /// to a generic message so the code is never reported without context.
    pub fn check(self, describe: impl FnOnce(Status) -> Option<String>) -> Result<(), NativeError> {
        if self.is_ok() {
            return Ok(());
        }
        let message = describe(self)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("unknown DCGM error {}", self.0));
        Err(NativeError::new(self.0, message))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
