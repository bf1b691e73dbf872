//! Core domain types used throughout the lifecycle crates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a client process reaches the host engine.
///
/// The set is closed: every startup strategy has exactly one matching
/// teardown, and `match` on this type is exhaustive everywhere it is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// The host engine runs inside this process.
    Embedded,
    /// Connect to a host engine that is already running (TCP or unix socket).
    Standalone,
    /// Spawn a private host engine child and connect over a unix socket.
    #[serde(alias = "start_hostengine")]
    ManagedChild,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Embedded, Mode::Standalone, Mode::ManagedChild];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Embedded => "embedded",
            Mode::Standalone => "standalone",
            Mode::ManagedChild => "managed_child",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a [`Mode`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mode '{0}', expected one of: embedded, standalone, managed_child")]
pub struct ParseModeError(pub String);

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "embedded" => Ok(Mode::Embedded),
            "standalone" => Ok(Mode::Standalone),
            "managed_child" | "start_hostengine" => Ok(Mode::ManagedChild),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}

/// Native representation of `dcgmHandle_t` (`uintptr_t`).
pub type RawHandle = usize;

/// Opaque session identifier returned by the native library.
///
/// Deliberately neither `Clone` nor `Copy`: a handle belongs to exactly one
/// session and is released when that session shuts down. Code that calls
/// further native entry points borrows the raw value through [`as_raw`].
///
/// [`as_raw`]: ConnectionHandle::as_raw
#[derive(Debug, PartialEq, Eq)]
pub struct ConnectionHandle(RawHandle);

impl ConnectionHandle {
    pub fn from_raw(raw: RawHandle) -> Self {
        Self(raw)
    }

    pub fn as_raw(&self) -> RawHandle {
        self.0
    }
}

impl fmt::Display for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_str_accepts_aliases() {
        assert_eq!("embedded".parse::<Mode>().unwrap(), Mode::Embedded);
        assert_eq!("Standalone".parse::<Mode>().unwrap(), Mode::Standalone);
        assert_eq!("managed-child".parse::<Mode>().unwrap(), Mode::ManagedChild);
        assert_eq!("start_hostengine".parse::<Mode>().unwrap(), Mode::ManagedChild);
    }

    #[test]
    fn test_mode_from_str_rejects_unknown() {
        let err = "remote".parse::<Mode>().unwrap_err();
        assert_eq!(err, ParseModeError("remote".to_string()));
        assert!(err.to_string().contains("remote"));
    }

    #[test]
    fn test_mode_display_matches_serde_name() {
        for mode in Mode::ALL {
            let yaml = serde_yaml::to_string(&mode).unwrap();
            assert_eq!(yaml.trim(), mode.to_string());
        }
    }

    #[test]
    fn test_mode_deserializes_legacy_name() {
        let mode: Mode = serde_yaml::from_str("start_hostengine").unwrap();
        assert_eq!(mode, Mode::ManagedChild);
    }

    #[test]
    fn test_handle_exposes_raw_value() {
        let handle = ConnectionHandle::from_raw(0x2a);
        assert_eq!(handle.as_raw(), 0x2a);
        assert_eq!(handle.to_string(), "0x2a");
    }
}
