//! Connection to an already running host engine.

use super::with_native_init;
use dcgm_common::{ConnectionHandle, Error, Result};
use dcgm_native::{ConnectV2Params, NativeApi};
use std::ffi::CString;
use std::fmt;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use tracing::{debug, info};

/// Address of a host engine plus the unix-socket flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandaloneTarget {
    address: CString,
    address_is_unix_socket: u32,
}

impl StandaloneTarget {
    /// Parse `[address, unix_socket_flag, ..]`.
    ///
    /// The flag is an unsigned decimal: nonzero means `address` is a socket
    /// path, zero means `host[:port]`. Arguments past the second are ignored.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        let (address, flag) = match args {
            [address, flag, ..] => (address.as_ref(), flag.as_ref()),
            _ => return Err(Error::argument_parse("missing address/port")),
        };

        let address_is_unix_socket = flag
            .parse::<u32>()
            .map_err(|e| Error::argument_parse(format!("error parsing {}: {}", flag, e)))?;

        Self::new(address, address_is_unix_socket)
    }

    pub fn new(address: &str, address_is_unix_socket: u32) -> Result<Self> {
        let address = CString::new(address)
            .map_err(|_| Error::argument_parse(format!("address contains a NUL byte: {:?}", address)))?;
        Ok(Self {
            address,
            address_is_unix_socket,
        })
    }

    /// Target for a unix domain socket at `path`.
    pub fn unix_socket(path: &Path) -> Result<Self> {
        let address = CString::new(path.as_os_str().as_bytes()).map_err(|_| {
            Error::argument_parse(format!("socket path contains a NUL byte: {}", path.display()))
        })?;
        Ok(Self {
            address,
            address_is_unix_socket: 1,
        })
    }

    pub fn address(&self) -> &str {
        self.address.to_str().unwrap_or_default()
    }

    pub fn address_is_unix_socket(&self) -> u32 {
        self.address_is_unix_socket
    }
}

impl fmt::Display for StandaloneTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.address_is_unix_socket != 0 { "unix" } else { "tcp" };
        write!(f, "{}://{}", kind, self.address.to_string_lossy())
    }
}

/// Client connection to a host engine.
#[derive(Debug)]
pub struct StandaloneConnection {
    handle: ConnectionHandle,
    target: StandaloneTarget,
}

impl StandaloneConnection {
    pub(crate) fn connect(native: &dyn NativeApi, target: &StandaloneTarget) -> Result<Self> {
        let handle = with_native_init(native, || {
            let mut params = ConnectV2Params::new(target.address_is_unix_socket);
            debug!(
                "Connecting to {} (params version {:#x})",
                target, params.version
            );
            native
                .connect(&target.address, &mut params)
                .map_err(Error::NativeConnect)
        })?;

        info!("Connected to host engine at {} (handle {})", target, handle);
        Ok(Self {
            handle,
            target: target.clone(),
        })
    }

    pub fn handle(&self) -> &ConnectionHandle {
        &self.handle
    }

    pub fn target(&self) -> &StandaloneTarget {
        &self.target
    }

    /// Disconnect, then shut the library down.
    pub(crate) fn disconnect(self, native: &dyn NativeApi) -> Result<()> {
        native.disconnect(&self.handle).map_err(Error::NativeDisconnect)?;
        debug!("Disconnected from host engine at {}", self.target);

        native.shutdown().map_err(Error::NativeShutdown)
    }
}
