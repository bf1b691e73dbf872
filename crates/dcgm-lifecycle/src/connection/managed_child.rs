//! Host engine child owned by this process.
//!
//! Startup reserves a unique path in the scratch directory, starts
//! `nv-hostengine --domain-socket <path>` in its own process group and
//! connects to it over that socket. Teardown disconnects, asks the engine to
//! stop with `nv-hostengine --term`, then SIGKILLs the recorded pid. The
//! reserved path is removed whatever happens.

use super::standalone::{StandaloneConnection, StandaloneTarget};
use crate::options::HostengineOptions;
use dcgm_common::{ConnectionHandle, Error, Result};
use dcgm_native::NativeApi;
use dcgm_process::{force_kill, resolve_executable, run_to_completion, spawn_in_process_group};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Child;
use tempfile::TempPath;
use tracing::{debug, info, warn};

/// Flag telling the host engine to listen on a unix socket at the next argument.
pub const DOMAIN_SOCKET_FLAG: &str = "--domain-socket";

/// Flag asking a running host engine to terminate.
pub const TERM_FLAG: &str = "--term";

/// The spawned host engine and the socket path reserved for it.
#[derive(Debug)]
pub struct ChildRecord {
    pid: u32,
    process: Child,
    executable: PathBuf,
    socket_path: TempPath,
}

impl ChildRecord {
    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// `--term`, then SIGKILL and reap.
    ///
    /// A failing `--term` is returned without killing the child.
    fn terminate(&mut self) -> Result<()> {
        let name = self.executable.display().to_string();

        run_to_completion(&self.executable, [TERM_FLAG]).map_err(|e| {
            Error::TerminationCommand {
                executable: name.clone(),
                reason: e.reason().to_string(),
            }
        })?;
        info!("Successfully terminated {}", name);

        // --term returns before the engine exits.
        force_kill(self.pid).map_err(|e| Error::ForceKill {
            pid: self.pid,
            reason: e.reason().to_string(),
        })?;
        self.reap();
        Ok(())
    }

    fn reap(&mut self) {
        match self.process.wait() {
            Ok(status) => debug!("Host engine (PID: {}) exited: {}", self.pid, status),
            Err(e) => warn!("Failed to reap host engine (PID: {}): {}", self.pid, e),
        }
    }

    /// Kill and reap without the `--term` handshake, after a failed startup.
    fn abort(mut self) {
        warn!("Killing host engine (PID: {}) after failed startup", self.pid);
        match force_kill(self.pid) {
            Ok(()) => self.reap(),
            Err(e) => warn!("Failed to kill host engine (PID: {}): {}", self.pid, e),
        }
        self.release();
    }

    /// Remove the reserved socket path.
    fn release(self) {
        let path = self.socket_path.to_path_buf();
        match self.socket_path.close() {
            Ok(()) => debug!("Removed socket path {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Socket path {} already removed", path.display())
            }
            Err(e) => warn!("Failed to remove socket path {}: {}", path.display(), e),
        }
    }
}

/// Create an empty file in `directory` to claim a unique path for the socket.
///
/// The host engine replaces the file with its listening socket. The returned
/// [`TempPath`] deletes the path when dropped.
fn reserve_socket_path(directory: &Path, prefix: &str) -> Result<TempPath> {
    let file = tempfile::Builder::new()
        .prefix(prefix)
        .tempfile_in(directory)
        .map_err(|source| Error::ScratchFile {
            directory: directory.to_path_buf(),
            source,
        })?;
    Ok(file.into_temp_path())
}

/// Connection to a host engine child started by this process.
#[derive(Debug)]
pub struct ManagedChildConnection {
    connection: StandaloneConnection,
    child: ChildRecord,
}

impl ManagedChildConnection {
    pub(crate) fn start(native: &dyn NativeApi, options: &HostengineOptions) -> Result<Self> {
        let executable = resolve_executable(&options.executable, options.search_path.as_deref())
            .map_err(|e| Error::ExecutableNotFound {
                executable: options.executable.clone(),
                reason: e.reason().to_string(),
            })?;
        debug!("Resolved host engine binary: {}", executable.display());

        let socket_path = reserve_socket_path(&options.scratch_directory, &options.socket_prefix)?;

        let process = spawn_in_process_group(
            &executable,
            [OsStr::new(DOMAIN_SOCKET_FLAG), socket_path.as_os_str()],
        )
        .map_err(|e| Error::ForkExec {
            executable: executable.display().to_string(),
            reason: e.reason().to_string(),
        })?;

        let child = ChildRecord {
            pid: process.id(),
            process,
            executable,
            socket_path,
        };
        info!(
            "Started host engine child (PID: {}) on {}",
            child.pid,
            child.socket_path.display()
        );

        let connection = StandaloneTarget::unix_socket(child.socket_path())
            .and_then(|target| StandaloneConnection::connect(native, &target));

        match connection {
            Ok(connection) => Ok(Self { connection, child }),
            Err(e) => {
                child.abort();
                Err(e)
            }
        }
    }

    pub fn handle(&self) -> &ConnectionHandle {
        self.connection.handle()
    }

    pub fn child(&self) -> &ChildRecord {
        &self.child
    }

    /// Disconnect and shut the library down, then stop the child.
    ///
    /// A disconnect failure skips the child shutdown. The socket path is
    /// removed in every case.
    pub(crate) fn stop(self, native: &dyn NativeApi) -> Result<()> {
        let ManagedChildConnection {
            connection,
            mut child,
        } = self;

        let outcome = connection
            .disconnect(native)
            .and_then(|()| child.terminate());

        child.release();
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcgm_common::ErrorKind;
    use tempfile::TempDir;

    #[test]
    fn test_reserved_path_is_unique_and_removed_on_drop() {
        let dir = TempDir::new().unwrap();
        let first = reserve_socket_path(dir.path(), "dcgm").unwrap();
        let second = reserve_socket_path(dir.path(), "dcgm").unwrap();

        assert_ne!(first.to_path_buf(), second.to_path_buf());
        assert!(first.exists());
        assert!(first.file_name().unwrap().to_string_lossy().starts_with("dcgm"));

        let path = first.to_path_buf();
        drop(first);
        assert!(!path.exists());
    }

    #[test]
    fn test_reserve_in_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent");

        let err = reserve_socket_path(&missing, "dcgm").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ScratchFile);
    }
}
