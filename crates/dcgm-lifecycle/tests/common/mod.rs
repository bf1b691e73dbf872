//! Shared fixtures: a mock native library and a fake `nv-hostengine`.

#![allow(dead_code)]

use dcgm_lifecycle::{HostengineOptions, LifecycleManager, LifecycleOptions};
use dcgm_native::mock::MockLoader;
use parking_lot::{Mutex, MutexGuard};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

pub const NO_ARGS: [&str; 0] = [];

static SPAWN_LOCK: Mutex<()> = Mutex::new(());

/// Serialize tests that write and exec scripts, so no forked sibling holds
/// a script open for writing while it is executed.
pub fn serial() -> MutexGuard<'static, ()> {
    SPAWN_LOCK.lock()
}

pub fn manager(loader: &MockLoader, options: LifecycleOptions) -> LifecycleManager<&MockLoader> {
    LifecycleManager::with_loader(loader, options)
}

/// A scratch directory holding an executable `nv-hostengine` shell script.
///
/// Started normally, the script records its socket argument and sleeps.
/// Started with `--term`, it records the call and exits with `term_exit`.
pub struct FakeHostengine {
    dir: TempDir,
}

impl FakeHostengine {
    pub fn new(term_exit: i32) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().display().to_string();
        let script = format!(
            "#!/bin/sh\n\
             if [ \"$1\" = \"--term\" ]; then\n\
             \techo term >> \"{root}/term.log\"\n\
             \texit {term_exit}\n\
             fi\n\
             echo \"$2\" > \"{root}/socket-arg\"\n\
             exec sleep 30\n"
        );
        let bin = dir.path().join("bin");
        fs::create_dir(&bin).unwrap();
        let path = bin.join("nv-hostengine");
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        Self { dir }
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.dir.path().join("bin")
    }

    pub fn scratch_dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn options(&self) -> LifecycleOptions {
        LifecycleOptions {
            hostengine: HostengineOptions {
                search_path: Some(self.bin_dir().into_os_string()),
                scratch_directory: self.scratch_dir().to_path_buf(),
                ..HostengineOptions::default()
            },
            ..LifecycleOptions::default()
        }
    }

    pub fn term_calls(&self) -> usize {
        fs::read_to_string(self.dir.path().join("term.log"))
            .map(|log| log.lines().count())
            .unwrap_or(0)
    }

    /// The socket path the child was started with, once it has written it.
    pub fn socket_arg(&self) -> Option<PathBuf> {
        let file = self.dir.path().join("socket-arg");
        wait_for(Duration::from_secs(5), || file.exists());
        fs::read_to_string(file)
            .ok()
            .map(|arg| PathBuf::from(arg.trim_end()))
    }
}

/// Poll `condition` until it holds or `timeout` passes.
pub fn wait_for(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(20));
    }
    condition()
}
