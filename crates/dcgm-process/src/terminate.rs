//! Process termination primitives.

use dcgm_common::{ProcessError, ProcessResult};
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;

/// Force kill a process with SIGKILL.
pub fn force_kill(pid: u32) -> ProcessResult<()> {
    let nix_pid = Pid::from_raw(pid as i32);
    kill(nix_pid, Signal::SIGKILL).map_err(|e| ProcessError::signal_failed(pid, e.to_string()))
}
