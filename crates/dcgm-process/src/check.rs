//! Process existence checking.

use dcgm_common::{ProcessError, ProcessResult};
use nix::sys::signal::kill;
use nix::unistd::Pid;

/// Check if a process with the given PID exists.
///
/// Uses `kill(pid, 0)`, which sends no signal but reports whether the pid is
/// known to the kernel. An unreaped zombie still counts as existing.
///
/// # Returns
///
/// * `Ok(true)` - Process exists (including when we lack permission to signal it)
/// * `Ok(false)` - No such process
/// * `Err(_)` - Any other failure
pub fn process_exists(pid: u32) -> ProcessResult<bool> {
    let nix_pid = Pid::from_raw(pid as i32);

    match kill(nix_pid, None) {
        Ok(_) => Ok(true),
        Err(nix::errno::Errno::ESRCH) => Ok(false),
        Err(nix::errno::Errno::EPERM) => Ok(true),
        Err(e) => Err(ProcessError::Configuration {
            id: pid.to_string(),
            reason: format!("Failed to check process: {}", e),
        }),
    }
}
