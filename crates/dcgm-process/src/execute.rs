//! Process execution primitives.

use dcgm_common::{ProcessError, ProcessResult};
use std::ffi::OsStr;
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use tracing::debug;

/// Spawn `executable` with `args` as the leader of a new process group.
///
/// Standard input, output and error are inherited from the caller. Putting
/// the child in its own group keeps terminal signals aimed at the caller's
/// group (Ctrl+C) away from it. Returns as soon as the exec has happened; it
/// does not wait for the child to become ready.
pub fn spawn_in_process_group<I, S>(executable: &Path, args: I) -> ProcessResult<Child>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(executable);
    cmd.args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .process_group(0);

    let child = cmd
        .spawn()
        .map_err(|e| ProcessError::spawn_failed(executable.display().to_string(), e.to_string()))?;

    debug!("Spawned {} (PID: {}) in its own process group", executable.display(), child.id());
    Ok(child)
}

/// Run `executable` with `args` and wait for it to exit.
///
/// A spawn failure and a non-zero exit both yield `CommandFailed`.
pub fn run_to_completion<I, S>(executable: &Path, args: I) -> ProcessResult<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let name = executable.display().to_string();
    let status = Command::new(executable)
        .args(args)
        .status()
        .map_err(|e| ProcessError::command_failed(&name, e.to_string()))?;

    if status.success() {
        Ok(())
    } else {
        Err(ProcessError::command_failed(name, status.to_string()))
    }
}
