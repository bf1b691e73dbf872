//! Executable discovery.

use dcgm_common::{ProcessError, ProcessResult};
use std::ffi::OsStr;
use std::path::PathBuf;

/// Resolve `name` to an executable file.
///
/// With `search_path` unset the process `PATH` is searched; otherwise the
/// given colon-separated list is searched instead. Names containing a path
/// separator are checked directly.
pub fn resolve_executable(name: &str, search_path: Option<&OsStr>) -> ProcessResult<PathBuf> {
    if name.is_empty() {
        return Err(ProcessError::Configuration {
            id: "validation".to_string(),
            reason: "Executable name cannot be empty".to_string(),
        });
    }

    let resolved = match search_path {
        Some(paths) => {
            let cwd = std::env::current_dir()
                .map_err(|e| ProcessError::not_found(name, e.to_string()))?;
            which::which_in(name, Some(paths), cwd)
        }
        None => which::which(name),
    };

    resolved.map_err(|e| ProcessError::not_found(name, e.to_string()))
}
