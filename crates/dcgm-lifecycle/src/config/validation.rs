use super::*;
use anyhow::{anyhow, Result};

/// Validate the complete configuration
pub fn validate_config(config: &LifecycleConfig) -> Result<()> {
    match config.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => {
            return Err(anyhow!(
                "Invalid log level: {}, must be one of: trace, debug, info, warn, error",
                config.log_level
            ))
        }
    }

    if config.library.name.is_empty() {
        return Err(anyhow!("Library name cannot be empty"));
    }

    match (&config.mode, &config.standalone) {
        (Mode::Standalone, None) => {
            return Err(anyhow!(
                "standalone configuration is required for standalone mode"
            ))
        }
        (Mode::Standalone, Some(standalone)) => validate_standalone_config(standalone)?,
        _ => {}
    }

    if config.mode == Mode::ManagedChild {
        validate_hostengine_config(&config.hostengine)?;
    }

    Ok(())
}

fn validate_standalone_config(standalone: &StandaloneConfig) -> Result<()> {
    if standalone.address.is_empty() {
        return Err(anyhow!("Standalone address cannot be empty"));
    }
    if standalone.address.contains('\0') {
        return Err(anyhow!("Standalone address contains a NUL byte"));
    }
    Ok(())
}

fn validate_hostengine_config(hostengine: &HostengineConfig) -> Result<()> {
    if hostengine.executable.is_empty() {
        return Err(anyhow!("Host engine executable cannot be empty"));
    }

    if hostengine.socket_prefix.contains('/') {
        return Err(anyhow!(
            "Socket prefix must be a file name, got: {}",
            hostengine.socket_prefix
        ));
    }

    Ok(())
}
