//! YAML configuration for a lifecycle session.
//!
//! ```yaml
//! mode: managed_child
//! log_level: info
//! library:
//!   name: libdcgm.so.4
//! standalone:
//!   address: localhost
//!   address_is_unix_socket: 0
//! hostengine:
//!   executable: nv-hostengine
//!   scratch_directory: /tmp
//!   socket_prefix: dcgm
//! ```

use crate::options::{
    HostengineOptions, LifecycleOptions, DEFAULT_HOSTENGINE, DEFAULT_SCRATCH_DIRECTORY,
    DEFAULT_SOCKET_PREFIX,
};
use anyhow::{Context, Result};
use dcgm_common::Mode;
use dcgm_native::DCGM_LIBRARY;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub mod validation;

/// Top-level configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleConfig {
    pub mode: Mode,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub library: LibraryConfig,
    /// Required in standalone mode, ignored otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standalone: Option<StandaloneConfig>,
    #[serde(default)]
    pub hostengine: HostengineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryConfig {
    #[serde(default = "default_library")]
    pub name: String,
}

/// Address of an already running host engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandaloneConfig {
    pub address: String,
    /// `1` when `address` is a unix socket path.
    #[serde(default)]
    pub address_is_unix_socket: u32,
}

/// How to find and start the host engine child in managed-child mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostengineConfig {
    #[serde(default = "default_executable")]
    pub executable: String,
    /// Colon-separated directories searched instead of `PATH`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_path: Option<String>,
    #[serde(default = "default_scratch_directory")]
    pub scratch_directory: PathBuf,
    #[serde(default = "default_socket_prefix")]
    pub socket_prefix: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_library() -> String {
    DCGM_LIBRARY.to_string()
}

fn default_executable() -> String {
    DEFAULT_HOSTENGINE.to_string()
}

fn default_scratch_directory() -> PathBuf {
    PathBuf::from(DEFAULT_SCRATCH_DIRECTORY)
}

fn default_socket_prefix() -> String {
    DEFAULT_SOCKET_PREFIX.to_string()
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            name: default_library(),
        }
    }
}

impl Default for HostengineConfig {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            search_path: None,
            scratch_directory: default_scratch_directory(),
            socket_prefix: default_socket_prefix(),
        }
    }
}

impl LifecycleConfig {
    /// Configuration for `mode` with every other field at its default.
    pub fn for_mode(mode: Mode) -> Self {
        Self {
            mode,
            log_level: default_log_level(),
            library: LibraryConfig::default(),
            standalone: None,
            hostengine: HostengineConfig::default(),
        }
    }

    /// Load configuration from a YAML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        Self::load_from_string(&content)
    }

    /// Load configuration from a YAML string
    pub fn load_from_string(content: &str) -> Result<Self> {
        let config: LifecycleConfig =
            serde_yaml::from_str(content).context("Failed to parse YAML configuration")?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }

    pub fn to_options(&self) -> LifecycleOptions {
        LifecycleOptions {
            library: self.library.name.clone(),
            hostengine: HostengineOptions {
                executable: self.hostengine.executable.clone(),
                search_path: self.hostengine.search_path.as_ref().map(OsString::from),
                scratch_directory: self.hostengine.scratch_directory.clone(),
                socket_prefix: self.hostengine.socket_prefix.clone(),
            },
        }
    }

    /// Arguments for [`initialize`](crate::LifecycleManager::initialize).
    ///
    /// Empty unless the mode is standalone.
    pub fn startup_args(&self) -> Vec<String> {
        match (&self.mode, &self.standalone) {
            (Mode::Standalone, Some(standalone)) => vec![
                standalone.address.clone(),
                standalone.address_is_unix_socket.to_string(),
            ],
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = LifecycleConfig::load_from_string("mode: embedded\n").unwrap();
        assert_eq!(config.mode, Mode::Embedded);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.library.name, "libdcgm.so.4");
        assert_eq!(config.hostengine.executable, "nv-hostengine");
        assert_eq!(config.hostengine.scratch_directory, PathBuf::from("/tmp"));
        assert!(config.startup_args().is_empty());
    }

    #[test]
    fn test_standalone_section_becomes_args() {
        let yaml = r#"
mode: standalone
standalone:
  address: /run/nvidia-dcgm.sock
  address_is_unix_socket: 1
"#;
        let config = LifecycleConfig::load_from_string(yaml).unwrap();
        assert_eq!(
            config.startup_args(),
            vec!["/run/nvidia-dcgm.sock".to_string(), "1".to_string()]
        );
    }

    #[test]
    fn test_hostengine_section_becomes_options() {
        let yaml = r#"
mode: managed_child
library:
  name: libdcgm.so.4.2
hostengine:
  executable: nv-hostengine
  search_path: /opt/dcgm/bin:/usr/bin
  scratch_directory: /var/run/dcgm
  socket_prefix: engine
"#;
        let options = LifecycleConfig::load_from_string(yaml).unwrap().to_options();
        assert_eq!(options.library, "libdcgm.so.4.2");
        assert_eq!(
            options.hostengine.search_path,
            Some(OsString::from("/opt/dcgm/bin:/usr/bin"))
        );
        assert_eq!(options.hostengine.scratch_directory, PathBuf::from("/var/run/dcgm"));
        assert_eq!(options.hostengine.socket_prefix, "engine");
    }

    #[test]
    fn test_legacy_mode_name_is_accepted() {
        let config = LifecycleConfig::load_from_string("mode: start_hostengine\n").unwrap();
        assert_eq!(config.mode, Mode::ManagedChild);
    }

    #[test]
    fn test_unknown_mode_fails_to_parse() {
        let err = LifecycleConfig::load_from_string("mode: remote\n").unwrap_err();
        assert!(err.to_string().contains("Failed to parse YAML configuration"));
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = LifecycleConfig::load_from_file("/nonexistent/dcgm.yaml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/dcgm.yaml"));
    }
}
