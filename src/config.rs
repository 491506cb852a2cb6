/*============================================================
  Synavera Project: Syn-Pkg
  Module: synpkg_core::config
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1
  ------------------------------------------------------------
  Purpose:
    Load and validate Syn-Pkg-Core configuration from the
    operator's TOML file, supplying defaults when absent.

  Security / Safety Notes:
    Configuration is read from operator-controlled paths only;
    values are never executed, only interpolated into URLs and
    filesystem paths.

  Dependencies:
    serde + toml for deserialization, dirs for XDG locations.

  Operational Scope:
    Consumed at startup by the binary entry point; immutable
    for the remainder of the run.

  Revision History:
    2025-11-12 COD  Authored configuration loader.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Explicit defaults for every tunable
    - Absent config file is a supported state, not an error
    - Single load point, immutable thereafter
============================================================*/

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, SynpkgError};

const APP_DIR: &str = "syn-pkg";
const DEFAULT_REPO_URL: &str = "http://pkg.freebsd.org";
const DEFAULT_PORTS_DIR: &str = "/usr/ports";

/// Top-level Syn-Pkg-Core configuration document.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct SynpkgConfig {
    #[serde(default)]
    pub repo: RepoConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub gather: GatherConfig,
}

/// Remote package repository tunables.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepoConfig {
    #[serde(default = "default_repo_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default = "default_retries")]
    pub max_retries: usize,
}

/// Filesystem locations used by the run.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    #[serde(default = "default_ports_dir")]
    pub ports_dir: PathBuf,
    pub log_dir: Option<PathBuf>,
    pub manifest_path: Option<PathBuf>,
}

/// Orchestrator polling behaviour.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatherConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

fn default_repo_url() -> String {
    DEFAULT_REPO_URL.to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_retries() -> usize {
    3
}

fn default_ports_dir() -> PathBuf {
    PathBuf::from(DEFAULT_PORTS_DIR)
}

fn default_poll_interval() -> u64 {
    250
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            base_url: default_repo_url(),
            timeout: default_timeout(),
            max_retries: default_retries(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            ports_dir: default_ports_dir(),
            log_dir: None,
            manifest_path: None,
        }
    }
}

impl Default for GatherConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
        }
    }
}

impl SynpkgConfig {
    /// Load configuration from an explicit path, or from the default
    /// location when none is given. An explicitly named file must
    /// exist; the default location is allowed to be absent.
    pub fn load_from_optional_path(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_file(path),
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::load_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    fn load_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            SynpkgError::Config(format!("Failed to read {}: {err}", path.display()))
        })?;
        toml::from_str(&raw).map_err(|err| {
            SynpkgError::Config(format!("Failed to parse {}: {err}", path.display()))
        })
    }

    /// Directory receiving session logs.
    pub fn log_dir(&self) -> PathBuf {
        self.paths.log_dir.clone().unwrap_or_else(|| {
            dirs::state_dir()
                .or_else(dirs::data_local_dir)
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR)
                .join("logs")
        })
    }

    /// Manifest output location, when one is configured. The JSON
    /// manifest is opt-in; the stdout report is always emitted.
    pub fn manifest_path(&self) -> Option<PathBuf> {
        self.paths.manifest_path.clone()
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_without_file() {
        let config = SynpkgConfig::default();
        assert_eq!(config.repo.base_url, DEFAULT_REPO_URL);
        assert_eq!(config.paths.ports_dir, PathBuf::from(DEFAULT_PORTS_DIR));
        assert_eq!(config.gather.poll_interval_ms, 250);
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[repo]\nbase_url = \"http://mirror.example\"").unwrap();
        let config = SynpkgConfig::load_from_optional_path(Some(file.path())).unwrap();
        assert_eq!(config.repo.base_url, "http://mirror.example");
        assert_eq!(config.repo.max_retries, 3);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err =
            SynpkgConfig::load_from_optional_path(Some(Path::new("/nonexistent/conf.toml")))
                .unwrap_err();
        assert!(matches!(err, SynpkgError::Config(_)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[repo]\nbase_uri = \"typo\"").unwrap();
        let err = SynpkgConfig::load_from_optional_path(Some(file.path())).unwrap_err();
        assert!(matches!(err, SynpkgError::Config(_)));
    }
}
