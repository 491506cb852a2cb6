/*============================================================
  Synavera Project: Syn-Pkg
  Module: synpkg_core::error
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Centralise Syn-Pkg-Core error types to provide consistent
    diagnostics and exit semantics.

  Security / Safety Notes:
    Error contexts carry command names and high-level paths
    only; no credentials pass through this tool.

  Dependencies:
    thiserror for ergonomic error definitions.

  Operational Scope:
    Used across modules to propagate unrecoverable failures and
    consolidate exit codes for the binary entry point.

  Revision History:
    2025-11-12 COD  Established shared error definitions.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Explicit error taxonomy with actionable context
    - No silent failure paths
    - Stable exit codes for operational tooling
============================================================*/

use std::io;
use std::process::ExitCode;

use thiserror::Error;

/// Result alias for Syn-Pkg-Core operations.
pub type Result<T> = std::result::Result<T, SynpkgError>;

/// Enumerates high-level error domains surfaced by Syn-Pkg-Core.
#[derive(Debug, Error)]
pub enum SynpkgError {
    #[error("Required command `{command}` not found in PATH")]
    CommandMissing { command: String },
    #[error("Command `{command}` failed with status {status}: {stderr}")]
    CommandFailure {
        command: String,
        status: i32,
        stderr: String,
    },
    #[error("Config: {0}")]
    Config(String),
    #[error("Network: {0}")]
    Network(String),
    #[error("Serialization: {0}")]
    Serialization(String),
    #[error("Inventory: {0}")]
    Inventory(String),
    #[error("Filesystem: {0}")]
    Filesystem(String),
    #[error("Runtime: {0}")]
    Runtime(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl SynpkgError {
    /// Map error category to a deterministic exit code.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            SynpkgError::CommandMissing { .. } => ExitCode::from(10),
            SynpkgError::CommandFailure { .. } => ExitCode::from(11),
            SynpkgError::Config(_) => ExitCode::from(20),
            SynpkgError::Network(_) => ExitCode::from(30),
            SynpkgError::Serialization(_) => ExitCode::from(31),
            SynpkgError::Inventory(_) => ExitCode::from(32),
            SynpkgError::Filesystem(_) => ExitCode::from(40),
            SynpkgError::Io(_) => ExitCode::from(41),
            SynpkgError::Runtime(_) => ExitCode::from(50),
        }
    }
}
