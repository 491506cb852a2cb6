/*============================================================
  Synavera Project: Syn-Pkg
  Module: synpkg_core::logger
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1
  ------------------------------------------------------------
  Purpose:
    Provide structured, append-only logging utilities for
    Syn-Pkg-Core operations.

  Security / Safety Notes:
    Log entries carry package names and mirror URLs only; the
    report stream on stdout is never routed through the logger.

  Dependencies:
    std::fs::File, std::sync::Mutex, sha2 for integrity hashing.

  Operational Scope:
    Used by runtime components to emit RFC-3339 UTC stamped
    log entries and produce session hash digests.

  Revision History:
    2025-11-12 COD  Established logging module for Syn-Pkg-Core.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Append-only logging with UTC timestamps
    - Deterministic formatting for auditability
    - Graceful error propagation on I/O failures
============================================================*/

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};
use sha2::{Digest, Sha256};

use crate::error::{Result, SynpkgError};

/// Structured log level for Syn-Pkg-Core events.
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Debug,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Debug => "DEBUG",
        }
    }
}

struct LogSink {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

/// Logger that mirrors entries to stderr and, when configured,
/// appends them to a session log file.
pub struct Logger {
    sink: Option<LogSink>,
    verbose: bool,
}

impl Logger {
    /// Build a logger writing to stderr and optionally to `path`.
    pub fn new(path: Option<PathBuf>, verbose: bool) -> Result<Self> {
        let sink = match path {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent).map_err(|err| {
                        SynpkgError::Filesystem(format!(
                            "Failed to create log directory {}: {err}",
                            parent.display()
                        ))
                    })?;
                }
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)
                    .map_err(|err| {
                        SynpkgError::Filesystem(format!(
                            "Failed to open log file {}: {err}",
                            path.display()
                        ))
                    })?;
                Some(LogSink {
                    writer: Mutex::new(BufWriter::new(file)),
                    path,
                })
            }
            None => None,
        };

        Ok(Self { sink, verbose })
    }

    /// Emit a log entry with the given level, code, and message.
    pub fn log<S: AsRef<str>>(&self, level: LogLevel, code: &str, message: S) {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let payload = format!(
            "{timestamp} [{}] [{}] {}",
            level.as_str(),
            code,
            message.as_ref()
        );

        if self.verbose || level == LogLevel::Error || level == LogLevel::Warn {
            eprintln!("{payload}");
        }

        if let Some(sink) = &self.sink {
            if let Ok(mut guard) = sink.writer.lock() {
                if writeln!(guard, "{payload}").and_then(|_| guard.flush()).is_err() {
                    eprintln!("{timestamp} [ERROR] [LOGGER] Failed to append to session log");
                }
            }
        }
    }

    /// Convenience wrapper for `INFO` level events.
    pub fn info<S: AsRef<str>>(&self, code: &str, message: S) {
        self.log(LogLevel::Info, code, message);
    }

    /// Convenience wrapper for `WARN` level events.
    pub fn warn<S: AsRef<str>>(&self, code: &str, message: S) {
        self.log(LogLevel::Warn, code, message);
    }

    /// Convenience wrapper for `DEBUG` level events.
    pub fn debug<S: AsRef<str>>(&self, code: &str, message: S) {
        self.log(LogLevel::Debug, code, message);
    }

    /// Return the path backing this logger, if any.
    pub fn path(&self) -> Option<&Path> {
        self.sink.as_ref().map(|sink| sink.path.as_path())
    }

    /// Compute and persist a SHA-256 digest of the session log.
    pub fn finalize(&self) -> Result<()> {
        let Some(sink) = &self.sink else {
            return Ok(());
        };
        let data = std::fs::read(&sink.path).map_err(|err| {
            SynpkgError::Filesystem(format!(
                "Failed to read log for hashing {}: {err}",
                sink.path.display()
            ))
        })?;
        let digest = Sha256::digest(&data);

        let mut hash_os = sink.path.as_os_str().to_os_string();
        hash_os.push(".hash");
        let hash_path = PathBuf::from(hash_os);
        let mut file = File::create(&hash_path).map_err(|err| {
            SynpkgError::Filesystem(format!(
                "Failed to create hash file {}: {err}",
                hash_path.display()
            ))
        })?;
        writeln!(
            file,
            "{:x}  {}",
            digest,
            sink.path.file_name().unwrap_or_default().to_string_lossy()
        )
        .map_err(|err| {
            SynpkgError::Filesystem(format!(
                "Failed to write hash file {}: {err}",
                hash_path.display()
            ))
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn entries_are_appended_to_the_session_log() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("core.log");
        let logger = Logger::new(Some(path.clone()), false).unwrap();
        logger.info("TEST", "first entry");
        logger.info("TEST", "second entry");

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("[INFO] [TEST] first entry"));
    }

    #[test]
    fn finalize_writes_hash_sidecar() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("core.log");
        let logger = Logger::new(Some(path.clone()), false).unwrap();
        logger.info("TEST", "entry");
        logger.finalize().unwrap();

        let sidecar = std::fs::read_to_string(dir.path().join("core.log.hash")).unwrap();
        assert!(sidecar.trim().ends_with("core.log"));
        // 64 hex chars, two spaces, file name
        assert_eq!(sidecar.split_whitespace().next().unwrap().len(), 64);
    }

    #[test]
    fn fileless_logger_is_silent_on_finalize() {
        let logger = Logger::new(None, true).unwrap();
        logger.debug("TEST", "stderr only");
        logger.finalize().unwrap();
        assert!(logger.path().is_none());
    }
}
