/*============================================================
  Synavera Project: Syn-Pkg
  Module: synpkg_core::pkg
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Interface with pkg(8) and uname(1) to enumerate installed
    packages and detect the host release and architecture.

  Security / Safety Notes:
    Executes pkg/uname binaries with user privileges only;
    no privilege escalation is attempted.

  Dependencies:
    tokio::process for async command execution.

  Operational Scope:
    Supplies Syn-Pkg-Core with the local inventory half of the
    update decision.

  Revision History:
    2025-11-12 COD  Crafted pkg integration layer.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Deterministic command invocation with explicit checks
    - Structured parsing with clear failure modes
    - Reusable helpers for external command diagnostics
============================================================*/

use std::io;
use std::process::Stdio;

use tokio::process::Command;

use crate::error::{Result, SynpkgError};

/// Represents a package currently installed on the system.
#[derive(Debug, Clone)]
pub struct InstalledPackage {
    pub name: String,
    pub version: String,
    /// Ports-tree origin (e.g. `devel/git`), relative to the ports root.
    pub origin: String,
}

/// Host identity used to select the remote repository branch.
#[derive(Debug, Clone)]
pub struct HostPlatform {
    pub major: u32,
    pub arch: String,
}

/// Run an external command and capture its stdout as UTF-8.
pub(crate) async fn run_capture(program: &str, args: &[&str]) -> Result<String> {
    let output = Command::new(program)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|err| map_spawn_error(err, program))?;

    if !output.status.success() {
        return Err(SynpkgError::CommandFailure {
            command: format!("{program} {}", args.join(" ")),
            status: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    String::from_utf8(output.stdout).map_err(|err| {
        SynpkgError::Serialization(format!("{program} emitted invalid UTF-8: {err}"))
    })
}

/// Enumerate all installed packages via `pkg info -a -o`.
///
/// Each line reads `<name>-<version> <origin>`; the name/version
/// boundary is the last hyphen, since versions never contain one
/// but package names frequently do.
pub async fn enumerate_installed_packages() -> Result<Vec<InstalledPackage>> {
    let stdout = run_capture("pkg", &["info", "-a", "-o"]).await?;

    let mut packages = Vec::new();
    for line in stdout.lines() {
        if line.trim().is_empty() {
            continue;
        }
        packages.push(parse_inventory_line(line)?);
    }
    Ok(packages)
}

fn parse_inventory_line(line: &str) -> Result<InstalledPackage> {
    let mut fields = line.split_whitespace();
    let (package, origin) = match (fields.next(), fields.next(), fields.next()) {
        (Some(package), Some(origin), None) => (package, origin),
        _ => {
            return Err(SynpkgError::Inventory(format!(
                "Unparsable pkg info line `{line}`"
            )))
        }
    };

    let (name, version) = package.rsplit_once('-').ok_or_else(|| {
        SynpkgError::Inventory(format!("Package token `{package}` has no version part"))
    })?;

    Ok(InstalledPackage {
        name: name.to_string(),
        version: version.to_string(),
        origin: origin.to_string(),
    })
}

/// Detect the host release major and processor architecture via
/// `uname -p -U` (e.g. `amd64 1302001` → major 13, arch amd64).
pub async fn detect_platform() -> Result<HostPlatform> {
    let stdout = run_capture("uname", &["-p", "-U"]).await?;
    let mut fields = stdout.split_whitespace();
    let (arch, release) = match (fields.next(), fields.next()) {
        (Some(arch), Some(release)) => (arch, release),
        _ => {
            return Err(SynpkgError::Runtime(format!(
                "Unexpected uname output `{}`",
                stdout.trim()
            )))
        }
    };

    let digits: String = release.chars().take(2).collect();
    let major = digits.parse::<u32>().map_err(|err| {
        SynpkgError::Runtime(format!("Failed to parse release `{release}`: {err}"))
    })?;

    Ok(HostPlatform {
        major,
        arch: arch.to_string(),
    })
}

pub(crate) fn map_spawn_error(err: io::Error, command: &str) -> SynpkgError {
    if err.kind() == io::ErrorKind::NotFound {
        SynpkgError::CommandMissing {
            command: command.into(),
        }
    } else {
        SynpkgError::Runtime(format!("Failed to spawn {command}: {err}"))
    }
}
