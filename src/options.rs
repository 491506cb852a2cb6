/*============================================================
  Synavera Project: Syn-Pkg
  Module: synpkg_core::options
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1
  ------------------------------------------------------------
  Purpose:
    Decide whether a package was built with the port's default
    option set or with operator-modified options.

  Security / Safety Notes:
    Executes pkg/make binaries read-only with user privileges;
    the ports tree is never modified.

  Dependencies:
    tokio::process via the shared pkg command helper.

  Operational Scope:
    Consulted once per outdated package to split binary-upgrade
    candidates from source rebuilds.

  Revision History:
    2025-11-12 COD  Authored option comparison layer.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Tri-state outcome instead of silent assumptions
    - Missing build directories degrade, never abort
    - Pure set comparison separated from command plumbing
============================================================*/

use std::collections::HashSet;
use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

use crate::error::{Result, SynpkgError};
use crate::pkg::run_capture;

/// Result of comparing locally enabled options against the
/// port's declared defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionComparison {
    Same,
    Changed,
    /// The port's build directory could not be located, so no
    /// comparison was possible.
    Unknown,
}

/// Classify a package's build options against upstream defaults.
///
/// `origin` is the ports-tree path recorded at install time; when
/// the directory is gone (tree pruned, port removed) the outcome
/// is `Unknown` rather than an error.
pub async fn classify_options(
    ports_dir: &Path,
    name: &str,
    origin: &str,
) -> Result<OptionComparison> {
    let enabled = query_enabled_options(name).await?;

    let build_dir = ports_dir.join(origin);
    if !build_dir.is_dir() {
        return Ok(OptionComparison::Unknown);
    }

    let defaults = query_default_options(&build_dir).await?;
    Ok(compare_option_sets(&enabled, &defaults))
}

/// Options the installed package was built with, restricted to
/// those explicitly switched on.
async fn query_enabled_options(name: &str) -> Result<HashSet<String>> {
    let stdout = run_capture("pkg", &["query", "%Ok %Ov", name]).await?;
    Ok(parse_enabled_options(&stdout))
}

fn parse_enabled_options(stdout: &str) -> HashSet<String> {
    let mut enabled = HashSet::new();
    for line in stdout.lines() {
        let mut fields = line.split_whitespace();
        if let (Some(option), Some("on")) = (fields.next(), fields.next()) {
            enabled.insert(option.to_string());
        }
    }
    enabled
}

/// The port's default option set, from `make -V OPTIONS_DEFAULT`
/// run inside the build directory. A single line of space-separated
/// names; possibly empty.
async fn query_default_options(build_dir: &Path) -> Result<HashSet<String>> {
    let output = Command::new("make")
        .arg("-V")
        .arg("OPTIONS_DEFAULT")
        .current_dir(build_dir)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|err| crate::pkg::map_spawn_error(err, "make"))?;

    if !output.status.success() {
        return Err(SynpkgError::CommandFailure {
            command: format!("make -V OPTIONS_DEFAULT ({})", build_dir.display()),
            status: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let stdout = String::from_utf8(output.stdout).map_err(|err| {
        SynpkgError::Serialization(format!("make emitted invalid UTF-8: {err}"))
    })?;

    Ok(stdout
        .lines()
        .next()
        .unwrap_or("")
        .split_whitespace()
        .map(str::to_string)
        .collect())
}

/// Unordered set equality; a port with no declared defaults has
/// nothing to diverge from.
fn compare_option_sets(enabled: &HashSet<String>, defaults: &HashSet<String>) -> OptionComparison {
    if defaults.is_empty() {
        OptionComparison::Same
    } else if enabled == defaults {
        OptionComparison::Same
    } else {
        OptionComparison::Changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> HashSet<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn enabled_options_keep_on_state_only() {
        let stdout = "DOCS on\nEXAMPLES off\nLTO on\nX11 off\n";
        assert_eq!(parse_enabled_options(stdout), set(&["DOCS", "LTO"]));
    }

    #[test]
    fn empty_defaults_always_match() {
        assert_eq!(
            compare_option_sets(&set(&["DOCS"]), &set(&[])),
            OptionComparison::Same
        );
    }

    #[test]
    fn equal_sets_match_regardless_of_order() {
        assert_eq!(
            compare_option_sets(&set(&["A", "B"]), &set(&["B", "A"])),
            OptionComparison::Same
        );
    }

    #[test]
    fn diverging_sets_are_changed() {
        assert_eq!(
            compare_option_sets(&set(&["OPT1"]), &set(&["OPT1", "OPT2"])),
            OptionComparison::Changed
        );
    }
}
