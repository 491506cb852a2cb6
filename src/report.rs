/*============================================================
  Synavera Project: Syn-Pkg
  Module: synpkg_core::report
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Reconcile the local inventory against the remote index and
    classify every package: binary upgrade, source rebuild, or
    absent from the repository.

  Security / Safety Notes:
    Report data is written to operator-controlled paths; no
    privileged operations are performed.

  Dependencies:
    serde for JSON serialization, chrono for timestamps.

  Operational Scope:
    Runs once per invocation after both inventories are joined;
    emits the stdout report consumed by operators and scripts.

  Revision History:
    2025-11-12 COD  Authored report builder.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Deterministic ordering for reproducible reports
    - Each outdated package lands in exactly one bucket
    - Rich metadata for audit and observability
============================================================*/

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::future::Future;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::error::{Result, SynpkgError};
use crate::logger::Logger;
use crate::options::OptionComparison;
use crate::pkg::{HostPlatform, InstalledPackage};

/// Wrapper representing the full report document.
#[derive(Debug, Serialize)]
pub struct ReportDocument {
    pub metadata: ReportMetadata,
    pub direct_upgrades: Vec<DirectUpgrade>,
    pub rebuild_from_source: Vec<String>,
    pub not_in_remote: Vec<String>,
}

/// Metadata block describing report context.
#[derive(Debug, Serialize)]
pub struct ReportMetadata {
    pub generated_at: String,
    pub generated_by: String,
    pub release: String,
    pub total_packages: usize,
    pub updates_available: usize,
}

/// A package eligible for a binary swap against the remote repo.
#[derive(Debug, Clone, Serialize)]
pub struct DirectUpgrade {
    pub name: String,
    pub local_version: String,
    pub remote_version: String,
}

impl fmt::Display for DirectUpgrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}: remote has {}",
            self.name, self.local_version, self.remote_version
        )
    }
}

/// Build the report by walking the local inventory in order.
///
/// `classify` is consulted only for packages with a strictly newer
/// remote version; `Same` keeps the binary-upgrade path, anything
/// else (changed or undecidable options) routes to a source rebuild.
pub async fn build_report<C, Fut>(
    packages: &[InstalledPackage],
    remote_index: &HashMap<String, String>,
    platform: &HostPlatform,
    logger: &Logger,
    classify: C,
) -> Result<ReportDocument>
where
    C: Fn(InstalledPackage) -> Fut,
    Fut: Future<Output = Result<OptionComparison>>,
{
    let mut direct_upgrades = Vec::new();
    let mut rebuild_from_source = Vec::new();
    let mut not_in_remote = Vec::new();

    for package in packages {
        let Some(remote_version) = remote_index.get(&package.name) else {
            not_in_remote.push(package.name.clone());
            continue;
        };

        if !crate::version::remote_is_newer(&package.version, remote_version) {
            continue;
        }

        let comparison = classify(package.clone()).await?;
        logger.debug(
            "DECIDE",
            format!(
                "{} {} → {} options {:?}",
                package.name, package.version, remote_version, comparison
            ),
        );
        match comparison {
            OptionComparison::Same => direct_upgrades.push(DirectUpgrade {
                name: package.name.clone(),
                local_version: package.version.clone(),
                remote_version: remote_version.clone(),
            }),
            OptionComparison::Changed | OptionComparison::Unknown => {
                rebuild_from_source.push(package.name.clone());
            }
        }
    }

    let metadata = ReportMetadata {
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        generated_by: "synpkg_core".to_string(),
        release: format!("FreeBSD:{}:{}", platform.major, platform.arch),
        total_packages: packages.len(),
        updates_available: direct_upgrades.len() + rebuild_from_source.len(),
    };

    Ok(ReportDocument {
        metadata,
        direct_upgrades,
        rebuild_from_source,
        not_in_remote,
    })
}

/// Emit the human-readable report on stdout.
pub fn print_report(document: &ReportDocument) {
    for upgrade in &document.direct_upgrades {
        println!("{upgrade}");
    }
    println!("# Should be rebuilt from source (non-default options):");
    println!("# {}", document.rebuild_from_source.join(" "));
    println!("# Not in remote repo:");
    println!("# {}", document.not_in_remote.join(" "));
}

/// Persist the report document to the given path as JSON.
pub fn write_report(document: &ReportDocument, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| {
            SynpkgError::Filesystem(format!(
                "Failed to create report directory {}: {err}",
                parent.display()
            ))
        })?;
    }
    let file = File::create(path).map_err(|err| {
        SynpkgError::Filesystem(format!(
            "Failed to create report file {}: {err}",
            path.display()
        ))
    })?;
    serde_json::to_writer_pretty(file, document).map_err(|err| {
        SynpkgError::Filesystem(format!("Failed to write report {}: {err}", path.display()))
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn platform() -> HostPlatform {
        HostPlatform {
            major: 13,
            arch: "amd64".to_string(),
        }
    }

    fn quiet_logger() -> Logger {
        Logger::new(None, false).unwrap()
    }

    fn package(name: &str, version: &str, origin: &str) -> InstalledPackage {
        InstalledPackage {
            name: name.to_string(),
            version: version.to_string(),
            origin: origin.to_string(),
        }
    }

    fn index(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(name, version)| (name.to_string(), version.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn default_options_yield_direct_upgrade() {
        let packages = vec![package("foo", "1.2", "ports/foo")];
        let remote = index(&[("foo", "1.3")]);
        let logger = quiet_logger();

        let document = build_report(&packages, &remote, &platform(), &logger, |_| async {
            Ok(OptionComparison::Same)
        })
        .await
        .unwrap();

        assert_eq!(document.direct_upgrades.len(), 1);
        assert_eq!(
            document.direct_upgrades[0].to_string(),
            "foo-1.2: remote has 1.3"
        );
        assert!(document.rebuild_from_source.is_empty());
        assert!(document.not_in_remote.is_empty());
        assert_eq!(document.metadata.updates_available, 1);
    }

    #[tokio::test]
    async fn changed_options_route_to_rebuild_only() {
        let packages = vec![package("bar", "2.0_1", "ports/bar")];
        let remote = index(&[("bar", "2.0_2")]);
        let logger = quiet_logger();

        let document = build_report(&packages, &remote, &platform(), &logger, |_| async {
            Ok(OptionComparison::Changed)
        })
        .await
        .unwrap();

        assert!(document.direct_upgrades.is_empty());
        assert_eq!(document.rebuild_from_source, vec!["bar".to_string()]);
        assert!(document.not_in_remote.is_empty());
    }

    #[tokio::test]
    async fn missing_build_dir_is_treated_as_rebuild() {
        let packages = vec![package("baz", "0.9", "ports/baz")];
        let remote = index(&[("baz", "1.0")]);
        let logger = quiet_logger();

        let document = build_report(&packages, &remote, &platform(), &logger, |_| async {
            Ok(OptionComparison::Unknown)
        })
        .await
        .unwrap();

        assert_eq!(document.rebuild_from_source, vec!["baz".to_string()]);
    }

    #[tokio::test]
    async fn up_to_date_and_absent_packages_skip_classification() {
        let packages = vec![
            package("current", "1.0", "ports/current"),
            package("orphan", "0.5", "ports/orphan"),
        ];
        let remote = index(&[("current", "1.0")]);
        let logger = quiet_logger();
        let calls = AtomicUsize::new(0);

        let document = build_report(&packages, &remote, &platform(), &logger, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(OptionComparison::Same) }
        })
        .await
        .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(document.direct_upgrades.is_empty());
        assert!(document.rebuild_from_source.is_empty());
        assert_eq!(document.not_in_remote, vec!["orphan".to_string()]);
    }

    #[tokio::test]
    async fn direct_upgrades_keep_inventory_order() {
        let packages = vec![
            package("zlib", "1.2", "ports/zlib"),
            package("acme", "0.1", "ports/acme"),
        ];
        let remote = index(&[("zlib", "1.3"), ("acme", "0.2")]);
        let logger = quiet_logger();

        let document = build_report(&packages, &remote, &platform(), &logger, |_| async {
            Ok(OptionComparison::Same)
        })
        .await
        .unwrap();

        let names: Vec<&str> = document
            .direct_upgrades
            .iter()
            .map(|upgrade| upgrade.name.as_str())
            .collect();
        assert_eq!(names, vec!["zlib", "acme"]);
    }

    #[tokio::test]
    async fn undecodable_versions_still_classify() {
        // A raw-vs-numeric key mismatch must resolve to "remote is
        // newer", so the package lands in a bucket, never disappears.
        let packages = vec![package("tzdata", "2024g", "ports/tzdata")];
        let remote = index(&[("tzdata", "1.0")]);
        let logger = quiet_logger();

        let document = build_report(&packages, &remote, &platform(), &logger, |_| async {
            Ok(OptionComparison::Same)
        })
        .await
        .unwrap();

        assert_eq!(document.direct_upgrades.len(), 1);
    }

    #[tokio::test]
    async fn report_document_serializes_to_json() {
        let packages = vec![package("foo", "1.2", "ports/foo")];
        let remote = index(&[("foo", "1.3")]);
        let logger = quiet_logger();
        let document = build_report(&packages, &remote, &platform(), &logger, |_| async {
            Ok(OptionComparison::Same)
        })
        .await
        .unwrap();

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("report.json");
        write_report(&document, &path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["metadata"]["release"], "FreeBSD:13:amd64");
        assert_eq!(value["direct_upgrades"][0]["remote_version"], "1.3");
    }
}
