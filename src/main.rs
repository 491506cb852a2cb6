/*============================================================
  Synavera Project: Syn-Pkg
  Module: synpkg_core::main
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Entry point for Syn-Pkg Core. Gathers the local package
    inventory and the remote repository index in parallel, then
    reports which packages can be binary-upgraded and which
    must be rebuilt from source.

  Security / Safety Notes:
    Operates within user privileges. Executes pkg/uname/make
    commands and performs outbound HTTP GET requests only.

  Dependencies:
    clap for CLI parsing, chrono for timestamps.

  Operational Scope:
    Invoked by operators ahead of an upgrade window, or by the
    Syn-Pkg shell layer for scheduled manifest regeneration.

  Revision History:
    2025-11-12 COD  Authored Syn-Pkg Core runtime.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Result-first error handling with deterministic exits
    - Structured logging following Synavera cadence
    - Configurable execution via CLI and config file
============================================================*/

mod config;
mod error;
mod gather;
mod logger;
mod options;
mod pkg;
mod repo;
mod report;
mod version;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::{ArgAction, Parser};

use config::SynpkgConfig;
use error::Result;
use gather::gather_inventories;
use logger::Logger;
use options::classify_options;
use pkg::{detect_platform, HostPlatform};
use repo::RepoClient;
use report::{build_report, print_report, write_report};

/// Command-line arguments for Syn-Pkg-Core.
#[derive(Debug, Parser)]
#[command(
    name = "Syn-Pkg-Core",
    version,
    author = "Synavera Systems",
    about = "Update-candidate reporter for FreeBSD binary packages"
)]
struct Cli {
    /// Override configuration file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Write the JSON report to this path.
    #[arg(long, value_name = "PATH")]
    manifest: Option<PathBuf>,
    /// Explicit log file path.
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,
    /// FreeBSD major version (default: detected via uname).
    #[arg(short, long, value_name = "N")]
    major: Option<u32>,
    /// Processor architecture (default: detected via uname).
    #[arg(short, long, value_name = "ARCH")]
    arch: Option<String>,
    /// Print the report without writing the JSON manifest.
    #[arg(long, action = ArgAction::SetTrue)]
    dry_run: bool,
    /// Enable verbose logging to stderr.
    #[arg(long, action = ArgAction::SetTrue)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("[Syn-Pkg-Core] {}", err);
            err.exit_code()
        }
    }
}

async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = SynpkgConfig::load_from_optional_path(cli.config.as_deref())?;

    let session_stamp = Utc::now().format("%Y-%m-%d_%H-%M-%S").to_string();
    let log_path = cli
        .log
        .clone()
        .or_else(|| Some(config.log_dir().join(format!("core_{session_stamp}.log"))));
    let logger = Logger::new(log_path, cli.verbose)?;
    logger.info("INIT", "Syn-Pkg Core starting.");
    if let Some(path) = logger.path() {
        logger.debug("INIT", format!("Session log at {}", path.display()));
    }

    let detected = detect_platform().await?;
    let platform = HostPlatform {
        major: cli.major.unwrap_or(detected.major),
        arch: cli.arch.clone().unwrap_or_else(|| detected.arch.clone()),
    };
    if platform.major != detected.major || platform.arch != detected.arch {
        logger.warn(
            "OVERRIDE",
            format!(
                "Platform override in effect (detected FreeBSD:{}:{})",
                detected.major, detected.arch
            ),
        );
    }

    println!(
        "# FreeBSD major version: {} {}",
        platform.major,
        provenance(platform.major == detected.major)
    );
    println!(
        "# FreeBSD processor architecture: {} {}",
        platform.arch,
        provenance(platform.arch == detected.arch)
    );
    logger.info(
        "PLATFORM",
        format!("Targeting FreeBSD:{}:{}", platform.major, platform.arch),
    );

    println!("# Retrieving local and remote package lists");
    let client = RepoClient::new(&config.repo)?;
    let (remote_index, local_packages) =
        gather_inventories(&client, &platform, &config.gather, &logger).await?;
    logger.info(
        "SOURCES",
        format!(
            "Remote index entries={} installed packages={}",
            remote_index.len(),
            local_packages.len()
        ),
    );

    let ports_dir = config.paths.ports_dir.clone();
    let document = build_report(
        &local_packages,
        &remote_index,
        &platform,
        &logger,
        |package| {
            let ports_dir = ports_dir.clone();
            async move { classify_options(&ports_dir, &package.name, &package.origin).await }
        },
    )
    .await?;

    print_report(&document);

    let manifest_path = cli.manifest.clone().or_else(|| config.manifest_path());
    if let Some(path) = manifest_path {
        if cli.dry_run {
            logger.info("MANIFEST", "Dry-run: manifest write skipped");
        } else {
            write_report(&document, &path)?;
            logger.info("MANIFEST", format!("Report written to {}", path.display()));
        }
    }

    logger.info(
        "SUMMARY",
        format!(
            "packages={} updates={} rebuilds={} absent={}",
            document.metadata.total_packages,
            document.metadata.updates_available,
            document.rebuild_from_source.len(),
            document.not_in_remote.len()
        ),
    );
    logger.info("COMPLETE", "Inventory reconciled.");
    logger.finalize()?;

    Ok(ExitCode::SUCCESS)
}

fn provenance(detected: bool) -> &'static str {
    if detected {
        "(detected)"
    } else {
        "(override)"
    }
}
