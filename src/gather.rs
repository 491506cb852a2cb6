/*============================================================
  Synavera Project: Syn-Pkg
  Module: synpkg_core::gather
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Run the local inventory read and the remote index fetch as
    isolated concurrent tasks and join their results.

  Security / Safety Notes:
    No shared mutable state crosses task boundaries; each task
    owns its inputs and returns its output by value.

  Dependencies:
    tokio for task spawning and interval timing.

  Operational Scope:
    Invoked once per run, before the decision phase. The network
    fetch dominates wall-clock time; the poll loop exists to
    surface per-source progress while both tasks run.

  Revision History:
    2025-11-12 COD  Authored isolated fetch orchestrator.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Join-once synchronisation, no locks
    - Progress visibility for long-running sources
    - Task panics surface as runtime errors, never hangs
============================================================*/

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use crate::config::GatherConfig;
use crate::error::{Result, SynpkgError};
use crate::logger::Logger;
use crate::pkg::{enumerate_installed_packages, HostPlatform, InstalledPackage};
use crate::repo::RepoClient;

/// Fetch the remote index and the local inventory concurrently,
/// blocking until both are available.
pub async fn gather_inventories(
    client: &RepoClient,
    platform: &HostPlatform,
    config: &GatherConfig,
    logger: &Logger,
) -> Result<(HashMap<String, String>, Vec<InstalledPackage>)> {
    let client = client.clone();
    let major = platform.major;
    let arch = platform.arch.clone();
    let remote = async move { client.fetch_index(major, &arch).await };
    let local = enumerate_installed_packages();

    poll_join(
        remote,
        local,
        Duration::from_millis(config.poll_interval_ms.max(1)),
        logger,
    )
    .await
}

/// Spawn both sources as independent tasks and poll their join
/// handles, announcing each source the first time it completes.
/// There is no timeout here: a hung source hangs the run.
async fn poll_join<R, L, RemoteOut, LocalOut>(
    remote: R,
    local: L,
    poll_interval: Duration,
    logger: &Logger,
) -> Result<(RemoteOut, LocalOut)>
where
    R: Future<Output = Result<RemoteOut>> + Send + 'static,
    L: Future<Output = Result<LocalOut>> + Send + 'static,
    RemoteOut: Send + 'static,
    LocalOut: Send + 'static,
{
    let remote_task = tokio::spawn(remote);
    let local_task = tokio::spawn(local);

    let mut ticker = tokio::time::interval(poll_interval);
    let mut remote_seen = false;
    let mut local_seen = false;
    while !(remote_seen && local_seen) {
        ticker.tick().await;
        if !remote_seen && remote_task.is_finished() {
            remote_seen = true;
            println!("# * Finished retrieving remote packages.");
            logger.debug("GATHER", "Remote index task completed");
        }
        if !local_seen && local_task.is_finished() {
            local_seen = true;
            println!("# * Finished retrieving local packages.");
            logger.debug("GATHER", "Local inventory task completed");
        }
    }

    let remote_out = remote_task
        .await
        .map_err(|err| SynpkgError::Runtime(format!("Remote index task failed: {err}")))??;
    let local_out = local_task
        .await
        .map_err(|err| SynpkgError::Runtime(format!("Local inventory task failed: {err}")))??;

    Ok((remote_out, local_out))
}
