/*============================================================
  Synavera Project: Syn-Pkg
  Module: synpkg_core::repo
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1
  ------------------------------------------------------------
  Purpose:
    Query the FreeBSD binary package repository for its package
    listing and derive the latest available version per package.

  Security / Safety Notes:
    Performs read-only HTTP GET requests to the configured
    repository mirror. No credentials are transmitted.

  Dependencies:
    reqwest for HTTP, regex for listing extraction.

  Operational Scope:
    Supplies the remote half of the update decision; one request
    per run.

  Revision History:
    2025-11-12 COD  Implemented asynchronous repository client.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Defensive retry logic with exponential backoff
    - Structured response parsing with explicit error paths
    - Configurable timeouts and mirror selection
============================================================*/

use std::collections::HashMap;
use std::time::Duration;

use regex::Regex;
use reqwest::StatusCode;
use tokio::time::sleep;

use crate::config::RepoConfig;
use crate::error::{Result, SynpkgError};

/// Archive suffix carried by every package link in the listing.
const PACKAGE_SUFFIX: &str = ".txz";

/// Client for the repository's HTML directory listing.
#[derive(Clone)]
pub struct RepoClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: usize,
}

impl RepoClient {
    /// Construct a new client from configuration.
    pub fn new(config: &RepoConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent("Syn-Pkg-Core/0.4 (freebsd)")
            .build()
            .map_err(|err| SynpkgError::Network(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries.max(1),
        })
    }

    fn listing_url(&self, major: u32, arch: &str) -> String {
        format!("{}/FreeBSD:{major}:{arch}/latest/All/", self.base_url)
    }

    /// Fetch the repository listing and map each package name to its
    /// latest published version.
    pub async fn fetch_index(&self, major: u32, arch: &str) -> Result<HashMap<String, String>> {
        let url = self.listing_url(major, arch);
        let body = self.fetch_listing(&url).await?;
        parse_listing(&body)
    }

    async fn fetch_listing(&self, url: &str) -> Result<String> {
        let mut attempt = 0;
        loop {
            let response = self.client.get(url).send().await.map_err(|err| {
                SynpkgError::Network(format!("Repository request to {url} failed: {err}"))
            })?;

            if response.status() == StatusCode::OK {
                return response.text().await.map_err(|err| {
                    SynpkgError::Network(format!("Failed to read listing body from {url}: {err}"))
                });
            }

            attempt += 1;
            if attempt >= self.max_retries {
                return Err(SynpkgError::Network(format!(
                    "Repository request {url} failed with status {} after {attempt} attempts",
                    response.status()
                )));
            }
            let exponent = (attempt as u32).min(8);
            let backoff = Duration::from_millis(200_u64.saturating_mul(1_u64 << exponent));
            sleep(backoff).await;
        }
    }
}

/// Extract `(name, version)` pairs from an HTML directory listing.
///
/// Only `href` attribute values are consulted. Entries without the
/// package archive suffix, or whose stem does not split at a last
/// hyphen, are directory or metadata links and are dropped.
fn parse_listing(body: &str) -> Result<HashMap<String, String>> {
    let href = Regex::new(r#"href="([^"]*)""#)
        .map_err(|err| SynpkgError::Runtime(format!("Invalid listing pattern: {err}")))?;

    let mut index = HashMap::new();
    for capture in href.captures_iter(body) {
        let target = &capture[1];
        let Some(stem) = target.strip_suffix(PACKAGE_SUFFIX) else {
            continue;
        };
        if let Some((name, version)) = stem.rsplit_once('-') {
            index.insert(name.to_string(), version.to_string());
        }
    }
    Ok(index)
}
