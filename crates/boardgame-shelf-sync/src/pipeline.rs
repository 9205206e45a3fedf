//! The two pipelines: build the shelf data file, and export a collection to a manifest.
//!
//! Output files are only written after every fetch succeeded, via a
//! temporary sibling file renamed into place.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use boardgame_shelf::{manifest_ids, parse_manifest, write_manifest, OutputDocument};
use chrono::Utc;
use tracing::{info, warn};

use crate::client::BggClient;
use crate::collection::fetch_collection;
use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::thing::fetch_things;

/// Summary of a finished build run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub output_path: PathBuf,
    /// Games written to the document.
    pub games: usize,
    /// Manifest ids BGG returned no usable item for.
    pub missing: Vec<u64>,
}

/// Summary of a finished export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub manifest_path: PathBuf,
    pub games: usize,
}

/// Read the manifest, fetch every game from BGG, and write the output document.
pub async fn build_catalog(config: &SyncConfig) -> SyncResult<BuildReport> {
    with_deadline(config.deadline, run_build(config)).await
}

/// Fetch `username`'s owned games and overwrite the manifest with their ids.
pub async fn export_collection(config: &SyncConfig, username: &str) -> SyncResult<ExportReport> {
    with_deadline(config.deadline, run_export(config, username)).await
}

async fn run_build(config: &SyncConfig) -> SyncResult<BuildReport> {
    let path = &config.manifest_path;
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SyncError::ReadManifest {
            path: path.clone(),
            source,
        })?;

    let entries = parse_manifest(&text);
    let ids = manifest_ids(&entries);
    if ids.is_empty() {
        return Err(SyncError::EmptyManifest { path: path.clone() });
    }
    info!(path = %path.display(), entries = entries.len(), ids = ids.len(), "Manifest loaded");

    let client = BggClient::new(config)?;
    let fetched = fetch_things(&client, &ids, &config.batch).await?;

    let missing: Vec<u64> = ids
        .iter()
        .copied()
        .filter(|id| !fetched.contains_key(id))
        .collect();
    if !missing.is_empty() {
        warn!(?missing, "BGG returned no item for some manifest ids");
    }

    let document = OutputDocument::build(&entries, &fetched, Utc::now());
    let json = document.to_json_pretty()?;
    write_atomic(&config.output_path, json.as_bytes()).await?;

    info!(
        path = %config.output_path.display(),
        games = document.games.len(),
        "Wrote shelf data"
    );

    Ok(BuildReport {
        output_path: config.output_path.clone(),
        games: document.games.len(),
        missing,
    })
}

async fn run_export(config: &SyncConfig, username: &str) -> SyncResult<ExportReport> {
    let client = BggClient::new(config)?;
    let ids = fetch_collection(&client, username, &config.collection).await?;

    write_atomic(&config.manifest_path, write_manifest(&ids).as_bytes()).await?;
    info!(
        path = %config.manifest_path.display(),
        games = ids.len(),
        username,
        "Wrote manifest"
    );

    Ok(ExportReport {
        manifest_path: config.manifest_path.clone(),
        games: ids.len(),
    })
}

async fn with_deadline<T>(
    deadline: Option<Duration>,
    run: impl Future<Output = SyncResult<T>>,
) -> SyncResult<T> {
    match deadline {
        Some(limit) => tokio::time::timeout(limit, run)
            .await
            .map_err(|_| SyncError::DeadlineExceeded {
                secs: limit.as_secs(),
            })?,
        None => run.await,
    }
}

/// Write `contents` to `path` through a temporary sibling, creating parent directories.
pub async fn write_atomic(path: &Path, contents: &[u8]) -> SyncResult<()> {
    let write_err = |source: std::io::Error| SyncError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp = temp_sibling(path);
    tokio::fs::write(&tmp, contents).await.map_err(write_err)?;
    if let Err(source) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(write_err(source));
    }
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
