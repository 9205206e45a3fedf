//! Error types for the sync pipelines.

use std::path::PathBuf;

/// All fatal errors a pipeline run can end with.
///
/// Field-level parse gaps and unusable fragments never surface here; they
/// are absorbed by the extractor.
#[derive(thiserror::Error, Debug)]
pub enum SyncError {
    /// The collection endpoint rejected the token. Not retried.
    #[error("BGG returned 401 Unauthorized; check the token and how it is passed. First bytes: \"{snippet}\"")]
    Unauthorized { snippet: String },

    #[error("BGG collection did not return usable XML after {attempts} attempts")]
    CollectionUnavailable { attempts: u32 },

    #[error("BGG API did not return items after {attempts} attempts (chunk of {len} ids starting at {first})")]
    NoItems { attempts: u32, first: u64, len: usize },

    #[error("No bgg_id entries found in {}", path.display())]
    EmptyManifest { path: PathBuf },

    #[error("Missing BGG token; pass --token or set BGG_TOKEN")]
    MissingToken,

    #[error("Run exceeded its {secs}s deadline")]
    DeadlineExceeded { secs: u64 },

    #[error("Failed to read manifest {}: {source}", path.display())]
    ReadManifest {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SyncError {
    /// Whether a retry loop should keep going after this error.
    pub fn is_transient(&self) -> bool {
        matches!(self, SyncError::Http(_))
    }
}

/// Convenience result type.
pub type SyncResult<T> = Result<T, SyncError>;
