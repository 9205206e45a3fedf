//! boardgame-shelf sync: fetch BoardGameGeek data and build the shelf's static data file.

pub mod client;
pub mod collection;
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod retry;
pub mod thing;

pub use client::{BggClient, HttpResponse};
pub use collection::fetch_collection;
pub use config::{BatchPolicy, CollectionPolicy, ConfigOverrides, SyncConfig};
pub use error::{SyncError, SyncResult};
pub use pipeline::{build_catalog, export_collection, BuildReport, ExportReport};
pub use thing::fetch_things;
