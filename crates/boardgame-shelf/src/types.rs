//! Core data types for manifest entries and game records.

use serde::{Deserialize, Serialize};

/// Base URL for a game's page on BoardGameGeek.
pub const BGG_GAME_URL: &str = "https://boardgamegeek.com/boardgame";

/// One game tracked in the local manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestEntry {
    /// BoardGameGeek id. `None` when the entry's id line was missing or not an integer.
    pub bgg_id: Option<u64>,
    /// Personal note.
    pub note: Option<String>,
    /// Every other key, in the order first seen.
    pub overrides: Vec<(String, String)>,
}

impl ManifestEntry {
    /// Create an entry carrying only an id.
    pub fn with_id(bgg_id: u64) -> Self {
        Self {
            bgg_id: Some(bgg_id),
            ..Self::default()
        }
    }

    /// Set a field by key, routing `bgg_id` and `note` to their own slots.
    pub fn set(&mut self, key: &str, value: String) {
        match key {
            "bgg_id" => self.bgg_id = value.parse().ok(),
            "note" => self.note = Some(value),
            _ => {
                if let Some(slot) = self.overrides.iter_mut().find(|(k, _)| k == key) {
                    slot.1 = value;
                } else {
                    self.overrides.push((key.to_string(), value));
                }
            }
        }
    }
}

/// Ids worth requesting, in manifest order. `0` is never a real BGG id and is skipped.
pub fn manifest_ids(entries: &[ManifestEntry]) -> Vec<u64> {
    entries
        .iter()
        .filter_map(|e| e.bgg_id)
        .filter(|&id| id != 0)
        .collect()
}

/// A min/max pair where either bound may be unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

/// Community rating statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Ratings {
    pub average: Option<f64>,
    pub bayesaverage: Option<f64>,
    pub usersrated: Option<u64>,
}

/// Game metadata extracted from one `thing` response item.
///
/// Numeric fields are `None` when the source omits them or carries a
/// non-numeric value, so consumers can tell "unknown" from zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub bgg_id: Option<u64>,
    pub name: Option<String>,
    pub yearpublished: Option<i64>,
    pub players: Range,
    pub playtime: Range,
    pub thumbnail: Option<String>,
    pub image: Option<String>,
    pub categories: Vec<String>,
    pub mechanics: Vec<String>,
    pub ratings: Ratings,
    pub bgg_url: Option<String>,
}

impl GameRecord {
    /// A record with every remote field unknown, carrying only the id.
    pub fn placeholder(bgg_id: Option<u64>) -> Self {
        Self {
            bgg_id,
            ..Self::default()
        }
    }

    /// Canonical BoardGameGeek page URL for an id.
    pub fn url_for(bgg_id: u64) -> String {
        format!("{BGG_GAME_URL}/{bgg_id}")
    }
}
