//! Merge fetched game records with manifest overrides and build the output document.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::types::{GameRecord, ManifestEntry};

/// Provenance label recorded in every output document.
pub const PROVENANCE: &str = "BoardGameGeek XMLAPI2 /thing?stats=1";

/// A fetched record combined with its manifest entry.
///
/// Serializes as one flat object: the record's fields, then `note`, then
/// every override. An override replaces a record field of the same name.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedGame {
    pub record: GameRecord,
    pub note: String,
    pub overrides: Vec<(String, String)>,
}

impl MergedGame {
    /// Combine a manifest entry with its fetched record, if any.
    pub fn from_entry(entry: &ManifestEntry, fetched: Option<&GameRecord>) -> Self {
        let record = fetched
            .cloned()
            .unwrap_or_else(|| GameRecord::placeholder(entry.bgg_id));
        Self {
            record,
            note: entry.note.clone().unwrap_or_default(),
            overrides: entry.overrides.clone(),
        }
    }

    /// Display name after overrides.
    pub fn name(&self) -> Option<&str> {
        self.overrides
            .iter()
            .rev()
            .find(|(k, _)| k == "name")
            .map(|(_, v)| v.as_str())
            .or(self.record.name.as_deref())
    }

    /// The flat JSON object written to the output document.
    pub fn to_value(&self) -> serde_json::Result<Value> {
        let mut value = serde_json::to_value(&self.record)?;
        if let Value::Object(map) = &mut value {
            map.insert("note".to_string(), Value::String(self.note.clone()));
            for (key, v) in &self.overrides {
                map.insert(key.clone(), Value::String(v.clone()));
            }
        }
        Ok(value)
    }
}

impl Serialize for MergedGame {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

/// Merge every manifest entry with its fetched record, sorted by name.
///
/// Entries with no fetched record still appear, with every remote field unknown.
pub fn merge_games(
    entries: &[ManifestEntry],
    fetched: &BTreeMap<u64, GameRecord>,
) -> Vec<MergedGame> {
    let mut games: Vec<MergedGame> = entries
        .iter()
        .map(|entry| {
            let record = entry.bgg_id.and_then(|id| fetched.get(&id));
            MergedGame::from_entry(entry, record)
        })
        .collect();
    games.sort_by(|a, b| compare_names(a.name().unwrap_or(""), b.name().unwrap_or("")));
    games
}

/// Case-insensitive ordering, ties broken case-sensitively.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// The JSON document consumed by the shelf site.
#[derive(Debug, Clone, Serialize)]
pub struct OutputDocument {
    #[serde(serialize_with = "iso_millis")]
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub games: Vec<MergedGame>,
}

impl OutputDocument {
    /// Merge and wrap the games with provenance metadata.
    pub fn build(
        entries: &[ManifestEntry],
        fetched: &BTreeMap<u64, GameRecord>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            generated_at,
            source: PROVENANCE.to_string(),
            games: merge_games(entries, fetched),
        }
    }

    /// Pretty-printed JSON with two-space indentation.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn iso_millis<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}
