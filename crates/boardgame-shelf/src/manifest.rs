//! Reader and writer for the `games.yaml` manifest.
//!
//! The manifest is a tiny YAML subset, not YAML proper:
//!
//! ```text
//! games:
//!   - bgg_id: 13        # Catan
//!     note: "Played to death"
//!   - bgg_id: 822
//! ```
//!
//! Parsing is best-effort. Lines that do not fit the format are skipped
//! instead of failing the whole file.

use crate::types::ManifestEntry;

/// Top-level key introducing the list of games.
pub const LIST_KEY: &str = "games";

/// Parse manifest text into entries, preserving file order.
pub fn parse_manifest(text: &str) -> Vec<ManifestEntry> {
    let mut entries = Vec::new();
    let mut in_list = false;
    let mut current: Option<ManifestEntry> = None;

    for raw in text.lines() {
        let expanded = raw.replace('\t', "  ");
        let line = expanded.trim_end();
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let indented = line.len() != trimmed.len();
        let item = list_item(trimmed);

        if !indented && item.is_none() {
            // A top-level key opens (or closes) the list.
            in_list = split_key_value(trimmed).is_some_and(|(k, _)| k == LIST_KEY);
            if !in_list {
                entries.extend(current.take());
            }
            continue;
        }
        if !in_list {
            continue;
        }

        if let Some(rest) = item {
            entries.extend(current.take());
            let mut entry = ManifestEntry::default();
            if let Some((key, value)) = split_key_value(rest.trim()) {
                entry.set(key, clean_value(strip_comment(value)));
            }
            current = Some(entry);
            continue;
        }

        let Some(entry) = current.as_mut() else {
            continue;
        };
        if let Some((key, value)) = split_key_value(trimmed) {
            entry.set(key, clean_value(value));
        }
    }

    entries.extend(current);
    entries
}

/// Render collection ids as a manifest with one entry per id.
pub fn write_manifest(ids: &[u64]) -> String {
    let mut out = String::with_capacity(16 + ids.len() * 20);
    out.push_str(LIST_KEY);
    out.push_str(":\n");
    for id in ids {
        out.push_str(&format!("  - bgg_id: {id}\n"));
    }
    out
}

/// The remainder of a `- ` list item line, or `None` for any other line.
fn list_item(trimmed: &str) -> Option<&str> {
    if trimmed == "-" {
        return Some("");
    }
    trimmed.strip_prefix("- ")
}

/// Split `key: value` at the first colon. `None` when there is no colon or the key is empty.
fn split_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(':')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, value))
}

/// Drop a trailing `# comment` from an unquoted value.
fn strip_comment(value: &str) -> &str {
    let value = value.trim();
    if value.starts_with('"') || value.starts_with('\'') {
        return value;
    }
    match value.find('#') {
        Some(idx) => &value[..idx],
        None => value,
    }
}

fn clean_value(value: &str) -> String {
    let value = value.trim();
    let unquoted = ['"', '\'']
        .iter()
        .find_map(|&q| {
            (value.len() >= 2 && value.starts_with(q) && value.ends_with(q))
                .then(|| &value[1..value.len() - 1])
        })
        .unwrap_or(value);
    unquoted.to_string()
}
