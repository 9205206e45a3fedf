//! Tolerant field extraction from BoardGameGeek XML API 2 responses.
//!
//! The API's response shape is stable, so instead of building a DOM this
//! module pulls the handful of fields we need with regular expressions.
//! Every field degrades to `None` on its own; a fragment is only dropped
//! when its item id cannot be read.
//!
//! Extraction goes through [`FragmentReader`], so a structured XML reader can
//! replace [`PatternReader`] without changing [`parse_item`].

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::types::{GameRecord, Range, Ratings};

/// `<link type="…">` value for categories.
pub const LINK_CATEGORY: &str = "boardgamecategory";
/// `<link type="…">` value for mechanics.
pub const LINK_MECHANIC: &str = "boardgamemechanic";

/// Attributes of one element, in source order. Values are raw (not entity-decoded).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    attrs: Vec<(String, String)>,
}

impl Element {
    /// Value of the first attribute with this name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Read access to one item fragment.
pub trait FragmentReader {
    /// Trimmed, entity-decoded text of the first `<tag>…</tag>` element.
    fn text(&self, tag: &str) -> Option<String>;

    /// Every `<tag …>` element, in source order.
    fn elements(&self, tag: &str) -> Vec<Element>;

    /// Raw attribute of the first `<tag …>` element.
    fn attr(&self, tag: &str, attr: &str) -> Option<String> {
        self.elements(tag)
            .into_iter()
            .next()
            .and_then(|e| e.get(attr).map(str::to_string))
    }
}

/// [`FragmentReader`] backed by regular expressions over the raw fragment text.
#[derive(Debug, Clone, Copy)]
pub struct PatternReader<'a> {
    fragment: &'a str,
}

impl<'a> PatternReader<'a> {
    pub fn new(fragment: &'a str) -> Self {
        Self { fragment }
    }

    /// Every open or self-closing tag named `tag`, in source order.
    fn open_tags(&self, tag: &str) -> Vec<regex::Match<'a>> {
        open_tag_re()
            .captures_iter(self.fragment)
            .filter(|c| &c[1] == tag)
            .filter_map(|c| c.get(0))
            .collect()
    }
}

impl FragmentReader for PatternReader<'_> {
    fn text(&self, tag: &str) -> Option<String> {
        let open = format!("<{tag}>");
        let close = format!("</{tag}>");
        let start = self
            .open_tags(tag)
            .into_iter()
            .find(|m| m.as_str() == open)?
            .end();
        let rest = &self.fragment[start..];
        let end = rest.find(&close)?;
        Some(decode_entities(rest[..end].trim()))
    }

    fn elements(&self, tag: &str) -> Vec<Element> {
        self.open_tags(tag)
            .into_iter()
            .map(|m| parse_attrs(m.as_str()))
            .collect()
    }

    fn attr(&self, tag: &str, attr: &str) -> Option<String> {
        let first = self.open_tags(tag).into_iter().next()?;
        parse_attrs(first.as_str()).get(attr).map(str::to_string)
    }
}

fn open_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"<([A-Za-z_][-A-Za-z0-9_:.]*)(?:[\s/][^>]*)?>").expect("open tag regex is valid")
    })
}

fn attr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*"([^"]*)""#).expect("attr regex is valid")
    })
}

fn parse_attrs(tag: &str) -> Element {
    Element {
        attrs: attr_re()
            .captures_iter(tag)
            .map(|c| (c[1].to_string(), c[2].to_string()))
            .collect(),
    }
}

/// Split a `thing` response into its `<item …>…</item>` fragments, in document order.
pub fn split_items(body: &str) -> Vec<&str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    // A self-closing `<item …/>` is its own fragment and must not swallow the next item.
    let re = RE.get_or_init(|| {
        Regex::new(r"(?s)<item\b[^>]*/>|<item\b(?:[^>]*[^/>])?>.*?</item>").expect("item regex is valid")
    });
    re.find_iter(body).map(|m| m.as_str()).collect()
}

/// Whether a response contains at least one `<item>` element (`<items>` alone does not count).
pub fn contains_item(body: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<item\b").expect("item tag regex is valid"))
        .is_match(body)
}

/// Parse every usable item in a `thing` response. Fragments without a readable id are dropped.
pub fn parse_items(body: &str) -> Vec<GameRecord> {
    split_items(body)
        .into_iter()
        .filter_map(|fragment| {
            let record = parse_item(&PatternReader::new(fragment));
            if record.is_none() {
                let head: String = fragment.chars().take(80).collect();
                tracing::debug!(fragment = %head, "dropping item without a numeric id");
            }
            record
        })
        .collect()
}

/// Build a [`GameRecord`] from one item fragment. `None` when the item id is missing or not numeric.
pub fn parse_item<R: FragmentReader>(reader: &R) -> Option<GameRecord> {
    let bgg_id: u64 = reader.attr("item", "id")?.trim().parse().ok()?;

    let names = reader.elements("name");
    let name = names
        .iter()
        .find(|n| n.get("type") == Some("primary"))
        .or_else(|| names.first())
        .map(|n| decode_entities(n.get("value").unwrap_or("")));

    let links = reader.elements("link");
    let link_values = |kind: &str| -> Vec<String> {
        links
            .iter()
            .filter(|l| l.get("type") == Some(kind))
            .map(|l| decode_entities(l.get("value").unwrap_or("")))
            .collect()
    };

    Some(GameRecord {
        bgg_id: Some(bgg_id),
        name,
        yearpublished: int_value(reader, "yearpublished"),
        players: Range {
            min: int_value(reader, "minplayers"),
            max: int_value(reader, "maxplayers"),
        },
        playtime: Range {
            min: int_value(reader, "minplaytime"),
            max: int_value(reader, "maxplaytime"),
        },
        thumbnail: reader.text("thumbnail"),
        image: reader.text("image"),
        categories: link_values(LINK_CATEGORY),
        mechanics: link_values(LINK_MECHANIC),
        ratings: Ratings {
            average: float_value(reader, "average"),
            bayesaverage: float_value(reader, "bayesaverage"),
            usersrated: int_value(reader, "usersrated").and_then(|n| u64::try_from(n).ok()),
        },
        bgg_url: Some(GameRecord::url_for(bgg_id)),
    })
}

fn float_value<R: FragmentReader>(reader: &R, tag: &str) -> Option<f64> {
    reader
        .attr(tag, "value")?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

// Whole numbers written as "4.0" still count.
fn int_value<R: FragmentReader>(reader: &R, tag: &str) -> Option<i64> {
    let raw = reader.attr(tag, "value")?;
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n);
    }
    let f = raw.parse::<f64>().ok().filter(|f| f.is_finite())?;
    (f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64)
}

/// Object ids of every item in a `collection` response, deduplicated and ascending.
pub fn collection_ids(body: &str) -> Vec<u64> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r#"<item\b[^>]*\bobjectid="(\d+)"[^>]*>"#).expect("objectid regex is valid")
    });
    re.captures_iter(body)
        .filter_map(|c| c[1].parse::<u64>().ok())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// The item count of a `collection` response's `<items>` element (`totalitems`, or the older `total`).
pub fn collection_total(body: &str) -> Option<u64> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r#"<items\b[^>]*\btotal(?:items)?="(\d+)""#).expect("total regex is valid")
    });
    re.captures(body)?[1].parse().ok()
}

/// Decode XML entity references in a single left-to-right pass.
///
/// Handles the five predefined entities plus decimal and hex character
/// references. Decoded text is never re-scanned, so `&amp;quot;` becomes
/// `&quot;`. Unknown references are kept verbatim.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(idx) = rest.find('&') {
        out.push_str(&rest[..idx]);
        rest = &rest[idx..];
        match decode_reference(rest) {
            Some((ch, len)) => {
                out.push(ch);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Decode the reference at the start of `s` (which begins with `&`). Returns the char and bytes consumed.
fn decode_reference(s: &str) -> Option<(char, usize)> {
    let end = s
        .char_indices()
        .take(12)
        .find(|&(_, c)| c == ';')
        .map(|(i, _)| i)?;
    let name = &s[1..end];
    let ch = match name {
        "amp" => '&',
        "quot" => '"',
        "apos" => '\'',
        "lt" => '<',
        "gt" => '>',
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse::<u32>().ok()?,
            };
            char::from_u32(code)?
        }
    };
    Some((ch, end + 1))
}
