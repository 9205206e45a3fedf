//! Shared helpers for the sync integration tests.

#![allow(dead_code)]

use std::time::Duration;

use boardgame_shelf_sync::{BatchPolicy, CollectionPolicy, SyncConfig};
use wiremock::{MockServer, Request, ResponseTemplate};

pub const TOKEN: &str = "test-token";
pub const API_PATH: &str = "/xmlapi2";

/// Config pointed at the mock server, with millisecond delays.
pub fn fast_config(server: &MockServer) -> SyncConfig {
    SyncConfig {
        api_base: format!("{}{API_PATH}", server.uri()),
        token: Some(TOKEN.to_string()),
        request_timeout: Duration::from_secs(5),
        batch: BatchPolicy {
            retry_delay: Duration::from_millis(1),
            chunk_pause: Duration::from_millis(1),
            ..BatchPolicy::default()
        },
        collection: CollectionPolicy {
            accepted_delay: Duration::from_millis(1),
            retry_delay: Duration::from_millis(1),
            ..CollectionPolicy::default()
        },
        ..SyncConfig::default()
    }
}

/// One `thing` item with a primary name and player counts.
pub fn item_xml(id: u64, name: &str, min_players: u32, max_players: u32) -> String {
    format!(
        r#"<item type="boardgame" id="{id}">
        <thumbnail>https://cf.geekdo-images.com/{id}_t.jpg</thumbnail>
        <name type="primary" sortindex="1" value="{name}" />
        <minplayers value="{min_players}" />
        <maxplayers value="{max_players}" />
        <link type="boardgamecategory" id="1002" value="Card Game" />
        <statistics page="1"><ratings><usersrated value="10" /><average value="6.5" /></ratings></statistics>
    </item>"#
    )
}

/// Wrap items in a `thing` response envelope.
pub fn thing_xml(items: &[String]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<items termsofuse="https://boardgamegeek.com/xmlapi/termsofuse">{}</items>"#,
        items.join("\n")
    )
}

/// A `collection` response listing the given object ids.
pub fn collection_xml(ids: &[u64]) -> String {
    let items: Vec<String> = ids
        .iter()
        .map(|id| {
            format!(
                r#"<item objecttype="thing" objectid="{id}" subtype="boardgame" collid="{id}0"><name sortindex="1">Game {id}</name><status own="1" /></item>"#
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<items totalitems="{}" termsofuse="https://boardgamegeek.com/xmlapi/termsofuse">{}</items>"#,
        ids.len(),
        items.join("\n")
    )
}

/// Ids requested by a `thing` call, in query order.
pub fn requested_ids(req: &Request) -> Vec<u64> {
    req.url
        .query_pairs()
        .find(|(k, _)| k == "id")
        .map(|(_, v)| v.split(',').filter_map(|s| s.parse().ok()).collect())
        .unwrap_or_default()
}

/// Responder that answers every `thing` request with one item per requested id.
pub fn echo_things(req: &Request) -> ResponseTemplate {
    let items: Vec<String> = requested_ids(req)
        .into_iter()
        .map(|id| item_xml(id, &format!("Game {id}"), 1, 4))
        .collect();
    ResponseTemplate::new(200).set_body_string(thing_xml(&items))
}
