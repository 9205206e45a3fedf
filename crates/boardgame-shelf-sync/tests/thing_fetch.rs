//! Batch metadata fetching against a mock BGG `thing` endpoint.

mod common;

use boardgame_shelf_sync::{fetch_things, BggClient, SyncError};
use pretty_assertions::assert_eq;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{echo_things, fast_config, item_xml, requested_ids, thing_xml, API_PATH, TOKEN};

fn thing_path() -> String {
    format!("{API_PATH}/thing")
}

#[tokio::test]
async fn test_chunks_are_sequential_and_sized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(thing_path()))
        .and(query_param("stats", "1"))
        .respond_with(echo_things)
        .expect(3)
        .mount(&server)
        .await;

    let config = fast_config(&server);
    let client = BggClient::new(&config).unwrap();
    let ids: Vec<u64> = (1..=65).collect();

    let fetched = fetch_things(&client, &ids, &config.batch).await.unwrap();
    assert_eq!(fetched.len(), 65);
    assert_eq!(fetched[&65].name.as_deref(), Some("Game 65"));

    let requests = server.received_requests().await.unwrap();
    let chunks: Vec<Vec<u64>> = requests.iter().map(requested_ids).collect();
    let sizes: Vec<usize> = chunks.iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![30, 30, 5]);
    assert_eq!(chunks[0][0], 1);
    assert_eq!(chunks[1][0], 31);
    assert_eq!(chunks[2], vec![61, 62, 63, 64, 65]);
}

#[tokio::test]
async fn test_retries_until_items_appear() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(thing_path()))
        .respond_with(
            ResponseTemplate::new(429)
                .set_body_string("<error><message>Rate limit exceeded.</message></error>"),
        )
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(thing_path()))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(thing_xml(&[item_xml(7, "Azul", 2, 4)])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = fast_config(&server);
    let client = BggClient::new(&config).unwrap();
    let fetched = fetch_things(&client, &[7], &config.batch).await.unwrap();

    assert_eq!(fetched[&7].name.as_deref(), Some("Azul"));
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_gives_up_after_five_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(thing_path()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<items termsofuse="https://boardgamegeek.com/xmlapi/termsofuse"></items>"#),
        )
        .expect(5)
        .mount(&server)
        .await;

    let config = fast_config(&server);
    let client = BggClient::new(&config).unwrap();
    let err = fetch_things(&client, &[1, 2, 3], &config.batch)
        .await
        .unwrap_err();

    match err {
        SyncError::NoItems {
            attempts,
            first,
            len,
        } => {
            assert_eq!(attempts, 5);
            assert_eq!(first, 1);
            assert_eq!(len, 3);
        }
        other => panic!("expected NoItems, got {other:?}"),
    }
    assert_eq!(server.received_requests().await.unwrap().len(), 5);
}

#[tokio::test]
async fn test_failed_chunk_aborts_remaining_chunks() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(thing_path()))
        .and(query_param("id", "1,2"))
        .respond_with(echo_things)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(thing_path()))
        .and(query_param("id", "3,4"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&server)
        .await;

    let mut config = fast_config(&server);
    config.batch.chunk_size = 2;
    let client = BggClient::new(&config).unwrap();
    let err = fetch_things(&client, &[1, 2, 3, 4, 5, 6], &config.batch)
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::NoItems { first: 3, .. }));
    let requests = server.received_requests().await.unwrap();
    // One good chunk, five failed tries of the second, nothing for the third.
    assert_eq!(requests.len(), 6);
    assert!(requests.iter().all(|r| !requested_ids(r).contains(&5)));
}

#[tokio::test]
async fn test_sends_bearer_token_and_drops_unusable_items() {
    let server = MockServer::start().await;
    let body = thing_xml(&[
        item_xml(1, "Go Fish", 2, 6),
        r#"<item type="boardgame"><name type="primary" value="No id" /></item>"#.to_string(),
    ]);
    Mock::given(method("GET"))
        .and(path(thing_path()))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(&server)
        .await;

    let config = fast_config(&server);
    let client = BggClient::new(&config).unwrap();
    let fetched = fetch_things(&client, &[1, 2], &config.batch).await.unwrap();

    assert_eq!(fetched.keys().copied().collect::<Vec<_>>(), vec![1]);
    let go_fish = &fetched[&1];
    assert_eq!(go_fish.players.min, Some(2));
    assert_eq!(go_fish.players.max, Some(6));
    assert_eq!(go_fish.categories, vec!["Card Game"]);
    assert_eq!(go_fish.ratings.usersrated, Some(10));
}
