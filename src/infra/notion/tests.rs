use std::time::Duration;

use httpmock::MockServer;
use serde_json::json;

use super::*;

fn settings(server: &MockServer, token: Option<&str>) -> NotionSettings {
    NotionSettings {
        token: token.map(str::to_string),
        api_base: Url::parse(&server.base_url()).expect("mock server url"),
        api_version: "2022-06-28".to_string(),
        blog_database_id: Some("blog-db".to_string()),
        projects_database_id: None,
        timeout: Duration::from_secs(5),
    }
}

fn client(server: &MockServer) -> NotionClient {
    NotionClient::new(&settings(server, Some("secret_token"))).expect("client builds")
}

fn page(id: &str, title: &str) -> Value {
    json!({
        "object": "page",
        "id": id,
        "properties": {
            "Name": { "type": "title", "title": [{ "plain_text": title }] }
        }
    })
}

#[test]
fn blank_token_is_not_configured() {
    let server = MockServer::start();
    let client = NotionClient::new(&settings(&server, Some("  "))).expect("client builds");
    assert!(!client.is_configured());

    let client = NotionClient::new(&settings(&server, None)).expect("client builds");
    assert!(!client.is_configured());
}

#[tokio::test]
async fn unconfigured_client_never_hits_the_network() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.any_request();
        then.status(200);
    });

    let client = NotionClient::new(&settings(&server, None)).expect("client builds");
    let err = client
        .list_published("blog-db")
        .await
        .expect_err("unconfigured");
    assert!(matches!(err, ClientError::NotConfigured));
    mock.assert_calls(0);
}

#[tokio::test]
async fn list_published_sends_filter_and_follows_cursor() {
    let server = MockServer::start();
    let first = server.mock(|when, then| {
        when.method("POST")
            .path("/v1/databases/blog-db/query")
            .header("authorization", "Bearer secret_token")
            .header("notion-version", "2022-06-28")
            .json_body_includes(
                r#"{"filter":{"property":"Published","checkbox":{"equals":true}},"page_size":100}"#,
            )
            .body_excludes("start_cursor");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "results": [page("p1", "One"), { "object": "page" }, page("p2", "Two")],
                "has_more": true,
                "next_cursor": "cursor-2"
            }));
    });
    let second = server.mock(|when, then| {
        when.method("POST")
            .path("/v1/databases/blog-db/query")
            .json_body_includes(r#"{"start_cursor":"cursor-2"}"#);
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "results": [page("p3", "Three")],
                "has_more": false,
                "next_cursor": null
            }));
    });

    let records = client(&server)
        .list_published("blog-db")
        .await
        .expect("listing succeeds");

    let ids: Vec<_> = records.iter().map(RawRecord::id).collect();
    assert_eq!(ids, vec!["p1", "p2", "p3"]);
    first.assert();
    second.assert();
}

#[tokio::test]
async fn list_published_reports_upstream_status() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("POST").path("/v1/databases/blog-db/query");
        then.status(401).body(r#"{"code":"unauthorized"}"#);
    });

    let err = client(&server)
        .list_published("blog-db")
        .await
        .expect_err("401 is an error");
    match err {
        ClientError::Status { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("unauthorized"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn entry_body_attaches_nested_children() {
    let server = MockServer::start();
    let page_mock = server.mock(|when, then| {
        when.method("GET").path("/v1/pages/p1");
        then.status(200).json_body(page("p1", "One"));
    });
    let top = server.mock(|when, then| {
        when.method("GET")
            .path("/v1/blocks/p1/children")
            .query_param("page_size", "100");
        then.status(200).json_body(json!({
            "results": [
                { "id": "b1", "type": "paragraph", "has_children": false },
                { "id": "b2", "type": "toggle", "has_children": true }
            ],
            "has_more": false
        }));
    });
    let nested = server.mock(|when, then| {
        when.method("GET").path("/v1/blocks/b2/children");
        then.status(200).json_body(json!({
            "results": [{ "id": "b3", "type": "paragraph", "has_children": false }],
            "has_more": false
        }));
    });

    let record = client(&server)
        .get_entry_body("p1")
        .await
        .expect("body fetch succeeds");

    let blocks = record.blocks().expect("blocks attached");
    assert_eq!(blocks.len(), 2);
    assert!(blocks[0].get("children").is_none());
    assert_eq!(blocks[1]["children"][0]["id"], "b3");
    page_mock.assert();
    top.assert();
    nested.assert();
}

#[tokio::test]
async fn block_children_follow_pagination() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/v1/pages/p1");
        then.status(200).json_body(page("p1", "One"));
    });
    server.mock(|when, then| {
        when.method("GET")
            .path("/v1/blocks/p1/children")
            .query_param_missing("start_cursor");
        then.status(200).json_body(json!({
            "results": [{ "id": "b1", "type": "divider" }],
            "has_more": true,
            "next_cursor": "next"
        }));
    });
    let second = server.mock(|when, then| {
        when.method("GET")
            .path("/v1/blocks/p1/children")
            .query_param("start_cursor", "next");
        then.status(200).json_body(json!({
            "results": [{ "id": "b2", "type": "divider" }],
            "has_more": false
        }));
    });

    let record = client(&server).get_entry_body("p1").await.expect("body");
    assert_eq!(record.blocks().map(<[Value]>::len), Some(2));
    second.assert();
}

#[tokio::test]
async fn missing_nested_block_is_an_upstream_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/v1/pages/p1");
        then.status(200).json_body(page("p1", "One"));
    });
    server.mock(|when, then| {
        when.method("GET").path("/v1/blocks/p1/children");
        then.status(200).json_body(json!({
            "results": [{ "id": "b9", "type": "toggle", "has_children": true }],
            "has_more": false
        }));
    });
    server.mock(|when, then| {
        when.method("GET").path("/v1/blocks/b9/children");
        then.status(404).body(r#"{"code":"object_not_found"}"#);
    });

    let err = client(&server)
        .get_entry_body("p1")
        .await
        .expect_err("nested 404 fails the fetch");
    assert!(!err.is_not_found());
    match err {
        ClientError::Status { status, body } => {
            assert_eq!(status, 404);
            assert!(body.contains("b9"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn missing_page_is_not_found() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/v1/pages/gone");
        then.status(404).body(r#"{"code":"object_not_found"}"#);
    });

    let err = client(&server)
        .get_entry_body("gone")
        .await
        .expect_err("404 maps to error");
    assert!(err.is_not_found());
}

#[tokio::test]
async fn malformed_json_is_decode_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("POST").path("/v1/databases/blog-db/query");
        then.status(200).body("not json");
    });

    let err = client(&server)
        .list_published("blog-db")
        .await
        .expect_err("decode failure");
    assert!(matches!(err, ClientError::Decode(_)));
}
