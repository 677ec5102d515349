//! Tests for index page discovery against a mock server.

use reqwest::Url;
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zipmirror::create_http_client;
use zipmirror::index::{discover, fetch_index};
use zipmirror::Error;

mod common;
use common::helpers::*;

const TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_discover_resolves_links_against_index() {
    let server = MockServer::start().await;
    mount_index(
        &server,
        &["game1.zip", "GAME1.ZIP", "readme.txt", "../up.zip", "game1.zip"],
    )
    .await;

    let client = create_http_client(create_test_http_config()).unwrap();
    let links = discover(&client, &index_url(&server), TIMEOUT).await.unwrap();

    let expected: Vec<Url> = vec![
        server_url(&server, "files/game1.zip"),
        server_url(&server, "files/GAME1.ZIP"),
        server_url(&server, "up.zip"),
    ];
    assert_eq!(links.urls(), expected.as_slice());
}

#[tokio::test]
async fn test_index_without_archives_is_empty() {
    let server = MockServer::start().await;
    mount_index(&server, &["notes.txt", "image.png"]).await;

    let client = create_http_client(create_test_http_config()).unwrap();
    let links = discover(&client, &index_url(&server), TIMEOUT).await.unwrap();

    assert!(links.is_empty());
}

#[tokio::test]
async fn test_index_error_status_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = create_http_client(create_test_http_config()).unwrap();

    assert!(discover(&client, &index_url(&server), TIMEOUT).await.is_err());
}

#[tokio::test]
async fn test_index_body_is_decoded_with_declared_charset() {
    let server = MockServer::start().await;
    // "café.zip" in ISO-8859-1
    let body = b"<a href=\"caf\xe9.zip\">caf\xe9</a>".to_vec();
    Mock::given(method("GET"))
        .and(path("/files/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=iso-8859-1")
                .set_body_bytes(body),
        )
        .mount(&server)
        .await;

    let client = create_http_client(create_test_http_config()).unwrap();
    let html = fetch_index(&client, &index_url(&server), TIMEOUT).await.unwrap();

    assert!(html.contains("café.zip"));
}

#[tokio::test]
async fn test_unreachable_index_fails() {
    let client = create_http_client(create_test_http_config()).unwrap();
    let base = Url::parse("http://127.0.0.1:9/files/").unwrap();

    assert!(discover(&client, &base, TIMEOUT).await.is_err());
}

#[tokio::test]
async fn test_stalled_index_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(index_html(&["late.zip"]))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = create_http_client(create_test_http_config()).unwrap();
    let started = Instant::now();
    let err = discover(&client, &index_url(&server), Duration::from_millis(200))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Timeout(_)));
    assert!(started.elapsed() < Duration::from_secs(3));
}
