#![allow(dead_code)]

use reqwest::Url;
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};
use zipmirror::{DownloaderBuilder, HttpClientConfig};

// Common test constants
pub const TEST_DOMAIN: &str = "http://domain.com/file.zip";
pub const TEST_USER_AGENT: &str = "zipmirror-test-agent";

/// Creates a temporary directory for testing purposes
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Creates a temporary file with the given content
pub fn create_temp_file(dir: &Path, filename: &str, content: &[u8]) -> PathBuf {
    let file_path = dir.join(filename);
    fs::write(&file_path, content).expect("Failed to write temporary file");
    file_path
}

/// Creates test file content of specified size
pub fn create_test_content(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 251) as u8).collect()
}

/// Asserts that a file exists at the given path
pub fn assert_file_exists(path: &Path) {
    assert!(path.exists(), "File should exist at path: {:?}", path);
}

/// Asserts that a file has the expected size
pub fn assert_file_size(path: &Path, expected_size: u64) {
    let metadata = fs::metadata(path).expect("Failed to get file metadata");
    assert_eq!(
        metadata.len(),
        expected_size,
        "File size mismatch at path: {:?}",
        path
    );
}

// === Archive Fixtures ===

/// Builds an in-memory ZIP archive.
///
/// Names ending in `/` become directory entries. Entry names are stored
/// verbatim, so hostile paths can be used as fixtures.
pub fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Stored);

    for (name, content) in entries {
        if name.ends_with('/') {
            zip.add_directory(*name, options)
                .expect("Failed to add directory entry");
        } else {
            zip.start_file(*name, options)
                .expect("Failed to start file entry");
            zip.write_all(content).expect("Failed to write file entry");
        }
    }

    zip.finish().expect("Failed to finish archive").into_inner()
}

/// Writes a ZIP archive built by [`build_zip`] into `dir`.
pub fn write_zip(dir: &Path, filename: &str, entries: &[(&str, &[u8])]) -> PathBuf {
    create_temp_file(dir, filename, &build_zip(entries))
}

/// A small, well-formed archive with a nested directory.
pub fn sample_zip() -> Vec<u8> {
    build_zip(&[
        ("readme.txt", b"hello"),
        ("data/", b""),
        ("data/level1.bin", &[1, 2, 3, 4]),
    ])
}

// === Downloader Builder Helpers ===

/// Creates a quiet downloader builder writing into `dir` with a short backoff
pub fn create_test_downloader_builder(dir: &Path) -> DownloaderBuilder {
    DownloaderBuilder::hidden()
        .directory(dir.to_path_buf())
        .backoff(Duration::from_millis(1))
        .timeout(Duration::from_secs(5))
}

/// Index client configuration without middleware retries
pub fn create_test_http_config() -> HttpClientConfig {
    HttpClientConfig {
        retries: 0,
        timeout: Duration::from_secs(5),
        ..HttpClientConfig::default()
    }
}

// === Mock Server Helpers ===

/// URL of `name` on the mock server
pub fn server_url(server: &MockServer, name: &str) -> Url {
    Url::parse(&format!("{}/{}", server.uri(), name)).expect("Invalid mock URL")
}

/// Base URL of the index page on the mock server
pub fn index_url(server: &MockServer) -> Url {
    server_url(server, "files/")
}

/// Builds an index page linking to every href
pub fn index_html(hrefs: &[&str]) -> String {
    let links: String = hrefs
        .iter()
        .map(|href| format!("<li><a href=\"{}\">{}</a></li>\n", href, href))
        .collect();
    format!(
        "<html><head><title>Index of /files</title></head><body><ul>\n{}</ul></body></html>",
        links
    )
}

/// Serves an index page at `/files/`
pub async fn mount_index(server: &MockServer, hrefs: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/files/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string(index_html(hrefs)),
        )
        .mount(server)
        .await;
}

/// Serves `body` for both HEAD and GET at `route`
pub async fn mount_file(server: &MockServer, route: &str, body: &[u8]) {
    Mock::given(method("HEAD"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}
