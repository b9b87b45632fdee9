//! Mock server helpers
//!
//! Serve an index at `/batis_index.json` and files at arbitrary paths.

use serde_json::Value;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub async fn mock_index(server: &MockServer, index: &Value) {
    Mock::given(method("GET"))
        .and(path("/batis_index.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(index))
        .mount(server)
        .await;
}

pub async fn mock_file(server: &MockServer, file_path: &str, content: &[u8]) {
    Mock::given(method("GET"))
        .and(path(file_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
        .mount(server)
        .await;
}

pub async fn mock_missing(server: &MockServer, file_path: &str) {
    Mock::given(method("GET"))
        .and(path(file_path))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
}

pub fn index_url(server: &MockServer) -> String {
    format!("{}/batis_index.json", server.uri())
}
