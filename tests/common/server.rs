//! Mock problem API and crawler configuration helpers

use super::fixtures::{metadata_index, question_detail};
use problem_crawler::Config;
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Crawler configuration against `server`, with pauses shrunk to milliseconds
pub fn test_config(server: &MockServer, output_dir: PathBuf) -> Config {
    let mut config = Config::default();
    config.http.base_url = Some(server.uri());
    config.http.request_timeout = Duration::from_secs(5);
    config.output_dir = output_dir;
    config.retry.retry_delay = Duration::from_millis(10);
    config.pacing.rate_limited_delay = Duration::from_millis(20);
    config.pacing.slow_delay = Duration::from_millis(10);
    config.pacing.normal_delay = Duration::from_millis(1);
    config.pacing.jitter = false;
    config
}

/// Serve the metadata index, expecting exactly `expected_calls` requests
pub async fn mount_index(server: &MockServer, entries: &[(u32, &str)], expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/api/problems/all/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(metadata_index(entries)))
        .expect(expected_calls)
        .named("metadata index")
        .mount(server)
        .await;
}

/// Serve the detail document for `slug`, expecting exactly `expected_calls` requests
pub async fn mount_detail(server: &MockServer, id: u32, slug: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(json!({ "variables": { "titleSlug": slug } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(question_detail(id, slug)))
        .expect(expected_calls)
        .named(format!("detail {slug}"))
        .mount(server)
        .await;
}

/// Answer detail requests for `slug` with `status`
pub async fn mount_detail_status(server: &MockServer, slug: &str, status: u16, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(json!({ "variables": { "titleSlug": slug } })))
        .respond_with(ResponseTemplate::new(status))
        .expect(expected_calls)
        .named(format!("detail {slug} -> {status}"))
        .mount(server)
        .await;
}

/// Slugs of the detail requests the server has received, in arrival order
pub async fn requested_slugs(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == "/graphql")
        .filter_map(|request| {
            let body: serde_json::Value = serde_json::from_slice(&request.body).ok()?;
            body["variables"]["titleSlug"].as_str().map(str::to_string)
        })
        .collect()
}
