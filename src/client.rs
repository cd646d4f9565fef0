//! HTTP access to the problem API
//!
//! One [`ProblemClient`] is built per run and reused for every request so the
//! underlying connection pool is shared.

use crate::config::Config;
use crate::error::{Error, FetchFailure, MetadataError, Result};
use serde_json::{Value, json};
use std::time::{Duration, Instant};
use url::Url;

/// Path of the metadata index endpoint
const METADATA_PATH: &str = "api/problems/all/";

/// Path of the GraphQL endpoint
const GRAPHQL_PATH: &str = "graphql";

/// GraphQL document requesting every field of a question
pub const QUESTION_QUERY: &str = r#"
query questionData($titleSlug: String!) {
    question(titleSlug: $titleSlug) {
        questionId
        questionFrontendId
        boundTopicId
        title
        titleSlug
        content
        translatedTitle
        translatedContent
        isPaidOnly
        difficulty
        likes
        dislikes
        isLiked
        similarQuestions
        contributors {
            username
            profileUrl
            avatarUrl
        }
        langToValidPlayground
        topicTags {
            name
            slug
            translatedName
        }
        companyTagStats
        codeSnippets {
            lang
            langSlug
            code
        }
        stats
        hints
        status
        sampleTestCase
        metaData
        judgerAvailable
        judgeType
        mysqlSchemas
        enableRunCode
        enableTestMode
        envInfo
        libraryUrl
        note
    }
}
"#;

/// Raw answer to a detail request
#[derive(Debug)]
pub struct DetailResponse {
    /// HTTP status code
    pub status: u16,
    /// Time from sending the request until the body was read
    pub elapsed: Duration,
    /// Response body
    pub body: Vec<u8>,
}

impl DetailResponse {
    /// Parse the body and check it carries a `data.question` object
    pub fn into_document(self) -> std::result::Result<Value, FetchFailure> {
        let document: Value = serde_json::from_slice(&self.body)?;
        if document
            .get("data")
            .and_then(|data| data.get("question"))
            .is_some_and(Value::is_object)
        {
            Ok(document)
        } else {
            Err(FetchFailure::InvalidPayload)
        }
    }
}

/// Client for the metadata and detail endpoints
#[derive(Clone, Debug)]
pub struct ProblemClient {
    http: reqwest::Client,
    metadata_url: Url,
    graphql_url: Url,
}

impl ProblemClient {
    /// Build a client from configuration
    pub fn new(config: &Config) -> Result<Self> {
        let base = config.base_url()?;
        let metadata_url = base
            .join(METADATA_PATH)
            .map_err(|e| Error::config("http.base_url", e.to_string()))?;
        let graphql_url = base
            .join(GRAPHQL_PATH)
            .map_err(|e| Error::config("http.base_url", e.to_string()))?;

        let http = reqwest::Client::builder()
            .timeout(config.http.request_timeout)
            .user_agent(config.http.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            metadata_url,
            graphql_url,
        })
    }

    /// URL of the metadata index
    pub fn metadata_url(&self) -> &Url {
        &self.metadata_url
    }

    /// URL of the GraphQL endpoint
    pub fn graphql_url(&self) -> &Url {
        &self.graphql_url
    }

    /// Download the full metadata index as raw JSON
    pub async fn fetch_metadata(&self) -> Result<Value> {
        let url = self.metadata_url.as_str();
        tracing::info!(url = %url, "fetching metadata index");

        let response = self
            .http
            .get(self.metadata_url.clone())
            .send()
            .await
            .map_err(|source| MetadataError::Fetch {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(MetadataError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let body = response.bytes().await.map_err(|source| MetadataError::Fetch {
            url: url.to_string(),
            source,
        })?;

        let value = serde_json::from_slice(&body).map_err(|source| MetadataError::Parse {
            origin: url.to_string(),
            source,
        })?;
        Ok(value)
    }

    /// Send the detail query for `slug`
    ///
    /// Any HTTP status is returned as a response; only transport failures
    /// (timeouts, connection errors, truncated bodies) are errors.
    pub async fn fetch_detail(
        &self,
        slug: &str,
    ) -> std::result::Result<DetailResponse, FetchFailure> {
        let payload = json!({
            "query": QUESTION_QUERY,
            "variables": { "titleSlug": slug },
        });

        let started = Instant::now();
        let response = self
            .http
            .post(self.graphql_url.clone())
            .json(&payload)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        let elapsed = started.elapsed();

        tracing::debug!(
            slug = %slug,
            status,
            elapsed_ms = elapsed.as_millis() as u64,
            bytes = body.len(),
            "detail response"
        );

        Ok(DetailResponse {
            status,
            elapsed,
            body,
        })
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Site;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> Config {
        let mut config = Config::default();
        config.http.base_url = Some(server.uri());
        config
    }

    fn response(status: u16, body: &str) -> DetailResponse {
        DetailResponse {
            status,
            elapsed: Duration::ZERO,
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn endpoints_follow_site() {
        let mut config = Config::default();
        let client = ProblemClient::new(&config).unwrap();
        assert_eq!(
            client.metadata_url().as_str(),
            "https://leetcode.com/api/problems/all/"
        );
        assert_eq!(client.graphql_url().as_str(), "https://leetcode.com/graphql");

        config.site = Site::Cn;
        let client = ProblemClient::new(&config).unwrap();
        assert_eq!(
            client.metadata_url().as_str(),
            "https://leetcode.cn/api/problems/all/"
        );
        assert_eq!(client.graphql_url().as_str(), "https://leetcode.cn/graphql");
    }

    #[test]
    fn document_requires_data_question_object() {
        let ok = response(200, r#"{"data":{"question":{"titleSlug":"two-sum"}}}"#);
        assert!(ok.into_document().is_ok());

        let null_question = response(200, r#"{"data":{"question":null}}"#);
        assert!(matches!(
            null_question.into_document(),
            Err(FetchFailure::InvalidPayload)
        ));

        let errors_only = response(200, r#"{"errors":[{"message":"rate limited"}]}"#);
        assert!(matches!(
            errors_only.into_document(),
            Err(FetchFailure::InvalidPayload)
        ));

        let html = response(200, "<html>blocked</html>");
        assert!(matches!(
            html.into_document(),
            Err(FetchFailure::MalformedJson(_))
        ));
    }

    #[tokio::test]
    async fn fetch_metadata_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/problems/all/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "stat_status_pairs": [
                    {"stat": {"question_id": 1, "question__title_slug": "two-sum", "question__title": "Two Sum"}}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ProblemClient::new(&config_for(&server)).unwrap();
        let value = client.fetch_metadata().await.unwrap();

        assert_eq!(value["stat_status_pairs"][0]["stat"]["question_id"], 1);
    }

    #[tokio::test]
    async fn fetch_metadata_rejects_error_status_and_garbage() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/problems/all/"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/problems/all/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = ProblemClient::new(&config_for(&server)).unwrap();

        let first = client.fetch_metadata().await;
        assert!(matches!(
            first,
            Err(Error::Metadata(MetadataError::Status { status: 503, .. }))
        ));

        let second = client.fetch_metadata().await;
        assert!(matches!(
            second,
            Err(Error::Metadata(MetadataError::Parse { .. }))
        ));
    }

    #[tokio::test]
    async fn fetch_detail_posts_query_with_slug() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_partial_json(serde_json::json!({
                "variables": { "titleSlug": "two-sum" }
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"data": {"question": {"questionId": "1"}}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = ProblemClient::new(&config_for(&server)).unwrap();
        let response = client.fetch_detail("two-sum").await.unwrap();

        assert_eq!(response.status, 200);
        let document = response.into_document().unwrap();
        assert_eq!(document["data"]["question"]["questionId"], "1");
    }

    #[tokio::test]
    async fn fetch_detail_passes_error_status_through() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let client = ProblemClient::new(&config_for(&server)).unwrap();
        let response = client.fetch_detail("two-sum").await.unwrap();

        assert_eq!(response.status, 429);
    }

    #[tokio::test]
    async fn fetch_detail_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let mut config = config_for(&server);
        config.http.request_timeout = Duration::from_millis(100);
        let client = ProblemClient::new(&config).unwrap();

        let err = client.fetch_detail("two-sum").await.unwrap_err();
        assert_eq!(err.reason(), "timeout");
    }
}
