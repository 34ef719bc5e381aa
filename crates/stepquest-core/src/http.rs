//! HTTP step source.
//!
//! Reads step data from a small REST endpoint, typically a companion
//! service that bridges a phone's health store:
//!
//! | Request | Response |
//! |---------|----------|
//! | `GET {base}/steps/daily?start=YYYY-MM-DD&end=YYYY-MM-DD` | `[{"date": "2024-01-01", "steps": 8123}, ...]` |
//! | `GET {base}/steps/today` | `{"steps": 4200}` |
//!
//! An optional bearer token is sent with every request.
//!
//! # Example
//!
//! ```no_run
//! use stepquest_core::{HistoricalSource, HttpStepSource};
//! use stepquest_types::DateRange;
//! use time::macros::date;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = HttpStepSource::new("http://localhost:9090", None)?;
//! let range = DateRange::new(date!(2024 - 01 - 01), date!(2024 - 01 - 07));
//! let days = source.fetch_days(range).await?;
//! println!("{} days", days.len());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use tracing::debug;

use stepquest_types::{DailySteps, DateRange, format_date};

use crate::error::{Error, Result, SourceError};
use crate::traits::{HistoricalSource, LiveSource};

const SOURCE_NAME: &str = "http step source";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct TodayResponse {
    steps: u64,
}

/// A [`HistoricalSource`] and [`LiveSource`] backed by a REST endpoint.
#[derive(Debug, Clone)]
pub struct HttpStepSource {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpStepSource {
    /// Create a source for `base_url` (must start with `http://` or `https://`).
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| Error::invalid_config(format!("HTTP client: {}", e)))?;
        Self::with_client(base_url, token, client)
    }

    /// Create a source with a custom reqwest Client.
    pub fn with_client(base_url: &str, token: Option<String>, client: Client) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::invalid_config(format!(
                "URL must start with http:// or https://, got: {}",
                base_url
            )));
        }

        Ok(Self {
            client,
            base_url,
            token: token.filter(|t| !t.is_empty()),
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> std::result::Result<T, SourceError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| classify_transport(operation, e))?;

        let status = response.status();
        if let Some(err) = classify_status(status) {
            return Err(err);
        }

        response
            .json()
            .await
            .map_err(|e| SourceError::invalid_response(SOURCE_NAME, e.to_string()))
    }
}

fn classify_transport(operation: &str, e: reqwest::Error) -> SourceError {
    if e.is_timeout() {
        SourceError::timeout(operation, DEFAULT_TIMEOUT)
    } else {
        SourceError::unreachable(SOURCE_NAME, e.to_string())
    }
}

/// Map a non-success HTTP status to a source error.
fn classify_status(status: StatusCode) -> Option<SourceError> {
    if status.is_success() {
        return None;
    }
    Some(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            SourceError::PermissionDenied(SOURCE_NAME.to_string())
        }
        StatusCode::NOT_FOUND => SourceError::NotInstalled(SOURCE_NAME.to_string()),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            SourceError::unreachable(SOURCE_NAME, status.to_string())
        }
        s if s.is_server_error() => SourceError::unreachable(SOURCE_NAME, s.to_string()),
        s => SourceError::invalid_response(SOURCE_NAME, s.to_string()),
    })
}

#[async_trait]
impl HistoricalSource for HttpStepSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn fetch_days(&self, range: DateRange) -> std::result::Result<Vec<DailySteps>, SourceError> {
        let url = format!("{}/steps/daily", self.base_url);
        debug!("GET {} for {:?}", url, range);
        let request = self.client.get(&url).query(&[
            ("start", format_date(range.start)),
            ("end", format_date(range.end)),
        ]);
        self.get("fetch_days", request).await
    }
}

#[async_trait]
impl LiveSource for HttpStepSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn today_total(&self) -> std::result::Result<u64, SourceError> {
        let url = format!("{}/steps/today", self.base_url);
        let request = self.client.get(&url);
        let body: TodayResponse = self.get("today_total", request).await?;
        Ok(body.steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;
    use tokio::net::TcpListener;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// A server answering `/steps/today` with a fixed status and body.
    async fn today_server(status: u16, body: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/steps/today"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&server)
            .await;
        server
    }

    #[test]
    fn test_source_creation() {
        let source = HttpStepSource::new("http://localhost:9090/", None).unwrap();
        assert_eq!(source.base_url(), "http://localhost:9090");

        let result = HttpStepSource::new("localhost:9090", None);
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_classify_status() {
        assert_eq!(classify_status(StatusCode::OK), None);
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED),
            Some(SourceError::PermissionDenied(_))
        ));
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN),
            Some(SourceError::PermissionDenied(_))
        ));
        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND),
            Some(SourceError::NotInstalled(_))
        ));
        assert!(
            classify_status(StatusCode::SERVICE_UNAVAILABLE)
                .unwrap()
                .is_transient()
        );
        assert!(matches!(
            classify_status(StatusCode::BAD_REQUEST),
            Some(SourceError::InvalidResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_days_and_today() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/steps/daily"))
            .and(query_param("start", "2024-01-01"))
            .and(query_param("end", "2024-01-02"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"date": "2024-01-01", "steps": 8123},
                {"date": "2024-01-02", "steps": 0}
            ])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/steps/today"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"steps": 4200})))
            .expect(1)
            .mount(&server)
            .await;

        let source = HttpStepSource::new(&server.uri(), Some("secret".to_string())).unwrap();

        let range = DateRange::new(date!(2024 - 01 - 01), date!(2024 - 01 - 02));
        let days = source.fetch_days(range).await.unwrap();
        assert_eq!(
            days,
            vec![
                DailySteps::new(date!(2024 - 01 - 01), 8123),
                DailySteps::new(date!(2024 - 01 - 02), 0),
            ]
        );
        assert_eq!(source.today_total().await.unwrap(), 4200);
    }

    #[tokio::test]
    async fn test_error_statuses_and_bad_bodies() {
        let server = today_server(401, r#"{"error":"no token"}"#).await;
        let source = HttpStepSource::new(&server.uri(), None).unwrap();
        assert!(matches!(
            source.today_total().await,
            Err(SourceError::PermissionDenied(_))
        ));

        let server = today_server(404, "{}").await;
        let source = HttpStepSource::new(&server.uri(), None).unwrap();
        assert!(matches!(
            source.today_total().await,
            Err(SourceError::NotInstalled(_))
        ));

        let server = today_server(503, "").await;
        let source = HttpStepSource::new(&server.uri(), None).unwrap();
        assert!(source.today_total().await.unwrap_err().is_transient());

        let server = today_server(200, r#"{"total":1}"#).await;
        let source = HttpStepSource::new(&server.uri(), None).unwrap();
        assert!(matches!(
            source.today_total().await,
            Err(SourceError::InvalidResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_daily_request_without_token_is_unauthenticated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/steps/daily"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let source = HttpStepSource::new(&server.uri(), None).unwrap();
        let range = DateRange::new(date!(2024 - 01 - 01), date!(2024 - 01 - 01));
        assert!(source.fetch_days(range).await.unwrap().is_empty());

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].headers.contains_key("authorization"));
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        // Bind then drop to get a port with nothing listening
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source = HttpStepSource::new(&format!("http://{}", addr), None).unwrap();
        let err = source.today_total().await.unwrap_err();
        assert!(err.is_transient());
    }
}
