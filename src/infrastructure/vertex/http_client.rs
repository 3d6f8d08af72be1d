use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::domain::DomainError;

/// Trait for HTTP client operations (for mocking)
#[async_trait]
pub trait HttpClientTrait: Send + Sync + std::fmt::Debug {
    async fn get_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
    ) -> Result<serde_json::Value, DomainError>;

    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, DomainError>;
}

/// Real HTTP client using reqwest
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                DomainError::configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        headers: Vec<(&str, &str)>,
    ) -> Result<serde_json::Value, DomainError> {
        let mut request = request;

        for (key, value) in headers {
            request = request.header(key, value);
        }

        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(status_error(status, error_body));
        }

        response.json().await.map_err(|e| {
            if e.is_timeout() {
                return map_transport_error(e);
            }
            DomainError::serialization(format!("Failed to parse response: {}", e))
        })
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

fn map_transport_error(e: reqwest::Error) -> DomainError {
    if e.is_timeout() {
        DomainError::timeout("Timeout error occurred.")
    } else {
        DomainError::remote(500, format!("Request failed: {}", e))
    }
}

fn status_error(status: StatusCode, body: String) -> DomainError {
    match status {
        StatusCode::FORBIDDEN => DomainError::permission_denied(body),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => DomainError::timeout(body),
        _ => DomainError::remote(status.as_u16(), body),
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn get_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
    ) -> Result<serde_json::Value, DomainError> {
        self.send(self.client.get(url), headers).await
    }

    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, DomainError> {
        self.send(self.client.post(url).json(body), headers).await
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::RwLock;

    /// Recorded request made against the mock
    #[derive(Debug, Clone)]
    pub struct RecordedRequest {
        pub method: &'static str,
        pub url: String,
        pub headers: Vec<(String, String)>,
        pub body: Option<serde_json::Value>,
    }

    #[derive(Debug, Default)]
    pub struct MockHttpClient {
        get_responses: RwLock<HashMap<String, serde_json::Value>>,
        post_responses: RwLock<HashMap<String, serde_json::Value>>,
        errors: RwLock<HashMap<String, u16>>,
        requests: RwLock<Vec<RecordedRequest>>,
    }

    impl MockHttpClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_get_response(self, url: impl Into<String>, response: serde_json::Value) -> Self {
            self.get_responses.write().unwrap().insert(url.into(), response);
            self
        }

        pub fn with_post_response(
            self,
            url: impl Into<String>,
            response: serde_json::Value,
        ) -> Self {
            self.post_responses
                .write()
                .unwrap()
                .insert(url.into(), response);
            self
        }

        /// Fails every request to `url` with the given status
        pub fn with_error(self, url: impl Into<String>, status: u16) -> Self {
            self.errors.write().unwrap().insert(url.into(), status);
            self
        }

        pub fn requests(&self) -> Vec<RecordedRequest> {
            self.requests.read().unwrap().clone()
        }

        fn record(
            &self,
            method: &'static str,
            url: &str,
            headers: Vec<(&str, &str)>,
            body: Option<&serde_json::Value>,
        ) -> Result<(), DomainError> {
            self.requests.write().unwrap().push(RecordedRequest {
                method,
                url: url.to_string(),
                headers: headers
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                body: body.cloned(),
            });

            match self.errors.read().unwrap().get(url) {
                Some(&status) => Err(status_error(
                    StatusCode::from_u16(status).unwrap(),
                    format!("mock error {}", status),
                )),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl HttpClientTrait for MockHttpClient {
        async fn get_json(
            &self,
            url: &str,
            headers: Vec<(&str, &str)>,
        ) -> Result<serde_json::Value, DomainError> {
            self.record("GET", url, headers, None)?;

            self.get_responses
                .read()
                .unwrap()
                .get(url)
                .cloned()
                .ok_or_else(|| DomainError::remote(404, format!("No mock response for {}", url)))
        }

        async fn post_json(
            &self,
            url: &str,
            headers: Vec<(&str, &str)>,
            body: &serde_json::Value,
        ) -> Result<serde_json::Value, DomainError> {
            self.record("POST", url, headers, Some(body))?;

            self.post_responses
                .read()
                .unwrap()
                .get(url)
                .cloned()
                .ok_or_else(|| DomainError::remote(404, format!("No mock response for {}", url)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_get_json_sends_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/items"))
            .and(header("Authorization", "Bearer token-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;

        let client = HttpClient::new();
        let body = client
            .get_json(
                &format!("{}/v1/items", server.uri()),
                vec![("Authorization", "Bearer token-1")],
            )
            .await
            .unwrap();

        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_forbidden_maps_to_permission_denied() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("denied"))
            .mount(&server)
            .await;

        let err = HttpClient::new()
            .get_json(&server.uri(), vec![])
            .await
            .unwrap_err();

        assert!(err.is_permission_denied());
    }

    #[tokio::test]
    async fn test_error_status_keeps_code_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let err = HttpClient::new()
            .post_json(&server.uri(), vec![], &serde_json::json!({}))
            .await
            .unwrap_err();

        match err {
            DomainError::RemoteTransport { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "slow down");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_slow_response_maps_to_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = HttpClient::with_timeout(Duration::from_millis(50)).unwrap();
        let err = client
            .post_json(&server.uri(), vec![], &serde_json::json!({}))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), 408);
    }
}
