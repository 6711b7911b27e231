use crate::{Transport, TransportSession};
use async_trait::async_trait;
use cascade_core::{OperationDescriptor, Payload, TransportError, TransportResponse, Verb};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::Client as HttpClient;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, trace};

/// HTTP session configuration shared by every request of a round
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Cascade API key, sent as a bearer token
    pub api_key: Option<String>,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
    pub user_agent: String,
    /// Additional headers sent with every request
    pub extra_headers: Vec<(String, String)>,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            timeout_ms: 30000,
            user_agent: concat!("cascade-batch/", env!("CARGO_PKG_VERSION")).to_string(),
            extra_headers: Vec::new(),
        }
    }
}

impl HttpTransportConfig {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    fn default_headers(&self) -> Result<HeaderMap, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, header_value(&self.user_agent)?);

        if let Some(key) = &self.api_key {
            let mut value = header_value(&format!("Bearer {}", key))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        for (name, value) in &self.extra_headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| TransportError::Config(format!("header name '{}': {}", name, e)))?;
            headers.insert(name, header_value(value)?);
        }

        Ok(headers)
    }
}

fn header_value(value: &str) -> Result<HeaderValue, TransportError> {
    HeaderValue::from_str(value).map_err(|e| TransportError::Config(format!("header value: {}", e)))
}

/// Opens a fresh reqwest client per round with the configured headers
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    config: HttpTransportConfig,
}

impl HttpTransport {
    pub fn new(config: HttpTransportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HttpTransportConfig {
        &self.config
    }
}

#[async_trait]
impl Transport for HttpTransport {
    type Session = HttpSession;

    async fn open(&self) -> Result<HttpSession, TransportError> {
        let client = HttpClient::builder()
            .default_headers(self.config.default_headers()?)
            .timeout(self.config.timeout())
            .build()
            .map_err(|e| TransportError::Config(e.to_string()))?;

        debug!(timeout_ms = self.config.timeout_ms, "Opened HTTP session");
        Ok(HttpSession {
            client,
            timeout: self.config.timeout(),
        })
    }
}

/// One round's connection pool. Dropping it closes idle connections.
#[derive(Debug)]
pub struct HttpSession {
    client: HttpClient,
    timeout: Duration,
}

impl HttpSession {
    fn map_send_error(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else {
            TransportError::Connection(err.to_string())
        }
    }
}

#[async_trait]
impl TransportSession for HttpSession {
    async fn request(
        &self,
        operation: &OperationDescriptor,
    ) -> Result<TransportResponse, TransportError> {
        let mut request = match operation.verb() {
            Verb::Get => self.client.get(operation.target()),
            Verb::Post => self.client.post(operation.target()),
        };
        request = match operation.body() {
            Some(Payload::Json(value)) => request.json(value),
            Some(Payload::Bytes(bytes)) => request.body(bytes.clone()),
            None => request,
        };

        trace!(operation = %operation, "Sending request");
        let response = request.send().await.map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.map_send_error(e))?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).map_err(|e| TransportError::Decode(e.to_string()))?
        };

        Ok(TransportResponse::new(status.as_u16(), body))
    }

    fn timeout(&self) -> Option<Duration> {
        Some(self.timeout)
    }
}

impl Drop for HttpSession {
    fn drop(&mut self) {
        trace!("Released HTTP session");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_config() {
        let config = HttpTransportConfig::default();
        assert_eq!(config.timeout_ms, 30000);
        assert!(config.api_key.is_none());
        assert!(config.user_agent.starts_with("cascade-batch/"));
    }

    #[test]
    fn test_default_headers_include_bearer_token() {
        let config = HttpTransportConfig::with_api_key("secret-key");
        let headers = config.default_headers().unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer secret-key");
        assert!(headers[AUTHORIZATION].is_sensitive());
        assert_eq!(headers[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_invalid_header_is_config_error() {
        let config = HttpTransportConfig::with_api_key("bad\nkey");
        assert!(matches!(
            config.default_headers(),
            Err(TransportError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_open_fails_on_bad_extra_header() {
        let transport = HttpTransport::new(HttpTransportConfig {
            extra_headers: vec![("bad header".to_string(), "x".to_string())],
            ..Default::default()
        });
        assert!(matches!(transport.open().await, Err(TransportError::Config(_))));
    }

    #[tokio::test]
    async fn test_get_decodes_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/listSites")
            .match_header("authorization", "Bearer k1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success":true,"sites":[]}"#)
            .create_async()
            .await;

        let transport = HttpTransport::new(HttpTransportConfig::with_api_key("k1"));
        let session = transport.open().await.unwrap();
        let op = OperationDescriptor::get(format!("{}/api/v1/listSites", server.url())).unwrap();

        let response = session.request(&op).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, json!({"success": true, "sites": []}));
        mock.assert_async().await;
    }
}
