//! Komtrax REST API client
//!
//! Uses ISO-15143-3 (AEMP 2.0) style endpoints:
//! - `GET {endpoint}/equipment/{equipment_id}` for a single machine
//! - `GET {endpoint}/equipment` for the whole fleet
//!
//! One attempt per call, 30 s timeout, no retry.

use crate::config::ProcessorConfig;
use crate::telemetry::EquipmentTelemetry;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP status error: {0}")]
    Status(u16),

    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("JSON parsing error: {0}")]
    Decode(String),

    #[error("Unexpected response body: expected a JSON object, got {0}")]
    UnexpectedBody(&'static str),
}

pub type Result<T> = std::result::Result<T, FetchError>;

/// Single equipment request, built from the current config
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    pub api_key: String,
}

impl FetchRequest {
    /// `None` when no API key is configured
    pub fn from_config(config: &ProcessorConfig) -> Option<Self> {
        let api_key = config.api_key()?;
        Some(Self {
            url: equipment_url(config),
            api_key: api_key.to_string(),
        })
    }
}

/// Build the equipment URL for the configured filter
pub fn equipment_url(config: &ProcessorConfig) -> String {
    match config.equipment_id() {
        Some(equipment_id) => format!("{}/equipment/{}", config.api_endpoint, equipment_id),
        None => format!("{}/equipment", config.api_endpoint),
    }
}

/// Source of equipment reports
#[async_trait]
pub trait EquipmentApi: Send + Sync {
    /// Issue the request and return the decoded JSON body
    async fn fetch(&self, request: &FetchRequest) -> Result<Value>;
}

/// Interpret a response body: an object is a report, an empty object or
/// `null` means "no data"
pub fn telemetry_from_body(body: Value) -> Result<Option<EquipmentTelemetry>> {
    match body {
        Value::Null => Ok(None),
        Value::Object(fields) if fields.is_empty() => Ok(None),
        Value::Object(fields) => Ok(Some(EquipmentTelemetry::new(fields))),
        Value::Array(_) => Err(FetchError::UnexpectedBody("array")),
        Value::String(_) => Err(FetchError::UnexpectedBody("string")),
        Value::Number(_) => Err(FetchError::UnexpectedBody("number")),
        Value::Bool(_) => Err(FetchError::UnexpectedBody("boolean")),
    }
}

/// HTTP client for the Komtrax API
#[derive(Debug, Clone)]
pub struct KomtraxClient {
    timeout: Duration,
}

impl Default for KomtraxClient {
    fn default() -> Self {
        Self::new()
    }
}

impl KomtraxClient {
    pub fn new() -> Self {
        Self { timeout: REQUEST_TIMEOUT }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl EquipmentApi for KomtraxClient {
    async fn fetch(&self, request: &FetchRequest) -> Result<Value> {
        info!("Fetching equipment data from {}", request.url);

        // Client lives for this request only; redirects are not followed
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let response = client
            .get(&request.url)
            .header(AUTHORIZATION, format!("Bearer {}", request.api_key))
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| {
                error!("Request error to Komtrax API: {}", e);
                FetchError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            error!("HTTP error from Komtrax API: {}", status.as_u16());
            return Err(FetchError::Status(status.as_u16()));
        }

        response.json::<Value>().await.map_err(|e| {
            if e.is_decode() {
                FetchError::Decode(e.to_string())
            } else {
                FetchError::Transport(e.to_string())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn http_response(status_line: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        )
    }

    /// Serve one canned HTTP response, returning the base URL and the raw request
    async fn serve_once(response: String) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&request).to_string()
        });

        (format!("http://{}", addr), handle)
    }

    fn request(base: &str) -> FetchRequest {
        FetchRequest {
            url: format!("{}/equipment/KOM-12345", base),
            api_key: "SECRET".into(),
        }
    }

    #[test]
    fn test_equipment_url() {
        let mut config = ProcessorConfig {
            api_endpoint: "https://komtrax.test/v1".into(),
            ..ProcessorConfig::default()
        };
        assert_eq!(equipment_url(&config), "https://komtrax.test/v1/equipment");

        config.equipment_id = Some("KOM-12345".into());
        assert_eq!(equipment_url(&config), "https://komtrax.test/v1/equipment/KOM-12345");

        config.equipment_id = Some(String::new());
        assert_eq!(equipment_url(&config), "https://komtrax.test/v1/equipment");
    }

    #[test]
    fn test_request_requires_api_key() {
        let mut config = ProcessorConfig::default();
        assert!(FetchRequest::from_config(&config).is_none());

        config.api_key = Some(String::new());
        assert!(FetchRequest::from_config(&config).is_none());

        config.api_key = Some("SECRET".into());
        let request = FetchRequest::from_config(&config).unwrap();
        assert_eq!(request.api_key, "SECRET");
        assert_eq!(request.url, "https://api.komtrax.komatsu.com/v1/equipment");
    }

    #[test]
    fn test_telemetry_from_body() {
        assert!(telemetry_from_body(json!(null)).unwrap().is_none());
        assert!(telemetry_from_body(json!({})).unwrap().is_none());
        let report = telemetry_from_body(json!({"model": "PC200-8"})).unwrap().unwrap();
        assert_eq!(report.fields()["model"], "PC200-8");
        assert!(matches!(
            telemetry_from_body(json!([{"model": "PC200-8"}])),
            Err(FetchError::UnexpectedBody("array"))
        ));
    }

    #[test]
    fn test_default_timeout() {
        assert_eq!(KomtraxClient::new().timeout(), Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_fetch_sends_headers_and_decodes_json() {
        let (base, server) =
            serve_once(http_response("200 OK", r#"{"equipment_id":"KOM-12345"}"#)).await;

        let body = KomtraxClient::new().fetch(&request(&base)).await.unwrap();
        assert_eq!(body, json!({"equipment_id": "KOM-12345"}));

        let raw = server.await.unwrap().to_lowercase();
        assert!(raw.starts_with("get /equipment/kom-12345 http/1.1"));
        assert!(raw.contains("authorization: bearer secret"));
        assert!(raw.contains("accept: application/json"));
        assert!(raw.contains("content-type: application/json"));
    }

    #[tokio::test]
    async fn test_fetch_status_error() {
        let (base, server) = serve_once(http_response("500 Internal Server Error", "")).await;

        let err = KomtraxClient::new().fetch(&request(&base)).await.unwrap_err();
        assert!(matches!(err, FetchError::Status(500)));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_redirect_is_a_status_error() {
        let (base, server) = serve_once(
            "HTTP/1.1 302 Found\r\nlocation: http://127.0.0.1:9/equipment\r\ncontent-length: 0\r\nconnection: close\r\n\r\n"
                .to_string(),
        )
        .await;

        let err = KomtraxClient::new().fetch(&request(&base)).await.unwrap_err();
        assert!(matches!(err, FetchError::Status(302)));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_invalid_json() {
        let (base, server) = serve_once(http_response("200 OK", "not json")).await;

        let err = KomtraxClient::new().fetch(&request(&base)).await.unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        // Reserve a port, then close it
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = KomtraxClient::new()
            .fetch(&request(&format!("http://{}", addr)))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }
}
