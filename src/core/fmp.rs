//! Financial Modeling Prep API gateway.
//!
//! All outbound traffic goes through [`FmpClient::get`]: one HTTPS GET per
//! call, the API key appended to the query string, and every failure mode
//! collapsed into one of the three [`GatewayError`] kinds. There are no
//! retries - a timeout or network failure surfaces immediately, which is the
//! right trade-off for an on-demand data lookup.
//!
//! The client is constructed once from [`Config`](super::config::Config)
//! sections and shared (`Arc`) by every tool and resource, so the API key is
//! explicit constructor state rather than a process-wide global.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::config::{ApiConfig, CredentialsConfig};

/// Result type for gateway calls.
pub type GatewayResult = Result<Value, GatewayError>;

/// The closed set of gateway failure kinds.
///
/// The `Display` output of each variant is written to be embedded directly
/// into tool error Markdown, so messages are phrased for an end reader.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The API answered with a non-2xx status.
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    /// The API was unreachable: connection failure, DNS failure, or timeout.
    #[error("Request error: {0}")]
    Network(String),

    /// Anything else - malformed JSON, client construction failure.
    #[error("Unknown error: {0}")]
    Unexpected(String),
}

/// Client for the Financial Modeling Prep REST API.
pub struct FmpClient {
    /// Shared connection pool; one instance per server process.
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl FmpClient {
    /// Build a client from the API and credentials configuration.
    pub fn new(api: &ApiConfig, credentials: &CredentialsConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .build()
            .map_err(|e| GatewayError::Unexpected(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            api_key: credentials.fmp_api_key.clone(),
        })
    }

    /// Issue a GET request against an FMP endpoint path (no leading slash).
    ///
    /// Returns the decoded JSON payload unchanged - an array of records, a
    /// single object, or a primitive. Interpreting the shape (including FMP's
    /// in-band error objects on 2xx responses) is the caller's job.
    pub async fn get(&self, endpoint: &str, params: &[(&str, String)]) -> GatewayResult {
        let url = format!("{}/{}", self.base_url, endpoint);

        let mut query: Vec<(&str, &str)> = params
            .iter()
            .map(|(name, value)| (*name, value.as_str()))
            .collect();
        query.push(("apikey", &self.api_key));

        debug!(endpoint, "requesting FMP endpoint");

        let response = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(classify_request_error)?;

        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("");
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                reason.to_string()
            } else {
                format!("{} - {}", reason, body.trim())
            };
            return Err(GatewayError::Http {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| GatewayError::Unexpected(format!("invalid JSON payload: {e}")))
    }
}

/// Map a reqwest send-phase error onto the gateway taxonomy.
fn classify_request_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() || e.is_connect() {
        GatewayError::Network(e.to_string())
    } else {
        GatewayError::Unexpected(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn test_client(base_url: &str) -> FmpClient {
        let api = ApiConfig {
            base_url: base_url.to_string(),
            timeout_secs: 5,
        };
        FmpClient::new(&api, &CredentialsConfig::default()).expect("client should build")
    }

    /// Serve exactly one canned HTTP response on a loopback port.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            if let Ok((mut stream, _)) = listener.accept().await {
                let mut buf = [0u8; 2048];
                let _ = stream.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {status_line}\r\n\
                     content-type: application/json\r\n\
                     content-length: {}\r\n\
                     connection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_get_returns_decoded_json() {
        let base = serve_once("200 OK", r#"[{"symbol":"AAPL","price":190.5}]"#).await;
        let client = test_client(&base);

        let value = client
            .get("quote", &[("symbol", "AAPL".to_string())])
            .await
            .unwrap();

        assert_eq!(value[0]["symbol"], "AAPL");
        assert_eq!(value[0]["price"], 190.5);
    }

    #[tokio::test]
    async fn test_get_http_error_carries_status() {
        let base = serve_once("404 Not Found", "").await;
        let client = test_client(&base);

        let err = client.get("quote", &[]).await.unwrap_err();
        match &err {
            GatewayError::Http { status, .. } => assert_eq!(*status, 404),
            other => panic!("expected Http error, got {other:?}"),
        }
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_get_http_error_includes_body_text() {
        let base = serve_once("403 Forbidden", r#"{"Error Message": "Invalid API KEY"}"#).await;
        let client = test_client(&base);

        let err = client.get("profile", &[]).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("403"));
        assert!(message.contains("Invalid API KEY"));
    }

    #[tokio::test]
    async fn test_get_malformed_json_is_unexpected() {
        let base = serve_once("200 OK", "this is not json").await;
        let client = test_client(&base);

        let err = client.get("quote", &[]).await.unwrap_err();
        assert!(matches!(err, GatewayError::Unexpected(_)));
    }

    #[tokio::test]
    async fn test_get_connection_refused_is_network() {
        // Bind then drop so the port is known-closed
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = test_client(&format!("http://{addr}"));
        let err = client.get("quote", &[]).await.unwrap_err();
        assert!(matches!(err, GatewayError::Network(_)));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let api = ApiConfig {
            base_url: "https://example.com/api/v3/".to_string(),
            timeout_secs: 5,
        };
        let client = FmpClient::new(&api, &CredentialsConfig::default()).unwrap();
        assert_eq!(client.base_url, "https://example.com/api/v3");
    }
}
