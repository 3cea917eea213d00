//! Extraction service client: upload one file, decode one answer.
//!
//! The service is an external collaborator. Its contract:
//!
//! * request — `POST <endpoint>` with a single multipart field named `file`
//!   carrying the bytes and declared media type;
//! * success — a JSON [`ExtractionResult`];
//! * failure — a non-success status whose JSON body may carry a `detail`
//!   string, surfaced verbatim.
//!
//! No retries happen here. One call is one attempt; a retry is a fresh user
//! selection.

use crate::config::ScanConfig;
use crate::error::{ScanError, GENERIC_FAILURE};
use crate::model::{CandidateFile, ExtractionResult};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Anything that can turn a candidate file into an extraction result.
///
/// [`HttpExtractionClient`] is the real implementation; tests plug in fakes.
#[async_trait]
pub trait ExtractionClient: Send + Sync {
    async fn extract(&self, file: CandidateFile) -> Result<ExtractionResult, ScanError>;
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

/// reqwest-backed client for the extraction service.
#[derive(Debug, Clone)]
pub struct HttpExtractionClient {
    http: reqwest::Client,
    endpoint: String,
    health_url: String,
}

impl HttpExtractionClient {
    pub fn new(config: &ScanConfig) -> Result<Self, ScanError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs));
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| ScanError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            health_url: config.health_url()?,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Probe the service's health endpoint.
    pub async fn health(&self) -> Result<HealthStatus, ScanError> {
        let response = self
            .http
            .get(&self.health_url)
            .send()
            .await
            .map_err(|e| transport_error(&self.health_url, e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(&self.health_url, e))?;
        if !status.is_success() {
            return Err(ScanError::Service {
                status: status.as_u16(),
                message: error_detail(&body),
            });
        }
        serde_json::from_slice(&body).map_err(|e| ScanError::MalformedResponse {
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl ExtractionClient for HttpExtractionClient {
    async fn extract(&self, file: CandidateFile) -> Result<ExtractionResult, ScanError> {
        let start = Instant::now();
        let name = file.name.clone();
        let media_type = file.media_type.clone();
        let bytes = file.into_bytes().await?;
        let size = bytes.len();

        let part = Part::bytes(bytes)
            .file_name(name.clone())
            .mime_str(&media_type)
            .map_err(|e| {
                ScanError::Internal(format!("Invalid media type '{}': {}", media_type, e))
            })?;
        let form = Form::new().part("file", part);

        info!("Uploading {} ({}, {} bytes) to {}", name, media_type, size, self.endpoint);

        let response = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport_error(&self.endpoint, e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(&self.endpoint, e))?;
        debug!(
            "{} answered {} with {} bytes in {:?}",
            self.endpoint,
            status,
            body.len(),
            start.elapsed()
        );

        if !status.is_success() {
            let message = error_detail(&body);
            warn!("Extraction failed with HTTP {}: {}", status, message);
            return Err(ScanError::Service {
                status: status.as_u16(),
                message,
            });
        }

        ExtractionResult::from_json(&body)
    }
}

/// The `detail` string of an error body, or [`GENERIC_FAILURE`].
///
/// Validation errors from the service carry a list in `detail`; only a
/// non-empty string is taken verbatim.
pub fn error_detail(body: &[u8]) -> String {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| match b.detail {
            Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
            _ => None,
        })
        .unwrap_or_else(|| GENERIC_FAILURE.to_string())
}

fn transport_error(url: &str, e: reqwest::Error) -> ScanError {
    if e.is_timeout() {
        ScanError::Timeout {
            url: url.to_string(),
        }
    } else {
        ScanError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_string_is_verbatim() {
        assert_eq!(
            error_detail(br#"{"detail":"OCR engine unavailable"}"#),
            "OCR engine unavailable"
        );
    }

    #[test]
    fn detail_falls_back_to_generic() {
        assert_eq!(error_detail(b"Internal Server Error"), GENERIC_FAILURE);
        assert_eq!(error_detail(b"{}"), GENERIC_FAILURE);
        assert_eq!(error_detail(br#"{"detail":""}"#), GENERIC_FAILURE);
        assert_eq!(
            error_detail(br#"{"detail":[{"loc":["body","file"],"msg":"field required"}]}"#),
            GENERIC_FAILURE
        );
    }

    #[test]
    fn client_uses_configured_endpoint() {
        let config = ScanConfig::builder()
            .endpoint("http://127.0.0.1:9/extract")
            .build()
            .unwrap();
        let client = HttpExtractionClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:9/extract");
        assert_eq!(client.health_url, "http://127.0.0.1:9/health");
    }
}
