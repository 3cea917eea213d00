//! Configuration types for talking to the extraction service.
//!
//! All client behaviour is controlled through [`ScanConfig`], built via its
//! [`ScanConfigBuilder`]. The defaults point at a service running locally on
//! port 8000, which is where the extraction backend listens out of the box.

use crate::error::ScanError;
use crate::observer::WorkflowObserver;
use reqwest::Url;
use std::fmt;
use std::sync::Arc;

/// Default extraction endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/extract";

/// Configuration for an upload session.
///
/// # Example
/// ```rust
/// use docscan::ScanConfig;
///
/// let config = ScanConfig::builder()
///     .endpoint("https://scanner.internal/extract")
///     .request_timeout_secs(90)
///     .build()
///     .unwrap();
/// assert_eq!(config.health_url().unwrap(), "https://scanner.internal/health");
/// ```
#[derive(Clone)]
pub struct ScanConfig {
    /// URL that accepts the multipart upload. Default: [`DEFAULT_ENDPOINT`].
    pub endpoint: String,

    /// Whole-request deadline in seconds. Default: `None`.
    ///
    /// The client normally relies on whatever deadline the service or the
    /// network imposes. When set, expiry is reported as a timeout failure.
    pub request_timeout_secs: Option<u64>,

    /// TCP connect timeout in seconds. Default: 10.
    pub connect_timeout_secs: u64,

    /// `User-Agent` header sent with every request.
    pub user_agent: String,

    /// Receives workflow transitions. Default: none.
    pub observer: Option<Arc<dyn WorkflowObserver>>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout_secs: None,
            connect_timeout_secs: 10,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
            observer: None,
        }
    }
}

impl fmt::Debug for ScanConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanConfig")
            .field("endpoint", &self.endpoint)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("observer", &self.observer.as_ref().map(|_| "<dyn WorkflowObserver>"))
            .finish()
    }
}

impl ScanConfig {
    /// Create a new builder for `ScanConfig`.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder {
            config: Self::default(),
        }
    }

    /// The service's health-check URL: the endpoint's origin plus `/health`.
    pub fn health_url(&self) -> Result<String, ScanError> {
        let mut url = parse_endpoint(&self.endpoint)?;
        url.set_path("/health");
        url.set_query(None);
        Ok(url.to_string())
    }
}

/// Builder for [`ScanConfig`].
#[derive(Debug)]
pub struct ScanConfigBuilder {
    config: ScanConfig,
}

impl ScanConfigBuilder {
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = url.into();
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs);
        self
    }

    pub fn connect_timeout_secs(mut self, secs: u64) -> Self {
        self.config.connect_timeout_secs = secs.max(1);
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    pub fn observer(mut self, observer: Arc<dyn WorkflowObserver>) -> Self {
        self.config.observer = Some(observer);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ScanConfig, ScanError> {
        parse_endpoint(&self.config.endpoint)?;
        if self.config.request_timeout_secs == Some(0) {
            return Err(ScanError::InvalidConfig(
                "Request timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url, ScanError> {
    let url = Url::parse(endpoint).map_err(|e| {
        ScanError::InvalidConfig(format!("endpoint '{}' is not a valid URL: {}", endpoint, e))
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ScanError::InvalidConfig(format!(
            "endpoint must use http or https, got '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ScanConfig::builder().build().unwrap();
        assert_eq!(c.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(c.request_timeout_secs, None);
        assert!(c.user_agent.starts_with("docscan/"));
    }

    #[test]
    fn health_url_keeps_port() {
        let c = ScanConfig::default();
        assert_eq!(c.health_url().unwrap(), "http://localhost:8000/health");
    }

    #[test]
    fn rejects_bad_endpoints() {
        assert!(ScanConfig::builder().endpoint("not a url").build().is_err());
        let err = ScanConfig::builder()
            .endpoint("ftp://example.com/extract")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("ftp"));
    }

    #[test]
    fn rejects_zero_timeout() {
        assert!(ScanConfig::builder().request_timeout_secs(0).build().is_err());
    }
}
