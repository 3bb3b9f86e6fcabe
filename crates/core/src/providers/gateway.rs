use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::{debug, warn};

use crate::errors::{redact_query, CoreError};

/// Timeout applied when a request does not set its own.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// One outgoing request: method, URL, headers and an optional timeout.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            headers: Vec::new(),
            timeout: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Effective timeout (falls back to [`DEFAULT_TIMEOUT`]).
    pub fn timeout(&self) -> Duration {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Remote request primitive shared by the market sources and the image cache.
///
/// Implementations return the raw response body, or a typed error:
/// `InvalidUrl` before any I/O, `HttpErrorCode` for non-2xx statuses,
/// `Unknown` for transport failures.
#[async_trait]
pub trait HttpGateway: Send + Sync {
    async fn request(&self, request: &HttpRequest) -> Result<Vec<u8>, CoreError>;
}

/// Only absolute http/https URLs are accepted.
pub fn validate_url(url: &str) -> Result<Url, CoreError> {
    let parsed = Url::parse(url).map_err(|_| CoreError::InvalidUrl(url.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        _ => Err(CoreError::InvalidUrl(url.to_string())),
    }
}

/// Map an HTTP status code to the error taxonomy.
pub fn check_status(status: u16) -> Result<(), CoreError> {
    if !(100..=599).contains(&status) {
        return Err(CoreError::InvalidResponse(status));
    }
    if !(200..300).contains(&status) {
        return Err(CoreError::HttpErrorCode(status));
    }
    Ok(())
}

/// Production gateway backed by `reqwest`.
pub struct ReqwestGateway {
    client: Client,
}

impl ReqwestGateway {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpGateway for ReqwestGateway {
    async fn request(&self, request: &HttpRequest) -> Result<Vec<u8>, CoreError> {
        let url = validate_url(&request.url)?;
        debug!(
            method = %request.method,
            url = %redact_query(url.as_str()),
            "sending request"
        );

        let mut builder = self
            .client
            .request(request.method.into(), url)
            .timeout(request.timeout());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        if let Err(e) = check_status(status) {
            warn!(
                status,
                url = %redact_query(&request.url),
                "request failed"
            );
            return Err(e);
        }

        let body = response.bytes().await?;
        Ok(body.to_vec())
    }
}
