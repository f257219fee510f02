//! The transport seam: one prepared request in, one raw response out.

use async_trait::async_trait;
use log::debug;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Proxy};
use serde_json::Value;
use std::time::Duration;

use super::error::{DispatchError, TransportKind, short_message};
use super::method::Method;
use crate::headers::{BrowserProfile, HeaderSet};

/// Everything needed to issue a single HTTP call.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub url: String,
    pub method: Method,
    pub headers: HeaderSet,
    pub body: Option<Value>,
    /// Used for both http and https targets
    pub proxy: Option<String>,
    pub profile: BrowserProfile,
    pub timeout: Duration,
}

/// Status, rate-limit hint and body text of a completed call.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub retry_after: Option<String>,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            retry_after: None,
            body: body.into(),
        }
    }

    pub fn with_retry_after(mut self, value: impl Into<String>) -> Self {
        self.retry_after = Some(value.into());
        self
    }
}

/// Issues exactly one HTTP call. Non-success statuses are returned, not raised.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: PreparedRequest) -> Result<RawResponse, DispatchError>;
}

/// [`Transport`] backed by a fresh `reqwest` client per call.
///
/// The browser profile sets the client's User-Agent; the TLS handshake is
/// rustls' own. See `EmulatedTransport` (feature `emulation`) for a
/// handshake that matches the profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpTransport;

impl HttpTransport {
    pub fn build_client(request: &PreparedRequest) -> Result<Client, DispatchError> {
        let mut builder = Client::builder()
            .user_agent(request.profile.user_agent())
            .timeout(request.timeout);

        if let Some(proxy) = &request.proxy {
            let proxy = Proxy::all(proxy.as_str()).map_err(|e| {
                DispatchError::Configuration(format!("Invalid proxy {}: {}", proxy, e))
            })?;
            builder = builder.proxy(proxy);
        }

        builder
            .build()
            .map_err(|e| DispatchError::Configuration(format!("Failed to build client: {}", e)))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[tracing::instrument(skip(self, request), fields(url = %request.url, method = %request.method))]
    async fn execute(&self, request: PreparedRequest) -> Result<RawResponse, DispatchError> {
        let client = Self::build_client(&request)?;
        let headers = to_header_map(&request.headers)?;
        let via_proxy = request.proxy.is_some();

        debug!(
            "{} {} as {}{}",
            request.method,
            request.url,
            request.profile,
            if via_proxy { " via proxy" } else { "" }
        );

        let mut builder = client
            .request(request.method.into(), &request.url)
            .headers(headers);
        if request.method.has_body() {
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }
        }

        let response = builder
            .send()
            .await
            .map_err(|e| transport_error(&e, e.is_timeout(), e.is_connect(), via_proxy))?;

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(&e, e.is_timeout(), e.is_connect(), via_proxy))?;

        Ok(RawResponse {
            status,
            retry_after,
            body,
        })
    }
}

/// Converts a header set into a `HeaderMap`, marking the bearer token sensitive.
pub fn to_header_map(headers: &HeaderSet) -> Result<HeaderMap, DispatchError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            DispatchError::Configuration(format!("Invalid header name {}: {}", name, e))
        })?;
        let mut header_value = HeaderValue::from_str(value).map_err(|e| {
            DispatchError::Configuration(format!("Invalid value for header {}: {}", name, e))
        })?;
        if header_name == AUTHORIZATION {
            header_value.set_sensitive(true);
        }
        map.insert(header_name, header_value);
    }
    Ok(map)
}

/// Classifies a failed send. Connect failures count against the proxy when
/// one is configured.
pub(super) fn transport_error(
    error: &dyn std::error::Error,
    timed_out: bool,
    connect: bool,
    via_proxy: bool,
) -> DispatchError {
    let kind = if timed_out {
        TransportKind::Timeout
    } else if via_proxy && connect {
        TransportKind::Proxy
    } else {
        TransportKind::Network
    };
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    DispatchError::transport(kind, short_message(&message))
}
