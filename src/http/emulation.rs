//! Transport that presents the browser profile's TLS and HTTP/2 fingerprint.
//!
//! Built on `wreq` (BoringSSL) so the handshake matches the User-Agent the
//! header builder advertises. Enabled with the `emulation` cargo feature.

use async_trait::async_trait;
use log::debug;
use wreq::{Client, Proxy};

use super::client::{PreparedRequest, RawResponse, Transport, to_header_map, transport_error};
use super::error::DispatchError;
use super::method::Method;

/// [`Transport`] backed by a fresh `wreq` client per call, emulating the
/// request's [`BrowserProfile`](crate::headers::BrowserProfile).
#[derive(Debug, Clone, Copy, Default)]
pub struct EmulatedTransport;

impl EmulatedTransport {
    pub fn build_client(request: &PreparedRequest) -> Result<Client, DispatchError> {
        let mut builder = Client::builder()
            .emulation(request.profile.emulation())
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

fn wreq_method(method: Method) -> wreq::Method {
    match method {
        Method::Get => wreq::Method::GET,
        Method::Post => wreq::Method::POST,
        Method::Put => wreq::Method::PUT,
    }
}

#[async_trait]
impl Transport for EmulatedTransport {
    #[tracing::instrument(skip(self, request), fields(url = %request.url, method = %request.method))]
    async fn execute(&self, request: PreparedRequest) -> Result<RawResponse, DispatchError> {
        let client = Self::build_client(&request)?;
        let headers = to_header_map(&request.headers)?;
        let via_proxy = request.proxy.is_some();

        debug!(
            "{} {} emulating {}{}",
            request.method,
            request.url,
            request.profile,
            if via_proxy { " via proxy" } else { "" }
        );

        let mut builder = client
            .request(wreq_method(request.method), &request.url)
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
            .get(wreq::header::RETRY_AFTER)
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
