//! Single-call sending and the retry controller around it.

use log::debug;
use rand::Rng;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::account::Account;
use crate::activity::{ActivityLog, ConsoleLog};
use crate::config::Settings;
use crate::headers::{BrowserProfile, build_headers};
use crate::http::{
    DefaultTransport, DispatchError, Method, PreparedRequest, RawResponse, Transport, TransportKind,
    exponential_backoff,
};
use crate::runtime::{RealRuntime, Runtime};

/// Seconds to wait on a 429 without a usable `Retry-After`.
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

/// Longest rate-limit wait honoured from a `Retry-After` header.
pub const MAX_RETRY_AFTER_SECS: u64 = 120;

/// Cooldown range in seconds after a 403.
const FORBIDDEN_COOLDOWN_SECS: std::ops::Range<f64> = 5.0..10.0;

pub struct Dispatcher<T: Transport, R: Runtime> {
    transport: T,
    runtime: R,
    settings: Settings,
    log: Arc<dyn ActivityLog>,
}

impl Dispatcher<DefaultTransport, RealRuntime> {
    /// Dispatcher over the real network, logging to the console.
    ///
    /// With the `emulation` feature the transport also matches the TLS
    /// fingerprint of each call's browser profile.
    pub fn new(settings: Settings) -> Self {
        let runtime = settings
            .seed
            .map(RealRuntime::seeded)
            .unwrap_or_default();
        Self::with_parts(DefaultTransport::default(), runtime, settings, Arc::new(ConsoleLog))
    }
}

impl<T: Transport, R: Runtime> Dispatcher<T, R> {
    pub fn with_parts(
        transport: T,
        runtime: R,
        settings: Settings,
        log: Arc<dyn ActivityLog>,
    ) -> Self {
        Self {
            transport,
            runtime,
            settings,
            log,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Serializes `payload` and dispatches it with retries.
    pub async fn retry_json<P: Serialize + ?Sized>(
        &self,
        url: &str,
        payload: &P,
        account: &Account,
        method: Method,
    ) -> Result<Value, DispatchError> {
        let payload = encode_payload(payload)?;
        self.retry(url, Some(&payload), account, method).await
    }

    /// Calls [`Dispatcher::send`] up to `max_retries` times with capped
    /// exponential backoff between attempts.
    ///
    /// Transport, status and decode failures are retried. Invalid arguments
    /// and configuration problems are returned on the first attempt.
    #[tracing::instrument(skip(self, payload, account), fields(account = account.index))]
    pub async fn retry(
        &self,
        url: &str,
        payload: Option<&Value>,
        account: &Account,
        method: Method,
    ) -> Result<Value, DispatchError> {
        let attempts = self.settings.max_retries.max(1);
        let mut rng = self.runtime.rng();
        let mut last_error = None;

        for retry_count in 0..attempts {
            match self.send(url, payload, account, method).await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_retryable() => {
                    self.log.error(account, &format!("Error: {}", e));
                    return Err(e);
                }
                Err(e) => {
                    debug!("Attempt {}/{} for {} failed: {}", retry_count + 1, attempts, url, e);
                    last_error = Some(e);
                }
            }

            if retry_count + 1 < attempts {
                let delay = exponential_backoff(retry_count as u32, &mut rng);
                self.log.info(
                    account,
                    &format!(
                        "Retry {}/{}: Waiting {:.2} seconds...",
                        retry_count + 1,
                        attempts,
                        delay.as_secs_f64()
                    ),
                );
                self.runtime.sleep(delay).await;
            }
        }

        self.log
            .error(account, &format!("Max retries reached for URL: {}", url_path(url)));

        Err(DispatchError::RetriesExhausted {
            url: url.to_string(),
            attempts,
            last: Box::new(last_error.unwrap_or_else(|| {
                DispatchError::InvalidArgument(format!("No attempt was made for {}", url))
            })),
        })
    }

    /// Issues exactly one call and classifies the outcome.
    ///
    /// A 403 cools down for 5-10 seconds and a 429 waits out `Retry-After`
    /// before the failure is returned.
    #[tracing::instrument(skip(self, payload, account), fields(account = account.index))]
    pub async fn send(
        &self,
        url: &str,
        payload: Option<&Value>,
        account: &Account,
        method: Method,
    ) -> Result<Value, DispatchError> {
        if url.trim().is_empty() {
            return Err(DispatchError::InvalidArgument(
                "URL must be a valid string.".to_string(),
            ));
        }
        if payload.is_some_and(|p| !p.is_object()) {
            return Err(DispatchError::InvalidArgument(
                "Data must be a dictionary.".to_string(),
            ));
        }

        let mut rng = self.runtime.rng();
        let profile = self.choose_profile(&mut rng);

        let headers = build_headers(url, account, method, payload, &self.settings, profile)?;
        if headers.is_empty() {
            self.log.error(
                account,
                &format!("No headers generated for URL: {}", url_path(url)),
            );
            return Err(DispatchError::Configuration(
                "Failed to generate headers".to_string(),
            ));
        }

        let request = PreparedRequest {
            url: url.to_string(),
            method,
            headers,
            body: if method.has_body() { payload.cloned() } else { None },
            proxy: account.proxy.clone(),
            profile,
            timeout: self.settings.timeout(),
        };

        let response = match self.transport.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                self.report_transport_error(account, &e);
                return Err(e);
            }
        };

        self.classify(response, account, &mut rng).await
    }

    fn choose_profile<G: Rng + ?Sized>(&self, rng: &mut G) -> BrowserProfile {
        self.settings
            .fixed_profile
            .unwrap_or_else(|| BrowserProfile::choose(rng))
    }

    async fn classify<G: Rng + ?Sized>(
        &self,
        response: RawResponse,
        account: &Account,
        rng: &mut G,
    ) -> Result<Value, DispatchError> {
        match response.status {
            200..=299 => serde_json::from_str(&response.body).map_err(|e| {
                self.log.error(
                    account,
                    &format!("Failed to decode JSON response: {}", response.body),
                );
                DispatchError::Decode(e.to_string())
            }),
            403 => {
                self.log
                    .error(account, "403 Forbidden: Check permissions or proxy");
                let cooldown = Duration::from_secs_f64(rng.gen_range(FORBIDDEN_COOLDOWN_SECS));
                self.runtime.sleep(cooldown).await;
                Err(DispatchError::HttpStatus {
                    status: 403,
                    body: response.body,
                })
            }
            429 => {
                let requested = parse_retry_after(response.retry_after.as_deref());
                let wait = requested.min(MAX_RETRY_AFTER_SECS);
                if wait < requested {
                    self.log.warn(
                        account,
                        &format!(
                            "Retry-After of {} seconds capped at {} seconds",
                            requested, MAX_RETRY_AFTER_SECS
                        ),
                    );
                }
                self.log.warn(
                    account,
                    &format!("Rate limited (429). Retrying after {} seconds", wait),
                );
                self.runtime.sleep(Duration::from_secs(wait)).await;
                Err(DispatchError::HttpStatus {
                    status: 429,
                    body: response.body,
                })
            }
            status => {
                self.log
                    .error(account, &format!("Request failed: HTTP {}", status));
                Err(DispatchError::HttpStatus {
                    status,
                    body: response.body,
                })
            }
        }
    }

    fn report_transport_error(&self, account: &Account, error: &DispatchError) {
        let message = match error {
            DispatchError::Transport {
                kind: TransportKind::Proxy,
                ..
            } => "Proxy connection failed. Unable to connect to proxy".to_string(),
            DispatchError::Transport {
                kind: TransportKind::Timeout,
                ..
            } => format!(
                "Connection timed out after {} seconds",
                self.settings.timeout_secs
            ),
            DispatchError::Transport { message, .. } => format!("Request failed: {}", message),
            other => other.to_string(),
        };
        self.log.error(account, &message);
    }
}

/// Converts any serializable payload into JSON, failing with
/// [`DispatchError::Serialization`].
pub fn encode_payload<P: Serialize + ?Sized>(payload: &P) -> Result<Value, DispatchError> {
    serde_json::to_value(payload).map_err(|e| DispatchError::Serialization(e.to_string()))
}

/// Whole seconds from a `Retry-After` header, defaulting to 5.
pub fn parse_retry_after(value: Option<&str>) -> u64 {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

/// The path component of `url` for log lines, or `url` itself if it does not parse.
pub fn url_path(url: &str) -> String {
    reqwest::Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url.to_string())
}
