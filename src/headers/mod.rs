//! Per-call header construction.
//!
//! Every call gets the bearer token, a JSON content type and a browser
//! User-Agent. Calls to the known API endpoints additionally get the full
//! browser header profile; anything else gets a plain JSON `Accept`.

mod profile;

pub use profile::BrowserProfile;

use serde_json::Value;
use std::collections::BTreeMap;

use crate::account::Account;
use crate::config::Settings;
use crate::http::{DispatchError, Method};

/// Header name to value, rebuilt for every call.
pub type HeaderSet = BTreeMap<String, String>;

const SEC_CH_UA: &str = r#""Google Chrome";v="122", "Chromium";v="122", "Not/A)Brand";v="99""#;

/// Builds the headers for one call to `url`.
///
/// For POST and PUT the payload, when present, must be a JSON object that
/// serializes cleanly.
#[tracing::instrument(skip(account, payload, settings))]
pub fn build_headers(
    url: &str,
    account: &Account,
    method: Method,
    payload: Option<&Value>,
    settings: &Settings,
    profile: BrowserProfile,
) -> Result<HeaderSet, DispatchError> {
    let mut headers = HeaderSet::new();
    headers.insert(
        "Authorization".to_string(),
        format!("Bearer {}", account.token),
    );
    headers.insert("Content-Type".to_string(), "application/json".to_string());
    headers.insert("User-Agent".to_string(), profile.user_agent().to_string());

    headers.extend(endpoint_headers(url, settings));

    if method.has_body() {
        if let Some(payload) = payload {
            validate_payload(payload)?;
        }
    }

    Ok(headers)
}

/// The endpoint-specific part of the header set.
pub fn endpoint_headers(url: &str, settings: &Settings) -> HeaderSet {
    let pairs: Vec<(&str, &str)> = match settings.endpoints.category(url) {
        Some(_) => vec![
            ("Accept", "*/*"),
            ("Accept-Language", "en-US,en;q=0.9"),
            ("Referer", settings.referer.as_str()),
            ("Origin", settings.origin.as_str()),
            ("Connection", "keep-alive"),
            ("Sec-CH-UA", SEC_CH_UA),
            ("Sec-Ch-Ua-Mobile", "?0"),
            ("Sec-Ch-Ua-Platform", "\"Windows\""),
            ("Sec-Fetch-Dest", "empty"),
            ("Sec-Fetch-Mode", "cors"),
            ("Sec-Fetch-Site", "cross-site"),
            ("TE", "trailers"),
            ("Pragma", "no-cache"),
            ("Cache-Control", "no-cache"),
        ],
        None => vec![("Accept", "application/json")],
    };

    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Rejects payloads that are not JSON objects or do not serialize.
pub fn validate_payload(payload: &Value) -> Result<(), DispatchError> {
    if !payload.is_object() {
        return Err(DispatchError::InvalidArgument(
            "Payload must be a dictionary.".to_string(),
        ));
    }
    serde_json::to_string(payload)
        .map(|_| ())
        .map_err(|e| DispatchError::Serialization(e.to_string()))
}
