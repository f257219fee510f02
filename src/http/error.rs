//! Error taxonomy for a single dispatch and its retries.

/// What went wrong below the HTTP layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Could not reach or tunnel through the account proxy
    Proxy,
    /// The call did not finish within the configured timeout
    Timeout,
    /// Any other connection or I/O failure
    Network,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::Proxy => write!(f, "proxy"),
            TransportKind::Timeout => write!(f, "timeout"),
            TransportKind::Network => write!(f, "network"),
        }
    }
}

/// Errors produced while building, sending or retrying a request.
#[derive(Debug)]
pub enum DispatchError {
    /// Bad URL or payload shape
    InvalidArgument(String),
    /// Payload could not be encoded as JSON
    Serialization(String),
    /// Headers or client could not be produced from the account and settings
    Configuration(String),
    /// Proxy, network or timeout failure
    Transport { kind: TransportKind, message: String },
    /// Non-success HTTP status (403 and 429 have already cooled down)
    HttpStatus { status: u16, body: String },
    /// Success status but the body is not JSON
    Decode(String),
    /// Every attempt failed
    RetriesExhausted {
        url: String,
        attempts: usize,
        last: Box<DispatchError>,
    },
}

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            DispatchError::Serialization(msg) => write!(f, "Invalid payload data: {}", msg),
            DispatchError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            DispatchError::Transport { kind, message } => {
                write!(f, "Request failed ({}): {}", kind, message)
            }
            DispatchError::HttpStatus { status, body } => {
                if body.is_empty() {
                    write!(f, "HTTP {} error", status)
                } else {
                    write!(f, "HTTP {} error: {}", status, body)
                }
            }
            DispatchError::Decode(msg) => write!(f, "Invalid JSON in response: {}", msg),
            DispatchError::RetriesExhausted {
                url,
                attempts,
                last,
            } => write!(
                f,
                "Max retries reached for {} after {} attempts (last error: {})",
                url, attempts, last
            ),
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DispatchError::RetriesExhausted { last, .. } => Some(last.as_ref()),
            _ => None,
        }
    }
}

impl DispatchError {
    /// Whether another attempt of the same call could succeed.
    ///
    /// Validation failures are deterministic and never retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DispatchError::Transport { .. }
                | DispatchError::HttpStatus { .. }
                | DispatchError::Decode(_)
        )
    }

    /// The HTTP status behind this error, looking through exhausted retries.
    pub fn status(&self) -> Option<u16> {
        match self {
            DispatchError::HttpStatus { status, .. } => Some(*status),
            DispatchError::RetriesExhausted { last, .. } => last.status(),
            _ => None,
        }
    }

    pub(crate) fn transport(kind: TransportKind, message: impl Into<String>) -> Self {
        DispatchError::Transport {
            kind,
            message: message.into(),
        }
    }
}

/// Cuts a transport error message before the trailing "See ..." hint.
pub(crate) fn short_message(message: &str) -> &str {
    message.split(". See").next().unwrap_or(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = DispatchError::InvalidArgument("Payload must be a dictionary.".to_string());
        assert!(err.to_string().contains("Payload must be a dictionary"));

        let err = DispatchError::HttpStatus {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 500 error: boom");

        let err = DispatchError::HttpStatus {
            status: 404,
            body: String::new(),
        };
        assert_eq!(err.to_string(), "HTTP 404 error");

        let err = DispatchError::transport(TransportKind::Timeout, "timed out");
        assert!(err.to_string().contains("(timeout)"));
    }

    #[test]
    fn test_is_retryable() {
        assert!(DispatchError::transport(TransportKind::Network, "reset").is_retryable());
        assert!(
            DispatchError::HttpStatus {
                status: 429,
                body: String::new()
            }
            .is_retryable()
        );
        assert!(DispatchError::Decode("eof".to_string()).is_retryable());

        assert!(!DispatchError::InvalidArgument("x".to_string()).is_retryable());
        assert!(!DispatchError::Serialization("x".to_string()).is_retryable());
        assert!(!DispatchError::Configuration("x".to_string()).is_retryable());
    }

    #[test]
    fn test_status_looks_through_exhausted() {
        let err = DispatchError::RetriesExhausted {
            url: "https://api.example.com/ping".to_string(),
            attempts: 3,
            last: Box::new(DispatchError::HttpStatus {
                status: 403,
                body: String::new(),
            }),
        };
        assert_eq!(err.status(), Some(403));
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(DispatchError::Decode("x".to_string()).status(), None);
    }

    #[test]
    fn test_short_message() {
        assert_eq!(
            short_message("Failed to perform. See https://curl.se/libcurl/c/libcurl-errors.html"),
            "Failed to perform"
        );
        assert_eq!(short_message("connection reset"), "connection reset");
    }
}
