//! HTTP plumbing: methods, the transport seam, error taxonomy and backoff.

mod client;
#[cfg(feature = "emulation")]
mod emulation;
mod error;
mod method;
mod retry;

pub use client::{HttpTransport, PreparedRequest, RawResponse, Transport, to_header_map};
#[cfg(test)]
pub use client::MockTransport;
#[cfg(feature = "emulation")]
pub use emulation::EmulatedTransport;
pub use error::{DispatchError, TransportKind};
pub use method::Method;
pub use retry::{BASE_DELAY_SECS, MAX_DELAY_SECS, MAX_RETRIES, backoff_delay, exponential_backoff};

/// Transport used by [`Dispatcher::new`](crate::Dispatcher::new).
#[cfg(feature = "emulation")]
pub type DefaultTransport = EmulatedTransport;
/// Transport used by [`Dispatcher::new`](crate::Dispatcher::new).
#[cfg(not(feature = "emulation"))]
pub type DefaultTransport = HttpTransport;
