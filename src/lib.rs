//! Request dispatching for a single JSON API.
//!
//! A [`Dispatcher`] builds per-call headers for an [`Account`], sends the
//! call through a [`Transport`](http::Transport) and retries failures with
//! capped exponential backoff.

pub mod account;
pub mod activity;
pub mod config;
pub mod dispatch;
pub mod headers;
pub mod http;
pub mod runtime;

pub use account::Account;
pub use activity::{ActivityLog, ConsoleLog};
pub use config::{EndpointCategory, Endpoints, Settings};
pub use dispatch::Dispatcher;
pub use headers::{BrowserProfile, HeaderSet, build_headers};
pub use http::{DispatchError, Method, TransportKind};
pub use runtime::{RealRuntime, Runtime};
