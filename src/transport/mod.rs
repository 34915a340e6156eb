//! HTTP transports.
//!
//! - [`traits`] - The `HttpTransport` trait and request/response types
//! - [`mock`] - A scripted transport for tests
//! - [`http`] - The network transport, backed by `reqwest` (requires the `http` feature)

pub mod mock;
pub mod traits;

#[cfg(feature = "http")]
pub mod http;

pub use mock::MockTransport;
pub use traits::{ArcTransport, HttpRequest, HttpResponse, HttpTransport, Method, RequestBody};

#[cfg(feature = "http")]
pub use http::ReqwestTransport;
