#![deny(clippy::unwrap_used, clippy::expect_used)]

//! Client for the comparison service: two participants answer the same
//! query and a judge picks the better answer.

mod api;

pub use api::ComparisonBackend;
pub use api::ComparisonRequest;
pub use api::ComparisonResponse;
pub use api::Error;
pub use api::HealthStatus;
pub use api::HistoryEntry;
pub use api::Result;
pub use api::SessionId;

#[cfg(feature = "mock")]
mod mock;

#[cfg(feature = "online")]
mod http;

#[cfg(feature = "mock")]
pub use mock::MockClient;

#[cfg(feature = "online")]
pub use http::HttpClient;
