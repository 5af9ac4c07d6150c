//! Multi-platform GDPR data-subject-request aggregation.
//!
//! Queries four independent identity platforms with per-platform fallback
//! strategies, classifies heterogeneous failures into a stable taxonomy, and
//! aggregates partial results so an operator can still act when some
//! platforms are unreachable.

pub mod classify;
pub mod config;
pub mod delete;
pub mod error;
pub mod fetch;
pub mod normalize;
pub mod platform;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testutils;

pub use config::{Config, ConfigError, PlatformConfig};
pub use error::{AggregatorError, PlatformError, Result};
pub use fetch::Aggregator;
pub use platform::PlatformId;
pub use transport::{HttpTransport, PlatformTransport, SearchCriteria};
pub use types::{ClassifiedError, DeleteRequest, DeleteResult, UserData, UserRecord};
