use crate::platform::PlatformId;
use thiserror::Error;

/// Result type alias for aggregator operations
pub type Result<T, E = AggregatorError> = std::result::Result<T, E>;

/// A failure from a single platform call, carrying enough context for the
/// classifier to produce a stable operator-facing code.
#[derive(Error, Debug)]
#[error("{platform}: {message}")]
pub struct PlatformError {
    pub message: String,
    pub platform: PlatformId,
    pub status_code: Option<u16>,
    #[source]
    pub cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl PlatformError {
    /// Non-2xx response from the platform.
    pub fn http(platform: PlatformId, status: u16, message: impl Into<String>) -> Self {
        PlatformError {
            message: message.into(),
            platform,
            status_code: Some(status),
            cause: None,
        }
    }

    /// Network-level failure (DNS, refused connection, timeout, TLS). No
    /// HTTP status is available; the underlying error is kept as the cause.
    pub fn transport(
        platform: PlatformId,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        PlatformError {
            message: cause.to_string(),
            platform,
            status_code: None,
            cause: Some(Box::new(cause)),
        }
    }

    /// Response body could not be decoded as JSON. Tagged with the status of
    /// the response whose body failed to parse.
    pub fn parse(
        platform: PlatformId,
        status: u16,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        PlatformError {
            message: format!("failed to parse response body: {cause}"),
            platform,
            status_code: Some(status),
            cause: Some(Box::new(cause)),
        }
    }
}

/// Errors surfaced by the orchestration layer.
#[derive(Error, Debug)]
pub enum AggregatorError {
    /// Best-effort fetch found no reachable platform. Carries one entry per
    /// failed platform so the caller can report every cause.
    #[error("all platforms failed: {}", format_failures(.failures))]
    AllPlatformsFailed {
        failures: Vec<(PlatformId, String)>,
    },

    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("no platform configured for {0}")]
    UnknownPlatform(PlatformId),
}

fn format_failures(failures: &[(PlatformId, String)]) -> String {
    failures
        .iter()
        .map(|(platform, message)| format!("{platform}: {message}"))
        .collect::<Vec<_>>()
        .join("; ")
}
