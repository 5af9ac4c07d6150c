//! Error classification for operator-facing reporting.
//!
//! Maps platform failures onto a fixed table of `(code, reason)` pairs. The
//! codes are rendered directly in the operator UI and are a stable contract:
//! renaming one breaks every dashboard filtering on it.

use crate::error::PlatformError;
use crate::types::ClassifiedError;

/// Classify a platform failure into a stable `(code, reason)` pair.
///
/// Failures carrying an HTTP status use the status table; everything else
/// (network, DNS, TLS) falls back to message heuristics.
pub fn classify(err: &PlatformError) -> ClassifiedError {
    match err.status_code {
        Some(status) => classify_status(status),
        None => classify_message(&err.message),
    }
}

/// Status-table half of the classification contract.
pub fn classify_status(status: u16) -> ClassifiedError {
    match status {
        400 => ClassifiedError::new("Bad Request", "Invalid request parameters"),
        401 => ClassifiedError::new("Unauthorized", "Authentication failed"),
        403 => ClassifiedError::new("Access Denied", "Insufficient permissions"),
        404 => ClassifiedError::new("Not Found", "API endpoint or user not found"),
        408 => ClassifiedError::new("Response Timeout", "Request timed out"),
        429 => ClassifiedError::new("Rate Limited", "Too many requests"),
        500 => ClassifiedError::new("Server Error", "Internal server error"),
        502 => ClassifiedError::new("Bad Gateway", "Invalid response from upstream"),
        503 => ClassifiedError::new("Unavailable", "Service unavailable"),
        504 => ClassifiedError::new("Gateway Timeout", "Upstream timed out"),
        other => ClassifiedError::new(format!("HTTP {other}"), format!("HTTP status {other}")),
    }
}

/// Heuristic half: classify an opaque failure by its lower-cased message.
pub fn classify_message(message: &str) -> ClassifiedError {
    let text = message.to_lowercase();

    if contains_any(&text, &["timeout", "timed out", "etimedout"]) {
        ClassifiedError::new("Response Timeout", "Request timed out")
    } else if contains_any(&text, &["enotfound", "dns", "getaddrinfo", "name or service"]) {
        ClassifiedError::new("Unreachable", "DNS resolution failed")
    } else if contains_any(&text, &["econnrefused", "connection refused"]) {
        ClassifiedError::new("Unreachable", "Connection refused")
    } else if contains_any(&text, &["network", "fetch failed", "error sending request"]) {
        ClassifiedError::new("Network Error", message)
    } else if contains_any(&text, &["certificate", "ssl", "tls"]) {
        ClassifiedError::new("SSL Error", message)
    } else {
        ClassifiedError::new("Unreachable", message)
    }
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| text.contains(needle))
}
