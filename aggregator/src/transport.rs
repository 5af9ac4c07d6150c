//! Authenticated request execution against a single platform.
//!
//! Each platform is a Drupal-like REST host: fetch is a `POST` to the
//! configured base URL with a `{ summarize, name|mail }` body, delete is a
//! `DELETE` with a `{ uid }` body, both behind Basic auth. Transport and
//! HTTP failures are translated into [`PlatformError`] here so the layers
//! above only ever see typed errors.

use crate::config::{Config, PlatformConfig};
use crate::error::PlatformError;
use crate::platform::PlatformId;
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use http::StatusCode;
use reqwest::Method;
use reqwest::header::AUTHORIZATION;
use serde_json::{Value as JsonValue, json};
use std::collections::HashMap;

/// What to search a platform for. Exactly one criterion per request; the
/// username-to-email fallback is two requests, not one.
#[derive(Clone, Debug, PartialEq)]
pub enum SearchCriteria {
    Name(String),
    Mail(String),
}

impl SearchCriteria {
    /// The raw search term, used in logs and failure placeholders.
    pub fn term(&self) -> &str {
        match self {
            SearchCriteria::Name(term) | SearchCriteria::Mail(term) => term,
        }
    }

    fn body(&self) -> JsonValue {
        match self {
            SearchCriteria::Name(term) => json!({ "summarize": true, "name": term }),
            SearchCriteria::Mail(term) => json!({ "summarize": true, "mail": term }),
        }
    }
}

/// Seam between the orchestrators and the network. Production uses
/// [`HttpTransport`]; tests substitute scripted fakes.
#[async_trait]
pub trait PlatformTransport: Send + Sync {
    /// Fetch the raw user payload matching `criteria` from `platform`.
    async fn fetch(
        &self,
        platform: PlatformId,
        criteria: &SearchCriteria,
    ) -> Result<JsonValue, PlatformError>;

    /// Delete user `uid` on `platform`, returning the raw response payload.
    async fn delete(&self, platform: PlatformId, uid: &str) -> Result<JsonValue, PlatformError>;
}

/// Builds the `Basic` authorization value for a platform service account.
pub fn basic_auth(service_account: &str, token: &str) -> String {
    let credentials = BASE64.encode(format!("{service_account}:{token}"));
    format!("Basic {credentials}")
}

/// reqwest-backed transport talking to the real platforms.
pub struct HttpTransport {
    client: reqwest::Client,
    platforms: HashMap<PlatformId, PlatformConfig>,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Self {
        HttpTransport {
            client: reqwest::Client::new(),
            platforms: config.platforms.clone(),
        }
    }

    fn config_for(&self, platform: PlatformId) -> Result<&PlatformConfig, PlatformError> {
        self.platforms.get(&platform).ok_or_else(|| PlatformError {
            message: format!("no configuration for platform {platform}"),
            platform,
            status_code: None,
            cause: None,
        })
    }

    async fn execute(
        &self,
        platform: PlatformId,
        method: Method,
        body: JsonValue,
    ) -> Result<JsonValue, PlatformError> {
        let config = self.config_for(platform)?;

        let response = self
            .client
            .request(method, config.api_base_url.clone())
            .header(
                AUTHORIZATION,
                basic_auth(&config.service_account, &config.token),
            )
            .json(&body)
            .send()
            .await
            .map_err(|e| PlatformError::transport(platform, e))?;

        let status: StatusCode = response.status();
        if !status.is_success() {
            return Err(PlatformError::http(
                platform,
                status.as_u16(),
                format!("HTTP {} from {platform}", status.as_u16()),
            ));
        }

        response
            .json::<JsonValue>()
            .await
            .map_err(|e| PlatformError::parse(platform, status.as_u16(), e))
    }
}

#[async_trait]
impl PlatformTransport for HttpTransport {
    async fn fetch(
        &self,
        platform: PlatformId,
        criteria: &SearchCriteria,
    ) -> Result<JsonValue, PlatformError> {
        self.execute(platform, Method::POST, criteria.body()).await
    }

    async fn delete(&self, platform: PlatformId, uid: &str) -> Result<JsonValue, PlatformError> {
        self.execute(platform, Method::DELETE, json!({ "uid": uid }))
            .await
    }
}
