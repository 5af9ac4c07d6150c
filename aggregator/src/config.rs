use crate::platform::PlatformId;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use url::Url;

/// Connection settings for a single platform.
///
/// Note: Uses the `url::Url` type for the API base URL so malformed URLs are
/// rejected during config deserialization.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct PlatformConfig {
    pub service_account: String,
    pub token: String,
    pub api_base_url: Url,
}

/// Aggregator configuration: one entry per platform, loaded once at startup
/// and never mutated afterwards.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    pub platforms: HashMap<PlatformId, PlatformConfig>,
}

impl Config {
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config: Config = serde_yaml::from_reader(file)?;
        config.validate()?;

        Ok(config)
    }

    /// Fails fast when any platform is missing or any credential field is
    /// blank. Run at process start so a half-configured aggregator never
    /// serves requests.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for platform in PlatformId::ALL {
            let entry = self
                .platforms
                .get(&platform)
                .ok_or(ConfigError::MissingPlatform(platform))?;

            for (field, value) in [
                ("service_account", &entry.service_account),
                ("token", &entry.token),
            ] {
                if value.trim().is_empty() {
                    return Err(ConfigError::EmptyField { platform, field });
                }
            }
        }

        Ok(())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
    #[error("no configuration for platform {0}")]
    MissingPlatform(PlatformId),
    #[error("empty {field} for platform {platform}")]
    EmptyField {
        platform: PlatformId,
        field: &'static str,
    },
}
