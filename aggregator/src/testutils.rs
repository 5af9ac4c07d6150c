use crate::config::{Config, PlatformConfig};
use crate::error::PlatformError;
use crate::platform::PlatformId;
use crate::transport::{PlatformTransport, SearchCriteria};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use url::Url;

/// Config pointing every platform at the same base URL (a mock server).
pub(crate) fn config_with_base_url(base_url: &str) -> Config {
    let platforms = PlatformId::ALL
        .into_iter()
        .map(|platform| {
            (
                platform,
                PlatformConfig {
                    service_account: "svc".into(),
                    token: "secret".into(),
                    api_base_url: Url::parse(base_url).expect("parse base url"),
                },
            )
        })
        .collect();

    Config { platforms }
}

/// One scripted transport response.
pub(crate) enum Script {
    Ok(JsonValue),
    Err(PlatformError),
    Panic,
}

impl Script {
    fn resolve(self) -> Result<JsonValue, PlatformError> {
        match self {
            Script::Ok(payload) => Ok(payload),
            Script::Err(err) => Err(err),
            Script::Panic => panic!("scripted transport panic"),
        }
    }
}

/// In-memory [`PlatformTransport`] returning pre-scripted responses.
///
/// Fetch responses are consumed per platform in FIFO order, so a
/// name-then-email fallback consumes two entries. Delete responses are keyed
/// by `(platform, uid)`.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    fetches: Mutex<HashMap<PlatformId, VecDeque<Script>>>,
    deletes: Mutex<HashMap<(PlatformId, String), Script>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn script_fetch(&self, platform: PlatformId, script: Script) -> &Self {
        self.fetches
            .lock()
            .expect("fetch scripts lock")
            .entry(platform)
            .or_default()
            .push_back(script);
        self
    }

    pub(crate) fn script_delete(&self, platform: PlatformId, uid: &str, script: Script) -> &Self {
        self.deletes
            .lock()
            .expect("delete scripts lock")
            .insert((platform, uid.to_string()), script);
        self
    }
}

#[async_trait]
impl PlatformTransport for ScriptedTransport {
    async fn fetch(
        &self,
        platform: PlatformId,
        _criteria: &SearchCriteria,
    ) -> Result<JsonValue, PlatformError> {
        let script = self
            .fetches
            .lock()
            .expect("fetch scripts lock")
            .get_mut(&platform)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| panic!("no scripted fetch left for {platform}"));

        script.resolve()
    }

    async fn delete(&self, platform: PlatformId, uid: &str) -> Result<JsonValue, PlatformError> {
        let script = self
            .deletes
            .lock()
            .expect("delete scripts lock")
            .remove(&(platform, uid.to_string()))
            .unwrap_or_else(|| panic!("no scripted delete for {platform}/{uid}"));

        script.resolve()
    }
}
