//! Fetch orchestration across all configured platforms.
//!
//! Two fetch protocols share one strategy-driven loop but have different
//! failure contracts:
//!
//! - **Best-effort** ([`Aggregator::fetch_user`]): per platform, query by
//!   username and fall back to email when the user comes back empty. Failed
//!   platforms are logged and omitted from the result; the call errors only
//!   when every platform failed.
//! - **Report-all** ([`Aggregator::search_by_username`],
//!   [`Aggregator::search_by_email`]): one query per platform, no fallback,
//!   never fails. Failed platforms become placeholder records carrying the
//!   classified error, so the caller always gets exactly one entry per
//!   platform in platform priority order.
//!
//! Platforms are walked sequentially in both protocols: result ordering
//! reflects platform priority, and callers rely on that.

use crate::classify::classify;
use crate::delete;
use crate::error::{AggregatorError, PlatformError, Result};
use crate::normalize::normalize;
use crate::platform::PlatformId;
use crate::transport::{PlatformTransport, SearchCriteria};
use crate::types::{DeleteRequest, DeleteResult, UserData, UserRecord};
use serde_json::{Map, json};
use std::sync::Arc;

/// Whether a platform query retries with a second criterion when the first
/// returns an empty user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FallbackPolicy {
    None,
    NameThenEmail,
}

/// Drives one orchestration loop for both fetch protocols.
#[derive(Clone, Debug)]
pub struct FetchStrategy {
    pub platforms: Vec<PlatformId>,
    pub fallback: FallbackPolicy,
}

/// Per-platform outcome before protocol-specific failure handling. Failures
/// stay typed here; the report-all protocol converts them to placeholder
/// records only at the edge.
enum FetchOutcome {
    Fetched(UserData),
    Failed(PlatformId, PlatformError),
}

/// Entry point for the data-subject-request operations: fetch, search, and
/// delete across all configured platforms.
pub struct Aggregator {
    transport: Arc<dyn PlatformTransport>,
    platforms: Vec<PlatformId>,
}

impl Aggregator {
    pub fn new(transport: Arc<dyn PlatformTransport>) -> Self {
        Aggregator {
            transport,
            platforms: PlatformId::ALL.to_vec(),
        }
    }

    /// Restrict or reorder the platforms this aggregator queries.
    pub fn with_platforms(mut self, platforms: Vec<PlatformId>) -> Self {
        self.platforms = platforms;
        self
    }

    /// Best-effort fetch by username with email fallback.
    ///
    /// Returns the records of every platform that answered (0..=N entries).
    /// Errors only when every platform failed, carrying one failure entry
    /// per platform.
    pub async fn fetch_user(&self, name: &str, mail: &str) -> Result<Vec<UserData>> {
        let strategy = FetchStrategy {
            platforms: self.platforms.clone(),
            fallback: FallbackPolicy::NameThenEmail,
        };
        let primary = SearchCriteria::Name(name.to_string());
        let fallback = SearchCriteria::Mail(mail.to_string());

        let outcomes = self.run_strategy(&strategy, &primary, Some(&fallback)).await;

        let mut results = Vec::new();
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome {
                FetchOutcome::Fetched(data) => results.push(data),
                FetchOutcome::Failed(platform, err) => failures.push((platform, err.to_string())),
            }
        }

        if results.is_empty() && !failures.is_empty() {
            return Err(AggregatorError::AllPlatformsFailed { failures });
        }

        Ok(results)
    }

    /// Report-all search by username. Never fails; failed platforms yield
    /// placeholder records. `ticket` is the support ticket driving the
    /// request, carried for audit logging only.
    pub async fn search_by_username(&self, username: &str, ticket: &str) -> Vec<UserData> {
        tracing::debug!(ticket, term = username, "searching platforms by username");
        self.search(SearchCriteria::Name(username.to_string())).await
    }

    /// Report-all search by email. Same contract as
    /// [`Aggregator::search_by_username`].
    pub async fn search_by_email(&self, email: &str, ticket: &str) -> Vec<UserData> {
        tracing::debug!(ticket, term = email, "searching platforms by email");
        self.search(SearchCriteria::Mail(email.to_string())).await
    }

    /// Delete users across platforms, one result per request in input order.
    pub async fn delete_users(&self, requests: Vec<DeleteRequest>) -> Vec<DeleteResult> {
        delete::delete_users(Arc::clone(&self.transport), requests).await
    }

    async fn search(&self, criteria: SearchCriteria) -> Vec<UserData> {
        let strategy = FetchStrategy {
            platforms: self.platforms.clone(),
            fallback: FallbackPolicy::None,
        };

        self.run_strategy(&strategy, &criteria, None)
            .await
            .into_iter()
            .map(|outcome| match outcome {
                FetchOutcome::Fetched(data) => data,
                FetchOutcome::Failed(platform, err) => {
                    failure_placeholder(platform, criteria.term(), &err)
                }
            })
            .collect()
    }

    /// The single orchestration loop behind both protocols. Walks platforms
    /// sequentially; a platform failure never stops the loop.
    async fn run_strategy(
        &self,
        strategy: &FetchStrategy,
        primary: &SearchCriteria,
        fallback: Option<&SearchCriteria>,
    ) -> Vec<FetchOutcome> {
        let fallback = match strategy.fallback {
            FallbackPolicy::NameThenEmail => fallback,
            FallbackPolicy::None => None,
        };

        let mut outcomes = Vec::with_capacity(strategy.platforms.len());
        for &platform in &strategy.platforms {
            outcomes.push(self.fetch_one(platform, primary, fallback).await);
        }

        outcomes
    }

    /// Runs the per-platform strategy: primary query, then the fallback
    /// query when the primary returned an empty user. An error from either
    /// step fails the platform.
    async fn fetch_one(
        &self,
        platform: PlatformId,
        primary: &SearchCriteria,
        fallback: Option<&SearchCriteria>,
    ) -> FetchOutcome {
        let criteria_outcome: std::result::Result<UserData, PlatformError> = async {
            let raw = self.transport.fetch(platform, primary).await?;
            let data = normalize(platform, &raw);

            let Some(fallback) = fallback else {
                return Ok(data);
            };
            if !data.user.is_empty() {
                return Ok(data);
            }

            tracing::debug!(
                platform = %platform,
                term = primary.term(),
                "primary lookup returned no user, falling back to email"
            );
            let raw = self.transport.fetch(platform, fallback).await?;
            Ok(normalize(platform, &raw))
        }
        .await;

        match criteria_outcome {
            Ok(data) => FetchOutcome::Fetched(data),
            Err(err) => {
                tracing::warn!(platform = %platform, error = %err, "platform fetch failed");
                FetchOutcome::Failed(platform, err)
            }
        }
    }
}

/// Synthesized record for a failed platform lookup, shaped identically to a
/// successful one so renderers need no branching logic.
fn failure_placeholder(platform: PlatformId, term: &str, err: &PlatformError) -> UserData {
    let classified = classify(err);

    let mut fields = Map::new();
    fields.insert("name".into(), json!(format!("{term} ({})", classified.code)));

    UserData {
        platform,
        user: UserRecord {
            roles: Vec::new(),
            fields,
        },
        content: Vec::new(),
        code: err.status_code.unwrap_or(500),
        status: format!("{}: {}", classified.code, classified.reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils::{Script, ScriptedTransport};
    use serde_json::json;

    fn found_user(name: &str) -> serde_json::Value {
        json!({"data": {"user": {"name": name, "roles": []}}})
    }

    fn empty_user() -> serde_json::Value {
        json!({"data": {"user": {}}})
    }

    fn aggregator(transport: ScriptedTransport) -> Aggregator {
        Aggregator::new(Arc::new(transport))
    }

    #[tokio::test]
    async fn test_fetch_user_accepts_primary_result() {
        let transport = ScriptedTransport::new();
        for platform in PlatformId::ALL {
            transport.script_fetch(platform, Script::Ok(found_user("jdoe")));
        }

        let results = aggregator(transport)
            .fetch_user("jdoe", "j@example.com")
            .await
            .unwrap();
        assert_eq!(results.len(), 4);
        assert_eq!(results[0].platform, PlatformId::Dcp);
        assert_eq!(results[0].user.fields["name"], "jdoe");
    }

    #[tokio::test]
    async fn test_fetch_user_falls_back_to_email_on_empty_user() {
        let transport = ScriptedTransport::new();
        // Dcp: empty by name, found by mail. Others found by name.
        transport.script_fetch(PlatformId::Dcp, Script::Ok(empty_user()));
        transport.script_fetch(PlatformId::Dcp, Script::Ok(found_user("jdoe-by-mail")));
        for platform in [PlatformId::Dxsp, PlatformId::Cppg, PlatformId::Cphub] {
            transport.script_fetch(platform, Script::Ok(found_user("jdoe")));
        }

        let results = aggregator(transport)
            .fetch_user("jdoe", "j@example.com")
            .await
            .unwrap();
        assert_eq!(results[0].user.fields["name"], "jdoe-by-mail");
    }

    #[tokio::test]
    async fn test_fetch_user_accepts_empty_email_fallback_result() {
        // Fallback result is accepted even when it is empty too.
        let transport = ScriptedTransport::new();
        transport.script_fetch(PlatformId::Dcp, Script::Ok(empty_user()));
        transport.script_fetch(PlatformId::Dcp, Script::Ok(empty_user()));
        for platform in [PlatformId::Dxsp, PlatformId::Cppg, PlatformId::Cphub] {
            transport.script_fetch(platform, Script::Ok(found_user("jdoe")));
        }

        let results = aggregator(transport)
            .fetch_user("jdoe", "j@example.com")
            .await
            .unwrap();
        assert_eq!(results.len(), 4);
        assert!(results[0].user.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_user_omits_failed_platforms() {
        let transport = ScriptedTransport::new();
        transport.script_fetch(
            PlatformId::Dcp,
            Script::Err(PlatformError::http(PlatformId::Dcp, 503, "HTTP 503 from DCP")),
        );
        for platform in [PlatformId::Dxsp, PlatformId::Cppg, PlatformId::Cphub] {
            transport.script_fetch(platform, Script::Ok(found_user("jdoe")));
        }

        let results = aggregator(transport)
            .fetch_user("jdoe", "j@example.com")
            .await
            .unwrap();
        // Dcp is omitted, no placeholder.
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].platform, PlatformId::Dxsp);
    }

    #[tokio::test]
    async fn test_fetch_user_fails_only_when_all_platforms_fail() {
        let transport = ScriptedTransport::new();
        for platform in PlatformId::ALL {
            transport.script_fetch(
                platform,
                Script::Err(PlatformError::http(platform, 500, "HTTP 500")),
            );
        }

        let err = aggregator(transport)
            .fetch_user("jdoe", "j@example.com")
            .await
            .unwrap_err();
        match err {
            AggregatorError::AllPlatformsFailed { failures } => {
                assert_eq!(failures.len(), 4);
                let platforms: Vec<_> = failures.iter().map(|(p, _)| *p).collect();
                assert_eq!(platforms, PlatformId::ALL.to_vec());
            }
            other => panic!("expected AllPlatformsFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_search_returns_one_entry_per_platform_even_on_total_failure() {
        let transport = ScriptedTransport::new();
        for platform in PlatformId::ALL {
            transport.script_fetch(
                platform,
                Script::Err(PlatformError::http(platform, 503, "HTTP 503")),
            );
        }

        let results = aggregator(transport).search_by_username("jdoe", "GDPR-1").await;
        assert_eq!(results.len(), 4);
        for (result, platform) in results.iter().zip(PlatformId::ALL) {
            assert_eq!(result.platform, platform);
            assert_eq!(result.code, 503);
            assert_eq!(result.status, "Unavailable: Service unavailable");
        }
    }

    #[tokio::test]
    async fn test_search_placeholder_embeds_term_and_code() {
        let transport = ScriptedTransport::new();
        transport.script_fetch(
            PlatformId::Dcp,
            Script::Err(PlatformError::http(PlatformId::Dcp, 404, "HTTP 404 from DCP")),
        );
        for platform in [PlatformId::Dxsp, PlatformId::Cppg, PlatformId::Cphub] {
            transport.script_fetch(platform, Script::Ok(found_user("jdoe")));
        }

        let results = aggregator(transport).search_by_username("jdoe", "GDPR-1").await;
        assert_eq!(results[0].user.fields["name"], "jdoe (Not Found)");
        assert_eq!(results[0].code, 404);
        assert_eq!(results[0].status, "Not Found: API endpoint or user not found");
    }

    #[tokio::test]
    async fn test_search_transport_failure_defaults_to_code_500() {
        let transport = ScriptedTransport::new();
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        transport.script_fetch(
            PlatformId::Dcp,
            Script::Err(PlatformError::transport(PlatformId::Dcp, io)),
        );
        for platform in [PlatformId::Dxsp, PlatformId::Cppg, PlatformId::Cphub] {
            transport.script_fetch(platform, Script::Ok(found_user("jdoe")));
        }

        let results = aggregator(transport).search_by_username("jdoe", "GDPR-1").await;
        assert_eq!(results[0].code, 500);
        assert_eq!(results[0].status, "Unreachable: Connection refused");
    }

    #[tokio::test]
    async fn test_search_has_no_fallback_for_empty_users() {
        // An empty-but-successful record is a normal result here: exactly
        // one fetch per platform is scripted, so a fallback would panic.
        let transport = ScriptedTransport::new();
        for platform in PlatformId::ALL {
            transport.script_fetch(platform, Script::Ok(empty_user()));
        }

        let results = aggregator(transport).search_by_email("j@example.com", "GDPR-2").await;
        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|r| r.user.is_empty()));
        assert!(results.iter().all(|r| r.status == "success"));
    }

    #[tokio::test]
    async fn test_with_platforms_restricts_and_orders() {
        let transport = ScriptedTransport::new();
        transport.script_fetch(PlatformId::Cphub, Script::Ok(found_user("jdoe")));
        transport.script_fetch(PlatformId::Dcp, Script::Ok(found_user("jdoe")));

        let results = aggregator(transport)
            .with_platforms(vec![PlatformId::Cphub, PlatformId::Dcp])
            .search_by_username("jdoe", "GDPR-3")
            .await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].platform, PlatformId::Cphub);
        assert_eq!(results[1].platform, PlatformId::Dcp);
    }
}
