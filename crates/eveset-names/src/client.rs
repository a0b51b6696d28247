//! Remote lookup of a single character name

use crate::cache::CharacterId;
use crate::error::{FetchFailed, LookupError};
use async_trait::async_trait;
use eveset_core::retry::{ClosurePredicate, RetryExecutor, TracingObserver};
use eveset_core::types::{EsiConfig, RetryPolicy, RuntimeConfig, LOOKUP_OPERATION};
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Resolves one character id to a name.
///
/// `Ok(None)` means the upstream confirmed the id does not exist;
/// `Err` means the lookup could not tell.
#[async_trait]
pub trait LookupClient: Send + Sync {
    async fn fetch(&self, id: CharacterId) -> Result<Option<String>, FetchFailed>;
}

#[derive(Debug, Deserialize)]
struct CharacterResponse {
    name: String,
}

/// [`LookupClient`] backed by the public ESI character endpoint
pub struct EsiClient {
    client: reqwest::Client,
    esi: EsiConfig,
    policy: RetryPolicy,
}

impl EsiClient {
    pub fn new(esi: EsiConfig, policy: RetryPolicy) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&esi.user_agent)
            .timeout(Duration::from_secs(esi.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            esi,
            policy,
        })
    }

    /// Build a client from the `esi` section and the `lookup` retry policy
    pub fn from_runtime_config(config: &RuntimeConfig) -> reqwest::Result<Self> {
        Self::new(
            config.esi.clone(),
            config.retry_policies.policy_for(LOOKUP_OPERATION),
        )
    }

    /// One request, no retries
    async fn fetch_once(&self, id: CharacterId) -> Result<Option<String>, LookupError> {
        let url = self.esi.character_url(id);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if status.is_server_error() {
            return Err(LookupError::ServerError {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(LookupError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let character: CharacterResponse = serde_json::from_slice(&body)
            .map_err(|e| LookupError::MalformedBody(e.to_string()))?;

        if character.name.is_empty() {
            return Err(LookupError::MalformedBody("empty name".to_string()));
        }

        Ok(Some(character.name))
    }
}

#[async_trait]
impl LookupClient for EsiClient {
    async fn fetch(&self, id: CharacterId) -> Result<Option<String>, FetchFailed> {
        RetryExecutor::new(self.policy.clone())
            .with_predicate(ClosurePredicate::new(LookupError::is_transient))
            .with_observer(TracingObserver::new(format!("{} {}", LOOKUP_OPERATION, id)))
            .execute(|| self.fetch_once(id))
            .await
            .map_err(|err| FetchFailed {
                id,
                attempts: err.attempts(),
                source: err.into_inner(),
            })
    }
}
