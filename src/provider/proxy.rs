//! HTTP client for the provider proxy endpoint.

use super::igdb::{ExternalGame, GAME_FIELDS};
use super::MetadataProvider;
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::search::tokenize::escape_quoted;
use async_trait::async_trait;
use serde::Serialize;

const GAMES_ENDPOINT: &str = "games";

#[derive(Debug, Serialize)]
struct ProxyRequest<'a> {
    endpoint: &'a str,
    body: String,
}

/// Posts provider queries through a proxy that holds the upstream credentials.
#[derive(Debug, Clone)]
pub struct ProxyProvider {
    client: reqwest::Client,
    base_url: String,
}

impl ProxyProvider {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Builds a client from config. Fails when no endpoint is configured.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let base_url = config
            .base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(ProviderError::NotConfigured)?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self::new(client, base_url))
    }

    async fn query(&self, body: String) -> Result<Vec<ExternalGame>, ProviderError> {
        tracing::trace!("Provider query: {}", body);
        let response = self
            .client
            .post(&self.base_url)
            .json(&ProxyRequest {
                endpoint: GAMES_ENDPOINT,
                body,
            })
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: text.chars().take(200).collect(),
            });
        }
        Ok(serde_json::from_str(&text)?)
    }
}

/// `search "<query>"; fields ...; limit N;`
pub fn search_body(query: &str, limit: usize) -> String {
    format!(
        "search \"{}\"; fields {}; limit {};",
        escape_quoted(query),
        GAME_FIELDS,
        limit.max(1)
    )
}

/// `fields ...; where id = N;`
pub fn by_id_body(id: u64) -> String {
    format!("fields {}; where id = {};", GAME_FIELDS, id)
}

#[async_trait]
impl MetadataProvider for ProxyProvider {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<ExternalGame>, ProviderError> {
        self.query(search_body(query, limit)).await
    }

    async fn get_by_id(&self, id: u64) -> Result<Option<ExternalGame>, ProviderError> {
        Ok(self.query(by_id_body(id)).await?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};

    #[test]
    fn test_search_body_escapes_quotes() {
        let body = search_body(r#"the "best" game"#, 30);
        check!(body.starts_with(r#"search "the \"best\" game"; fields name,"#));
        check!(body.ends_with("limit 30;"));
    }

    #[test]
    fn test_by_id_body() {
        check!(by_id_body(1074).ends_with("where id = 1074;"));
    }

    #[test]
    fn test_request_shape() {
        let request = ProxyRequest {
            endpoint: GAMES_ENDPOINT,
            body: by_id_body(1),
        };
        let json = serde_json::to_value(&request).unwrap();
        check!(json["endpoint"] == "games");
        check!(json["body"].as_str().unwrap().contains("where id = 1;"));
    }

    #[test]
    fn test_from_config_requires_endpoint() {
        let_assert!(
            Err(ProviderError::NotConfigured) = ProxyProvider::from_config(&ProviderConfig::default())
        );

        let config = ProviderConfig {
            base_url: Some("http://localhost:9/igdb".to_string()),
            ..ProviderConfig::default()
        };
        check!(ProxyProvider::from_config(&config).is_ok());
    }
}
