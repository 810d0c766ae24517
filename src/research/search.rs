//! Web Search Capability
//!
//! `SearchProvider` is the seam between research aggregation and a search API.
//! `TavilyClient` is the production implementation.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::constants::{network, research};
use crate::types::{DeckError, ParseWithDefault, Result};

const DEFAULT_API_BASE: &str = "https://api.tavily.com";

// =============================================================================
// Request / Response
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchDepth {
    Basic,
    #[default]
    Advanced,
}

impl ParseWithDefault for SearchDepth {
    fn type_name() -> &'static str {
        "SearchDepth"
    }

    fn default_value() -> Self {
        Self::Advanced
    }

    fn try_parse(s: &str) -> Option<Self> {
        match s {
            "basic" => Some(Self::Basic),
            "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    pub depth: SearchDepth,
    pub max_results: usize,
    pub include_answer: bool,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            depth: SearchDepth::Advanced,
            max_results: research::RESULTS_PER_QUERY,
            include_answer: true,
        }
    }

    pub fn with_depth(mut self, depth: SearchDepth) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub score: f64,
}

// =============================================================================
// Provider Trait
// =============================================================================

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run one query. Failures are `DeckError::Search`.
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse>;

    fn name(&self) -> &str;
}

pub type SharedSearch = Arc<dyn SearchProvider + Send + Sync>;

/// Search provider settings
#[derive(Clone, Serialize, Deserialize)]
pub struct SearchProviderConfig {
    pub provider: String,
    pub timeout_secs: u64,
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_base: Option<String>,
}

impl std::fmt::Debug for SearchProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchProviderConfig")
            .field("provider", &self.provider)
            .field("timeout_secs", &self.timeout_secs)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl Default for SearchProviderConfig {
    fn default() -> Self {
        Self {
            provider: "tavily".to_string(),
            timeout_secs: network::SEARCH_TIMEOUT_SECS,
            api_key: None,
            api_base: None,
        }
    }
}

pub fn create_search_provider(config: &SearchProviderConfig) -> Result<SharedSearch> {
    match config.provider.as_str() {
        "tavily" => Ok(Arc::new(TavilyClient::new(config.clone())?)),
        other => Err(DeckError::Config(format!(
            "Unknown search provider: {}. Supported: tavily",
            other
        ))),
    }
}

// =============================================================================
// Tavily
// =============================================================================

pub struct TavilyClient {
    api_key: SecretString,
    api_base: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for TavilyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TavilyClient")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl TavilyClient {
    pub fn new(config: SearchProviderConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .or_else(|| std::env::var("TAVILY_API_KEY").ok())
            .ok_or_else(|| {
                DeckError::Config(
                    "Tavily API key not found. Set TAVILY_API_KEY env var or provide in config"
                        .to_string(),
                )
            })?;

        let api_base = config
            .api_base
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DeckError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key: SecretString::from(api_key),
            api_base,
            client,
        })
    }

    fn build_body<'a>(&self, request: &'a SearchRequest) -> TavilyRequest<'a> {
        TavilyRequest {
            query: &request.query,
            search_depth: request.depth,
            include_answer: request.include_answer,
            max_results: request.max_results,
        }
    }
}

#[derive(Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    search_depth: SearchDepth,
    include_answer: bool,
    max_results: usize,
}

#[async_trait]
impl SearchProvider for TavilyClient {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let search_err = |message: String| DeckError::Search {
            query: request.query.clone(),
            message,
        };

        let response = self
            .client
            .post(format!("{}/search", self.api_base))
            .bearer_auth(self.api_key.expose_secret())
            .json(&self.build_body(request))
            .send()
            .await
            .map_err(|e| search_err(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(search_err(format!("HTTP {}: {}", status, body)));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| search_err(format!("invalid response body: {}", e)))?;

        debug!(
            "Search '{}' returned {} results",
            request.query,
            parsed.results.len()
        );
        Ok(parsed)
    }

    fn name(&self) -> &str {
        "tavily"
    }
}
