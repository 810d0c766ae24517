//! Scripted collaborators for unit tests.
//!
//! `ScriptedProvider` and `ScriptedSearch` answer from closures so tests can
//! route on prompt text, inject failures and count calls without a network.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use crate::ai::provider::{GenerationRequest, LlmProvider, LlmResponse, TokenUsage};
use crate::research::{SearchHit, SearchProvider, SearchRequest, SearchResponse};
use crate::types::{DeckError, ErrorCategory, LlmError, Result};

type Responder = Box<dyn Fn(&GenerationRequest) -> Result<String> + Send + Sync>;
type SearchResponder = Box<dyn Fn(&SearchRequest) -> Result<SearchResponse> + Send + Sync>;

// =============================================================================
// Text Generation
// =============================================================================

pub struct ScriptedProvider {
    responder: Responder,
    calls: AtomicU32,
    delay: Option<Duration>,
}

impl ScriptedProvider {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&GenerationRequest) -> Result<String> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            calls: AtomicU32::new(0),
            delay: None,
        }
    }

    pub fn always(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(move |_| Ok(text.clone()))
    }

    pub fn failing(category: ErrorCategory) -> Self {
        Self::new(move |_| {
            Err(DeckError::Llm(LlmError::with_provider(
                category,
                "scripted failure",
                "scripted",
            )))
        })
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<LlmResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let content = (self.responder)(request)?;
        Ok(LlmResponse {
            usage: TokenUsage::new(10, 10),
            ..LlmResponse::content_only(content)
        })
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }
}

// =============================================================================
// Search
// =============================================================================

pub struct ScriptedSearch {
    responder: SearchResponder,
    calls: AtomicU32,
}

impl ScriptedSearch {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&SearchRequest) -> Result<SearchResponse> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            calls: AtomicU32::new(0),
        }
    }

    /// Every query returns `per_query` hits with URLs derived from the query
    pub fn hits(per_query: usize) -> Self {
        Self::new(move |request| {
            let slug = request.query.replace(' ', "-");
            let results = (0..per_query)
                .map(|i| SearchHit {
                    title: format!("{} result {}", request.query, i),
                    url: format!("https://example.com/{}/{}", slug, i),
                    content: format!("Findings for {}", request.query),
                    score: 1.0 - (i as f64 * 0.05),
                })
                .collect();
            Ok(SearchResponse {
                answer: Some(format!("Summary for {}", request.query)),
                results,
            })
        })
    }

    pub fn failing() -> Self {
        Self::new(|request| {
            Err(DeckError::Search {
                query: request.query.clone(),
                message: "scripted outage".to_string(),
            })
        })
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchProvider for ScriptedSearch {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.responder)(request)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
