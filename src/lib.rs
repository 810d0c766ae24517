//! deckforge - Research-Backed Strategy Deck Generator
//!
//! Turns a one-paragraph business problem into a consulting-style deck:
//! the problem is classified, expanded into a section blueprint, researched
//! through web search, written section by section, charted and rendered to
//! Markdown with SVG charts.
//!
//! ## Core Features
//!
//! - **Always a document**: every stage after classification degrades to
//!   deterministic fallback content instead of failing the run
//! - **Typed generation**: every model call is parsed into a strict schema
//!   through one JSON repair and validation seam
//! - **Bounded concurrency**: section content is generated on a capped pool
//!   and reassembled in blueprint order
//!
//! ## Quick Start
//!
//! ```ignore
//! use deckforge::ai::{ProviderConfig, create_provider};
//! use deckforge::research::{SearchProviderConfig, create_search_provider};
//! use deckforge::pipeline::{DeckPipeline, DocumentSink, FileSink};
//!
//! let provider = create_provider(&ProviderConfig::default())?;
//! let search = create_search_provider(&SearchProviderConfig::default())?;
//! let artifact = DeckPipeline::new(provider, search)
//!     .generate_document("Enter the European SaaS market", "Acme")
//!     .await?;
//! FileSink::new("decks").write(&artifact)?;
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: LLM providers, structured generation, timeouts, metrics
//! - [`research`]: search providers and market research aggregation
//! - [`deck`]: problem analysis, blueprints, section content
//! - [`visual`]: chart data and SVG rendering
//! - [`render`]: Markdown document templates
//! - [`pipeline`]: end-to-end orchestration and artifact sinks
//! - [`config`]: layered configuration

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod deck;
pub mod pipeline;
pub mod render;
pub mod research;
pub mod types;
pub mod visual;

#[cfg(test)]
mod testing;

// =============================================================================
// Core Re-exports
// =============================================================================

pub use config::{Config, ConfigLoader};
pub use types::{DeckError, Degradation, DegradationKind, EngagementId, ErrorCategory, Result};

pub use pipeline::{
    ArtifactMetadata, DeckPipeline, DocumentSink, FileSink, GeneratedArtifact, PipelineOptions,
};

pub use ai::{LlmProvider, LlmResponse, ProviderConfig, SharedProvider, create_provider};
pub use research::{SearchProvider, SearchProviderConfig, SharedSearch, create_search_provider};
