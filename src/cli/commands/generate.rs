//! Generate Command
//!
//! Runs the full deck pipeline for one problem statement and writes the
//! bundle to `<output>/<engagement_id>/`.
//!
//! Usage:
//!   deckforge generate --problem "..." --client "Acme" [-o decks] [--format json]

use std::path::PathBuf;

use tokio::runtime::Runtime;
use tracing::info;

use crate::ai::create_provider;
use crate::cli::ui::Output;
use crate::config::{Config, ConfigLoader, OutputFormat};
use crate::pipeline::{DeckPipeline, DocumentSink, FileSink, GeneratedArtifact};
use crate::research::create_search_provider;
use crate::types::{DeckError, Result};

/// Generate options (CLI overrides on top of loaded config)
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Inline problem statement
    pub problem: Option<String>,
    /// Read the problem statement from a file
    pub problem_file: Option<PathBuf>,
    pub client: String,
    pub output: Option<PathBuf>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub format: Option<OutputFormat>,
    pub quiet: bool,
}

pub fn run(options: GenerateOptions) -> Result<()> {
    let mut config = ConfigLoader::load()?;
    apply_overrides(&mut config, &options);
    config.validate()?;

    let problem = resolve_problem(&options)?;
    let output = Output::new(options.quiet);

    let provider = create_provider(&config.provider_config())?;
    let search = create_search_provider(&config.search_config())?;
    info!(
        "Using LLM provider: {} ({}), search: {}",
        provider.name(),
        provider.model(),
        search.name()
    );

    let pipeline = DeckPipeline::new(provider, search).with_options(config.pipeline_options());

    let rt = Runtime::new()?;
    let artifact = rt.block_on(pipeline.generate_document(&problem, &options.client))?;

    let sink = FileSink::new(&config.output.dir);
    let written = sink.write(&artifact)?;

    match config.output.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&artifact)?),
        OutputFormat::Markdown => print_summary(&output, &artifact, &sink, written.len()),
    }

    Ok(())
}

fn apply_overrides(config: &mut Config, options: &GenerateOptions) {
    if let Some(provider) = &options.provider {
        config.llm.provider = provider.clone();
    }
    if let Some(model) = &options.model {
        config.llm.model = Some(model.clone());
    }
    if let Some(dir) = &options.output {
        config.output.dir = dir.clone();
    }
    if let Some(format) = options.format {
        config.output.format = format;
    }
}

fn resolve_problem(options: &GenerateOptions) -> Result<String> {
    match (&options.problem, &options.problem_file) {
        (Some(problem), _) => Ok(problem.clone()),
        (None, Some(path)) => Ok(std::fs::read_to_string(path)?),
        (None, None) => Err(DeckError::Validation(vec![
            "either --problem or --problem-file is required".to_string(),
        ])),
    }
}

fn print_summary(output: &Output, artifact: &GeneratedArtifact, sink: &FileSink, files: usize) {
    let meta = &artifact.metadata;

    output.header(&format!("Deck for {}", artifact.client_name));
    output.field("Engagement", &artifact.engagement_id);
    output.field("Problem", artifact.analysis.problem_type.label());
    output.field("Sections", meta.section_count);
    output.field("Charts", meta.chart_count);
    output.field("Sources", meta.source_count);
    output.field(
        "LLM calls",
        format!(
            "{} ({} failed, {} in / {} out tokens)",
            meta.usage.api_calls,
            meta.usage.failed_calls,
            meta.usage.input_tokens,
            meta.usage.output_tokens
        ),
    );
    output.field("Duration", format!("{:.1}s", meta.duration_ms as f64 / 1000.0));

    if artifact.is_degraded() {
        output.header("Degradations");
        for degradation in &artifact.degradations {
            output.degradation(degradation);
        }
    }

    println!();
    output.success(&format!(
        "Wrote {} files to {}",
        files,
        sink.engagement_dir(artifact).display()
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_config_values() {
        let mut config = Config::default();
        let options = GenerateOptions {
            provider: Some("openai".to_string()),
            model: Some("gpt-4o".to_string()),
            output: Some(PathBuf::from("out")),
            format: Some(OutputFormat::Json),
            ..Default::default()
        };

        apply_overrides(&mut config, &options);
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.model.as_deref(), Some("gpt-4o"));
        assert_eq!(config.output.dir, PathBuf::from("out"));
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_problem_from_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("problem.txt");
        std::fs::write(&path, "Reduce churn in the mid-market segment").unwrap();

        let options = GenerateOptions {
            problem_file: Some(path),
            ..Default::default()
        };
        assert_eq!(
            resolve_problem(&options).unwrap(),
            "Reduce churn in the mid-market segment"
        );
    }

    #[test]
    fn test_missing_problem_is_validation_error() {
        let err = resolve_problem(&GenerateOptions::default()).unwrap_err();
        assert!(matches!(err, DeckError::Validation(_)));
    }
}
