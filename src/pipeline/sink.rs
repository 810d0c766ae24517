//! Artifact sinks.
//!
//! The only place where a failure after generation is surfaced to the caller.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::GeneratedArtifact;
use crate::types::Result;

pub const DOCUMENT_FILE: &str = "deck.md";
pub const ARTIFACT_FILE: &str = "artifact.json";
pub const CHARTS_DIR: &str = "charts";

/// Destination for finished artifacts
pub trait DocumentSink: Send + Sync {
    /// Persist the artifact and return the paths written
    fn write(&self, artifact: &GeneratedArtifact) -> Result<Vec<PathBuf>>;
}

/// Writes `<root>/<engagement_id>/{deck.md, artifact.json, charts/*.svg}`
pub struct FileSink {
    root: PathBuf,
}

impl FileSink {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn engagement_dir(&self, artifact: &GeneratedArtifact) -> PathBuf {
        self.root.join(artifact.engagement_id.to_string())
    }
}

impl DocumentSink for FileSink {
    fn write(&self, artifact: &GeneratedArtifact) -> Result<Vec<PathBuf>> {
        let dir = self.engagement_dir(artifact);
        fs::create_dir_all(&dir)?;

        let mut written = Vec::new();

        let document = dir.join(DOCUMENT_FILE);
        fs::write(&document, &artifact.rendered)?;
        written.push(document);

        let json = dir.join(ARTIFACT_FILE);
        fs::write(&json, serde_json::to_string_pretty(artifact)?)?;
        written.push(json);

        let charts = artifact.charts();
        if !charts.is_empty() {
            let charts_dir = dir.join(CHARTS_DIR);
            fs::create_dir_all(&charts_dir)?;
            for (stem, svg) in charts {
                let path = charts_dir.join(format!("{}.svg", stem));
                fs::write(&path, svg)?;
                written.push(path);
            }
        }

        info!("Wrote {} files to {}", written.len(), dir.display());
        Ok(written)
    }
}
