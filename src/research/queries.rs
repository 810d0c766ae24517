//! Search query planning.

use chrono::Datelike;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::constants::research;

static LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[-*•]+|\d+[.)]|\(\d+\)|[a-zA-Z][.)])\s+")
        .expect("list marker pattern is valid")
});

/// Parse one query per line, stripping list markers and wrapping quotes
pub fn parse_query_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| {
            let stripped = LIST_MARKER.replace(line, "");
            stripped
                .trim()
                .trim_matches(|c| c == '"' || c == '\'' || c == '`')
                .trim()
                .to_string()
        })
        .filter(|q| !q.is_empty() && !q.ends_with(':'))
        .take(research::QUERIES_PER_AREA)
        .collect()
}

/// Query used when generation fails for a focus area
pub fn fallback_query(problem: &str, area: &str) -> String {
    format!(
        "{} {} analysis {}",
        problem.trim(),
        area.trim(),
        chrono::Utc::now().year()
    )
}

/// Accumulates queries across focus areas, dropping duplicates and
/// stopping at the cap
#[derive(Debug)]
pub struct QueryPlan {
    queries: Vec<String>,
    seen: HashSet<String>,
    cap: usize,
}

impl QueryPlan {
    pub fn new(cap: usize) -> Self {
        Self {
            queries: Vec::new(),
            seen: HashSet::new(),
            cap,
        }
    }

    pub fn is_full(&self) -> bool {
        self.queries.len() >= self.cap
    }

    /// Add queries in order; returns how many were accepted
    pub fn extend(&mut self, queries: impl IntoIterator<Item = String>) -> usize {
        let mut added = 0;
        for query in queries {
            if self.is_full() {
                break;
            }
            if self.seen.insert(query.to_lowercase()) {
                self.queries.push(query);
                added += 1;
            }
        }
        added
    }

    pub fn into_queries(self) -> Vec<String> {
        self.queries
    }
}
