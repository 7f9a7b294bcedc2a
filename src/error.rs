// ⚠️ Error Types - typed failures at the library boundary
// Binaries wrap these in anyhow; search/summary/compare callers never see
// GenerationError because the advisor downgrades it to the fallback path.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// CATALOG
// ============================================================================

/// A single invariant violation found while validating a catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogIssue {
    /// Card identifier (or position when the identifier is blank)
    pub card: String,
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for CatalogIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.card, self.field, self.message)
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog contains no cards")]
    Empty,

    #[error("catalog failed validation ({} issue(s)): {}", .0.len(), join_issues(.0))]
    Invalid(Vec<CatalogIssue>),

    #[error("failed to parse catalog JSON")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read catalog file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn join_issues(issues: &[CatalogIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

// ============================================================================
// EXTERNAL GENERATION
// ============================================================================

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("provider response had no completion text")]
    EmptyCompletion,

    #[error("generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("malformed structured reply: {0}")]
    MalformedReply(String),
}

// ============================================================================
// CONFIGURATION / INPUT
// ============================================================================

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key} must be a positive integer, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("search query is empty")]
    Empty,
}
