// Card Advisor - Core Library
// Exposes all modules for use in the CLI, the API server, and tests

pub mod advisor;
pub mod card;
pub mod catalog;
pub mod config;
pub mod error;
pub mod llm;
pub mod logging;
pub mod money;
pub mod report;
pub mod rules;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use advisor::{
    AdvisorSettings, CardAdvisor, Resolution, SearchQuery, SearchSequencer, SearchTicket, Source,
};
pub use card::{CardRecord, CardTier, CashbackRate, Eligibility, PriceHistoryEntry};
pub use catalog::{Catalog, CatalogStats};
pub use config::{AdvisorConfig, ApiKey};
pub use error::{CatalogError, CatalogIssue, ConfigError, GenerationError, QueryError};
pub use llm::{GenerationRequest, OpenAiClient, TextGenerator};
pub use money::{fee_label, format_inr};
pub use report::{fallback_comparison, fallback_summary, COMPARISON_GUIDANCE};
pub use rules::{classify, fallback_search, KeywordRule, SearchResult, MAX_RESULTS, SAMPLE_QUERIES};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
