// ⚙️ Configuration - explicit values, read from the environment once at startup
// Nothing in the library reads env vars on its own; binaries build an
// AdvisorConfig and hand it to the advisor.

use crate::error::ConfigError;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_MAX_EXPLANATION_CHARS: usize = 600;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

// ============================================================================
// API KEY
// ============================================================================

/// Credential for the text-generation service. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        ApiKey(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

// ============================================================================
// ADVISOR CONFIG
// ============================================================================

#[derive(Debug, Clone)]
pub struct AdvisorConfig {
    /// Present iff AI delegation is enabled
    pub api_key: Option<ApiKey>,
    pub model: String,
    pub base_url: String,
    /// Upper bound on a single generation call
    pub timeout: Duration,
    pub max_explanation_chars: usize,
    /// Catalog file replacing the built-in sample data
    pub catalog_path: Option<PathBuf>,
    pub bind_addr: String,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        AdvisorConfig {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_explanation_chars: DEFAULT_MAX_EXPLANATION_CHARS,
            catalog_path: None,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl AdvisorConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key → value source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = AdvisorConfig::default();

        let timeout = match get("CARD_ADVISOR_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_positive("CARD_ADVISOR_TIMEOUT_SECS", &raw)? as u64),
            None => defaults.timeout,
        };
        let max_explanation_chars = match get("CARD_ADVISOR_MAX_EXPLANATION") {
            Some(raw) => parse_positive("CARD_ADVISOR_MAX_EXPLANATION", &raw)?,
            None => defaults.max_explanation_chars,
        };

        let config = AdvisorConfig {
            api_key: get("OPENAI_API_KEY").map(ApiKey::new),
            model: get("CARD_ADVISOR_MODEL").unwrap_or(defaults.model),
            base_url: get("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            timeout,
            max_explanation_chars,
            catalog_path: get("CARD_ADVISOR_CATALOG").map(PathBuf::from),
            bind_addr: get("CARD_ADVISOR_BIND").unwrap_or(defaults.bind_addr),
        };

        Ok(config)
    }

    pub fn is_delegation_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

fn parse_positive(key: &'static str, raw: &str) -> Result<usize, ConfigError> {
    match raw.parse::<usize>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::InvalidNumber {
            key,
            value: raw.to_string(),
        }),
    }
}
