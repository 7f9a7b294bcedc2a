// 🧭 Card Advisor - search, summaries and comparisons
//
// Every operation has two paths: delegate to the text-generation service
// when a credential is configured, otherwise (or on any failure) answer
// from the deterministic rules/templates. Callers always get an answer.

use crate::card::CardRecord;
use crate::catalog::Catalog;
use crate::config::AdvisorConfig;
use crate::error::{GenerationError, QueryError};
use crate::llm::{GenerationRequest, OpenAiClient, TextGenerator};
use crate::report::{fallback_comparison, fallback_summary, COMPARISON_GUIDANCE, MIN_COMPARISON_CARDS};
use crate::rules::{fallback_search, SearchResult, MAX_RESULTS};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const SEARCH_SYSTEM_PROMPT: &str = "You are a credit card expert helping users find the best credit cards from Indian banks.
Analyze the user's query and return a JSON response with:
1. \"cardIds\": array of card IDs that match the criteria (maximum 6 cards)
2. \"explanation\": a brief explanation of why these cards were selected

Consider factors like:
- Annual fees and joining fees
- Cashback rates for different categories
- Lounge access availability
- Fuel surcharge benefits
- Eligibility criteria
- Card type (premium, mid-tier, entry-level)
- Bank preferences

Return only valid JSON without any markdown formatting.";

const SUMMARY_SYSTEM_PROMPT: &str = "You are a credit card expert. Generate a concise 2-3 sentence summary highlighting the key benefits and ideal user profile for this credit card. Focus on what makes it unique and who should consider it.";

const COMPARISON_SYSTEM_PROMPT: &str = "You are a credit card expert. Compare the given credit cards and provide a detailed analysis highlighting:
1. Key differences in benefits and features
2. Cost comparison (annual fees, joining fees)
3. Reward rates and cashback structure
4. Target audience for each card
5. Recommendation based on different user profiles

Be objective and highlight both pros and cons.";

// ============================================================================
// QUERY / RESOLUTION TYPES
// ============================================================================

/// Non-blank search text. The raw text is kept as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    pub fn new(raw: impl Into<String>) -> Result<Self, QueryError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(QueryError::Empty);
        }
        Ok(SearchQuery(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Which path produced an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Delegated,
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
    Delegated(T),
    Fallback(T),
}

impl<T> Resolution<T> {
    pub fn source(&self) -> Source {
        match self {
            Resolution::Delegated(_) => Source::Delegated,
            Resolution::Fallback(_) => Source::Fallback,
        }
    }

    pub fn is_delegated(&self) -> bool {
        matches!(self, Resolution::Delegated(_))
    }

    pub fn value(&self) -> &T {
        match self {
            Resolution::Delegated(value) | Resolution::Fallback(value) => value,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Resolution::Delegated(value) | Resolution::Fallback(value) => value,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DelegatedSearchReply {
    #[serde(rename = "cardIds")]
    card_ids: Vec<String>,
    explanation: String,
}

// ============================================================================
// SETTINGS
// ============================================================================

#[derive(Debug, Clone)]
pub struct AdvisorSettings {
    pub model: String,
    pub timeout: Duration,
    pub max_explanation_chars: usize,
}

impl From<&AdvisorConfig> for AdvisorSettings {
    fn from(config: &AdvisorConfig) -> Self {
        AdvisorSettings {
            model: config.model.clone(),
            timeout: config.timeout,
            max_explanation_chars: config.max_explanation_chars,
        }
    }
}

impl Default for AdvisorSettings {
    fn default() -> Self {
        AdvisorSettings::from(&AdvisorConfig::default())
    }
}

// ============================================================================
// CARD ADVISOR
// ============================================================================

pub struct CardAdvisor {
    catalog: Arc<Catalog>,
    generator: Option<Arc<dyn TextGenerator>>,
    settings: AdvisorSettings,
}

impl CardAdvisor {
    /// Wire the advisor from configuration; delegation is on iff a key is set.
    pub fn from_config(catalog: Arc<Catalog>, config: &AdvisorConfig) -> Result<Self, GenerationError> {
        let generator = OpenAiClient::from_config(config)?
            .map(|client| Arc::new(client) as Arc<dyn TextGenerator>);
        Ok(CardAdvisor {
            catalog,
            generator,
            settings: AdvisorSettings::from(config),
        })
    }

    /// Rules and templates only.
    pub fn offline(catalog: Arc<Catalog>) -> Self {
        CardAdvisor {
            catalog,
            generator: None,
            settings: AdvisorSettings::default(),
        }
    }

    pub fn with_generator(
        catalog: Arc<Catalog>,
        generator: Arc<dyn TextGenerator>,
        settings: AdvisorSettings,
    ) -> Self {
        CardAdvisor {
            catalog,
            generator: Some(generator),
            settings,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn is_delegating(&self) -> bool {
        self.generator.is_some()
    }

    // ------------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------------

    pub async fn search(&self, query: &SearchQuery) -> Resolution<SearchResult<'_>> {
        if let Some(generator) = &self.generator {
            match self.delegated_search(generator.as_ref(), query.as_str()).await {
                Ok(result) => return Resolution::Delegated(result),
                Err(e) => warn!(error = %e, "AI search failed, using keyword rules"),
            }
        }
        debug!(query = query.as_str(), "fallback search");
        Resolution::Fallback(fallback_search(query.as_str(), &self.catalog))
    }

    async fn delegated_search(
        &self,
        generator: &dyn TextGenerator,
        query: &str,
    ) -> Result<SearchResult<'_>, GenerationError> {
        let projection: Vec<_> = self.catalog.iter().map(|card| card.search_projection()).collect();
        let cards_json = serde_json::to_string(&projection)
            .map_err(|e| GenerationError::MalformedReply(e.to_string()))?;

        let request = GenerationRequest {
            system: format!("{}\n\nAvailable cards data: {}", SEARCH_SYSTEM_PROMPT, cards_json),
            prompt: format!("Find credit cards matching this query: \"{}\"", query),
            model: self.settings.model.clone(),
        };
        let text = self.generate(generator, &request).await?;

        let reply: DelegatedSearchReply = serde_json::from_str(strip_code_fence(&text))
            .map_err(|e| GenerationError::MalformedReply(e.to_string()))?;

        // Unknown ids are ignored; order follows the catalog
        let mut cards = self.catalog.select(&reply.card_ids);
        cards.truncate(MAX_RESULTS);

        Ok(SearchResult {
            cards,
            explanation: bound_text(&reply.explanation, self.settings.max_explanation_chars),
        })
    }

    // ------------------------------------------------------------------------
    // Summary
    // ------------------------------------------------------------------------

    pub async fn summarize(&self, card: &CardRecord) -> Resolution<String> {
        if let Some(generator) = &self.generator {
            match self.delegated_summary(generator.as_ref(), card).await {
                Ok(text) => return Resolution::Delegated(text),
                Err(e) => warn!(card = %card.id, error = %e, "AI summary failed, using template"),
            }
        }
        Resolution::Fallback(fallback_summary(card))
    }

    async fn delegated_summary(
        &self,
        generator: &dyn TextGenerator,
        card: &CardRecord,
    ) -> Result<String, GenerationError> {
        let card_json = serde_json::to_string(&card.summary_projection())
            .map_err(|e| GenerationError::MalformedReply(e.to_string()))?;
        let request = GenerationRequest {
            system: SUMMARY_SYSTEM_PROMPT.to_string(),
            prompt: format!("Generate a summary for: {}", card_json),
            model: self.settings.model.clone(),
        };
        self.generate(generator, &request).await
    }

    // ------------------------------------------------------------------------
    // Comparison
    // ------------------------------------------------------------------------

    /// Compare catalog cards by id (catalog order, unknown ids ignored).
    pub async fn compare<S: AsRef<str>>(&self, ids: &[S]) -> Resolution<String> {
        let cards = self.catalog.select(ids);
        self.compare_cards(&cards).await
    }

    pub async fn compare_cards(&self, cards: &[&CardRecord]) -> Resolution<String> {
        if cards.len() < MIN_COMPARISON_CARDS {
            return Resolution::Fallback(COMPARISON_GUIDANCE.to_string());
        }

        if let Some(generator) = &self.generator {
            match self.delegated_comparison(generator.as_ref(), cards).await {
                Ok(text) => return Resolution::Delegated(text),
                Err(e) => warn!(cards = cards.len(), error = %e, "AI comparison failed, using template"),
            }
        }
        Resolution::Fallback(fallback_comparison(cards))
    }

    async fn delegated_comparison(
        &self,
        generator: &dyn TextGenerator,
        cards: &[&CardRecord],
    ) -> Result<String, GenerationError> {
        let projection: Vec<_> = cards.iter().map(|card| card.comparison_projection()).collect();
        let cards_json = serde_json::to_string(&projection)
            .map_err(|e| GenerationError::MalformedReply(e.to_string()))?;
        let request = GenerationRequest {
            system: COMPARISON_SYSTEM_PROMPT.to_string(),
            prompt: format!("Compare these credit cards: {}", cards_json),
            model: self.settings.model.clone(),
        };
        self.generate(generator, &request).await
    }

    async fn generate(
        &self,
        generator: &dyn TextGenerator,
        request: &GenerationRequest,
    ) -> Result<String, GenerationError> {
        let timeout = self.settings.timeout;
        match tokio::time::timeout(timeout, generator.generate(request)).await {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout(timeout)),
        }
    }
}

/// Accept replies wrapped in a ```json fence.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// Trim and cap at `max_chars` characters, marking the cut with an ellipsis.
fn bound_text(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let mut bounded: String = trimmed.chars().take(max_chars).collect();
    bounded.push('…');
    bounded
}

// ============================================================================
// SEARCH SEQUENCING
// ============================================================================

/// Ticket handed out when a search starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SearchTicket(u64);

/// Drops results of searches that were superseded while in flight.
#[derive(Debug, Default)]
pub struct SearchSequencer {
    latest: AtomicU64,
}

impl SearchSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> SearchTicket {
        SearchTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_latest(&self, ticket: SearchTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Run `work` under a fresh ticket; `None` if a newer one was issued meanwhile.
    pub async fn run<F, T>(&self, work: F) -> Option<T>
    where
        F: Future<Output = T>,
    {
        let ticket = self.issue();
        let output = work.await;
        if self.is_latest(ticket) {
            Some(output)
        } else {
            debug!(ticket = ticket.0, "discarding superseded search result");
            None
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::rules::NO_MATCH_EXPLANATION;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Scripted stand-in for the external service
    pub(crate) struct ScriptedGenerator {
        reply: Result<String, String>,
        delay: Option<Duration>,
        pub(crate) requests: Mutex<Vec<GenerationRequest>>,
    }

    impl ScriptedGenerator {
        pub(crate) fn replying(text: &str) -> Self {
            ScriptedGenerator {
                reply: Ok(text.to_string()),
                delay: None,
                requests: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn failing() -> Self {
            ScriptedGenerator {
                reply: Err("connection refused".to_string()),
                delay: None,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn delayed(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        fn call_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
            self.requests.lock().unwrap().push(request.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(reason) => Err(GenerationError::MalformedReply(reason.clone())),
            }
        }
    }

    fn catalog() -> Arc<Catalog> {
        Arc::new(Catalog::builtin().unwrap())
    }

    fn advisor_with(generator: Arc<ScriptedGenerator>) -> CardAdvisor {
        CardAdvisor::with_generator(catalog(), generator, AdvisorSettings::default())
    }

    fn query(text: &str) -> SearchQuery {
        SearchQuery::new(text).unwrap()
    }

    #[test]
    fn test_blank_query_rejected() {
        assert_eq!(SearchQuery::new("   \t"), Err(QueryError::Empty));
        assert_eq!(SearchQuery::new("").unwrap_err(), QueryError::Empty);
        assert_eq!(SearchQuery::new(" premium ").unwrap().as_str(), " premium ");
    }

    #[tokio::test]
    async fn test_offline_search_uses_rules() {
        let advisor = CardAdvisor::offline(catalog());
        let resolution = advisor.search(&query("premium")).await;

        assert_eq!(resolution.source(), Source::Fallback);
        let result = resolution.into_inner();
        assert_eq!(result.ids(), vec!["hdfc-regalia", "axis-magnus"]);
    }

    #[tokio::test]
    async fn test_delegated_search_intersects_catalog() {
        let generator = Arc::new(ScriptedGenerator::replying(
            r#"{"cardIds": ["yes-first-exclusive", "made-up-card", "sbi-cashback"], "explanation": "  Great for dining.  "}"#,
        ));
        let advisor = advisor_with(generator.clone());

        let resolution = advisor.search(&query("dining under 3000")).await;

        assert!(resolution.is_delegated());
        let result = resolution.value();
        assert_eq!(result.ids(), vec!["sbi-cashback", "yes-first-exclusive"]);
        assert_eq!(result.explanation, "Great for dining.");

        let requests = generator.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "gpt-4o");
        assert_eq!(requests[0].prompt, "Find credit cards matching this query: \"dining under 3000\"");
        assert!(requests[0].system.contains("\"id\":\"kotak-811\""));
        assert!(!requests[0].system.contains("priceHistory"));
    }

    #[tokio::test]
    async fn test_delegated_search_accepts_code_fence() {
        let generator = Arc::new(ScriptedGenerator::replying(
            "```json\n{\"cardIds\": [\"axis-magnus\"], \"explanation\": \"Travel.\"}\n```",
        ));
        let advisor = advisor_with(generator);

        let resolution = advisor.search(&query("travel")).await;

        assert!(resolution.is_delegated());
        assert_eq!(resolution.value().ids(), vec!["axis-magnus"]);
    }

    #[tokio::test]
    async fn test_delegated_search_caps_results_and_explanation() {
        // Seven cards so the cap actually bites
        let mut cards = catalog().cards().to_vec();
        let mut extra = cards[0].clone();
        extra.id = "extra-card".to_string();
        cards.push(extra);
        let big_catalog = Arc::new(Catalog::new(cards).unwrap());

        let ids: Vec<String> = big_catalog.iter().map(|card| format!("\"{}\"", card.id)).collect();
        let reply = format!(
            "{{\"cardIds\": [{}], \"explanation\": \"{}\"}}",
            ids.join(","),
            "x".repeat(50)
        );
        let settings = AdvisorSettings {
            max_explanation_chars: 10,
            ..AdvisorSettings::default()
        };

        let advisor = CardAdvisor::with_generator(
            big_catalog,
            Arc::new(ScriptedGenerator::replying(&reply)),
            settings,
        );
        let result = advisor.search(&query("everything")).await.into_inner();

        assert_eq!(result.cards.len(), MAX_RESULTS);
        assert_eq!(result.ids()[0], "hdfc-regalia");
        assert_eq!(result.explanation, format!("{}…", "x".repeat(10)));
    }

    #[tokio::test]
    async fn test_delegated_search_with_no_known_ids_is_kept() {
        let generator = Arc::new(ScriptedGenerator::replying(
            r#"{"cardIds": ["made-up-card"], "explanation": "Nothing fits."}"#,
        ));
        let advisor = advisor_with(generator);

        let resolution = advisor.search(&query("premium")).await;

        assert!(resolution.is_delegated());
        assert!(resolution.value().cards.is_empty());
        assert_eq!(resolution.value().explanation, "Nothing fits.");
    }

    #[tokio::test]
    async fn test_malformed_reply_falls_back() {
        let generator = Arc::new(ScriptedGenerator::replying("Here are some cards you might like!"));
        let advisor = advisor_with(generator.clone());

        let resolution = advisor.search(&query("premium")).await;

        assert_eq!(resolution.source(), Source::Fallback);
        assert_eq!(resolution.value().ids(), vec!["hdfc-regalia", "axis-magnus"]);
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_non_conforming_structure_falls_back() {
        let generator = Arc::new(ScriptedGenerator::replying(r#"{"cards": ["axis-magnus"]}"#));
        let advisor = advisor_with(generator);

        let resolution = advisor.search(&query("nothing matches this")).await;

        assert_eq!(resolution.source(), Source::Fallback);
        assert_eq!(resolution.value().explanation, NO_MATCH_EXPLANATION);
    }

    #[tokio::test]
    async fn test_transport_failure_falls_back() {
        let advisor = advisor_with(Arc::new(ScriptedGenerator::failing()));
        let resolution = advisor.search(&query("lounge and fuel")).await;

        assert_eq!(resolution.source(), Source::Fallback);
        assert_eq!(
            resolution.value().ids(),
            vec!["hdfc-regalia", "axis-magnus", "yes-first-exclusive"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_falls_back() {
        let generator = Arc::new(
            ScriptedGenerator::replying(r#"{"cardIds": ["axis-magnus"], "explanation": "late"}"#)
                .delayed(Duration::from_secs(120)),
        );
        let settings = AdvisorSettings {
            timeout: Duration::from_secs(1),
            ..AdvisorSettings::default()
        };
        let advisor = CardAdvisor::with_generator(catalog(), generator, settings);

        let resolution = advisor.search(&query("premium")).await;

        assert_eq!(resolution.source(), Source::Fallback);
        assert_eq!(resolution.value().explanation, "Found premium credit cards with enhanced benefits.");
    }

    #[tokio::test]
    async fn test_summarize_paths() {
        let catalog = catalog();
        let card = catalog.get("kotak-811").unwrap();

        let offline = CardAdvisor::offline(catalog.clone());
        let fallback = offline.summarize(card).await;
        assert_eq!(fallback.source(), Source::Fallback);
        assert!(fallback.value().starts_with("The Kotak 811 #Dream Different Credit Card is a entry-level"));

        let generator = Arc::new(ScriptedGenerator::replying("A simple starter card."));
        let online = CardAdvisor::with_generator(catalog.clone(), generator.clone(), AdvisorSettings::default());
        let delegated = online.summarize(card).await;
        assert_eq!(delegated, Resolution::Delegated("A simple starter card.".to_string()));

        let requests = generator.requests.lock().unwrap();
        assert!(requests[0].prompt.starts_with("Generate a summary for: {\"name\":\"Kotak 811"));
    }

    #[tokio::test]
    async fn test_summarize_failure_uses_template() {
        let catalog = catalog();
        let card = catalog.get("hdfc-regalia").unwrap();
        let advisor = CardAdvisor::with_generator(
            catalog.clone(),
            Arc::new(ScriptedGenerator::failing()),
            AdvisorSettings::default(),
        );

        let resolution = advisor.summarize(card).await;

        assert_eq!(resolution, Resolution::Fallback(fallback_summary(card)));
    }

    #[tokio::test]
    async fn test_compare_single_card_skips_generation() {
        let generator = Arc::new(ScriptedGenerator::replying("should not be used"));
        let advisor = advisor_with(generator.clone());

        let resolution = advisor.compare(&["axis-magnus", "unknown"]).await;

        assert_eq!(resolution, Resolution::Fallback(COMPARISON_GUIDANCE.to_string()));
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_compare_paths() {
        let offline = CardAdvisor::offline(catalog());
        let report = offline.compare(&["icici-amazon-pay", "hdfc-regalia"]).await.into_inner();
        assert!(report.starts_with("CREDIT CARD COMPARISON ANALYSIS"));
        assert!(report.contains("For maximum rewards: ICICI Amazon Pay Credit Card"));

        let generator = Arc::new(ScriptedGenerator::replying("HDFC for travel, ICICI for shopping."));
        let online = advisor_with(generator.clone());
        let delegated = online.compare(&["icici-amazon-pay", "hdfc-regalia"]).await;
        assert!(delegated.is_delegated());

        let requests = generator.requests.lock().unwrap();
        assert!(requests[0].prompt.contains("\"joiningFee\":2500"));
        assert!(requests[0].system.contains("pros and cons"));
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{\"a\":1}```"), "{\"a\":1}");
    }

    #[test]
    fn test_bound_text_respects_char_boundaries() {
        assert_eq!(bound_text("₹₹₹₹", 2), "₹₹…");
        assert_eq!(bound_text(" short ", 10), "short");
    }

    #[test]
    fn test_sequencer_tickets() {
        let sequencer = SearchSequencer::new();
        let first = sequencer.issue();
        assert!(sequencer.is_latest(first));

        let second = sequencer.issue();
        assert!(second > first);
        assert!(!sequencer.is_latest(first));
        assert!(sequencer.is_latest(second));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequencer_discards_superseded_search() {
        let slow = CardAdvisor::with_generator(
            catalog(),
            Arc::new(
                ScriptedGenerator::replying(r#"{"cardIds": ["axis-magnus"], "explanation": "slow"}"#)
                    .delayed(Duration::from_secs(5)),
            ),
            AdvisorSettings::default(),
        );
        let fast = CardAdvisor::offline(catalog());
        let sequencer = SearchSequencer::new();
        let stale_query = query("stale");
        let fresh_query = query("premium");

        let (stale, fresh) = tokio::join!(
            sequencer.run(slow.search(&stale_query)),
            async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                sequencer.run(fast.search(&fresh_query)).await
            }
        );

        assert!(stale.is_none());
        let fresh = fresh.unwrap();
        assert_eq!(fresh.value().ids(), vec!["hdfc-regalia", "axis-magnus"]);
    }
}
