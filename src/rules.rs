// 🏷️ Keyword Rules - deterministic search without the AI service
// Ordered keyword rules over the lower-cased query; the first rule whose
// trigger fires decides the filter and the explanation.

use crate::card::{CardRecord, CardTier};
use crate::catalog::Catalog;
use serde::Serialize;
use tracing::debug;

/// Hard cap on cards returned by any search path
pub const MAX_RESULTS: usize = 6;

/// How many top-rated cards stand in for an empty result
pub const TOP_RATED_FALLBACK: usize = 3;

pub const NO_MATCH_EXPLANATION: &str =
    "No exact matches found. Here are our top-rated credit cards.";

/// Example questions offered to new users
pub const SAMPLE_QUERIES: [&str; 5] = [
    "Show me cards that offer lounge access and high cashback on fuel",
    "Best credit cards for first-time users with no annual fee",
    "Premium cards with dining benefits under ₹5000 annual fee",
    "Cards with highest cashback for online shopping",
    "Entry-level cards for students with low income requirements",
];

// ============================================================================
// SEARCH RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult<'a> {
    pub cards: Vec<&'a CardRecord>,
    pub explanation: String,
}

impl<'a> SearchResult<'a> {
    pub fn ids(&self) -> Vec<&'a str> {
        self.cards.iter().map(|card| card.id.as_str()).collect()
    }
}

// ============================================================================
// RULE DEFINITION
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub enum Trigger {
    /// Every phrase must appear
    All(&'static [&'static str]),
    /// At least one phrase must appear
    Any(&'static [&'static str]),
}

impl Trigger {
    /// `query` must already be lower-case
    pub fn fires(&self, query: &str) -> bool {
        match self {
            Trigger::All(phrases) => phrases.iter().all(|phrase| query.contains(phrase)),
            Trigger::Any(phrases) => phrases.iter().any(|phrase| query.contains(phrase)),
        }
    }
}

pub struct KeywordRule {
    /// Rule ID for tracing
    pub id: &'static str,
    pub trigger: Trigger,
    pub predicate: fn(&CardRecord) -> bool,
    pub explanation: &'static str,
}

impl std::fmt::Debug for KeywordRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeywordRule")
            .field("id", &self.id)
            .field("trigger", &self.trigger)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// RULE TABLE (evaluation order matters)
// ============================================================================

pub static KEYWORD_RULES: &[KeywordRule] = &[
    KeywordRule {
        id: "lounge-and-fuel",
        trigger: Trigger::All(&["lounge", "fuel"]),
        predicate: |card| card.lounge_access && card.fuel_surcharge,
        explanation: "Found cards that offer both lounge access and fuel benefits.",
    },
    KeywordRule {
        id: "no-annual-fee",
        trigger: Trigger::Any(&["no annual fee", "free"]),
        predicate: |card| card.annual_fee == 0,
        explanation: "Found cards with no annual fee.",
    },
    KeywordRule {
        id: "first-time",
        trigger: Trigger::Any(&["first-time", "beginner"]),
        predicate: |card| card.tier == CardTier::EntryLevel && card.eligibility.min_income <= 300_000,
        explanation: "Found entry-level cards suitable for first-time users.",
    },
    KeywordRule {
        id: "premium",
        trigger: Trigger::Any(&["premium"]),
        predicate: |card| card.tier == CardTier::Premium,
        explanation: "Found premium credit cards with enhanced benefits.",
    },
    KeywordRule {
        id: "cashback",
        trigger: Trigger::Any(&["cashback"]),
        predicate: |card| card.max_cashback() >= 4.0,
        explanation: "Found cards with high cashback rates.",
    },
    KeywordRule {
        id: "dining",
        trigger: Trigger::Any(&["dining"]),
        predicate: |card| card.cashback_rate.dining >= 4.0,
        explanation: "Found cards with excellent dining rewards.",
    },
    KeywordRule {
        id: "fuel",
        trigger: Trigger::Any(&["fuel"]),
        predicate: |card| card.fuel_surcharge || card.cashback_rate.fuel >= 3.0,
        explanation: "Found cards with fuel benefits and cashback.",
    },
    KeywordRule {
        id: "shopping",
        trigger: Trigger::Any(&["shopping", "online"]),
        predicate: |card| card.cashback_rate.shopping >= 3.0,
        explanation: "Found cards with good shopping rewards.",
    },
    KeywordRule {
        id: "axis-vs-hdfc",
        trigger: Trigger::All(&["axis", "hdfc"]),
        predicate: |card| {
            let bank = card.bank.to_lowercase();
            bank.contains("axis") || bank.contains("hdfc")
        },
        explanation: "Found cards from Axis Bank and HDFC Bank for comparison.",
    },
];

// ============================================================================
// RULE ENGINE
// ============================================================================

/// First rule whose trigger fires for `query`, if any.
pub fn classify(query: &str) -> Option<&'static KeywordRule> {
    let lowered = query.to_lowercase();
    KEYWORD_RULES.iter().find(|rule| rule.trigger.fires(&lowered))
}

/// Resolve a query against the catalog without any external service.
pub fn fallback_search<'a>(query: &str, catalog: &'a Catalog) -> SearchResult<'a> {
    let lowered = query.to_lowercase();

    let (mut cards, mut explanation): (Vec<&CardRecord>, String) =
        match KEYWORD_RULES.iter().find(|rule| rule.trigger.fires(&lowered)) {
            Some(rule) => {
                debug!(rule = rule.id, "keyword rule matched");
                let cards = catalog.iter().filter(|card| (rule.predicate)(card)).collect();
                (cards, rule.explanation.to_string())
            }
            None => {
                // General text search over names, banks, benefits, features
                let cards: Vec<&CardRecord> =
                    catalog.iter().filter(|card| card.mentions(&lowered)).collect();
                let explanation = format!("Found {} cards matching your search criteria.", cards.len());
                (cards, explanation)
            }
        };

    if cards.is_empty() {
        debug!("no matches, falling back to top-rated cards");
        cards = catalog.top_rated(TOP_RATED_FALLBACK);
        explanation = NO_MATCH_EXPLANATION.to_string();
    }

    cards.truncate(MAX_RESULTS);
    SearchResult { cards, explanation }
}

// ============================================================================
// TESTS
// ============================================================================
