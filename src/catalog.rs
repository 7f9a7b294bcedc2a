// 📚 Card Catalog - immutable, validated set of card records
//
// Built exactly once (sample data or a catalog file) and then only read.
// Share it with `Arc<Catalog>`; there is no way to mutate it after `new`.

use crate::card::CardRecord;
use crate::error::{CatalogError, CatalogIssue};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Sample dataset shipped with the binary
const BUILTIN_CATALOG: &str = include_str!("../data/cards.json");

// ============================================================================
// CATALOG STATS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogStats {
    pub total_cards: usize,
    /// Rounded to one decimal place
    pub average_rating: f64,
    pub free_cards: usize,
    pub bank_count: usize,
}

// ============================================================================
// CATALOG
// ============================================================================

#[derive(Debug, Clone)]
pub struct Catalog {
    cards: Vec<CardRecord>,
}

impl Catalog {
    /// Validate and freeze a set of records.
    pub fn new(cards: Vec<CardRecord>) -> Result<Self, CatalogError> {
        if cards.is_empty() {
            return Err(CatalogError::Empty);
        }

        let issues = validate_cards(&cards);
        if !issues.is_empty() {
            return Err(CatalogError::Invalid(issues));
        }

        debug!(cards = cards.len(), "catalog loaded");
        Ok(Catalog { cards })
    }

    /// The six-card sample dataset.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json_str(BUILTIN_CATALOG)
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let cards: Vec<CardRecord> = serde_json::from_str(json)?;
        Self::new(cards)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn cards(&self) -> &[CardRecord] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CardRecord> {
        self.cards.iter()
    }

    pub fn get(&self, id: &str) -> Option<&CardRecord> {
        self.cards.iter().find(|card| card.id == id)
    }

    /// Cards whose id is in `ids`, in catalog order. Unknown ids are ignored.
    pub fn select<S: AsRef<str>>(&self, ids: &[S]) -> Vec<&CardRecord> {
        self.cards
            .iter()
            .filter(|card| ids.iter().any(|id| id.as_ref() == card.id))
            .collect()
    }

    /// Highest rated first; equal ratings keep catalog order.
    pub fn top_rated(&self, n: usize) -> Vec<&CardRecord> {
        let mut ranked: Vec<&CardRecord> = self.cards.iter().collect();
        ranked.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        ranked.truncate(n);
        ranked
    }

    pub fn featured(&self, n: usize) -> Vec<&CardRecord> {
        self.cards.iter().take(n).collect()
    }

    pub fn stats(&self) -> CatalogStats {
        let total_cards = self.cards.len();
        let rating_sum: f64 = self.cards.iter().map(|card| card.rating).sum();
        let average = if total_cards == 0 {
            0.0
        } else {
            rating_sum / total_cards as f64
        };

        let banks: HashSet<&str> = self.cards.iter().map(|card| card.bank.as_str()).collect();

        CatalogStats {
            total_cards,
            average_rating: (average * 10.0).round() / 10.0,
            free_cards: self.cards.iter().filter(|card| card.is_fee_free()).count(),
            bank_count: banks.len(),
        }
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a CardRecord;
    type IntoIter = std::slice::Iter<'a, CardRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.cards.iter()
    }
}

// ============================================================================
// VALIDATION
// ============================================================================

fn validate_cards(cards: &[CardRecord]) -> Vec<CatalogIssue> {
    let mut issues = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for (index, card) in cards.iter().enumerate() {
        let label = if card.id.trim().is_empty() {
            format!("#{}", index)
        } else {
            card.id.clone()
        };
        let mut issue = |field: &str, message: String| {
            issues.push(CatalogIssue {
                card: label.clone(),
                field: field.to_string(),
                message,
            });
        };

        if card.id.trim().is_empty() {
            issue("id", "Required field is empty".to_string());
        } else if !seen.insert(card.id.as_str()) {
            issue("id", "Duplicate identifier".to_string());
        }

        if card.name.trim().is_empty() {
            issue("name", "Required field is empty".to_string());
        }
        if card.bank.trim().is_empty() {
            issue("bank", "Required field is empty".to_string());
        }

        if !card.rating.is_finite() || !(0.0..=5.0).contains(&card.rating) {
            issue("rating", format!("Must be within 0-5, got {}", card.rating));
        }

        if !card.reward_rate.is_finite() || card.reward_rate <= 0.0 {
            issue("rewardRate", format!("Must be positive, got {}", card.reward_rate));
        }

        let rates = &card.cashback_rate;
        for (field, value) in [
            ("cashbackRate.fuel", rates.fuel),
            ("cashbackRate.dining", rates.dining),
            ("cashbackRate.shopping", rates.shopping),
            ("cashbackRate.general", rates.general),
        ] {
            if !value.is_finite() || value < 0.0 {
                issue(field, format!("Must be a non-negative percentage, got {}", value));
            }
        }

        for entry in &card.price_history {
            if parse_period(&entry.period).is_none() {
                issue(
                    "priceHistory.date",
                    format!("Expected YYYY-MM, got {:?}", entry.period),
                );
            }
        }
    }

    issues
}

/// `YYYY-MM` → first day of that month
fn parse_period(period: &str) -> Option<NaiveDate> {
    if period.len() != 7 {
        return None;
    }
    NaiveDate::parse_from_str(&format!("{}-01", period), "%Y-%m-%d").ok()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::tests::sample_card;

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = Catalog::builtin().unwrap();

        assert_eq!(catalog.len(), 6);
        let ids: Vec<&str> = catalog.iter().map(|card| card.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "hdfc-regalia",
                "axis-magnus",
                "sbi-cashback",
                "icici-amazon-pay",
                "kotak-811",
                "yes-first-exclusive",
            ]
        );
    }

    #[test]
    fn test_get_and_select() {
        let catalog = Catalog::builtin().unwrap();

        assert_eq!(catalog.get("kotak-811").unwrap().bank, "Kotak Mahindra Bank");
        assert!(catalog.get("missing").is_none());

        // Catalog order, unknown ids dropped, duplicates collapse
        let picked = catalog.select(&["yes-first-exclusive", "nope", "hdfc-regalia", "hdfc-regalia"]);
        let ids: Vec<&str> = picked.iter().map(|card| card.id.as_str()).collect();
        assert_eq!(ids, vec!["hdfc-regalia", "yes-first-exclusive"]);
    }

    #[test]
    fn test_top_rated_is_stable() {
        let mut first = sample_card("first");
        first.rating = 4.0;
        let mut best = sample_card("best");
        best.rating = 4.8;
        let mut second = sample_card("second");
        second.rating = 4.0;
        let mut low = sample_card("low");
        low.rating = 2.0;

        let catalog = Catalog::new(vec![first, best, second, low]).unwrap();
        let ids: Vec<&str> = catalog.top_rated(3).iter().map(|card| card.id.as_str()).collect();

        assert_eq!(ids, vec!["best", "first", "second"]);
        // Catalog itself is untouched
        assert_eq!(catalog.cards()[0].id, "first");
    }

    #[test]
    fn test_featured_takes_catalog_order() {
        let catalog = Catalog::builtin().unwrap();
        let ids: Vec<&str> = catalog.featured(2).iter().map(|card| card.id.as_str()).collect();

        assert_eq!(ids, vec!["hdfc-regalia", "axis-magnus"]);
        assert_eq!(catalog.featured(10).len(), 6);
    }

    #[test]
    fn test_stats() {
        let catalog = Catalog::builtin().unwrap();
        let stats = catalog.stats();

        assert_eq!(stats.total_cards, 6);
        assert!(stats.average_rating >= 4.1 && stats.average_rating <= 4.2);
        assert_eq!(stats.free_cards, 1);
        assert_eq!(stats.bank_count, 6);
    }

    #[test]
    fn test_stats_average_is_rounded() {
        let mut a = sample_card("a");
        a.rating = 4.0;
        a.annual_fee = 0;
        let mut b = sample_card("b");
        b.rating = 4.4;
        let mut c = sample_card("c");
        c.rating = 4.2;
        c.bank = "Other Bank".to_string();

        let stats = Catalog::new(vec![a, b, c]).unwrap().stats();

        assert_eq!(stats.average_rating, 4.2);
        assert_eq!(stats.free_cards, 1);
        assert_eq!(stats.bank_count, 2);
    }

    #[test]
    fn test_empty_catalog_rejected() {
        assert!(matches!(Catalog::new(vec![]), Err(CatalogError::Empty)));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let result = Catalog::new(vec![sample_card("dup"), sample_card("dup")]);

        match result {
            Err(CatalogError::Invalid(issues)) => {
                assert_eq!(issues.len(), 1);
                assert_eq!(issues[0].field, "id");
                assert_eq!(issues[0].message, "Duplicate identifier");
            }
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn test_collects_every_issue() {
        let mut card = sample_card("broken");
        card.rating = 5.5;
        card.reward_rate = 0.0;
        card.cashback_rate.dining = -1.0;
        card.price_history[0].period = "January 2024".to_string();

        let issues = match Catalog::new(vec![card]) {
            Err(CatalogError::Invalid(issues)) => issues,
            other => panic!("expected validation failure, got {:?}", other),
        };

        let fields: Vec<&str> = issues.iter().map(|issue| issue.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["rating", "rewardRate", "cashbackRate.dining", "priceHistory.date"]
        );
    }

    #[test]
    fn test_parse_period() {
        assert_eq!(parse_period("2023-06"), NaiveDate::from_ymd_opt(2023, 6, 1));
        assert!(parse_period("2023-13").is_none());
        assert!(parse_period("2023-6").is_none());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            Catalog::from_json_str("[{\"id\": 1}]"),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = Catalog::from_file("/definitely/not/here/cards.json");
        assert!(matches!(result, Err(CatalogError::Io { .. })));
    }
}
