// 💳 Card Entity - one credit card offering
// Identity is the stable `id` string; everything else is a value loaded
// once with the catalog and never changed afterwards.

use serde::{Deserialize, Serialize};

// ============================================================================
// CARD TIER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CardTier {
    /// High fee, lounge access, travel perks
    Premium,

    MidTier,

    /// Low fee, easy approval
    EntryLevel,
}

impl CardTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardTier::Premium => "premium",
            CardTier::MidTier => "mid-tier",
            CardTier::EntryLevel => "entry-level",
        }
    }

    /// Who the card is pitched at, used in generated summaries
    pub fn audience(&self) -> &'static str {
        match self {
            CardTier::Premium => "premium benefits and exclusive privileges",
            CardTier::EntryLevel => "simple rewards and easy approval",
            CardTier::MidTier => "balanced features and good value",
        }
    }
}

impl std::fmt::Display for CardTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

// ============================================================================
// VALUE RECORDS
// ============================================================================

/// Cashback percentages per spend category. Independent values, they do
/// not need to add up to anything.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CashbackRate {
    pub fuel: f64,
    pub dining: f64,
    pub shopping: f64,
    pub general: f64,
}

impl CashbackRate {
    pub fn as_array(&self) -> [f64; 4] {
        [self.fuel, self.dining, self.shopping, self.general]
    }

    /// Best rate across all categories
    pub fn max_rate(&self) -> f64 {
        self.as_array().into_iter().fold(f64::MIN, f64::max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Eligibility {
    /// Annual income in rupees
    pub min_income: u64,
    pub min_age: u32,
    pub credit_score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceHistoryEntry {
    /// Month label, `YYYY-MM`
    #[serde(rename = "date")]
    pub period: String,
    pub annual_fee: u64,
    pub offer: String,
}

// ============================================================================
// CARD RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRecord {
    /// Stable identity, unique across the catalog
    pub id: String,
    pub name: String,
    pub bank: String,
    #[serde(rename = "type")]
    pub tier: CardTier,

    /// Whole rupees
    pub annual_fee: u64,
    pub joining_fee: u64,

    /// Reward multiplier (e.g. 4 means 4x points)
    pub reward_rate: f64,
    pub welcome_bonus: String,
    pub lounge_access: bool,

    /// Fuel surcharge waiver
    pub fuel_surcharge: bool,
    pub cashback_rate: CashbackRate,
    pub benefits: Vec<String>,
    pub eligibility: Eligibility,
    pub features: Vec<String>,

    /// URL or local path
    pub image: String,

    /// 0.0 - 5.0
    pub rating: f64,
    pub price_history: Vec<PriceHistoryEntry>,
}

impl CardRecord {
    pub fn is_fee_free(&self) -> bool {
        self.annual_fee == 0
    }

    pub fn max_cashback(&self) -> f64 {
        self.cashback_rate.max_rate()
    }

    /// Case-insensitive substring check over name, bank, benefits and features.
    /// `needle` must already be lower-case.
    pub fn mentions(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.bank.to_lowercase().contains(needle)
            || self
                .benefits
                .iter()
                .any(|benefit| benefit.to_lowercase().contains(needle))
            || self
                .features
                .iter()
                .any(|feature| feature.to_lowercase().contains(needle))
    }

    pub fn search_projection(&self) -> SearchProjection<'_> {
        SearchProjection {
            id: &self.id,
            name: &self.name,
            bank: &self.bank,
            tier: self.tier,
            annual_fee: self.annual_fee,
            lounge_access: self.lounge_access,
            fuel_surcharge: self.fuel_surcharge,
            cashback_rate: &self.cashback_rate,
            benefits: &self.benefits,
            eligibility: &self.eligibility,
            rating: self.rating,
        }
    }

    pub fn summary_projection(&self) -> SummaryProjection<'_> {
        SummaryProjection {
            name: &self.name,
            bank: &self.bank,
            tier: self.tier,
            annual_fee: self.annual_fee,
            cashback_rate: &self.cashback_rate,
            benefits: &self.benefits,
            eligibility: &self.eligibility,
        }
    }

    pub fn comparison_projection(&self) -> ComparisonProjection<'_> {
        ComparisonProjection {
            name: &self.name,
            bank: &self.bank,
            annual_fee: self.annual_fee,
            joining_fee: self.joining_fee,
            cashback_rate: &self.cashback_rate,
            benefits: &self.benefits,
            eligibility: &self.eligibility,
            lounge_access: self.lounge_access,
            rating: self.rating,
        }
    }
}

// ============================================================================
// PROJECTIONS (sent to the text-generation service)
// ============================================================================

/// Matching criteria only: no image, price history, welcome bonus or features.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchProjection<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub bank: &'a str,
    #[serde(rename = "type")]
    pub tier: CardTier,
    pub annual_fee: u64,
    pub lounge_access: bool,
    pub fuel_surcharge: bool,
    pub cashback_rate: &'a CashbackRate,
    pub benefits: &'a [String],
    pub eligibility: &'a Eligibility,
    pub rating: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryProjection<'a> {
    pub name: &'a str,
    pub bank: &'a str,
    #[serde(rename = "type")]
    pub tier: CardTier,
    pub annual_fee: u64,
    pub cashback_rate: &'a CashbackRate,
    pub benefits: &'a [String],
    pub eligibility: &'a Eligibility,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonProjection<'a> {
    pub name: &'a str,
    pub bank: &'a str,
    pub annual_fee: u64,
    pub joining_fee: u64,
    pub cashback_rate: &'a CashbackRate,
    pub benefits: &'a [String],
    pub eligibility: &'a Eligibility,
    pub lounge_access: bool,
    pub rating: f64,
}

// ============================================================================
// TESTS
// ============================================================================
