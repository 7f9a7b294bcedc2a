// 📝 Report Templates - summary and side-by-side comparison text
// Used whenever the text-generation service is unavailable.

use crate::card::{CardRecord, CardTier};
use crate::money::format_inr;
use std::fmt::Write;

pub const MIN_COMPARISON_CARDS: usize = 2;

pub const COMPARISON_GUIDANCE: &str = "Please select at least 2 cards for comparison.";

/// One-sentence pitch for a single card.
pub fn fallback_summary(card: &CardRecord) -> String {
    let fee_text = if card.is_fee_free() {
        "with no annual fee".to_string()
    } else {
        format!("with {} annual fee", format_inr(card.annual_fee))
    };
    let lounge_text = if card.lounge_access { "lounge access and " } else { "" };
    let cashback_text = if card.max_cashback() >= 4.0 {
        "high cashback rates"
    } else {
        "competitive rewards"
    };

    format!(
        "The {} is a {} credit card {}, offering {}{}. Ideal for users with minimum income of {} seeking {}.",
        card.name,
        card.tier,
        fee_text,
        lounge_text,
        cashback_text,
        format_inr(card.eligibility.min_income),
        card.tier.audience(),
    )
}

/// Cost, rewards, benefits, eligibility and recommendation sections.
/// Returns the guidance message when fewer than two cards are given.
pub fn fallback_comparison(cards: &[&CardRecord]) -> String {
    if cards.len() < MIN_COMPARISON_CARDS {
        return COMPARISON_GUIDANCE.to_string();
    }

    let mut out = String::from("CREDIT CARD COMPARISON ANALYSIS\n\n");

    // writeln! into a String cannot fail
    out.push_str("💰 COST COMPARISON:\n");
    for card in cards {
        let _ = writeln!(
            out,
            "• {}: Annual Fee {}, Joining Fee {}",
            card.name,
            format_inr(card.annual_fee),
            format_inr(card.joining_fee)
        );
    }

    out.push_str("\n🎁 REWARDS & CASHBACK:\n");
    for card in cards {
        let _ = writeln!(
            out,
            "• {}: Up to {}% cashback (Fuel: {}%, Dining: {}%)",
            card.name,
            card.max_cashback(),
            card.cashback_rate.fuel,
            card.cashback_rate.dining
        );
    }

    out.push_str("\n✈️ KEY BENEFITS:\n");
    for card in cards {
        let lounge = if card.lounge_access { "✓ Lounge Access" } else { "✗ No Lounge Access" };
        let fuel = if card.fuel_surcharge { "✓ Fuel Benefits" } else { "✗ No Fuel Benefits" };
        let _ = writeln!(out, "• {}: {}, {}", card.name, lounge, fuel);
    }

    out.push_str("\n👥 ELIGIBILITY:\n");
    for card in cards {
        let _ = writeln!(
            out,
            "• {}: Min Income {}, Credit Score {}+",
            card.name,
            format_inr(card.eligibility.min_income),
            card.eligibility.credit_score
        );
    }

    out.push_str("\n🎯 RECOMMENDATIONS:\n");
    if let Some(free) = cards.iter().find(|card| card.is_fee_free()) {
        let _ = writeln!(
            out,
            "• For cost-conscious users: {} offers good value with no annual fee",
            free.name
        );
    }
    if let Some(premium) = cards.iter().find(|card| card.tier == CardTier::Premium) {
        let _ = writeln!(
            out,
            "• For premium benefits: {} provides exclusive privileges and lounge access",
            premium.name
        );
    }
    if let Some(top) = highest_cashback(cards) {
        let _ = writeln!(
            out,
            "• For maximum rewards: {} offers the highest cashback rates",
            top.name
        );
    }

    out
}

/// Card with the highest best-category cashback; ties keep the earliest.
pub fn highest_cashback<'a>(cards: &[&'a CardRecord]) -> Option<&'a CardRecord> {
    let mut best: Option<&'a CardRecord> = None;
    for &card in cards {
        match best {
            Some(current) if card.max_cashback() <= current.max_cashback() => {}
            _ => best = Some(card),
        }
    }
    best
}

// ============================================================================
// TESTS
// ============================================================================
