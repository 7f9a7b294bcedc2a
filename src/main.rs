use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use card_advisor::logging::{init_tracing, Verbosity};
use card_advisor::{
    fee_label, format_inr, AdvisorConfig, CardAdvisor, CardRecord, Catalog, Resolution, SearchQuery,
    Source, SAMPLE_QUERIES,
};

#[derive(Parser)]
#[command(name = "card-advisor", version, about = "Browse, search and compare credit cards")]
struct Cli {
    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Errors only
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Catalog JSON file (defaults to the built-in sample cards)
    #[arg(long, global = true, value_name = "PATH")]
    catalog: Option<PathBuf>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every card in the catalog
    List,
    /// Full details for one card
    Show { id: String },
    /// Ask a question in natural language
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// One-paragraph summary of a card
    Summary { id: String },
    /// Side-by-side comparison of two or more cards
    Compare {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },
    /// Catalog statistics
    Stats,
    /// Example questions to try
    Samples,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(Verbosity::from_flags(cli.verbose, cli.quiet))?;

    let mut config = AdvisorConfig::from_env().context("Invalid environment configuration")?;
    if cli.catalog.is_some() {
        config.catalog_path = cli.catalog.clone();
    }

    let catalog = Arc::new(load_catalog(&config)?);
    if !config.is_delegation_enabled() {
        warn!("OpenAI API key not configured; using fallback search. Set OPENAI_API_KEY to enable AI answers");
    }
    let advisor = CardAdvisor::from_config(catalog, &config).context("Failed to set up AI client")?;

    match cli.command {
        Command::List => run_list(&advisor, cli.json)?,
        Command::Show { id } => run_show(&advisor, &id, cli.json)?,
        Command::Search { query } => run_search(&advisor, &query.join(" "), cli.json).await?,
        Command::Summary { id } => run_summary(&advisor, &id, cli.json).await?,
        Command::Compare { ids } => run_compare(&advisor, &ids, cli.json).await?,
        Command::Stats => run_stats(&advisor, cli.json)?,
        Command::Samples => run_samples(cli.json)?,
    }

    Ok(())
}

fn load_catalog(config: &AdvisorConfig) -> Result<Catalog> {
    let catalog = match &config.catalog_path {
        Some(path) => Catalog::from_file(path)
            .with_context(|| format!("Failed to load catalog from {:?}", path))?,
        None => Catalog::builtin().context("Built-in catalog is invalid")?,
    };
    info!(cards = catalog.len(), "catalog ready");
    Ok(catalog)
}

fn find_card<'a>(advisor: &'a CardAdvisor, id: &str) -> Result<&'a CardRecord> {
    match advisor.catalog().get(id) {
        Some(card) => Ok(card),
        None => bail!("Unknown card id: {} (run `card-advisor list`)", id),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn source_label(source: Source) -> &'static str {
    match source {
        Source::Delegated => "AI Analysis",
        Source::Fallback => "Smart Search Results",
    }
}

fn print_card_line(card: &CardRecord) {
    println!(
        "  {:<22} {:<40} {:<12} ⭐ {:<4} Fee: {}",
        card.id,
        card.name,
        card.tier,
        card.rating,
        fee_label(card.annual_fee)
    );
}

// ============================================================================
// Commands
// ============================================================================

fn run_list(advisor: &CardAdvisor, json: bool) -> Result<()> {
    if json {
        return print_json(&advisor.catalog().cards());
    }

    println!("💳 {} credit cards\n", advisor.catalog().len());
    for card in advisor.catalog() {
        print_card_line(card);
    }
    Ok(())
}

fn run_show(advisor: &CardAdvisor, id: &str, json: bool) -> Result<()> {
    let card = find_card(advisor, id)?;
    if json {
        return print_json(card);
    }

    println!("💳 {} ({})", card.name, card.bank);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Type:          {}", card.tier);
    println!("Rating:        ⭐ {}", card.rating);
    println!("Annual Fee:    {}", fee_label(card.annual_fee));
    println!("Joining Fee:   {}", fee_label(card.joining_fee));
    println!("Reward Rate:   {}x", card.reward_rate);
    println!("Welcome Bonus: {}", card.welcome_bonus);
    println!(
        "Cashback:      Fuel {}% | Dining {}% | Shopping {}% | General {}%",
        card.cashback_rate.fuel,
        card.cashback_rate.dining,
        card.cashback_rate.shopping,
        card.cashback_rate.general
    );
    println!(
        "Lounge Access: {}   Fuel Benefits: {}",
        if card.lounge_access { "✓" } else { "✗" },
        if card.fuel_surcharge { "✓" } else { "✗" }
    );

    println!("\n🎁 Benefits:");
    for benefit in &card.benefits {
        println!("  • {}", benefit);
    }
    println!("\n✨ Features:");
    for feature in &card.features {
        println!("  • {}", feature);
    }

    println!("\n👥 Eligibility:");
    println!("  Min Income:   {}", format_inr(card.eligibility.min_income));
    println!("  Min Age:      {}", card.eligibility.min_age);
    println!("  Credit Score: {}+", card.eligibility.credit_score);

    println!("\n📈 Price History:");
    for entry in &card.price_history {
        println!("  {}  {:>10}  {}", entry.period, fee_label(entry.annual_fee), entry.offer);
    }
    Ok(())
}

async fn run_search(advisor: &CardAdvisor, raw: &str, json: bool) -> Result<()> {
    let query = SearchQuery::new(raw).context("Please type a question to search")?;
    let resolution = advisor.search(&query).await;
    let source = resolution.source();
    let result = resolution.into_inner();

    if json {
        return print_json(&serde_json::json!({
            "cards": result.cards,
            "explanation": result.explanation,
            "source": source,
        }));
    }

    println!("🔍 {}: {}\n", source_label(source), result.explanation);
    for card in &result.cards {
        print_card_line(card);
    }
    Ok(())
}

async fn run_summary(advisor: &CardAdvisor, id: &str, json: bool) -> Result<()> {
    let card = find_card(advisor, id)?;
    let resolution = advisor.summarize(card).await;
    print_text(resolution, json, &format!("📝 {}", card.name))
}

async fn run_compare(advisor: &CardAdvisor, ids: &[String], json: bool) -> Result<()> {
    for id in ids {
        find_card(advisor, id)?;
    }
    let resolution = advisor.compare(ids).await;
    print_text(resolution, json, "⚖️  Comparison")
}

fn print_text(resolution: Resolution<String>, json: bool, heading: &str) -> Result<()> {
    let source = resolution.source();
    let text = resolution.into_inner();
    if json {
        return print_json(&serde_json::json!({ "text": text, "source": source }));
    }

    println!("{}", heading);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("{}", text);
    Ok(())
}

fn run_stats(advisor: &CardAdvisor, json: bool) -> Result<()> {
    let stats = advisor.catalog().stats();
    if json {
        return print_json(&stats);
    }

    println!("📊 Catalog");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Credit Cards: {}", stats.total_cards);
    println!("Avg Rating:   {:.1}", stats.average_rating);
    println!("Free Cards:   {}", stats.free_cards);
    println!("Banks:        {}", stats.bank_count);
    Ok(())
}

fn run_samples(json: bool) -> Result<()> {
    if json {
        return print_json(&SAMPLE_QUERIES);
    }

    println!("💬 Try these examples:");
    for sample in SAMPLE_QUERIES {
        println!("  card-advisor search \"{}\"", sample);
    }
    Ok(())
}
