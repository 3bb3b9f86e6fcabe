mod config;

use std::sync::Arc;

use anyhow::Result;
use coinwatch_core::format::{as_currency_with_2_decimals, as_percent_string};
use coinwatch_core::storage::image_store::FileImageStore;
use coinwatch_core::storage::portfolio_store::PortfolioStore;
use coinwatch_core::CoinWatch;
use tracing::{info, warn};

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let config = config::Config::from_env()?;

    info!(portfolio = %config.portfolio_file.display(), "coinwatch starting");

    // A portfolio that cannot be opened is the one fatal condition.
    let portfolio = PortfolioStore::open_file(&config.portfolio_file)?;
    let images = Arc::new(FileImageStore::new(config.cache_dir.join("images")));
    let app = CoinWatch::new(config.settings.clone(), portfolio, images);

    let pipeline = app.start_pipeline();
    pipeline.set_sort_option(config.sort_option);
    pipeline.set_search_text(config.search_text.clone());

    let state = pipeline.wait_until_settled().await?;

    if let Some(err) = &state.error_message {
        warn!(error = %err, "showing last known data");
        eprintln!("warning: {err}");
    }

    for stat in &state.statistics {
        match stat.percentage_change {
            Some(pct) => println!("{:<16} {:>20} ({})", stat.title, stat.value, as_percent_string(pct)),
            None => println!("{:<16} {:>20}", stat.title, stat.value),
        }
    }
    println!();

    for coin in state.coins.iter().take(config.rows) {
        let change = coin
            .price_change_percent_24h
            .map(as_percent_string)
            .unwrap_or_default();
        println!(
            "{:>4}  {:<8} {:>16} {:>10}",
            coin.rank(),
            coin.symbol.to_uppercase(),
            as_currency_with_2_decimals(coin.current_price),
            change
        );
    }

    if !state.portfolio_coins.is_empty() {
        println!();
        println!("Portfolio");
        for coin in &state.portfolio_coins {
            println!(
                "  {:<8} {:>14} {:>16}",
                coin.symbol.to_uppercase(),
                coin.current_holdings.unwrap_or_default(),
                as_currency_with_2_decimals(coin.current_holding_value())
            );
        }
    }

    Ok(())
}
