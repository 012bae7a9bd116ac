use anyhow::Context;
use clap::Parser;
use scout::cli::Cli;
use scout::config::{Config, ProviderKind};
use scout::services::Scanner;
use scout::sources::{FinnhubProvider, SeriesProvider, YahooProvider};
use std::io;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scout=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let provider: Arc<dyn SeriesProvider> = match config.provider {
        ProviderKind::Yahoo => Arc::new(YahooProvider::new(config.fetch_timeout)?),
        ProviderKind::Finnhub => Arc::new(FinnhubProvider::new(
            config.finnhub_api_key.clone().unwrap_or_default(),
            config.fetch_timeout,
        )?),
    };
    info!(provider = provider.name(), "using market data provider");

    let rules = config.rules().context("loading rule set")?;
    let mut scanner = Scanner::new(provider)
        .with_settings(config.scan_settings())
        .with_rules(rules);
    if let Some(cache) = config.series_cache() {
        scanner = scanner.with_cache(Arc::new(cache));
    }

    cli.run(&scanner).await?;
    Ok(())
}
