use std::sync::Arc;

use paper_trader::api::routes::{AppSettings, AppState, app_router};
use paper_trader::config::{Config, QuoteSource};
use paper_trader::persistence::{JsonFileStore, UserStore};
use paper_trader::quotes::{FixedQuotes, QuoteProvider, YahooQuotes};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn UserStore> = Arc::new(JsonFileStore::new(&config.data_file));
    let quotes: Arc<dyn QuoteProvider> = match &config.quote_source {
        QuoteSource::Yahoo { base_url, timeout } => {
            Arc::new(YahooQuotes::new(base_url.clone(), *timeout)?)
        }
        QuoteSource::Static(table) => {
            info!("serving fixed quotes");
            Arc::new(FixedQuotes::parse(table)?)
        }
    };

    let mut settings = AppSettings {
        starting_balance: config.starting_balance,
        currency: config.currency.clone(),
        corrupt_policy: config.corrupt_policy,
        secure_cookies: config.secure_cookies,
        ..AppSettings::default()
    };
    match &config.jwt_secret {
        Some(secret) => settings.jwt_secret = secret.clone(),
        None => warn!("JWT_SECRET not set, using a per-process secret"),
    }

    let app = app_router(AppState::new(store, quotes, settings));
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, data_file = %config.data_file.display(), "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
