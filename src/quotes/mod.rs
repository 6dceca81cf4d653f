//! Quote provider seam: symbol -> latest closing price.

mod fixed;
mod yahoo;

pub use fixed::FixedQuotes;
pub use yahoo::{DEFAULT_BASE_URL, YahooQuotes};

use async_trait::async_trait;
use thiserror::Error;

use crate::types::holding::Price;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuoteError {
    /// The provider answered and has no price for the symbol.
    #[error("no quote for symbol {0}")]
    NotFound(String),
    /// The provider could not be reached or answered with garbage.
    #[error("quote provider unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// `symbol` is already normalized by [`normalize_symbol`].
    async fn get_price(&self, symbol: &str) -> Result<Price, QuoteError>;
}

/// Trimmed, upper-cased ticker.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}
