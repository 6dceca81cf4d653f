use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use crate::quotes::{QuoteError, QuoteProvider, normalize_symbol};
use crate::types::holding::Price;

/// Prices from a table held in memory. Used offline and in tests.
#[derive(Default)]
pub struct FixedQuotes {
    prices: RwLock<HashMap<String, Price>>,
}

impl FixedQuotes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_prices<I, S>(prices: I) -> Self
    where
        I: IntoIterator<Item = (S, Price)>,
        S: AsRef<str>,
    {
        let prices = prices
            .into_iter()
            .map(|(s, p)| (normalize_symbol(s.as_ref()), p))
            .collect();
        Self {
            prices: RwLock::new(prices),
        }
    }

    /// Parse `SYM=price,SYM=price`.
    pub fn parse(spec: &str) -> Result<Self, String> {
        let mut prices = Vec::new();
        for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (symbol, price) = entry
                .split_once('=')
                .ok_or_else(|| format!("expected SYMBOL=PRICE, got {entry:?}"))?;
            let price: Decimal = price
                .trim()
                .parse()
                .map_err(|e| format!("bad price for {symbol}: {e}"))?;
            prices.push((symbol.to_string(), price));
        }
        Ok(Self::from_prices(prices))
    }

    pub async fn set_price(&self, symbol: &str, price: Price) {
        self.prices
            .write()
            .await
            .insert(normalize_symbol(symbol), price);
    }
}

#[async_trait]
impl QuoteProvider for FixedQuotes {
    async fn get_price(&self, symbol: &str) -> Result<Price, QuoteError> {
        self.prices
            .read()
            .await
            .get(symbol)
            .copied()
            .ok_or_else(|| QuoteError::NotFound(symbol.to_string()))
    }
}
