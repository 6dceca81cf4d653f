//! The buy transition: quote, affordability check, holding and balance
//! update, transaction log, persist. Testable without HTTP.

use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, warn};

use crate::persistence::{Ledger, StoreError};
use crate::quotes::{QuoteError, QuoteProvider, normalize_symbol};
use crate::types::holding::{Price, Shares};

#[derive(Debug, Error)]
pub enum TradeError {
    #[error("Shares must be a positive whole number.")]
    InvalidShares,
    #[error("Stop-loss must be a non-negative number.")]
    InvalidStopLoss,
    /// The holding's share count would overflow.
    #[error("Position too large.")]
    PositionTooLarge,
    #[error("Stock not found.")]
    SymbolNotFound(String),
    #[error("Quote service unavailable.")]
    QuoteUnavailable,
    #[error("Insufficient balance.")]
    InsufficientBalance { required: Decimal, available: Decimal },
    /// The session names an account that is no longer in the table.
    #[error("Account not found.")]
    UnknownAccount,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<QuoteError> for TradeError {
    fn from(e: QuoteError) -> Self {
        match e {
            QuoteError::NotFound(symbol) => TradeError::SymbolNotFound(symbol),
            QuoteError::Unavailable(_) => TradeError::QuoteUnavailable,
        }
    }
}

/// A validated buy request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuyOrder {
    pub symbol: String,
    pub shares: Shares,
    pub stop_loss: Price,
}

impl BuyOrder {
    pub fn new(symbol: &str, shares: Shares, stop_loss: Price) -> Self {
        Self {
            symbol: normalize_symbol(symbol),
            shares,
            stop_loss,
        }
    }

    /// Build from raw form fields.
    pub fn parse(symbol: &str, shares: &str, stop_loss: &str) -> Result<Self, TradeError> {
        let shares = shares
            .trim()
            .parse::<Shares>()
            .ok()
            .filter(|s| *s > 0)
            .ok_or(TradeError::InvalidShares)?;
        let stop_loss = stop_loss
            .trim()
            .parse::<Price>()
            .ok()
            .filter(|p| !p.is_sign_negative())
            .ok_or(TradeError::InvalidStopLoss)?;
        Ok(Self::new(symbol, shares, stop_loss))
    }
}

/// A committed buy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fill {
    pub symbol: String,
    pub shares: Shares,
    pub price: Price,
    pub total: Decimal,
    pub balance: Decimal,
}

pub fn transaction_line(
    currency: &str,
    shares: Shares,
    symbol: &str,
    price: Price,
    stop_loss: Price,
) -> String {
    format!(
        "Bought {shares} shares of {symbol} at {currency}{price} each with stop-loss {currency}{stop_loss}"
    )
}

pub struct TradingDesk {
    ledger: Arc<Ledger>,
    quotes: Arc<dyn QuoteProvider>,
    currency: String,
}

impl TradingDesk {
    pub fn new(
        ledger: Arc<Ledger>,
        quotes: Arc<dyn QuoteProvider>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            ledger,
            quotes,
            currency: currency.into(),
        }
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Latest price for `symbol`. Returns the normalized symbol with it.
    pub async fn quote(&self, symbol: &str) -> Result<(String, Price), QuoteError> {
        let symbol = normalize_symbol(symbol);
        if symbol.is_empty() {
            return Err(QuoteError::NotFound(symbol));
        }
        let price = self.quotes.get_price(&symbol).await?;
        Ok((symbol, price))
    }

    /// Execute a buy for `email`. Either every effect is persisted or none is.
    pub async fn buy(&self, email: &str, order: BuyOrder) -> Result<Fill, TradeError> {
        let (symbol, price) = self.quote(&order.symbol).await.inspect_err(|e| {
            warn!(email, symbol = %order.symbol, error = %e, "quote failed for buy");
        })?;
        let shares = order.shares;
        let stop_loss = order.stop_loss;
        // An unrepresentable total can never be afforded.
        let total = Decimal::from(shares).checked_mul(price);
        let currency = self.currency.as_str();

        let fill = self
            .ledger
            .update(|users| {
                let user = users.get_mut(email).ok_or(TradeError::UnknownAccount)?;
                let total = match total {
                    Some(total) if user.balance >= total => total,
                    _ => {
                        return Err(TradeError::InsufficientBalance {
                            required: total.unwrap_or(Decimal::MAX),
                            available: user.balance,
                        });
                    }
                };

                user.add_shares(&symbol, shares, price, stop_loss)
                    .ok_or(TradeError::PositionTooLarge)?;
                user.balance -= total;
                user.transactions.push(transaction_line(
                    currency, shares, &symbol, price, stop_loss,
                ));
                Ok(Fill {
                    symbol: symbol.clone(),
                    shares,
                    price,
                    total,
                    balance: user.balance,
                })
            })
            .await
            .inspect_err(|e| {
                if let TradeError::InsufficientBalance { required, available } = e {
                    warn!(email, symbol = %symbol, %required, %available, "buy rejected");
                }
            })?;

        info!(
            email,
            symbol = %fill.symbol,
            shares = fill.shares,
            price = %fill.price,
            balance = %fill.balance,
            "buy committed"
        );
        Ok(fill)
    }
}
