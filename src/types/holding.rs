use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub type Price = Decimal;
pub type Shares = u64;

/// Position in one ticker symbol.
///
/// `price` and `stop_loss` are fixed by the first purchase; later buys of the
/// same symbol only add to `shares`. The stop-loss is recorded, never acted on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    pub shares: Shares,
    pub price: Price,
    pub stop_loss: Price,
}

impl Holding {
    pub fn new(shares: Shares, price: Price, stop_loss: Price) -> Self {
        Self {
            shares,
            price,
            stop_loss,
        }
    }
}
