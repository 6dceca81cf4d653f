use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::holding::{Holding, Price, Shares};

/// Whole persisted document: email -> record. Ordered so a reload writes the
/// same document back.
pub type UserTable = BTreeMap<String, UserRecord>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Argon2 PHC string. Kept under the `password` key of the document.
    #[serde(rename = "password")]
    pub password_hash: String,
    pub balance: Decimal,
    #[serde(default)]
    pub portfolio: BTreeMap<String, Holding>,
    #[serde(default)]
    pub transactions: Vec<String>,
}

impl UserRecord {
    pub fn new(password_hash: String, starting_balance: Decimal) -> Self {
        Self {
            password_hash,
            balance: starting_balance,
            portfolio: BTreeMap::new(),
            transactions: Vec::new(),
        }
    }

    /// Add shares to the holding for `symbol`, opening it at `price` and
    /// `stop_loss` if absent. An existing holding keeps its first price.
    /// Returns the new share count, or `None` (leaving the record untouched)
    /// if the count would overflow.
    pub fn add_shares(
        &mut self,
        symbol: &str,
        shares: Shares,
        price: Price,
        stop_loss: Price,
    ) -> Option<Shares> {
        match self.portfolio.get_mut(symbol) {
            Some(holding) => {
                holding.shares = holding.shares.checked_add(shares)?;
                Some(holding.shares)
            }
            None => {
                self.portfolio
                    .insert(symbol.to_string(), Holding::new(shares, price, stop_loss));
                Some(shares)
            }
        }
    }
}

/// Public view of a user: everything except the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct AccountSummary {
    pub email: String,
    pub balance: Decimal,
    pub portfolio: BTreeMap<String, Holding>,
    pub transactions: Vec<String>,
}

impl AccountSummary {
    pub fn from_record(email: &str, record: &UserRecord) -> Self {
        Self {
            email: email.to_string(),
            balance: record.balance,
            portfolio: record.portfolio.clone(),
            transactions: record.transactions.clone(),
        }
    }
}
