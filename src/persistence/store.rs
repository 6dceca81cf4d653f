use async_trait::async_trait;
use thiserror::Error;

use crate::types::user::UserTable;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The document exists but does not decode as a user table.
    #[error("user store is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),
    #[error("user store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode user table: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Whole-table storage. Every load returns a fresh copy and every save
/// replaces the previous document entirely.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// An absent document loads as an empty table.
    async fn load(&self) -> Result<UserTable, StoreError>;

    async fn save(&self, table: &UserTable) -> Result<(), StoreError>;
}
