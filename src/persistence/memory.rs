use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::persistence::store::{StoreError, UserStore};
use crate::types::user::UserTable;

/// In-process store. Holds the encoded document so loads go through the same
/// decode path as the file store.
#[derive(Default)]
pub struct MemoryStore {
    document: RwLock<Option<Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with raw bytes, e.g. to simulate a damaged document.
    pub fn with_document(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            document: RwLock::new(Some(bytes.into())),
        }
    }

    pub async fn document(&self) -> Option<Vec<u8>> {
        self.document.read().await.clone()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn load(&self) -> Result<UserTable, StoreError> {
        match self.document.read().await.as_deref() {
            None => Ok(UserTable::new()),
            Some(bytes) => serde_json::from_slice(bytes).map_err(StoreError::Corrupt),
        }
    }

    async fn save(&self, table: &UserTable) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(table).map_err(StoreError::Encode)?;
        *self.document.write().await = Some(bytes);
        Ok(())
    }
}
