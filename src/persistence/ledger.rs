//! Serialized read-modify-write over a [`UserStore`].

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{error, warn};

use crate::persistence::store::{StoreError, UserStore};
use crate::types::user::UserTable;

/// What to do when the stored document fails to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorruptPolicy {
    /// Surface [`StoreError::Corrupt`] to the caller.
    #[default]
    FailFast,
    /// Treat the document as holding no users. The next save overwrites it.
    TreatAsEmpty,
}

/// Owns the store and the single write gate. Every mutation of the table goes
/// through [`Ledger::update`], so two writers can never interleave their
/// load and save.
pub struct Ledger {
    store: Arc<dyn UserStore>,
    write_gate: Mutex<()>,
    corrupt_policy: CorruptPolicy,
}

impl Ledger {
    pub fn new(store: Arc<dyn UserStore>, corrupt_policy: CorruptPolicy) -> Self {
        Self {
            store,
            write_gate: Mutex::new(()),
            corrupt_policy,
        }
    }

    /// Snapshot of the table. Does not take the write gate.
    pub async fn read(&self) -> Result<UserTable, StoreError> {
        match self.store.load().await {
            Ok(table) => Ok(table),
            Err(StoreError::Corrupt(e)) if self.corrupt_policy == CorruptPolicy::TreatAsEmpty => {
                warn!(error = %e, "user store is corrupt, treating as empty");
                Ok(UserTable::new())
            }
            Err(e) => {
                error!(error = %e, "failed to load user store");
                Err(e)
            }
        }
    }

    /// Load, apply `f`, and save, all under the write gate. If `f` fails the
    /// table is not saved.
    pub async fn update<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut UserTable) -> Result<T, E>,
        E: From<StoreError>,
    {
        let _guard = self.write_gate.lock().await;
        let mut table = self.read().await?;
        let out = f(&mut table)?;
        if let Err(e) = self.store.save(&table).await {
            error!(error = %e, "failed to save user store");
            return Err(e.into());
        }
        Ok(out)
    }
}
