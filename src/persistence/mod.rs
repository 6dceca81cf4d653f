//! User table persistence: the store seam, its file and in-memory backends,
//! and the ledger that serializes writes.

mod json_file;
mod ledger;
mod memory;
mod store;

pub use json_file::JsonFileStore;
pub use ledger::{CorruptPolicy, Ledger};
pub use memory::MemoryStore;
pub use store::{StoreError, UserStore};
