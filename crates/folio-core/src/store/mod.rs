//! Keyed storage layer.
//!
//! Everything Folio persists goes through the [`KeyedStore`] trait: project
//! documents, the session flag, the catalog index and the secret override
//! all live side by side under their own keys (see [`keys`]).

pub mod keys;
pub mod memory;
pub mod sqlite;
pub mod traits;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{KeyedStore, StoreOp};
