//! # Folio Core
//!
//! Core library for Folio - a local, single-user catalog of project pages.
//!
//! This crate provides the document model, the block editor, the keyed
//! store, the session gate and the import/export codec, independent of any
//! front end.
//!
//! ## Architecture
//!
//! - **store**: Keyed store trait with in-memory and SQLite backends
//! - **session**: Shared-secret session gate
//! - **document**: Project documents and content blocks
//! - **editor**: Block insert/update/delete/move operations
//! - **catalog**: Categories, project membership and `slugify`
//! - **codec**: Portable JSON export envelope
//! - **autosave**: Debounce and periodic flush scheduling
//! - **workspace**: Application controller tying the pieces together

pub mod autosave;
pub mod catalog;
pub mod clock;
pub mod codec;
pub mod document;
pub mod editor;
pub mod error;
pub mod fs;
pub mod session;
pub mod store;
pub mod workspace;

pub use catalog::{slugify, CatalogIndex, Category};
pub use clock::{Clock, ManualClock, SystemClock};
pub use document::{Block, BlockKind, Document};
pub use error::{FolioError, Result};
pub use session::SessionGate;
pub use store::{KeyedStore, MemoryStore, SqliteStore, StoreOp};
pub use workspace::Workspace;

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
