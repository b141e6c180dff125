//! Application-level utilities for the Folio CLI.
//!
//! This module provides:
//! - Application context for unified CLI + config handling
//! - Workspace construction (store, session gate, seed catalog)
//! - Secret entry and confirmation prompts

mod context;
mod prompt;

pub use context::{AppContext, FolioWorkspace};
pub use prompt::{confirm_action, read_new_secret, read_secret};
