//! Application-level utilities for the Voyage CLI.
//!
//! This module provides:
//! - Application context for unified CLI + config handling
//! - Path resolution for config and journal files
//! - Passphrase handling with retry logic

mod context;
mod passphrase;
mod resolver;

// Re-export public API
pub use context::AppContext;
pub use resolver::{missing_journal_message, resolve_config_path};
