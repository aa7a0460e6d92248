//! Input and parsing helper functions for the CLI.
//!
//! This module provides utilities for:
//! - Passphrase prompting and entry body reading (`input`)
//! - The plain-text body editing format (`compose`)
//! - Datetime, enum and ID parsing (`parsing`)

mod compose;
mod input;
mod parsing;

// Re-export public API
pub use compose::{append_photo_blocks, blocks_to_text, text_to_blocks, trim_placeholder};
pub use input::{
    prompt_init_passphrase, prompt_passphrase, read_body_from_editor, read_entry_body,
    read_piped_stdin,
};
pub use parsing::{
    parse_clearable, parse_datetime, parse_mood, parse_timezone, parse_uuid, parse_weather,
    resolve_journal_id, resolve_photo_id,
};
