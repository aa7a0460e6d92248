//! UI primitives for the Voyage CLI.
//!
//! - **Context**: environment detection (TTY, width, color, unicode)
//! - **Mode**: output mode resolution (json, plain, pretty)
//! - **Theme**: badges, visibility markers, styles
//! - **Render**: headers, tables, receipts, hints
//! - **Format**: truncation, wrapping, timestamps

mod context;
pub mod format;
mod mode;
pub mod render;
pub mod theme;

pub use context::UiContext;
pub use mode::OutputMode;
pub use theme::Badge;

pub use render::{
    badge, blank_line, divider, header, hint, kv, print, receipt,
    simple_table, Column,
};

pub use format::{format_bytes, format_date, format_datetime, short_id, single_line, truncate};
