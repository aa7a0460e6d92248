//! Output formatting helpers for the CLI.
//!
//! JSON shapes live in `json`; tables and detail views in `text`.

mod json;
mod text;

pub use json::{feed_json, journal_detail_json, journal_json, journals_json, photo_json};
pub use text::{
    print_feed, print_journal, print_journal_list, print_photo_list, print_threads, stop_label,
    JournalView,
};
