//! Storage abstraction for Voyage.
//!
//! This module defines the `StorageEngine` trait and the record types for
//! journal entries, photos, comments, reactions and profiles.
//!
//! ## Architecture
//!
//! The only backend is an Age-encrypted SQLite database held in memory and
//! written back to disk atomically on close. Row-level access control is
//! enforced by the engine against the [`Session`](crate::session::Session)
//! passed to each call.

pub mod age_sqlite;
pub mod encryption;
pub mod traits;
pub mod types;

pub use age_sqlite::AgeSqliteStorage;
pub use traits::StorageEngine;
pub use types::{
    photo_storage_path, Comment, CommentThread, FeedItem, JournalEntry, JournalFilter,
    JournalMetadata, JournalUpdate, Mood, NewJournalEntry, NewPhoto, Photo, PhotoFilter, Reaction,
    ReactionChange, ReactionCounts, ReactionKind, UserProfile, Weather,
};
