//! Storage engine trait definition.
//!
//! The `StorageEngine` trait is the interface the CLI talks to. Calls that
//! touch user-owned rows take the acting [`Session`] explicitly so the engine
//! can enforce ownership and visibility.

use std::path::Path;
use uuid::Uuid;

use super::types::{
    Comment, FeedItem, JournalEntry, JournalFilter, JournalMetadata, JournalUpdate,
    NewJournalEntry, NewPhoto, Photo, PhotoFilter, ReactionChange, ReactionCounts, ReactionKind,
    UserProfile,
};
use crate::error::Result;
use crate::session::Session;

/// Storage engine interface for encrypted journal storage.
///
/// All implementations must ensure:
/// - Data is encrypted at rest
/// - Writes to disk are atomic
/// - Only the owner can modify or delete their rows
pub trait StorageEngine: Send + Sync {
    /// Create a new journal file at the specified path.
    ///
    /// Returns the device ID recorded in the file metadata.
    ///
    /// # Errors
    ///
    /// Returns `VoyageError::Storage` if the file already exists or cannot be
    /// written, and `VoyageError::InvalidInput` for a weak passphrase.
    fn create(path: &Path, passphrase: &str) -> Result<Uuid>
    where
        Self: Sized;

    /// Open an existing journal file.
    ///
    /// # Errors
    ///
    /// Returns `VoyageError::JournalFileNotFound` if the path does not exist
    /// and `VoyageError::IncorrectPassphrase` if decryption fails.
    fn open(path: &Path, passphrase: &str) -> Result<Self>
    where
        Self: Sized;

    /// Encrypt and write the database back to disk, consuming the engine.
    fn close(self, passphrase: &str) -> Result<()>;

    /// Get journal file metadata.
    fn metadata(&self) -> Result<JournalMetadata>;

    /// Verify foreign keys, the search index and required metadata.
    fn check_integrity(&self) -> Result<()>;

    // --- Profiles ---

    /// Create or refresh the profile row for the session user.
    fn upsert_profile(&mut self, session: &Session) -> Result<UserProfile>;

    fn get_profile(&self, user_id: &Uuid) -> Result<Option<UserProfile>>;

    // --- Journal entries ---

    /// Insert a new entry owned by the session user.
    ///
    /// # Errors
    ///
    /// Returns `VoyageError::Validation` if the title is blank or the body
    /// has no content.
    fn create_journal(&mut self, session: &Session, entry: &NewJournalEntry) -> Result<Uuid>;

    /// Get an entry by ID. Returns `Ok(None)` if it does not exist.
    fn get_journal(&self, id: &Uuid) -> Result<Option<JournalEntry>>;

    /// The session user's entries, newest first.
    fn list_journals(&self, session: &Session, filter: &JournalFilter)
        -> Result<Vec<JournalEntry>>;

    /// Apply a partial update. Owner only.
    fn update_journal(&mut self, session: &Session, id: &Uuid, update: &JournalUpdate)
        -> Result<()>;

    /// Delete an entry with its comments and reactions. Owner only.
    fn delete_journal(&mut self, session: &Session, id: &Uuid) -> Result<()>;

    /// Public entries from all users, newest first.
    fn list_public_journals(&self, limit: Option<usize>) -> Result<Vec<JournalEntry>>;

    /// Full-text search over the session user's entries.
    ///
    /// Results are ordered by relevance, then recency.
    fn search_journals(&self, session: &Session, query: &str) -> Result<Vec<JournalEntry>>;

    // --- Photos ---

    fn add_photo(&mut self, session: &Session, photo: &NewPhoto) -> Result<Uuid>;

    fn get_photo(&self, id: &Uuid) -> Result<Option<Photo>>;

    /// The session user's photos, newest first.
    fn list_photos(&self, session: &Session, filter: &PhotoFilter) -> Result<Vec<Photo>>;

    /// Attach photos to an entry and finalize them.
    ///
    /// Returns the number of photos updated.
    fn link_photos(
        &mut self,
        session: &Session,
        journal_id: &Uuid,
        photo_ids: &[Uuid],
        is_public: bool,
    ) -> Result<usize>;

    fn update_photo_caption(
        &mut self,
        session: &Session,
        id: &Uuid,
        caption: Option<&str>,
    ) -> Result<()>;

    fn set_photo_public(&mut self, session: &Session, id: &Uuid, is_public: bool) -> Result<()>;

    /// Remove a photo record, returning its storage path.
    fn delete_photo(&mut self, session: &Session, id: &Uuid) -> Result<String>;

    /// Public photos attached to an entry, oldest first.
    fn public_photos_for_journal(&self, journal_id: &Uuid) -> Result<Vec<Photo>>;

    // --- Comments ---

    fn add_comment(
        &mut self,
        session: &Session,
        journal_id: &Uuid,
        content: &str,
        parent_comment_id: Option<&Uuid>,
    ) -> Result<Uuid>;

    /// Comments on an entry, oldest first.
    fn list_comments(&self, journal_id: &Uuid) -> Result<Vec<Comment>>;

    /// Delete a comment. Author only.
    fn delete_comment(&mut self, session: &Session, id: &Uuid) -> Result<()>;

    fn comment_count(&self, journal_id: &Uuid) -> Result<u64>;

    // --- Reactions ---

    fn toggle_reaction(
        &mut self,
        session: &Session,
        journal_id: &Uuid,
        kind: ReactionKind,
    ) -> Result<ReactionChange>;

    fn reaction_counts(&self, journal_id: &Uuid) -> Result<ReactionCounts>;

    fn user_reaction(&self, session: &Session, journal_id: &Uuid)
        -> Result<Option<ReactionKind>>;

    // --- Feed ---

    /// Public entries with their engagement counts, newest first.
    fn public_feed(&self, limit: Option<usize>) -> Result<Vec<FeedItem>> {
        self.list_public_journals(limit)?
            .into_iter()
            .map(|journal| {
                let reaction_counts = self.reaction_counts(&journal.id)?;
                let comment_count = self.comment_count(&journal.id)?;
                Ok(FeedItem {
                    journal,
                    reaction_counts,
                    comment_count,
                })
            })
            .collect()
    }
}
