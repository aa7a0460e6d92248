//! Age-encrypted SQLite storage backend.
//!
//! This module provides an encrypted SQLite storage engine using Age
//! passphrase encryption. The database is held in memory and serialized
//! to disk with encryption on close.

mod row;
mod validation;

use std::fs;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::serialize::OwnedData;
use rusqlite::{Connection, DatabaseName, OptionalExtension, Params};
use uuid::Uuid;

use crate::crypto::validate_passphrase;
use crate::error::{Result, VoyageError};
use crate::fs::write_atomic;
use crate::session::Session;
use crate::storage::encryption::{decrypt, encrypt};
use crate::storage::traits::StorageEngine;
use crate::storage::types::{
    Comment, JournalEntry, JournalFilter, JournalMetadata, JournalUpdate, NewJournalEntry,
    NewPhoto, Photo, PhotoFilter, ReactionChange, ReactionCounts, ReactionKind, UserProfile,
};

use row::{
    parse_timestamp, parse_uuid, timestamp, CommentRow, JournalRow, PhotoRow, ProfileRow,
    COMMENT_COLUMNS, JOURNAL_COLUMNS, PHOTO_COLUMNS,
};
use validation::{
    fts_body, normalize_caption, normalize_comment, normalize_title, validate_content,
    validate_location,
};

/// On-disk format version written to new journal files.
pub const FORMAT_VERSION: &str = "0.1";

const SCHEMA: &str = r#"
    CREATE TABLE meta (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE user_profiles (
        id TEXT PRIMARY KEY,
        display_name TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE TABLE journals (
        id TEXT PRIMARY KEY,
        stop_id INTEGER NOT NULL,
        user_id TEXT NOT NULL,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        mood TEXT,
        weather TEXT,
        is_public INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE INDEX journals_user_created ON journals (user_id, created_at);
    CREATE INDEX journals_public_created ON journals (is_public, created_at);

    CREATE VIRTUAL TABLE journals_fts USING fts5(
        journal_id UNINDEXED,
        title,
        body,
        tokenize = 'porter'
    );

    CREATE TABLE photos (
        id TEXT PRIMARY KEY,
        stop_id INTEGER NOT NULL,
        journal_id TEXT,
        user_id TEXT NOT NULL,
        storage_path TEXT NOT NULL UNIQUE,
        caption TEXT,
        taken_at TEXT,
        lat REAL,
        lon REAL,
        is_public INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        temp_session_id TEXT,

        FOREIGN KEY (journal_id) REFERENCES journals(id) ON DELETE SET NULL
    );

    CREATE TABLE comments (
        id TEXT PRIMARY KEY,
        journal_id TEXT NOT NULL,
        user_id TEXT NOT NULL,
        content TEXT NOT NULL,
        parent_comment_id TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,

        FOREIGN KEY (journal_id) REFERENCES journals(id) ON DELETE CASCADE,
        FOREIGN KEY (parent_comment_id) REFERENCES comments(id) ON DELETE CASCADE
    );

    -- One reaction per user per entry
    CREATE TABLE reactions (
        id TEXT PRIMARY KEY,
        journal_id TEXT NOT NULL,
        user_id TEXT NOT NULL,
        reaction_type TEXT NOT NULL,
        created_at TEXT NOT NULL,

        UNIQUE (journal_id, user_id),
        FOREIGN KEY (journal_id) REFERENCES journals(id) ON DELETE CASCADE
    );
"#;

/// Age-encrypted SQLite storage engine.
pub struct AgeSqliteStorage {
    path: PathBuf,
    conn: Mutex<Connection>,
    device_id: Uuid,
}

impl AgeSqliteStorage {
    /// Lock the database connection, returning an error if the mutex is poisoned.
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| VoyageError::Storage("SQLite connection poisoned".to_string()))
    }

    /// Path of the journal file this engine writes to on close.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn owned_data_from_bytes(bytes: &[u8]) -> Result<OwnedData> {
        if bytes.is_empty() {
            return Err(VoyageError::Storage("SQLite payload is empty".to_string()));
        }

        let size: i32 = bytes
            .len()
            .try_into()
            .map_err(|_| VoyageError::Storage("SQLite payload too large".to_string()))?;

        // SAFETY: sqlite3_malloc returns a valid pointer or null; null is
        // rejected immediately below. `size` fits in i32.
        let raw = unsafe { rusqlite::ffi::sqlite3_malloc(size) as *mut u8 };
        if raw.is_null() {
            return Err(VoyageError::Storage("SQLite allocation failed".to_string()));
        }

        // SAFETY:
        // - `raw` is non-null and writable for `bytes.len()` bytes (== size)
        // - `bytes` is valid for reads of `bytes.len()` bytes
        // - the regions cannot overlap since `raw` is freshly allocated
        // - `OwnedData` takes ownership of the sqlite3_malloc'd buffer and
        //   SQLite frees it when the data is dropped or consumed
        unsafe {
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), raw, bytes.len());
            let ptr = NonNull::new(raw).ok_or_else(|| {
                VoyageError::Storage("SQLite allocation returned null".to_string())
            })?;
            Ok(OwnedData::from_raw_nonnull(ptr, bytes.len()))
        }
    }

    fn read_meta(conn: &Connection, key: &str) -> Result<String> {
        conn.query_row("SELECT value FROM meta WHERE key = ?", [key], |row| {
            row.get(0)
        })
        .optional()?
        .ok_or_else(|| VoyageError::Storage(format!("Metadata key missing: {}", key)))
    }

    fn touch(conn: &Connection) -> Result<()> {
        conn.execute(
            "UPDATE meta SET value = ? WHERE key = 'last_modified'",
            [timestamp(Utc::now())],
        )?;
        Ok(())
    }

    fn query_journals<P: Params>(
        conn: &Connection,
        sql: &str,
        params: P,
    ) -> Result<Vec<JournalEntry>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, JournalRow::from_row)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?.try_into()?);
        }
        Ok(entries)
    }

    fn query_photos<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<Photo>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, PhotoRow::from_row)?;
        let mut photos = Vec::new();
        for row in rows {
            photos.push(row?.try_into()?);
        }
        Ok(photos)
    }

    /// Owner and visibility of an entry.
    fn journal_access(conn: &Connection, id: &Uuid) -> Result<(Uuid, bool)> {
        let found: Option<(String, bool)> = conn
            .query_row(
                "SELECT user_id, is_public FROM journals WHERE id = ?",
                [id.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let (user_id, is_public) = found.ok_or(VoyageError::JournalNotFound(*id))?;
        Ok((parse_uuid(&user_id, "user")?, is_public))
    }

    /// Fail unless the session owns the entry. Returns its current visibility.
    fn require_journal_owner(conn: &Connection, session: &Session, id: &Uuid) -> Result<bool> {
        let (owner, is_public) = Self::journal_access(conn, id)?;
        if !session.owns(&owner) {
            return Err(VoyageError::PermissionDenied(
                "Only the author can change this entry".to_string(),
            ));
        }
        Ok(is_public)
    }

    /// Fail unless the session may read the entry (public or owned).
    fn require_journal_visible(conn: &Connection, session: &Session, id: &Uuid) -> Result<()> {
        let (owner, is_public) = Self::journal_access(conn, id)?;
        if !is_public && !session.owns(&owner) {
            return Err(VoyageError::PermissionDenied(
                "This entry is private".to_string(),
            ));
        }
        Ok(())
    }

    fn require_photo_owner(conn: &Connection, session: &Session, id: &Uuid) -> Result<()> {
        let owner: Option<String> = conn
            .query_row(
                "SELECT user_id FROM photos WHERE id = ?",
                [id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        let owner = owner.ok_or_else(|| VoyageError::NotFound(format!("Photo {}", id)))?;
        if !session.owns(&parse_uuid(&owner, "user")?) {
            return Err(VoyageError::PermissionDenied(
                "Only the uploader can change this photo".to_string(),
            ));
        }
        Ok(())
    }

    fn write_fts(conn: &Connection, id: &Uuid, title: &str, content: &str) -> Result<()> {
        let body = fts_body(&crate::content::parse_blocks(content));
        conn.execute(
            "DELETE FROM journals_fts WHERE journal_id = ?",
            [id.to_string()],
        )?;
        conn.execute(
            "INSERT INTO journals_fts (journal_id, title, body) VALUES (?, ?, ?)",
            (id.to_string(), title, body),
        )?;
        Ok(())
    }
}

impl StorageEngine for AgeSqliteStorage {
    fn create(path: &Path, passphrase: &str) -> Result<Uuid> {
        if path.exists() {
            return Err(VoyageError::Storage(
                "Journal file already exists".to_string(),
            ));
        }

        validate_passphrase(passphrase)?;

        let device_id = Uuid::new_v4();
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;

        let created_at = timestamp(Utc::now());
        for (key, value) in [
            ("format_version", FORMAT_VERSION.to_string()),
            ("device_id", device_id.to_string()),
            ("created_at", created_at.clone()),
            ("last_modified", created_at),
        ] {
            conn.execute("INSERT INTO meta (key, value) VALUES (?, ?)", (key, value))?;
        }

        let plaintext = conn.serialize(DatabaseName::Main)?;
        let encrypted = encrypt(plaintext.as_ref(), passphrase)?;
        write_atomic(path, &encrypted)?;

        tracing::debug!(path = %path.display(), %device_id, "created journal file");
        Ok(device_id)
    }

    fn open(path: &Path, passphrase: &str) -> Result<Self> {
        if !path.exists() {
            return Err(VoyageError::JournalFileNotFound);
        }

        validate_passphrase(passphrase)?;

        let encrypted = fs::read(path)?;
        let plaintext = decrypt(&encrypted, passphrase)?;
        let mut conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let owned_data = Self::owned_data_from_bytes(&plaintext)?;
        conn.deserialize(DatabaseName::Main, owned_data, false)?;

        let device_id = parse_uuid(&Self::read_meta(&conn, "device_id")?, "device")?;

        tracing::debug!(path = %path.display(), bytes = plaintext.len(), "opened journal file");
        Ok(Self {
            path: path.to_path_buf(),
            conn: Mutex::new(conn),
            device_id,
        })
    }

    fn close(self, passphrase: &str) -> Result<()> {
        validate_passphrase(passphrase)?;
        let conn = self
            .conn
            .into_inner()
            .map_err(|_| VoyageError::Storage("SQLite connection poisoned".to_string()))?;
        let data = conn.serialize(DatabaseName::Main)?;
        let encrypted = encrypt(data.as_ref(), passphrase)?;
        write_atomic(&self.path, &encrypted)?;
        tracing::debug!(path = %self.path.display(), "closed journal file");
        Ok(())
    }

    fn metadata(&self) -> Result<JournalMetadata> {
        let conn = self.lock_conn()?;
        Ok(JournalMetadata {
            format_version: Self::read_meta(&conn, "format_version")?,
            device_id: self.device_id,
            created_at: parse_timestamp(&Self::read_meta(&conn, "created_at")?)?,
            last_modified: parse_timestamp(&Self::read_meta(&conn, "last_modified")?)?,
        })
    }

    fn check_integrity(&self) -> Result<()> {
        let conn = self.lock_conn()?;

        let fail = |message: &str| -> Result<()> {
            tracing::warn!(problem = message, "journal integrity check failed");
            Err(VoyageError::Storage(message.to_string()))
        };

        let mut stmt = conn.prepare("PRAGMA foreign_key_check")?;
        let mut rows = stmt.query([])?;
        if rows.next()?.is_some() {
            return fail("Foreign key integrity check failed");
        }

        let missing_fts: i64 = conn.query_row(
            "SELECT COUNT(*) FROM journals j LEFT JOIN journals_fts f ON j.id = f.journal_id WHERE f.journal_id IS NULL",
            [],
            |row| row.get(0),
        )?;
        if missing_fts > 0 {
            return fail("Search index missing entries");
        }

        let orphaned_fts: i64 = conn.query_row(
            "SELECT COUNT(*) FROM journals_fts f LEFT JOIN journals j ON f.journal_id = j.id WHERE j.id IS NULL",
            [],
            |row| row.get(0),
        )?;
        if orphaned_fts > 0 {
            return fail("Search index has orphaned rows");
        }

        let kinds = ReactionKind::ALL
            .iter()
            .map(|kind| format!("'{}'", kind.as_str()))
            .collect::<Vec<_>>()
            .join(", ");
        let bad_reactions: i64 = conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM reactions WHERE reaction_type NOT IN ({})",
                kinds
            ),
            [],
            |row| row.get(0),
        )?;
        if bad_reactions > 0 {
            return fail("Reactions have unknown types");
        }

        let metadata_count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM meta WHERE key IN ('format_version', 'device_id', 'created_at', 'last_modified')",
            [],
            |row| row.get(0),
        )?;
        if metadata_count < 4 {
            return fail("Metadata table missing required keys");
        }

        Ok(())
    }

    // --- Profiles ---

    fn upsert_profile(&mut self, session: &Session) -> Result<UserProfile> {
        {
            let conn = self.lock_conn()?;
            let now = timestamp(Utc::now());
            conn.execute(
                r#"
                INSERT INTO user_profiles (id, display_name, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?3)
                ON CONFLICT(id) DO UPDATE SET
                    display_name = excluded.display_name,
                    updated_at = excluded.updated_at
                "#,
                (
                    session.user_id.to_string(),
                    session.display_name.as_deref(),
                    now,
                ),
            )?;
            Self::touch(&conn)?;
        }
        self.get_profile(&session.user_id)?
            .ok_or_else(|| VoyageError::Storage("Profile upsert failed".to_string()))
    }

    fn get_profile(&self, user_id: &Uuid) -> Result<Option<UserProfile>> {
        let conn = self.lock_conn()?;
        let row = conn
            .query_row(
                "SELECT id, display_name, created_at, updated_at FROM user_profiles WHERE id = ?",
                [user_id.to_string()],
                ProfileRow::from_row,
            )
            .optional()?;
        row.map(UserProfile::try_from).transpose()
    }

    // --- Journal entries ---

    fn create_journal(&mut self, session: &Session, entry: &NewJournalEntry) -> Result<Uuid> {
        let title = normalize_title(&entry.title)?;
        validate_content(&entry.content)?;

        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let id = Uuid::new_v4();
        let now = Utc::now();
        let created_at = timestamp(entry.created_at.unwrap_or(now));

        tx.execute(
            r#"
            INSERT INTO journals (
                id, stop_id, user_id, title, content, mood, weather,
                is_public, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            (
                id.to_string(),
                entry.stop_id,
                session.user_id.to_string(),
                &title,
                &entry.content,
                entry.mood.map(|m| m.as_str()),
                entry.weather.map(|w| w.as_str()),
                entry.is_public,
                created_at,
                timestamp(now),
            ),
        )?;
        Self::write_fts(&tx, &id, &title, &entry.content)?;
        Self::touch(&tx)?;
        tx.commit()?;

        tracing::debug!(journal_id = %id, stop_id = entry.stop_id, "created journal entry");
        Ok(id)
    }

    fn get_journal(&self, id: &Uuid) -> Result<Option<JournalEntry>> {
        let conn = self.lock_conn()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM journals j WHERE j.id = ?", JOURNAL_COLUMNS),
                [id.to_string()],
                JournalRow::from_row,
            )
            .optional()?;
        row.map(JournalEntry::try_from).transpose()
    }

    fn list_journals(
        &self,
        session: &Session,
        filter: &JournalFilter,
    ) -> Result<Vec<JournalEntry>> {
        let conn = self.lock_conn()?;

        let mut conditions = vec!["j.user_id = ?".to_string()];
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(session.user_id.to_string())];

        if let Some(stop_id) = filter.stop_id {
            conditions.push("j.stop_id = ?".to_string());
            params.push(Box::new(stop_id));
        }

        let mut query = format!(
            "SELECT {} FROM journals j WHERE {} ORDER BY j.created_at DESC, j.rowid DESC",
            JOURNAL_COLUMNS,
            conditions.join(" AND ")
        );
        if let Some(limit) = filter.limit {
            query.push_str(" LIMIT ?");
            params.push(Box::new(limit as i64));
        }

        Self::query_journals(&conn, &query, rusqlite::params_from_iter(params.iter()))
    }

    fn update_journal(
        &mut self,
        session: &Session,
        id: &Uuid,
        update: &JournalUpdate,
    ) -> Result<()> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        Self::require_journal_owner(&tx, session, id)?;
        let current: JournalEntry = tx
            .query_row(
                &format!("SELECT {} FROM journals j WHERE j.id = ?", JOURNAL_COLUMNS),
                [id.to_string()],
                JournalRow::from_row,
            )?
            .try_into()?;

        let title = match &update.title {
            Some(title) => normalize_title(title)?,
            None => current.title,
        };
        let content = match &update.content {
            Some(content) => {
                validate_content(content)?;
                content.clone()
            }
            None => current.content,
        };
        let mood = update.mood.unwrap_or(current.mood);
        let weather = update.weather.unwrap_or(current.weather);
        let is_public = update.is_public.unwrap_or(current.is_public);

        tx.execute(
            r#"
            UPDATE journals
            SET title = ?, content = ?, mood = ?, weather = ?, is_public = ?, updated_at = ?
            WHERE id = ?
            "#,
            (
                &title,
                &content,
                mood.map(|m| m.as_str()),
                weather.map(|w| w.as_str()),
                is_public,
                timestamp(Utc::now()),
                id.to_string(),
            ),
        )?;
        Self::write_fts(&tx, id, &title, &content)?;

        if update.is_public.is_some() {
            let synced = tx.execute(
                "UPDATE photos SET is_public = ? WHERE journal_id = ?",
                (is_public, id.to_string()),
            )?;
            tracing::debug!(journal_id = %id, is_public, photos = synced, "synced photo visibility");
        }

        Self::touch(&tx)?;
        tx.commit()?;
        Ok(())
    }

    fn delete_journal(&mut self, session: &Session, id: &Uuid) -> Result<()> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        Self::require_journal_owner(&tx, session, id)?;

        let unlinked = tx.execute(
            "UPDATE photos SET journal_id = NULL WHERE journal_id = ?",
            [id.to_string()],
        )?;
        tx.execute("DELETE FROM reactions WHERE journal_id = ?", [id.to_string()])?;
        tx.execute("DELETE FROM comments WHERE journal_id = ?", [id.to_string()])?;
        tx.execute(
            "DELETE FROM journals_fts WHERE journal_id = ?",
            [id.to_string()],
        )?;
        tx.execute("DELETE FROM journals WHERE id = ?", [id.to_string()])?;
        Self::touch(&tx)?;
        tx.commit()?;

        tracing::debug!(journal_id = %id, unlinked_photos = unlinked, "deleted journal entry");
        Ok(())
    }

    fn list_public_journals(&self, limit: Option<usize>) -> Result<Vec<JournalEntry>> {
        let conn = self.lock_conn()?;
        let query = format!(
            "SELECT {} FROM journals j WHERE j.is_public = 1 \
             ORDER BY j.created_at DESC, j.rowid DESC LIMIT ?",
            JOURNAL_COLUMNS
        );
        // SQLite treats a negative LIMIT as unbounded.
        let limit = limit.map_or(-1, |l| l as i64);
        Self::query_journals(&conn, &query, [limit])
    }

    fn search_journals(&self, session: &Session, query: &str) -> Result<Vec<JournalEntry>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(VoyageError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let conn = self.lock_conn()?;
        let sql = format!(
            r#"
            SELECT {}
            FROM journals_fts f
            JOIN journals j ON j.id = f.journal_id
            WHERE journals_fts MATCH ? AND j.user_id = ?
            ORDER BY bm25(journals_fts), j.created_at DESC
            "#,
            JOURNAL_COLUMNS
        );
        Self::query_journals(&conn, &sql, (query, session.user_id.to_string()))
    }

    // --- Photos ---

    fn add_photo(&mut self, session: &Session, photo: &NewPhoto) -> Result<Uuid> {
        if photo.storage_path.trim().is_empty() {
            return Err(VoyageError::Validation(
                "Photo storage path cannot be empty".to_string(),
            ));
        }
        validate_location(photo.lat, photo.lon)?;

        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        if let Some(journal_id) = &photo.journal_id {
            Self::require_journal_owner(&tx, session, journal_id)?;
        }

        let id = Uuid::new_v4();
        tx.execute(
            r#"
            INSERT INTO photos (
                id, stop_id, journal_id, user_id, storage_path, caption, taken_at,
                lat, lon, is_public, created_at, temp_session_id
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            rusqlite::params![
                id.to_string(),
                photo.stop_id,
                photo.journal_id.map(|j| j.to_string()),
                session.user_id.to_string(),
                photo.storage_path,
                normalize_caption(photo.caption.as_deref()),
                photo.taken_at.map(timestamp),
                photo.lat,
                photo.lon,
                photo.is_public,
                timestamp(Utc::now()),
                photo.temp_session_id,
            ],
        )?;
        Self::touch(&tx)?;
        tx.commit()?;

        Ok(id)
    }

    fn get_photo(&self, id: &Uuid) -> Result<Option<Photo>> {
        let conn = self.lock_conn()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM photos p WHERE p.id = ?", PHOTO_COLUMNS),
                [id.to_string()],
                PhotoRow::from_row,
            )
            .optional()?;
        row.map(Photo::try_from).transpose()
    }

    fn list_photos(&self, session: &Session, filter: &PhotoFilter) -> Result<Vec<Photo>> {
        let conn = self.lock_conn()?;

        let mut conditions = vec!["p.user_id = ?".to_string()];
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(session.user_id.to_string())];

        if let Some(stop_id) = filter.stop_id {
            conditions.push("p.stop_id = ?".to_string());
            params.push(Box::new(stop_id));
        }
        if let Some(journal_id) = filter.journal_id {
            conditions.push("p.journal_id = ?".to_string());
            params.push(Box::new(journal_id.to_string()));
        }

        let query = format!(
            "SELECT {} FROM photos p WHERE {} ORDER BY p.created_at DESC, p.rowid DESC",
            PHOTO_COLUMNS,
            conditions.join(" AND ")
        );
        Self::query_photos(&conn, &query, rusqlite::params_from_iter(params.iter()))
    }

    fn link_photos(
        &mut self,
        session: &Session,
        journal_id: &Uuid,
        photo_ids: &[Uuid],
        is_public: bool,
    ) -> Result<usize> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        Self::require_journal_owner(&tx, session, journal_id)?;

        let mut linked = 0;
        for photo_id in photo_ids {
            linked += tx.execute(
                r#"
                UPDATE photos
                SET journal_id = ?, is_public = ?, temp_session_id = NULL
                WHERE id = ? AND user_id = ?
                "#,
                (
                    journal_id.to_string(),
                    is_public,
                    photo_id.to_string(),
                    session.user_id.to_string(),
                ),
            )?;
        }
        if linked < photo_ids.len() {
            tracing::warn!(
                requested = photo_ids.len(),
                linked,
                "some photos were not linked (missing or not owned)"
            );
        }

        Self::touch(&tx)?;
        tx.commit()?;
        Ok(linked)
    }

    fn update_photo_caption(
        &mut self,
        session: &Session,
        id: &Uuid,
        caption: Option<&str>,
    ) -> Result<()> {
        let conn = self.lock_conn()?;
        Self::require_photo_owner(&conn, session, id)?;
        conn.execute(
            "UPDATE photos SET caption = ? WHERE id = ?",
            (normalize_caption(caption), id.to_string()),
        )?;
        Self::touch(&conn)?;
        Ok(())
    }

    fn set_photo_public(&mut self, session: &Session, id: &Uuid, is_public: bool) -> Result<()> {
        let conn = self.lock_conn()?;
        Self::require_photo_owner(&conn, session, id)?;
        conn.execute(
            "UPDATE photos SET is_public = ? WHERE id = ?",
            (is_public, id.to_string()),
        )?;
        Self::touch(&conn)?;
        Ok(())
    }

    fn delete_photo(&mut self, session: &Session, id: &Uuid) -> Result<String> {
        let conn = self.lock_conn()?;
        Self::require_photo_owner(&conn, session, id)?;
        let storage_path: String = conn.query_row(
            "SELECT storage_path FROM photos WHERE id = ?",
            [id.to_string()],
            |row| row.get(0),
        )?;
        conn.execute("DELETE FROM photos WHERE id = ?", [id.to_string()])?;
        Self::touch(&conn)?;
        Ok(storage_path)
    }

    fn public_photos_for_journal(&self, journal_id: &Uuid) -> Result<Vec<Photo>> {
        let conn = self.lock_conn()?;
        let query = format!(
            "SELECT {} FROM photos p WHERE p.journal_id = ? AND p.is_public = 1 \
             ORDER BY p.created_at ASC, p.rowid ASC",
            PHOTO_COLUMNS
        );
        Self::query_photos(&conn, &query, [journal_id.to_string()])
    }

    // --- Comments ---

    fn add_comment(
        &mut self,
        session: &Session,
        journal_id: &Uuid,
        content: &str,
        parent_comment_id: Option<&Uuid>,
    ) -> Result<Uuid> {
        let content = normalize_comment(content)?;

        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        Self::require_journal_visible(&tx, session, journal_id)?;

        if let Some(parent_id) = parent_comment_id {
            let parent_journal: Option<String> = tx
                .query_row(
                    "SELECT journal_id FROM comments WHERE id = ?",
                    [parent_id.to_string()],
                    |row| row.get(0),
                )
                .optional()?;
            match parent_journal {
                Some(parent_journal) if parent_journal == journal_id.to_string() => {}
                Some(_) => {
                    return Err(VoyageError::Validation(
                        "Parent comment belongs to a different entry".to_string(),
                    ))
                }
                None => {
                    return Err(VoyageError::NotFound(format!("Comment {}", parent_id)));
                }
            }
        }

        let id = Uuid::new_v4();
        let now = timestamp(Utc::now());
        tx.execute(
            r#"
            INSERT INTO comments (
                id, journal_id, user_id, content, parent_comment_id, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            "#,
            (
                id.to_string(),
                journal_id.to_string(),
                session.user_id.to_string(),
                content,
                parent_comment_id.map(|p| p.to_string()),
                now,
            ),
        )?;
        Self::touch(&tx)?;
        tx.commit()?;

        Ok(id)
    }

    fn list_comments(&self, journal_id: &Uuid) -> Result<Vec<Comment>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {}
            FROM comments c
            LEFT JOIN user_profiles u ON u.id = c.user_id
            WHERE c.journal_id = ?
            ORDER BY c.created_at ASC, c.rowid ASC
            "#,
            COMMENT_COLUMNS
        ))?;
        let rows = stmt.query_map([journal_id.to_string()], CommentRow::from_row)?;
        let mut comments = Vec::new();
        for row in rows {
            comments.push(row?.try_into()?);
        }
        Ok(comments)
    }

    fn delete_comment(&mut self, session: &Session, id: &Uuid) -> Result<()> {
        let conn = self.lock_conn()?;
        let author: Option<String> = conn
            .query_row(
                "SELECT user_id FROM comments WHERE id = ?",
                [id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        let author = author.ok_or_else(|| VoyageError::NotFound(format!("Comment {}", id)))?;
        if !session.owns(&parse_uuid(&author, "user")?) {
            return Err(VoyageError::PermissionDenied(
                "Only the author can delete this comment".to_string(),
            ));
        }
        conn.execute("DELETE FROM comments WHERE id = ?", [id.to_string()])?;
        Self::touch(&conn)?;
        Ok(())
    }

    fn comment_count(&self, journal_id: &Uuid) -> Result<u64> {
        let conn = self.lock_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM comments WHERE journal_id = ?",
            [journal_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }

    // --- Reactions ---

    fn toggle_reaction(
        &mut self,
        session: &Session,
        journal_id: &Uuid,
        kind: ReactionKind,
    ) -> Result<ReactionChange> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        Self::require_journal_visible(&tx, session, journal_id)?;

        let existing: Option<(String, String)> = tx
            .query_row(
                "SELECT id, reaction_type FROM reactions WHERE journal_id = ? AND user_id = ?",
                (journal_id.to_string(), session.user_id.to_string()),
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let change = match existing {
            None => {
                tx.execute(
                    r#"
                    INSERT INTO reactions (id, journal_id, user_id, reaction_type, created_at)
                    VALUES (?, ?, ?, ?, ?)
                    "#,
                    (
                        Uuid::new_v4().to_string(),
                        journal_id.to_string(),
                        session.user_id.to_string(),
                        kind.as_str(),
                        timestamp(Utc::now()),
                    ),
                )?;
                ReactionChange::Added { kind }
            }
            Some((reaction_id, current)) => {
                let current: ReactionKind = current
                    .parse()
                    .map_err(|e: VoyageError| VoyageError::Storage(e.to_string()))?;
                if current == kind {
                    tx.execute("DELETE FROM reactions WHERE id = ?", [reaction_id])?;
                    ReactionChange::Removed { kind }
                } else {
                    tx.execute(
                        "UPDATE reactions SET reaction_type = ? WHERE id = ?",
                        (kind.as_str(), reaction_id),
                    )?;
                    ReactionChange::Changed {
                        from: current,
                        to: kind,
                    }
                }
            }
        };

        Self::touch(&tx)?;
        tx.commit()?;
        Ok(change)
    }

    fn reaction_counts(&self, journal_id: &Uuid) -> Result<ReactionCounts> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT reaction_type, COUNT(*) FROM reactions WHERE journal_id = ? GROUP BY reaction_type",
        )?;
        let rows = stmt.query_map([journal_id.to_string()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut counts = ReactionCounts::default();
        for row in rows {
            let (kind, count) = row?;
            let kind: ReactionKind = kind
                .parse()
                .map_err(|e: VoyageError| VoyageError::Storage(e.to_string()))?;
            counts.add(kind, count.max(0) as u64);
        }
        Ok(counts)
    }

    fn user_reaction(
        &self,
        session: &Session,
        journal_id: &Uuid,
    ) -> Result<Option<ReactionKind>> {
        let conn = self.lock_conn()?;
        let kind: Option<String> = conn
            .query_row(
                "SELECT reaction_type FROM reactions WHERE journal_id = ? AND user_id = ?",
                (journal_id.to_string(), session.user_id.to_string()),
                |row| row.get(0),
            )
            .optional()?;
        kind.map(|k| {
            k.parse()
                .map_err(|e: VoyageError| VoyageError::Storage(e.to_string()))
        })
        .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{create_photo_block, create_text_block};
    use crate::storage::types::{Mood, Weather};
    use tempfile::TempDir;

    const PASSPHRASE: &str = "test-passphrase-secure-123";

    fn open_fresh() -> (TempDir, AgeSqliteStorage) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("voyage.journal");
        AgeSqliteStorage::create(&path, PASSPHRASE).unwrap();
        let storage = AgeSqliteStorage::open(&path, PASSPHRASE).unwrap();
        (dir, storage)
    }

    fn entry(stop_id: i64, title: &str, text: &str) -> NewJournalEntry {
        NewJournalEntry::new(stop_id, title, &[create_text_block(text)])
    }

    #[test]
    fn test_create_journal_round_trip() {
        let (_dir, mut storage) = open_fresh();
        let session = Session::new(Uuid::new_v4());

        let id = storage
            .create_journal(
                &session,
                &entry(2, "  Kotor  ", "Walls above the bay")
                    .with_mood(Mood::Great)
                    .with_weather(Weather::Sunny),
            )
            .unwrap();

        let stored = storage.get_journal(&id).unwrap().unwrap();
        assert_eq!(stored.title, "Kotor");
        assert_eq!(stored.user_id, session.user_id);
        assert_eq!(stored.mood, Some(Mood::Great));
        assert_eq!(stored.weather, Some(Weather::Sunny));
        assert!(!stored.is_public);
        assert_eq!(stored.preview(150), "Walls above the bay");
    }

    #[test]
    fn test_create_journal_requires_title_and_content() {
        let (_dir, mut storage) = open_fresh();
        let session = Session::new(Uuid::new_v4());

        let blank_title = entry(1, "  ", "text");
        assert!(matches!(
            storage.create_journal(&session, &blank_title),
            Err(VoyageError::Validation(_))
        ));

        let empty_body = NewJournalEntry::new(1, "Title", &[create_text_block("   ")]);
        assert!(matches!(
            storage.create_journal(&session, &empty_body),
            Err(VoyageError::Validation(_))
        ));

        let photo_only = NewJournalEntry::new(1, "Title", &[create_photo_block("p1", None)]);
        assert!(storage.create_journal(&session, &photo_only).is_ok());
    }

    #[test]
    fn test_update_requires_owner() {
        let (_dir, mut storage) = open_fresh();
        let owner = Session::new(Uuid::new_v4());
        let stranger = Session::new(Uuid::new_v4());
        let id = storage
            .create_journal(&owner, &entry(1, "Mine", "text"))
            .unwrap();

        let update = JournalUpdate::new().title("Theirs");
        assert!(matches!(
            storage.update_journal(&stranger, &id, &update),
            Err(VoyageError::PermissionDenied(_))
        ));
        assert!(matches!(
            storage.delete_journal(&stranger, &id),
            Err(VoyageError::PermissionDenied(_))
        ));
        assert!(matches!(
            storage.update_journal(&owner, &Uuid::new_v4(), &update),
            Err(VoyageError::JournalNotFound(_))
        ));
    }

    #[test]
    fn test_update_clears_mood() {
        let (_dir, mut storage) = open_fresh();
        let session = Session::new(Uuid::new_v4());
        let id = storage
            .create_journal(&session, &entry(1, "T", "x").with_mood(Mood::Okay))
            .unwrap();

        storage
            .update_journal(&session, &id, &JournalUpdate::new().mood(None))
            .unwrap();
        let stored = storage.get_journal(&id).unwrap().unwrap();
        assert!(stored.mood.is_none());
        assert_eq!(stored.title, "T");
    }

    #[test]
    fn test_search_finds_title_and_body() {
        let (_dir, mut storage) = open_fresh();
        let session = Session::new(Uuid::new_v4());
        let other = Session::new(Uuid::new_v4());
        storage
            .create_journal(&session, &entry(1, "Lefkada", "Swimming at dawn"))
            .unwrap();
        storage
            .create_journal(&other, &entry(1, "Elsewhere", "Swimming too"))
            .unwrap();

        assert_eq!(storage.search_journals(&session, "lefkada").unwrap().len(), 1);
        assert_eq!(storage.search_journals(&session, "swimming").unwrap().len(), 1);
        assert!(storage.search_journals(&session, "   ").is_err());
    }

    #[test]
    fn test_integrity_on_fresh_file() {
        let (_dir, storage) = open_fresh();
        storage.check_integrity().unwrap();
        assert_eq!(storage.metadata().unwrap().format_version, FORMAT_VERSION);
    }
}
