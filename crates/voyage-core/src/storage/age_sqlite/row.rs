//! Row types for database queries.
//!
//! Each row struct mirrors the selected columns as raw SQLite values and is
//! converted into its domain type with `TryFrom`, so malformed stored data
//! surfaces as `VoyageError::Storage` instead of a panic.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Row;
use uuid::Uuid;

use crate::error::{Result, VoyageError};
use crate::storage::types::{Comment, JournalEntry, Mood, Photo, UserProfile, Weather};

pub const JOURNAL_COLUMNS: &str = "j.id, j.stop_id, j.user_id, j.title, j.content, j.mood, \
     j.weather, j.is_public, j.created_at, j.updated_at";

pub const PHOTO_COLUMNS: &str = "p.id, p.stop_id, p.journal_id, p.user_id, p.storage_path, \
     p.caption, p.taken_at, p.lat, p.lon, p.is_public, p.created_at, p.temp_session_id";

pub const COMMENT_COLUMNS: &str = "c.id, c.journal_id, c.user_id, c.content, \
     c.parent_comment_id, c.created_at, c.updated_at, u.display_name";

/// Format a timestamp for storage. Fixed width keeps text ordering
/// chronological.
pub fn timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_uuid(value: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| VoyageError::Storage(format!("Invalid {} UUID: {}", what, e)))
}

pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .map_err(|e| VoyageError::Storage(format!("Invalid timestamp: {}", e)))?
        .with_timezone(&Utc))
}

fn parse_optional_uuid(value: Option<&str>, what: &str) -> Result<Option<Uuid>> {
    value.map(|v| parse_uuid(v, what)).transpose()
}

/// Raw row from the journals table.
#[derive(Debug)]
pub struct JournalRow {
    pub id: String,
    pub stop_id: i64,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub mood: Option<String>,
    pub weather: Option<String>,
    pub is_public: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl JournalRow {
    /// Read a row selected with [`JOURNAL_COLUMNS`].
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            stop_id: row.get(1)?,
            user_id: row.get(2)?,
            title: row.get(3)?,
            content: row.get(4)?,
            mood: row.get(5)?,
            weather: row.get(6)?,
            is_public: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }
}

impl TryFrom<JournalRow> for JournalEntry {
    type Error = VoyageError;

    fn try_from(row: JournalRow) -> Result<Self> {
        let mood = row
            .mood
            .as_deref()
            .map(|m| m.parse::<Mood>().map_err(|e| VoyageError::Storage(e.to_string())))
            .transpose()?;
        let weather = row
            .weather
            .as_deref()
            .map(|w| {
                w.parse::<Weather>()
                    .map_err(|e| VoyageError::Storage(e.to_string()))
            })
            .transpose()?;

        Ok(JournalEntry {
            id: parse_uuid(&row.id, "journal")?,
            stop_id: row.stop_id,
            user_id: parse_uuid(&row.user_id, "user")?,
            title: row.title,
            content: row.content,
            mood,
            weather,
            is_public: row.is_public,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

/// Raw row from the photos table.
#[derive(Debug)]
pub struct PhotoRow {
    pub id: String,
    pub stop_id: i64,
    pub journal_id: Option<String>,
    pub user_id: String,
    pub storage_path: String,
    pub caption: Option<String>,
    pub taken_at: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub is_public: bool,
    pub created_at: String,
    pub temp_session_id: Option<String>,
}

impl PhotoRow {
    /// Read a row selected with [`PHOTO_COLUMNS`].
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            stop_id: row.get(1)?,
            journal_id: row.get(2)?,
            user_id: row.get(3)?,
            storage_path: row.get(4)?,
            caption: row.get(5)?,
            taken_at: row.get(6)?,
            lat: row.get(7)?,
            lon: row.get(8)?,
            is_public: row.get(9)?,
            created_at: row.get(10)?,
            temp_session_id: row.get(11)?,
        })
    }
}

impl TryFrom<PhotoRow> for Photo {
    type Error = VoyageError;

    fn try_from(row: PhotoRow) -> Result<Self> {
        Ok(Photo {
            id: parse_uuid(&row.id, "photo")?,
            stop_id: row.stop_id,
            journal_id: parse_optional_uuid(row.journal_id.as_deref(), "journal")?,
            user_id: parse_uuid(&row.user_id, "user")?,
            storage_path: row.storage_path,
            caption: row.caption,
            taken_at: row.taken_at.as_deref().map(parse_timestamp).transpose()?,
            lat: row.lat,
            lon: row.lon,
            is_public: row.is_public,
            created_at: parse_timestamp(&row.created_at)?,
            temp_session_id: row.temp_session_id,
        })
    }
}

/// Raw row from the comments table joined with the author's profile.
#[derive(Debug)]
pub struct CommentRow {
    pub id: String,
    pub journal_id: String,
    pub user_id: String,
    pub content: String,
    pub parent_comment_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub author_name: Option<String>,
}

impl CommentRow {
    /// Read a row selected with [`COMMENT_COLUMNS`].
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            journal_id: row.get(1)?,
            user_id: row.get(2)?,
            content: row.get(3)?,
            parent_comment_id: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
            author_name: row.get(7)?,
        })
    }
}

impl TryFrom<CommentRow> for Comment {
    type Error = VoyageError;

    fn try_from(row: CommentRow) -> Result<Self> {
        Ok(Comment {
            id: parse_uuid(&row.id, "comment")?,
            journal_id: parse_uuid(&row.journal_id, "journal")?,
            user_id: parse_uuid(&row.user_id, "user")?,
            content: row.content,
            parent_comment_id: parse_optional_uuid(row.parent_comment_id.as_deref(), "parent")?,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
            author_name: row.author_name,
        })
    }
}

/// Raw row from the user_profiles table.
#[derive(Debug)]
pub struct ProfileRow {
    pub id: String,
    pub display_name: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl ProfileRow {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            display_name: row.get(1)?,
            created_at: row.get(2)?,
            updated_at: row.get(3)?,
        })
    }
}

impl TryFrom<ProfileRow> for UserProfile {
    type Error = VoyageError;

    fn try_from(row: ProfileRow) -> Result<Self> {
        Ok(UserProfile {
            id: parse_uuid(&row.id, "user")?,
            display_name: row.display_name,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn journal_row() -> JournalRow {
        JournalRow {
            id: Uuid::new_v4().to_string(),
            stop_id: 3,
            user_id: Uuid::new_v4().to_string(),
            title: "Corfu".to_string(),
            content: "legacy".to_string(),
            mood: Some("great".to_string()),
            weather: None,
            is_public: true,
            created_at: timestamp(Utc::now()),
            updated_at: timestamp(Utc::now()),
        }
    }

    #[test]
    fn test_journal_row_converts() {
        let entry = JournalEntry::try_from(journal_row()).unwrap();
        assert_eq!(entry.mood, Some(Mood::Great));
        assert!(entry.weather.is_none());
        assert_eq!(entry.preview(150), "legacy");
    }

    #[test]
    fn test_bad_uuid_is_storage_error() {
        let mut row = journal_row();
        row.id = "not-a-uuid".to_string();
        assert!(matches!(
            JournalEntry::try_from(row),
            Err(VoyageError::Storage(_))
        ));
    }

    #[test]
    fn test_unknown_mood_is_storage_error() {
        let mut row = journal_row();
        row.mood = Some("ecstatic".to_string());
        assert!(matches!(
            JournalEntry::try_from(row),
            Err(VoyageError::Storage(_))
        ));
    }

    #[test]
    fn test_timestamp_is_fixed_width() {
        let a = timestamp(DateTime::parse_from_rfc3339("2026-05-01T10:00:00Z").unwrap().into());
        let b = timestamp(
            DateTime::parse_from_rfc3339("2026-05-01T10:00:00.5Z")
                .unwrap()
                .into(),
        );
        assert_eq!(a.len(), b.len());
        assert!(a < b);
    }
}
