//! Core data types for the storage layer.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::content::{blocks_preview, parse_blocks, serialize_blocks, JournalBlock};
use crate::error::VoyageError;

/// Metadata for a journal file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalMetadata {
    /// Format version (e.g., "0.1")
    pub format_version: String,

    /// Device that created this journal file
    pub device_id: Uuid,

    /// When this journal file was created
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp (informational)
    pub last_modified: DateTime<Utc>,
}

macro_rules! string_enum {
    ($name:ident, $label:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = VoyageError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    other => Err(VoyageError::InvalidInput(format!(
                        "Unknown {} \"{}\" (expected one of: {})",
                        $label,
                        other,
                        [$($text),+].join(", ")
                    ))),
                }
            }
        }
    };
}

string_enum!(Mood, "mood", {
    Great => "great",
    Good => "good",
    Okay => "okay",
    Challenging => "challenging",
});

string_enum!(Weather, "weather", {
    Sunny => "sunny",
    Cloudy => "cloudy",
    Rainy => "rainy",
    Stormy => "stormy",
    Windy => "windy",
});

string_enum!(ReactionKind, "reaction", {
    Like => "like",
    Heart => "heart",
    Amazed => "amazed",
    Inspired => "inspired",
});

/// A journal entry attached to an itinerary stop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: Uuid,
    pub stop_id: i64,
    pub user_id: Uuid,
    pub title: String,

    /// Persisted body: a block array or legacy plain text.
    pub content: String,

    pub mood: Option<Mood>,
    pub weather: Option<Weather>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JournalEntry {
    /// Body as blocks; legacy text comes back as a single text block.
    pub fn blocks(&self) -> Vec<JournalBlock> {
        parse_blocks(&self.content)
    }

    /// Plain-text excerpt for list views.
    pub fn preview(&self, max_length: usize) -> String {
        blocks_preview(&self.blocks(), max_length)
    }
}

/// Builder for creating new journal entries.
#[derive(Debug, Clone)]
pub struct NewJournalEntry {
    pub stop_id: i64,
    pub title: String,
    pub content: String,
    pub mood: Option<Mood>,
    pub weather: Option<Weather>,
    pub is_public: bool,

    /// Optional backdated creation time
    pub created_at: Option<DateTime<Utc>>,
}

impl NewJournalEntry {
    pub fn new(stop_id: i64, title: impl Into<String>, blocks: &[JournalBlock]) -> Self {
        Self {
            stop_id,
            title: title.into(),
            content: serialize_blocks(blocks),
            mood: None,
            weather: None,
            is_public: false,
            created_at: None,
        }
    }

    /// Use an already-persisted content string (block array or legacy text).
    pub fn with_raw_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_mood(mut self, mood: Mood) -> Self {
        self.mood = Some(mood);
        self
    }

    pub fn with_weather(mut self, weather: Weather) -> Self {
        self.weather = Some(weather);
        self
    }

    pub fn public(mut self, is_public: bool) -> Self {
        self.is_public = is_public;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// Partial update for a journal entry. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct JournalUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub mood: Option<Option<Mood>>,
    pub weather: Option<Option<Weather>>,
    pub is_public: Option<bool>,
}

impl JournalUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn blocks(mut self, blocks: &[JournalBlock]) -> Self {
        self.content = Some(serialize_blocks(blocks));
        self
    }

    pub fn mood(mut self, mood: Option<Mood>) -> Self {
        self.mood = Some(mood);
        self
    }

    pub fn weather(mut self, weather: Option<Weather>) -> Self {
        self.weather = Some(weather);
        self
    }

    pub fn public(mut self, is_public: bool) -> Self {
        self.is_public = Some(is_public);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.mood.is_none()
            && self.weather.is_none()
            && self.is_public.is_none()
    }
}

/// Filter for listing a user's journal entries.
#[derive(Debug, Clone, Default)]
pub struct JournalFilter {
    pub stop_id: Option<i64>,
    pub limit: Option<usize>,
}

impl JournalFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(mut self, stop_id: i64) -> Self {
        self.stop_id = Some(stop_id);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Photo metadata. The binary lives in an external object store at
/// `storage_path`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
    pub id: Uuid,
    pub stop_id: i64,
    pub journal_id: Option<Uuid>,
    pub user_id: Uuid,
    pub storage_path: String,
    pub caption: Option<String>,
    pub taken_at: Option<DateTime<Utc>>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,

    /// Editing session that uploaded the photo before the entry was saved.
    pub temp_session_id: Option<String>,
}

/// Builder for recording a new photo.
#[derive(Debug, Clone)]
pub struct NewPhoto {
    pub stop_id: i64,
    pub storage_path: String,
    pub journal_id: Option<Uuid>,
    pub caption: Option<String>,
    pub taken_at: Option<DateTime<Utc>>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub is_public: bool,
    pub temp_session_id: Option<String>,
}

impl NewPhoto {
    pub fn new(stop_id: i64, storage_path: impl Into<String>) -> Self {
        Self {
            stop_id,
            storage_path: storage_path.into(),
            journal_id: None,
            caption: None,
            taken_at: None,
            lat: None,
            lon: None,
            is_public: false,
            temp_session_id: None,
        }
    }

    pub fn with_journal(mut self, journal_id: Uuid) -> Self {
        self.journal_id = Some(journal_id);
        self
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn with_taken_at(mut self, taken_at: DateTime<Utc>) -> Self {
        self.taken_at = Some(taken_at);
        self
    }

    pub fn with_location(mut self, lat: f64, lon: f64) -> Self {
        self.lat = Some(lat);
        self.lon = Some(lon);
        self
    }

    pub fn public(mut self, is_public: bool) -> Self {
        self.is_public = is_public;
        self
    }

    pub fn with_temp_session(mut self, session_id: impl Into<String>) -> Self {
        self.temp_session_id = Some(session_id.into());
        self
    }
}

/// Filter for listing a user's photos.
#[derive(Debug, Clone, Default)]
pub struct PhotoFilter {
    pub stop_id: Option<i64>,
    pub journal_id: Option<Uuid>,
}

impl PhotoFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(mut self, stop_id: i64) -> Self {
        self.stop_id = Some(stop_id);
        self
    }

    pub fn journal(mut self, journal_id: Uuid) -> Self {
        self.journal_id = Some(journal_id);
        self
    }
}

/// Build the object-store key for an uploaded photo:
/// `<user>/<stop>/<epoch-millis>.<ext>`.
pub fn photo_storage_path(
    user_id: &Uuid,
    stop_id: i64,
    file_name: &str,
    now: DateTime<Utc>,
) -> String {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && !ext.contains('/'))
        .unwrap_or("bin")
        .to_ascii_lowercase();
    format!("{}/{}/{}.{}", user_id, stop_id, now.timestamp_millis(), ext)
}

/// Public profile for a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A comment on a journal entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub journal_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub parent_comment_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Author display name from their profile, if set
    pub author_name: Option<String>,
}

/// A comment with its nested replies.
#[derive(Debug, Clone, Serialize)]
pub struct CommentThread {
    pub comment: Comment,
    pub replies: Vec<CommentThread>,
}

/// A user's reaction to a journal entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reaction {
    pub id: Uuid,
    pub journal_id: Uuid,
    pub user_id: Uuid,
    pub kind: ReactionKind,
    pub created_at: DateTime<Utc>,
}

/// Reaction tallies per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionCounts {
    pub like: u64,
    pub heart: u64,
    pub amazed: u64,
    pub inspired: u64,
}

impl ReactionCounts {
    pub fn get(&self, kind: ReactionKind) -> u64 {
        match kind {
            ReactionKind::Like => self.like,
            ReactionKind::Heart => self.heart,
            ReactionKind::Amazed => self.amazed,
            ReactionKind::Inspired => self.inspired,
        }
    }

    pub fn add(&mut self, kind: ReactionKind, count: u64) {
        let slot = match kind {
            ReactionKind::Like => &mut self.like,
            ReactionKind::Heart => &mut self.heart,
            ReactionKind::Amazed => &mut self.amazed,
            ReactionKind::Inspired => &mut self.inspired,
        };
        *slot += count;
    }

    pub fn total(&self) -> u64 {
        self.like + self.heart + self.amazed + self.inspired
    }
}

/// Outcome of toggling a reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ReactionChange {
    Added { kind: ReactionKind },
    Removed { kind: ReactionKind },
    Changed { from: ReactionKind, to: ReactionKind },
}

/// A public entry with its engagement counts.
#[derive(Debug, Clone, Serialize)]
pub struct FeedItem {
    pub journal: JournalEntry,
    pub reaction_counts: ReactionCounts,
    pub comment_count: u64,
}
