//! Parsing helpers for datetimes, enums, and entry/photo IDs.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use voyage_core::storage::{JournalFilter, Mood, PhotoFilter, Weather};
use voyage_core::{Session, StorageEngine};

use crate::constants::MIN_ID_PREFIX;
use crate::errors::CliError;

/// Parse a datetime string (ISO-8601 or YYYY-MM-DD).
pub fn parse_datetime(value: &str) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        let naive = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| anyhow::anyhow!("Invalid date value: {}", value))?;
        return Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));
    }

    Err(CliError::invalid_input(format!(
        "Invalid date/time (expected ISO-8601 or YYYY-MM-DD): {}",
        value
    ))
    .into())
}

/// Parse an optional mood flag.
pub fn parse_mood(value: Option<&str>) -> anyhow::Result<Option<Mood>> {
    Ok(value.map(str::parse::<Mood>).transpose()?)
}

/// Parse an optional weather flag.
pub fn parse_weather(value: Option<&str>) -> anyhow::Result<Option<Weather>> {
    Ok(value.map(str::parse::<Weather>).transpose()?)
}

/// Parse an edit flag where `none` clears the value.
///
/// Returns `None` when the flag was not given, `Some(None)` to clear.
pub fn parse_clearable<T, F>(value: Option<&str>, parse: F) -> anyhow::Result<Option<Option<T>>>
where
    F: Fn(&str) -> anyhow::Result<Option<T>>,
{
    match value {
        None => Ok(None),
        Some(v) if v.trim().eq_ignore_ascii_case("none") => Ok(Some(None)),
        Some(v) => Ok(Some(parse(v)?)),
    }
}

/// Validate a timezone name. Empty or `auto` means system default.
pub fn parse_timezone(value: &str) -> anyhow::Result<Option<String>> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("auto") {
        return Ok(None);
    }

    let tz = trimmed
        .parse::<chrono_tz::Tz>()
        .map_err(|_| CliError::invalid_input(format!("Invalid timezone: {}", trimmed)))?;
    Ok(Some(tz.to_string()))
}

/// Parse a full UUID for a resource of kind `what`.
pub fn parse_uuid(value: &str, what: &str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(value.trim())
        .map_err(|e| CliError::invalid_input(format!("Invalid {} ID: {}", what, e)).into())
}

/// Resolve an entry ID or unique prefix among entries the session can see.
pub fn resolve_journal_id<S: StorageEngine>(
    storage: &S,
    session: &Session,
    value: &str,
) -> anyhow::Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(value.trim()) {
        return Ok(id);
    }
    let mut candidates: Vec<Uuid> = storage
        .list_journals(session, &JournalFilter::new())?
        .into_iter()
        .map(|entry| entry.id)
        .collect();
    for entry in storage.list_public_journals(None)? {
        if !candidates.contains(&entry.id) {
            candidates.push(entry.id);
        }
    }
    match_prefix(&candidates, value).map_err(|err| match err {
        PrefixError::NotFound => CliError::not_found(
            format!("Entry not found: {}", value),
            "Hint: Run `voyage list` or `voyage feed` to find entry IDs.",
        )
        .into(),
        other => other.into_cli(value, "entry").into(),
    })
}

/// Resolve a photo ID or unique prefix among the session's photos.
pub fn resolve_photo_id<S: StorageEngine>(
    storage: &S,
    session: &Session,
    value: &str,
) -> anyhow::Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(value.trim()) {
        return Ok(id);
    }
    let candidates: Vec<Uuid> = storage
        .list_photos(session, &PhotoFilter::new())?
        .into_iter()
        .map(|photo| photo.id)
        .collect();
    match_prefix(&candidates, value).map_err(|err| match err {
        PrefixError::NotFound => CliError::not_found(
            format!("Photo not found: {}", value),
            "Hint: Run `voyage photo list` to find photo IDs.",
        )
        .into(),
        other => other.into_cli(value, "photo").into(),
    })
}

#[derive(Debug, PartialEq, Eq)]
enum PrefixError {
    TooShort,
    NotFound,
    Ambiguous(usize),
}

impl PrefixError {
    fn into_cli(self, value: &str, what: &str) -> CliError {
        match self {
            PrefixError::TooShort => CliError::invalid_input(format!(
                "Invalid {} ID: {} (use a full UUID or at least {} characters)",
                what, value, MIN_ID_PREFIX
            )),
            PrefixError::Ambiguous(count) => CliError::invalid_input(format!(
                "{} ID prefix '{}' matches {} {}s; use more characters",
                capitalize(what),
                value,
                count,
                what
            )),
            PrefixError::NotFound => CliError::invalid_input(format!("Unknown {} ID", what)),
        }
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn match_prefix(candidates: &[Uuid], value: &str) -> Result<Uuid, PrefixError> {
    let prefix = value.trim().to_ascii_lowercase();
    if prefix.len() < MIN_ID_PREFIX {
        return Err(PrefixError::TooShort);
    }
    let matches: Vec<&Uuid> = candidates
        .iter()
        .filter(|id| id.to_string().starts_with(&prefix))
        .collect();
    match matches.as_slice() {
        [] => Err(PrefixError::NotFound),
        [id] => Ok(**id),
        many => Err(PrefixError::Ambiguous(many.len())),
    }
}
