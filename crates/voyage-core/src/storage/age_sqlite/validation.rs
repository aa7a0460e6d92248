//! Input validation for journal rows.

use crate::content::{blocks_preview, has_content, parse_blocks, JournalBlock};
use crate::error::{Result, VoyageError};

/// Maximum title length in characters.
pub const MAX_TITLE_CHARS: usize = 200;

/// Maximum bytes for a persisted entry body.
pub const MAX_CONTENT_BYTES: usize = 1024 * 1024;

/// Maximum comment length in characters.
pub const MAX_COMMENT_CHARS: usize = 2000;

/// Trim and validate an entry title.
pub fn normalize_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(VoyageError::Validation("Title cannot be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_TITLE_CHARS {
        return Err(VoyageError::Validation(format!(
            "Title too long (max {} characters)",
            MAX_TITLE_CHARS
        )));
    }
    Ok(trimmed.to_string())
}

/// Check that a persisted body has something worth saving.
pub fn validate_content(content: &str) -> Result<Vec<JournalBlock>> {
    if content.len() > MAX_CONTENT_BYTES {
        return Err(VoyageError::Validation(format!(
            "Entry body too large (max {} bytes)",
            MAX_CONTENT_BYTES
        )));
    }
    let blocks = parse_blocks(content);
    if !has_content(&blocks) {
        return Err(VoyageError::Validation(
            "Entry needs some text or a photo".to_string(),
        ));
    }
    Ok(blocks)
}

/// Trim and validate a comment body.
pub fn normalize_comment(content: &str) -> Result<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(VoyageError::Validation(
            "Comment cannot be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_COMMENT_CHARS {
        return Err(VoyageError::Validation(format!(
            "Comment too long (max {} characters)",
            MAX_COMMENT_CHARS
        )));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional caption; blank becomes `None`.
pub fn normalize_caption(caption: Option<&str>) -> Option<String> {
    caption
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
}

/// Validate a coordinate pair when present.
pub fn validate_location(lat: Option<f64>, lon: Option<f64>) -> Result<()> {
    if let Some(lat) = lat {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(VoyageError::Validation(format!(
                "Latitude out of range: {}",
                lat
            )));
        }
    }
    if let Some(lon) = lon {
        if !(-180.0..=180.0).contains(&lon) {
            return Err(VoyageError::Validation(format!(
                "Longitude out of range: {}",
                lon
            )));
        }
    }
    Ok(())
}

/// Searchable body text: every text block, untruncated.
pub fn fts_body(blocks: &[JournalBlock]) -> String {
    blocks_preview(blocks, usize::MAX)
}
