//! Block-based journal content.
//!
//! A journal body is an ordered sequence of [`JournalBlock`]s persisted as a
//! single string field. Two encodings coexist in that field:
//!
//! - **Block format**: a JSON array of block objects, e.g.
//!   `[{"id":"block_1700000000000_abc123def","type":"text","content":"Arrived."}]`
//! - **Legacy format**: arbitrary plain text written before blocks existed.
//!
//! [`parse_blocks`] is total: anything that is not a well-formed block array
//! is read as legacy text, so stored data can always be rendered.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Default preview length used by journal list views.
pub const DEFAULT_PREVIEW_LENGTH: usize = 150;

const BLOCK_ID_RANDOM_LEN: usize = 9;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A run of journal text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TextBlock {
    pub id: String,
    #[serde(default)]
    pub content: String,
}

/// A reference to an uploaded photo, by opaque photo ID.
///
/// The referenced photo may not exist (yet); consumers treat a dangling
/// reference as "no photo".
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PhotoBlock {
    pub id: String,
    #[serde(default, rename = "photoId")]
    pub photo_id: String,
    #[serde(default)]
    pub caption: Option<String>,
}

/// One segment of a journal entry body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum JournalBlock {
    Text(TextBlock),
    Photo(PhotoBlock),
}

impl JournalBlock {
    /// Block identifier, unique within one sequence.
    pub fn id(&self) -> &str {
        match self {
            JournalBlock::Text(block) => &block.id,
            JournalBlock::Photo(block) => &block.id,
        }
    }

    /// The `type` discriminator as written to storage.
    pub fn kind(&self) -> &'static str {
        match self {
            JournalBlock::Text(_) => "text",
            JournalBlock::Photo(_) => "photo",
        }
    }
}

// Field order mirrors the persisted layout: id, type, then payload.
impl Serialize for JournalBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            JournalBlock::Text(block) => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("id", &block.id)?;
                map.serialize_entry("type", "text")?;
                map.serialize_entry("content", &block.content)?;
                map.end()
            }
            JournalBlock::Photo(block) => {
                let len = if block.caption.is_some() { 4 } else { 3 };
                let mut map = serializer.serialize_map(Some(len))?;
                map.serialize_entry("id", &block.id)?;
                map.serialize_entry("type", "photo")?;
                map.serialize_entry("photoId", &block.photo_id)?;
                if let Some(caption) = &block.caption {
                    map.serialize_entry("caption", caption)?;
                }
                map.end()
            }
        }
    }
}

/// Generate a block ID of the form `block_<epoch-millis>_<9 base36 chars>`.
///
/// Uniqueness is probabilistic and only needs to hold within one editing
/// session.
pub fn generate_block_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);

    let mut bytes = [0u8; BLOCK_ID_RANDOM_LEN];
    if getrandom::getrandom(&mut bytes).is_err() {
        // Fall back to clock entropy; IDs only need to be unique per session.
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.subsec_nanos())
            .unwrap_or(0);
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = (nanos >> ((i % 4) * 8)) as u8 ^ (i as u8).wrapping_mul(31);
        }
    }
    let suffix: String = bytes
        .iter()
        .map(|b| BASE36[(*b as usize) % BASE36.len()] as char)
        .collect();

    format!("block_{}_{}", millis, suffix)
}

/// Create a text block with a fresh ID.
pub fn create_text_block(content: impl Into<String>) -> JournalBlock {
    JournalBlock::Text(TextBlock {
        id: generate_block_id(),
        content: content.into(),
    })
}

/// Create a photo block with a fresh ID.
pub fn create_photo_block(photo_id: impl Into<String>, caption: Option<String>) -> JournalBlock {
    JournalBlock::Photo(PhotoBlock {
        id: generate_block_id(),
        photo_id: photo_id.into(),
        caption,
    })
}

/// Parse a persisted content field into a non-empty block sequence.
///
/// - Empty or whitespace-only input yields a single empty text block.
/// - A JSON array whose every element has a string `id` and a `type` of
///   `"text"` or `"photo"` is returned as blocks, in order.
/// - Anything else is legacy content and is wrapped verbatim in one text block.
pub fn parse_blocks(content: &str) -> Vec<JournalBlock> {
    if content.trim().is_empty() {
        return vec![create_text_block("")];
    }

    if content.trim_start().starts_with('[') {
        if let Some(blocks) = decode_block_array(content) {
            return blocks;
        }
        tracing::debug!(
            len = content.len(),
            "content starts with '[' but is not a block array; reading as legacy text"
        );
    }

    vec![create_text_block(content)]
}

fn decode_block_array(content: &str) -> Option<Vec<JournalBlock>> {
    let value: serde_json::Value = serde_json::from_str(content).ok()?;
    let items = value.as_array()?;
    if items.is_empty() || !items.iter().all(has_block_shape) {
        return None;
    }
    items.iter().map(block_from_value).collect()
}

/// Build a block from an element that passed [`has_block_shape`].
///
/// Payload fields are lenient: a mistyped `content` or `photoId` is kept as
/// its JSON text and a non-string `caption` is dropped.
fn block_from_value(item: &serde_json::Value) -> Option<JournalBlock> {
    let id = item.get("id")?.as_str()?.to_string();
    match item.get("type")?.as_str()? {
        "text" => Some(JournalBlock::Text(TextBlock {
            id,
            content: lenient_string(item.get("content")),
        })),
        "photo" => Some(JournalBlock::Photo(PhotoBlock {
            id,
            photo_id: lenient_string(item.get("photoId")),
            caption: item
                .get("caption")
                .and_then(|c| c.as_str())
                .map(str::to_string),
        })),
        _ => None,
    }
}

fn lenient_string(value: Option<&serde_json::Value>) -> String {
    match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn has_block_shape(item: &serde_json::Value) -> bool {
    let Some(object) = item.as_object() else {
        return false;
    };
    let has_id = object.get("id").map_or(false, |id| id.is_string());
    let has_type = matches!(
        object.get("type").and_then(|t| t.as_str()),
        Some("text") | Some("photo")
    );
    has_id && has_type
}

/// Encode a block sequence as a compact JSON array.
///
/// No validation is performed; the sequence is written as given.
pub fn serialize_blocks(blocks: &[JournalBlock]) -> String {
    // A Vec of plain string fields cannot fail to serialize.
    serde_json::to_string(blocks).unwrap_or_else(|_| "[]".to_string())
}

/// Cheap format sniff: does the stored field look like a block array?
///
/// Looser than [`parse_blocks`]: any non-empty array whose elements carry a
/// truthy `id` and `type` counts.
pub fn is_block_format(content: &str) -> bool {
    if !content.trim_start().starts_with('[') {
        return false;
    }
    let Ok(value) = serde_json::from_str::<serde_json::Value>(content) else {
        return false;
    };
    match value.as_array() {
        Some(items) if !items.is_empty() => items
            .iter()
            .all(|item| is_truthy(item.get("id")) && is_truthy(item.get("type"))),
        _ => false,
    }
}

fn is_truthy(value: Option<&serde_json::Value>) -> bool {
    match value {
        None | Some(serde_json::Value::Null) => false,
        Some(serde_json::Value::Bool(b)) => *b,
        Some(serde_json::Value::String(s)) => !s.is_empty(),
        Some(serde_json::Value::Number(n)) => n.as_f64().map_or(true, |f| f != 0.0),
        Some(_) => true,
    }
}

/// Plain-text excerpt of the text blocks, for list views.
///
/// Text contents are joined with single spaces and trimmed. Results longer
/// than `max_length` characters are cut, right-trimmed, and suffixed with
/// `"..."`. Photo blocks contribute nothing.
pub fn blocks_preview(blocks: &[JournalBlock], max_length: usize) -> String {
    let joined = blocks
        .iter()
        .filter_map(|block| match block {
            JournalBlock::Text(text) => Some(text.content.as_str()),
            JournalBlock::Photo(_) => None,
        })
        .collect::<Vec<_>>()
        .join(" ");
    let text = joined.trim();

    if text.chars().count() <= max_length {
        return text.to_string();
    }

    let cut: String = text.chars().take(max_length).collect();
    format!("{}...", cut.trim_end())
}

/// Whether the sequence holds anything worth saving.
pub fn has_content(blocks: &[JournalBlock]) -> bool {
    blocks.iter().any(|block| match block {
        JournalBlock::Text(text) => !text.content.trim().is_empty(),
        JournalBlock::Photo(photo) => !photo.photo_id.is_empty(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(id: &str, content: &str) -> JournalBlock {
        JournalBlock::Text(TextBlock {
            id: id.to_string(),
            content: content.to_string(),
        })
    }

    fn photo(id: &str, photo_id: &str, caption: Option<&str>) -> JournalBlock {
        JournalBlock::Photo(PhotoBlock {
            id: id.to_string(),
            photo_id: photo_id.to_string(),
            caption: caption.map(String::from),
        })
    }

    fn single_text_content(blocks: &[JournalBlock]) -> &str {
        assert_eq!(blocks.len(), 1);
        match &blocks[0] {
            JournalBlock::Text(t) => &t.content,
            other => panic!("expected text block, got {:?}", other),
        }
    }

    #[test]
    fn test_block_id_shape() {
        let id = generate_block_id();
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "block");
        assert!(parts[1].parse::<u128>().is_ok());
        assert_eq!(parts[2].len(), 9);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_block_ids_differ() {
        assert_ne!(generate_block_id(), generate_block_id());
    }

    #[test]
    fn test_parse_empty_and_whitespace() {
        assert_eq!(single_text_content(&parse_blocks("")), "");
        assert_eq!(single_text_content(&parse_blocks("  \n\t ")), "");
    }

    #[test]
    fn test_parse_legacy_text_verbatim() {
        let legacy = "  Anchored off Hydra.\nSwam before breakfast.  ";
        assert_eq!(single_text_content(&parse_blocks(legacy)), legacy);
    }

    #[test]
    fn test_parse_wrong_element_shape_is_legacy() {
        assert_eq!(single_text_content(&parse_blocks("[1,2,3]")), "[1,2,3]");
    }

    #[test]
    fn test_parse_missing_type_is_legacy() {
        let raw = "[{\"id\":\"x\"}]";
        assert_eq!(single_text_content(&parse_blocks(raw)), raw);
    }

    #[test]
    fn test_parse_unknown_type_is_legacy() {
        let raw = r#"[{"id":"x","type":"video"}]"#;
        assert_eq!(single_text_content(&parse_blocks(raw)), raw);
    }

    #[test]
    fn test_parse_empty_array_is_legacy() {
        assert_eq!(single_text_content(&parse_blocks("[]")), "[]");
    }

    #[test]
    fn test_parse_invalid_json_is_legacy() {
        let raw = "[Day 3] rough crossing";
        assert_eq!(single_text_content(&parse_blocks(raw)), raw);
    }

    #[test]
    fn test_parse_partially_valid_array_is_legacy() {
        let raw = r#"[{"id":"a","type":"text","content":"ok"},{"type":"text"}]"#;
        assert_eq!(single_text_content(&parse_blocks(raw)), raw);
    }

    #[test]
    fn test_parse_block_array() {
        let raw = r#"[
            {"id":"block_1700000000000_abc123def","type":"text","content":"Arrived at sunset."},
            {"id":"block_1700000000100_xyz789ghi","type":"photo","photoId":"p-1","caption":"Marina view"}
        ]"#;
        let blocks = parse_blocks(raw);
        assert_eq!(
            blocks,
            vec![
                text("block_1700000000000_abc123def", "Arrived at sunset."),
                photo("block_1700000000100_xyz789ghi", "p-1", Some("Marina view")),
            ]
        );
    }

    #[test]
    fn test_parse_mistyped_payload_stays_blocks() {
        let numeric = r#"[{"id":"a","type":"text","content":42}]"#;
        assert_eq!(parse_blocks(numeric), vec![text("a", "42")]);

        let null = r#"[{"id":"a","type":"text","content":null}]"#;
        assert_eq!(parse_blocks(null), vec![text("a", "")]);

        let missing = r#"[{"id":"a","type":"text"}]"#;
        assert_eq!(parse_blocks(missing), vec![text("a", "")]);
    }

    #[test]
    fn test_parse_photo_with_non_string_caption() {
        let raw = r#"[{"id":"p","type":"photo","photoId":7,"caption":false}]"#;
        assert_eq!(parse_blocks(raw), vec![photo("p", "7", None)]);
    }

    #[test]
    fn test_parse_leading_whitespace_before_array() {
        let raw = "  [{\"id\":\"a\",\"type\":\"text\",\"content\":\"hi\"}]";
        assert_eq!(parse_blocks(raw), vec![text("a", "hi")]);
    }

    #[test]
    fn test_serialize_matches_persisted_layout() {
        let blocks = vec![
            text("a", "Arrived."),
            photo("b", "p-1", Some("Marina")),
            photo("c", "", None),
        ];
        assert_eq!(
            serialize_blocks(&blocks),
            r#"[{"id":"a","type":"text","content":"Arrived."},{"id":"b","type":"photo","photoId":"p-1","caption":"Marina"},{"id":"c","type":"photo","photoId":""}]"#
        );
    }

    #[test]
    fn test_round_trip_canonical_sequence() {
        let blocks = vec![
            create_text_block("Left Lefkada at dawn."),
            create_photo_block("photo-42", Some("Sunrise".to_string())),
            create_text_block("Dolphins off the bow \u{1F42C}"),
            create_photo_block("photo-43", None),
        ];
        assert_eq!(parse_blocks(&serialize_blocks(&blocks)), blocks);
    }

    #[test]
    fn test_is_block_format() {
        assert!(is_block_format(r#"[{"id":"a","type":"text","content":""}]"#));
        assert!(!is_block_format("plain words"));
        assert!(!is_block_format("[]"));
        assert!(!is_block_format(r#"[{"id":"","type":"text"}]"#));
        assert!(!is_block_format("[not json"));
    }

    #[test]
    fn test_preview_joins_text_and_skips_photos() {
        let blocks = vec![
            text("a", "Hello "),
            photo("b", "p1", Some("ignored caption")),
            text("c", "world"),
        ];
        assert_eq!(blocks_preview(&blocks, 150), "Hello  world");
    }

    #[test]
    fn test_preview_truncates_with_ellipsis() {
        let blocks = vec![text("a", &"a".repeat(200))];
        let preview = blocks_preview(&blocks, 150);
        assert_eq!(preview.len(), 153);
        assert!(preview.ends_with("..."));
        assert_eq!(&preview[..150], "a".repeat(150));
    }

    #[test]
    fn test_preview_trims_before_ellipsis() {
        let blocks = vec![text("a", "abcd efgh")];
        assert_eq!(blocks_preview(&blocks, 5), "abcd...");
    }

    #[test]
    fn test_preview_at_limit_is_unchanged() {
        let blocks = vec![text("a", "exact")];
        assert_eq!(blocks_preview(&blocks, 5), "exact");
    }

    #[test]
    fn test_preview_counts_characters_not_bytes() {
        let blocks = vec![text("a", "Çeşme Çeşme")];
        assert_eq!(blocks_preview(&blocks, 5), "Çeşme...");
    }

    #[test]
    fn test_has_content() {
        assert!(!has_content(&[text("a", "   ")]));
        assert!(!has_content(&[photo("a", "", None)]));
        assert!(has_content(&[photo("a", "p1", None)]));
        assert!(has_content(&[text("a", " "), text("b", "x")]));
    }
}
