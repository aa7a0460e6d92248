//! JSON output formatting for entries, photos and feed items.

use serde_json::{json, Value};

use voyage_core::itinerary::Itinerary;
use voyage_core::storage::{CommentThread, FeedItem, JournalEntry, Photo, ReactionCounts};

fn stop_name(itinerary: Option<&Itinerary>, stop_id: i64) -> Option<String> {
    itinerary
        .and_then(|it| it.stop(stop_id))
        .map(|stop| stop.name.clone())
}

/// Convert an entry to JSON for output. The body is emitted as blocks.
pub fn journal_json(entry: &JournalEntry, itinerary: Option<&Itinerary>) -> Value {
    json!({
        "id": entry.id,
        "stop_id": entry.stop_id,
        "stop_name": stop_name(itinerary, entry.stop_id),
        "user_id": entry.user_id,
        "title": entry.title,
        "blocks": entry.blocks(),
        "mood": entry.mood,
        "weather": entry.weather,
        "is_public": entry.is_public,
        "created_at": entry.created_at,
        "updated_at": entry.updated_at,
    })
}

pub fn journals_json(entries: &[JournalEntry], itinerary: Option<&Itinerary>) -> Vec<Value> {
    entries
        .iter()
        .map(|entry| journal_json(entry, itinerary))
        .collect()
}

/// Full entry detail for `show --json`.
pub fn journal_detail_json(
    entry: &JournalEntry,
    itinerary: Option<&Itinerary>,
    photos: &[Photo],
    reactions: &ReactionCounts,
    threads: &[CommentThread],
) -> Value {
    let mut value = journal_json(entry, itinerary);
    value["photos"] = json!(photos);
    value["reactions"] = json!(reactions);
    value["comments"] = json!(threads);
    value
}

pub fn photo_json(photo: &Photo) -> Value {
    json!(photo)
}

pub fn feed_json(items: &[FeedItem], itinerary: Option<&Itinerary>) -> Vec<Value> {
    items
        .iter()
        .map(|item| {
            let mut value = journal_json(&item.journal, itinerary);
            value["preview"] = json!(item.journal.preview(crate::constants::LIST_PREVIEW_CHARS));
            value["reactions"] = json!(item.reaction_counts);
            value["comment_count"] = json!(item.comment_count);
            value
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;
    use voyage_core::content::{create_photo_block, create_text_block, serialize_blocks};

    fn entry() -> JournalEntry {
        let blocks = vec![
            create_text_block("Anchored off Perast."),
            create_photo_block("p1", Some("Our Lady of the Rocks".to_string())),
        ];
        JournalEntry {
            id: Uuid::new_v4(),
            stop_id: 3,
            user_id: Uuid::new_v4(),
            title: "Perast".to_string(),
            content: serialize_blocks(&blocks),
            mood: None,
            weather: None,
            is_public: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_journal_json_emits_blocks() {
        let value = journal_json(&entry(), None);
        assert_eq!(value["title"], "Perast");
        assert!(value["stop_name"].is_null());
        let blocks = value["blocks"].as_array().unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0]["type"], "text");
        assert_eq!(blocks[1]["photoId"], "p1");
    }

    #[test]
    fn test_feed_json_includes_counts() {
        let item = FeedItem {
            journal: entry(),
            reaction_counts: ReactionCounts {
                heart: 2,
                ..Default::default()
            },
            comment_count: 1,
        };
        let values = feed_json(&[item], None);
        assert_eq!(values[0]["reactions"]["heart"], 2);
        assert_eq!(values[0]["comment_count"], 1);
        assert_eq!(values[0]["preview"], "Anchored off Perast.");
    }
}
