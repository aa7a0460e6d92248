//! Plain-text editing format for block bodies.
//!
//! In `$EDITOR` and `--body`, paragraphs separated by blank lines become text
//! blocks and a line of the form `@photo <id> [caption]` becomes a photo
//! block:
//!
//! ```text
//! Dropped anchor in Kotor bay before sunset.
//!
//! @photo 3f0c9a1e-... The old town walls
//!
//! Dinner ashore.
//! ```

use voyage_core::content::{
    append_photo, create_photo_block, create_text_block, normalize_blocks, set_photo,
    JournalBlock,
};

const PHOTO_PREFIX: &str = "@photo";

/// Render blocks in the editing format.
pub fn blocks_to_text(blocks: &[JournalBlock]) -> String {
    blocks
        .iter()
        .filter_map(|block| match block {
            JournalBlock::Text(text) if text.content.trim().is_empty() => None,
            JournalBlock::Text(text) => Some(text.content.clone()),
            JournalBlock::Photo(photo) => {
                let mut line = format!("{} {}", PHOTO_PREFIX, photo.photo_id);
                if let Some(caption) = photo.caption.as_deref().filter(|c| !c.is_empty()) {
                    line.push(' ');
                    line.push_str(caption);
                }
                Some(line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Parse the editing format into blocks. Never returns an empty vector.
pub fn text_to_blocks(text: &str) -> Vec<JournalBlock> {
    let mut blocks = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            flush_paragraph(&mut paragraph, &mut blocks);
            continue;
        }
        if let Some((photo_id, caption)) = parse_photo_line(line) {
            flush_paragraph(&mut paragraph, &mut blocks);
            blocks.push(create_photo_block(photo_id, caption));
            continue;
        }
        paragraph.push(line.trim_end());
    }
    flush_paragraph(&mut paragraph, &mut blocks);

    normalize_blocks(blocks)
}

/// Append a photo block for each ID.
pub fn append_photo_blocks(blocks: Vec<JournalBlock>, photo_ids: &[String]) -> Vec<JournalBlock> {
    photo_ids.iter().fold(blocks, |blocks, photo_id| {
        let blocks = append_photo(&blocks);
        let index = blocks.len() - 1;
        set_photo(&blocks, index, photo_id)
    })
}

/// Drop the leading empty text block left by `normalize_blocks` when photos
/// follow it.
pub fn trim_placeholder(blocks: Vec<JournalBlock>) -> Vec<JournalBlock> {
    let placeholder = matches!(
        blocks.first(),
        Some(JournalBlock::Text(text)) if text.content.trim().is_empty()
    );
    if placeholder && blocks.len() > 1 {
        blocks.into_iter().skip(1).collect()
    } else {
        blocks
    }
}

fn flush_paragraph(paragraph: &mut Vec<&str>, blocks: &mut Vec<JournalBlock>) {
    if paragraph.is_empty() {
        return;
    }
    blocks.push(create_text_block(paragraph.join("\n")));
    paragraph.clear();
}

fn parse_photo_line(line: &str) -> Option<(String, Option<String>)> {
    let rest = line.trim().strip_prefix(PHOTO_PREFIX)?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let rest = rest.trim();
    let (photo_id, caption) = match rest.split_once(char::is_whitespace) {
        Some((id, caption)) => (id, Some(caption.trim().to_string())),
        None => (rest, None),
    };
    if photo_id.is_empty() {
        return None;
    }
    Some((
        photo_id.to_string(),
        caption.filter(|c| !c.is_empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use voyage_core::content::{has_content, photo_ids};

    fn texts(blocks: &[JournalBlock]) -> Vec<String> {
        blocks
            .iter()
            .filter_map(|b| match b {
                JournalBlock::Text(t) => Some(t.content.clone()),
                JournalBlock::Photo(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_paragraphs_become_text_blocks() {
        let blocks = text_to_blocks("Arrived at dawn.\nCalm seas.\n\nDinner ashore.");
        assert_eq!(blocks.len(), 2);
        assert_eq!(
            texts(&blocks),
            vec!["Arrived at dawn.\nCalm seas.", "Dinner ashore."]
        );
    }

    #[test]
    fn test_photo_lines_split_paragraphs() {
        let blocks = text_to_blocks("Before\n@photo abc The walls\nAfter");
        assert_eq!(blocks.len(), 3);
        match &blocks[1] {
            JournalBlock::Photo(photo) => {
                assert_eq!(photo.photo_id, "abc");
                assert_eq!(photo.caption.as_deref(), Some("The walls"));
            }
            other => panic!("expected photo block, got {:?}", other),
        }
    }

    #[test]
    fn test_photo_prefix_needs_separator() {
        let blocks = text_to_blocks("@photography is fun");
        assert_eq!(texts(&blocks), vec!["@photography is fun"]);
    }

    #[test]
    fn test_empty_text_normalizes() {
        let blocks = text_to_blocks("   \n\n");
        assert_eq!(blocks.len(), 1);
        assert!(!has_content(&blocks));
    }

    #[test]
    fn test_blocks_to_text_round_trip() {
        let original = "Sailed north.\n\n@photo p1 Sunrise\n\nAnchored.";
        let blocks = text_to_blocks(original);
        assert_eq!(blocks_to_text(&blocks), original);
    }

    #[test]
    fn test_append_photo_blocks() {
        let blocks = append_photo_blocks(
            vec![create_text_block("Hello")],
            &["p1".to_string(), "p2".to_string()],
        );
        assert_eq!(blocks.len(), 3);
        assert_eq!(photo_ids(&blocks), vec!["p1", "p2"]);
    }

    #[test]
    fn test_trim_placeholder_before_photos() {
        let blocks = append_photo_blocks(text_to_blocks(""), &["p1".to_string()]);
        let blocks = trim_placeholder(blocks);
        assert_eq!(blocks.len(), 1);
        assert_eq!(photo_ids(&blocks), vec!["p1"]);

        let only = trim_placeholder(text_to_blocks(""));
        assert_eq!(only.len(), 1);
    }
}
