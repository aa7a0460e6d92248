//! Edit operations over block sequences.
//!
//! Every operation returns a new sequence; the input slice is never mutated.
//! Out-of-range indices and variant mismatches are no-ops, matching how an
//! editor would ignore a stale UI action.

use super::blocks::{create_photo_block, create_text_block, JournalBlock};

/// Direction for [`move_block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Replace an empty sequence with the minimal `[Text("")]`.
pub fn normalize_blocks(blocks: Vec<JournalBlock>) -> Vec<JournalBlock> {
    if blocks.is_empty() {
        vec![create_text_block("")]
    } else {
        blocks
    }
}

/// Replace the content of the text block at `index`.
pub fn update_text(blocks: &[JournalBlock], index: usize, content: &str) -> Vec<JournalBlock> {
    let mut next = blocks.to_vec();
    if let Some(JournalBlock::Text(block)) = next.get_mut(index) {
        block.content = content.to_string();
    }
    next
}

/// Point the photo block at `index` to `photo_id`.
pub fn set_photo(blocks: &[JournalBlock], index: usize, photo_id: &str) -> Vec<JournalBlock> {
    let mut next = blocks.to_vec();
    if let Some(JournalBlock::Photo(block)) = next.get_mut(index) {
        block.photo_id = photo_id.to_string();
    }
    next
}

/// Set or clear the caption of the photo block at `index`.
pub fn set_caption(
    blocks: &[JournalBlock],
    index: usize,
    caption: Option<&str>,
) -> Vec<JournalBlock> {
    let mut next = blocks.to_vec();
    if let Some(JournalBlock::Photo(block)) = next.get_mut(index) {
        block.caption = caption.map(String::from);
    }
    next
}

/// Remove the block at `index`.
///
/// The last remaining block is never removed: a sole text block is cleared
/// to `[Text("")]`, and a sole photo block is left in place.
pub fn remove_block(blocks: &[JournalBlock], index: usize) -> Vec<JournalBlock> {
    if blocks.len() <= 1 {
        return match blocks.first() {
            Some(JournalBlock::Text(_)) | None => vec![create_text_block("")],
            Some(JournalBlock::Photo(_)) => blocks.to_vec(),
        };
    }
    if index >= blocks.len() {
        return blocks.to_vec();
    }
    blocks
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, block)| block.clone())
        .collect()
}

/// Swap the block at `index` with its neighbour in `direction`.
pub fn move_block(blocks: &[JournalBlock], index: usize, direction: Direction) -> Vec<JournalBlock> {
    let mut next = blocks.to_vec();
    let target = match direction {
        Direction::Up => index.checked_sub(1),
        Direction::Down => index.checked_add(1),
    };
    if let Some(target) = target {
        if index < next.len() && target < next.len() {
            next.swap(index, target);
        }
    }
    next
}

/// Append an empty text block.
pub fn append_text(blocks: &[JournalBlock]) -> Vec<JournalBlock> {
    let mut next = blocks.to_vec();
    next.push(create_text_block(""));
    next
}

/// Append a photo block with no photo attached yet.
pub fn append_photo(blocks: &[JournalBlock]) -> Vec<JournalBlock> {
    let mut next = blocks.to_vec();
    next.push(create_photo_block("", None));
    next
}

/// Non-empty photo references, in block order.
pub fn photo_ids(blocks: &[JournalBlock]) -> Vec<String> {
    blocks
        .iter()
        .filter_map(|block| match block {
            JournalBlock::Photo(photo) if !photo.photo_id.is_empty() => {
                Some(photo.photo_id.clone())
            }
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::blocks::{PhotoBlock, TextBlock};

    fn text(id: &str, content: &str) -> JournalBlock {
        JournalBlock::Text(TextBlock {
            id: id.to_string(),
            content: content.to_string(),
        })
    }

    fn photo(id: &str, photo_id: &str) -> JournalBlock {
        JournalBlock::Photo(PhotoBlock {
            id: id.to_string(),
            photo_id: photo_id.to_string(),
            caption: None,
        })
    }

    fn ids(blocks: &[JournalBlock]) -> Vec<&str> {
        blocks.iter().map(|b| b.id()).collect()
    }

    #[test]
    fn test_normalize_empty() {
        let blocks = normalize_blocks(Vec::new());
        assert_eq!(blocks.len(), 1);
        assert!(matches!(&blocks[0], JournalBlock::Text(t) if t.content.is_empty()));
    }

    #[test]
    fn test_update_text_leaves_input_untouched() {
        let original = vec![text("a", "old")];
        let updated = update_text(&original, 0, "new");
        assert_eq!(original, vec![text("a", "old")]);
        assert_eq!(updated, vec![text("a", "new")]);
    }

    #[test]
    fn test_update_text_ignores_photo_block() {
        let original = vec![photo("a", "p1")];
        assert_eq!(update_text(&original, 0, "x"), original);
    }

    #[test]
    fn test_set_photo_and_caption() {
        let original = vec![text("a", ""), photo("b", "")];
        let with_photo = set_photo(&original, 1, "p9");
        let with_caption = set_caption(&with_photo, 1, Some("Harbour"));
        match &with_caption[1] {
            JournalBlock::Photo(p) => {
                assert_eq!(p.photo_id, "p9");
                assert_eq!(p.caption.as_deref(), Some("Harbour"));
            }
            other => panic!("unexpected block {:?}", other),
        }
    }

    #[test]
    fn test_remove_block() {
        let original = vec![text("a", "1"), photo("b", "p"), text("c", "2")];
        assert_eq!(ids(&remove_block(&original, 1)), vec!["a", "c"]);
        assert_eq!(remove_block(&original, 7), original);
    }

    #[test]
    fn test_remove_sole_text_block_clears_it() {
        let result = remove_block(&[text("a", "keep?")], 0);
        assert_eq!(result.len(), 1);
        assert!(matches!(&result[0], JournalBlock::Text(t) if t.content.is_empty()));
    }

    #[test]
    fn test_remove_sole_photo_block_is_noop() {
        let original = vec![photo("a", "p1")];
        assert_eq!(remove_block(&original, 0), original);
    }

    #[test]
    fn test_move_block() {
        let original = vec![text("a", ""), text("b", ""), text("c", "")];
        assert_eq!(ids(&move_block(&original, 0, Direction::Down)), vec!["b", "a", "c"]);
        assert_eq!(ids(&move_block(&original, 2, Direction::Up)), vec!["a", "c", "b"]);
        assert_eq!(move_block(&original, 0, Direction::Up), original);
        assert_eq!(move_block(&original, 2, Direction::Down), original);
    }

    #[test]
    fn test_append_blocks() {
        let original = vec![text("a", "x")];
        let next = append_photo(&append_text(&original));
        assert_eq!(next.len(), 3);
        assert_eq!(next[1].kind(), "text");
        assert_eq!(next[2].kind(), "photo");
    }

    #[test]
    fn test_photo_ids_skip_empty_references() {
        let blocks = vec![photo("a", "p1"), text("b", ""), photo("c", ""), photo("d", "p2")];
        assert_eq!(photo_ids(&blocks), vec!["p1".to_string(), "p2".to_string()]);
    }
}
