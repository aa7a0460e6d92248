//! Journal body content model.
//!
//! - **blocks**: the block sum type, parser, serializer, preview and
//!   presence checks
//! - **editing**: copy-on-write edit operations used by editors

pub mod blocks;
pub mod editing;

pub use blocks::{
    blocks_preview, create_photo_block, create_text_block, generate_block_id, has_content,
    is_block_format, parse_blocks, serialize_blocks, JournalBlock, PhotoBlock, TextBlock,
    DEFAULT_PREVIEW_LENGTH,
};
pub use editing::{
    append_photo, append_text, move_block, normalize_blocks, photo_ids, remove_block, set_caption,
    set_photo, update_text, Direction,
};
