//! Journal entry commands: add, edit, list, show, delete, search.

mod add;
mod delete;
mod edit;
mod list;
mod search;
mod show;

pub use add::handle_add;
pub use delete::handle_delete;
pub use edit::handle_edit;
pub use list::handle_list;
pub use search::handle_search;
pub use show::handle_show;

use uuid::Uuid;

use voyage_core::content::{photo_ids, set_photo, JournalBlock};
use voyage_core::{Session, StorageEngine};

use crate::helpers::resolve_photo_id;

/// Expand photo ID prefixes in photo blocks to full IDs.
fn resolve_block_photos<S: StorageEngine>(
    storage: &S,
    session: &Session,
    blocks: Vec<JournalBlock>,
) -> anyhow::Result<Vec<JournalBlock>> {
    let mut resolved = blocks;
    for index in 0..resolved.len() {
        let reference = match &resolved[index] {
            JournalBlock::Photo(photo)
                if !photo.photo_id.is_empty() && Uuid::parse_str(&photo.photo_id).is_err() =>
            {
                photo.photo_id.clone()
            }
            _ => continue,
        };
        let id = resolve_photo_id(storage, session, &reference)?;
        resolved = set_photo(&resolved, index, &id.to_string());
    }
    Ok(resolved)
}

/// Photo IDs referenced by the blocks, deduplicated, in block order.
fn referenced_photos(blocks: &[JournalBlock]) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = Vec::new();
    for id in photo_ids(blocks) {
        if let Ok(id) = Uuid::parse_str(&id) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    ids
}
