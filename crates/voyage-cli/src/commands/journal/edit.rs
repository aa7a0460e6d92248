use tracing::debug;

use voyage_core::content::{
    append_photo, append_text, move_block, remove_block, set_caption, set_photo, update_text,
    Direction, JournalBlock,
};
use voyage_core::storage::{JournalUpdate, StorageEngine};

use crate::app::AppContext;
use crate::cli::EditArgs;
use crate::errors::CliError;
use crate::helpers::{
    blocks_to_text, parse_clearable, parse_mood, parse_weather, read_body_from_editor,
    resolve_journal_id, resolve_photo_id, text_to_blocks, trim_placeholder,
};
use crate::ui::{receipt, short_id};

use super::{referenced_photos, resolve_block_photos};

pub fn handle_edit(ctx: &AppContext, args: &EditArgs) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let mood = parse_clearable(args.mood.as_deref(), |v| parse_mood(Some(v)))?;
    let weather = parse_clearable(args.weather.as_deref(), |v| parse_weather(Some(v)))?;

    let (mut storage, passphrase) = ctx.open_storage(args.no_input)?;
    let id = resolve_journal_id(&storage, &session, &args.id)?;
    let entry = storage
        .get_journal(&id)?
        .filter(|entry| session.owns(&entry.user_id))
        .ok_or_else(|| {
            CliError::not_found(
                format!("Entry not found: {}", args.id),
                "Hint: Only your own entries can be edited. Run `voyage list`.",
            )
        })?;

    let original = entry.blocks();
    let mut blocks = original.clone();

    if let Some(ref body) = args.body {
        blocks = text_to_blocks(body);
    } else if args.edit_body {
        if args.no_input {
            return Err(
                CliError::invalid_input("--edit-body cannot be used with --no-input").into(),
            );
        }
        let edited = read_body_from_editor(ctx.editor()?, Some(&blocks_to_text(&blocks)))?;
        blocks = text_to_blocks(&edited);
    }

    if let Some(n) = args.remove_block {
        let index = block_index(&blocks, n)?;
        blocks = remove_block(&blocks, index);
    }
    if let Some(n) = args.move_up {
        let index = block_index(&blocks, n)?;
        blocks = move_block(&blocks, index, Direction::Up);
    }
    if let Some(n) = args.move_down {
        let index = block_index(&blocks, n)?;
        blocks = move_block(&blocks, index, Direction::Down);
    }
    if let Some([n, caption]) = args.caption.as_deref() {
        let n: usize = n
            .parse()
            .map_err(|_| CliError::invalid_input(format!("Invalid block number: {}", n)))?;
        let index = block_index(&blocks, n)?;
        if !matches!(blocks[index], JournalBlock::Photo(_)) {
            return Err(CliError::invalid_input(format!("Block {} is not a photo", n)).into());
        }
        let caption = Some(caption.trim()).filter(|c| !c.is_empty());
        blocks = set_caption(&blocks, index, caption);
    }
    if let Some(ref text) = args.append {
        blocks = append_text(&blocks);
        let last = blocks.len() - 1;
        blocks = update_text(&blocks, last, text);
    }
    for value in &args.photos {
        let photo_id = resolve_photo_id(&storage, &session, value)?;
        blocks = append_photo(&blocks);
        let last = blocks.len() - 1;
        blocks = set_photo(&blocks, last, &photo_id.to_string());
    }
    let blocks = trim_placeholder(resolve_block_photos(&storage, &session, blocks)?);

    let mut update = JournalUpdate::new();
    if let Some(ref title) = args.title {
        update = update.title(title.as_str());
    }
    if blocks != original {
        update = update.blocks(&blocks);
    }
    if let Some(mood) = mood {
        update = update.mood(mood);
    }
    if let Some(weather) = weather {
        update = update.weather(weather);
    }
    if args.public {
        update = update.public(true);
    } else if args.private {
        update = update.public(false);
    }
    if update.is_empty() {
        return Err(CliError::invalid_input(
            "Nothing to change. Pass --title, --body, --edit-body, a block option, --mood, --weather, --public or --private.",
        )
        .into());
    }

    let is_public = update.is_public.unwrap_or(entry.is_public);
    storage.upsert_profile(&session)?;
    storage.update_journal(&session, &id, &update)?;
    let photos = referenced_photos(&blocks);
    let linked = if update.content.is_some() && !photos.is_empty() {
        storage.link_photos(&session, &id, &photos, is_public)?
    } else {
        0
    };
    debug!(entry_id = %id, blocks = blocks.len(), linked, "entry updated");
    storage.close(&passphrase)?;

    if !ctx.quiet() {
        let ui_ctx = ctx.ui_context(false, None);
        let entry_id = if ui_ctx.mode.is_pretty() {
            short_id(&id)
        } else {
            id.to_string()
        };
        let block_count = blocks.len().to_string();
        let visibility = if is_public { "public" } else { "private" };
        println!(
            "{}",
            receipt(
                &ui_ctx,
                "Updated entry",
                &[
                    ("Entry ID", entry_id.as_str()),
                    ("Blocks", block_count.as_str()),
                    ("Visibility", visibility),
                ],
            )
        );
    }
    Ok(())
}

/// Convert a 1-based block number to an index.
fn block_index(blocks: &[JournalBlock], n: usize) -> anyhow::Result<usize> {
    if n == 0 || n > blocks.len() {
        return Err(CliError::invalid_input(format!(
            "Block {} does not exist (entry has {} block{})",
            n,
            blocks.len(),
            if blocks.len() == 1 { "" } else { "s" }
        ))
        .into());
    }
    Ok(n - 1)
}
