use tracing::debug;

use voyage_core::storage::{NewJournalEntry, StorageEngine};

use crate::app::AppContext;
use crate::cli::AddArgs;
use crate::helpers::{
    append_photo_blocks, parse_datetime, parse_mood, parse_weather, read_entry_body,
    read_piped_stdin, resolve_photo_id, text_to_blocks, trim_placeholder,
};
use crate::output::stop_label;
use crate::ui::theme::{styled, styles};
use crate::ui::{badge, blank_line, format_datetime, hint, print, short_id, Badge, OutputMode};

use super::{referenced_photos, resolve_block_photos};

pub fn handle_add(ctx: &AppContext, args: &AddArgs) -> anyhow::Result<()> {
    let session = ctx.session()?;
    ctx.require_stop(args.stop)?;
    let mood = parse_mood(args.mood.as_deref())?;
    let weather = parse_weather(args.weather.as_deref())?;
    let created_at = args.date.as_deref().map(parse_datetime).transpose()?;

    let (mut storage, passphrase) = ctx.open_storage(args.no_input)?;
    let ui_ctx = ctx.ui_context(false, None);

    // A photo-only entry needs no text, so skip the editor.
    let body = if args.body.is_none() && !args.photos.is_empty() {
        read_piped_stdin()?.unwrap_or_default()
    } else {
        read_entry_body(args.no_input, args.body.clone(), ctx.editor()?, None)?
    };

    let mut photo_refs = Vec::with_capacity(args.photos.len());
    for value in &args.photos {
        photo_refs.push(resolve_photo_id(&storage, &session, value)?.to_string());
    }
    let blocks = append_photo_blocks(text_to_blocks(&body), &photo_refs);
    let blocks = trim_placeholder(resolve_block_photos(&storage, &session, blocks)?);

    let mut new_entry =
        NewJournalEntry::new(args.stop, args.title.as_str(), &blocks).public(args.public);
    if let Some(mood) = mood {
        new_entry = new_entry.with_mood(mood);
    }
    if let Some(weather) = weather {
        new_entry = new_entry.with_weather(weather);
    }
    if let Some(created_at) = created_at {
        new_entry = new_entry.with_created_at(created_at);
    }

    storage.upsert_profile(&session)?;
    let entry_id = storage.create_journal(&session, &new_entry)?;
    let photos = referenced_photos(&blocks);
    let linked = if photos.is_empty() {
        0
    } else {
        storage.link_photos(&session, &entry_id, &photos, args.public)?
    };
    debug!(%entry_id, blocks = blocks.len(), linked, "entry created");
    storage.close(&passphrase)?;

    if ctx.quiet() {
        return Ok(());
    }
    let itinerary = ctx.itinerary_if_configured();
    let created = format_datetime(
        &created_at.unwrap_or_else(chrono::Utc::now),
        ui_ctx.mode.is_pretty(),
        ctx.timezone()?,
    );
    match ui_ctx.mode {
        OutputMode::Pretty => {
            blank_line(&ui_ctx);
            print(
                &ui_ctx,
                &badge(
                    &ui_ctx,
                    Badge::Ok,
                    &format!("Added entry for {}", stop_label(itinerary.as_ref(), args.stop)),
                ),
            );
            let context = format!(
                "ID: {}  \u{00B7}  {}  \u{00B7}  photos: {}  \u{00B7}  {}",
                short_id(&entry_id),
                created,
                linked,
                if args.public { "public" } else { "private" }
            );
            println!("{}", styled(&context, styles::dim(), ui_ctx.color));
            blank_line(&ui_ctx);
            print(
                &ui_ctx,
                &hint(
                    &ui_ctx,
                    &format!(
                        "voyage show {}  \u{00B7}  voyage list  \u{00B7}  voyage edit {}",
                        short_id(&entry_id),
                        short_id(&entry_id)
                    ),
                ),
            );
        }
        OutputMode::Plain | OutputMode::Json => {
            println!("status=ok");
            println!("entry_id={}", entry_id);
            println!("stop_id={}", args.stop);
            println!("created_at={}", created);
            println!("photo_count={}", linked);
            println!("is_public={}", args.public);
        }
    }
    Ok(())
}
