//! Photo record commands.
//!
//! Voyage stores photo metadata only. The storage path is the key an upload
//! would use in an object store, derived from the owner, stop and upload time.

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use voyage_core::storage::{photo_storage_path, NewPhoto, PhotoFilter, StorageEngine};

use crate::app::AppContext;
use crate::cli::{
    PhotoAddArgs, PhotoArgs, PhotoCaptionArgs, PhotoListArgs, PhotoPublishArgs, PhotoRemoveArgs,
    PhotoSubcommand,
};
use crate::helpers::{parse_datetime, resolve_journal_id, resolve_photo_id};
use crate::output::{photo_json, print_photo_list};
use crate::ui::{receipt, short_id, UiContext};

pub fn handle_photo(ctx: &AppContext, args: &PhotoArgs) -> anyhow::Result<()> {
    match &args.command {
        PhotoSubcommand::Add(add) => handle_photo_add(ctx, add),
        PhotoSubcommand::List(list) => handle_photo_list(ctx, list),
        PhotoSubcommand::Caption(caption) => handle_photo_caption(ctx, caption),
        PhotoSubcommand::Publish(publish) => handle_photo_publish(ctx, publish),
        PhotoSubcommand::Remove(remove) => handle_photo_remove(ctx, remove),
    }
}

fn display_id(ui_ctx: &UiContext, id: &Uuid) -> String {
    if ui_ctx.mode.is_pretty() {
        short_id(id)
    } else {
        id.to_string()
    }
}

fn handle_photo_add(ctx: &AppContext, args: &PhotoAddArgs) -> anyhow::Result<()> {
    let session = ctx.session()?;
    ctx.require_stop(args.stop)?;
    let taken_at = args.taken_at.as_deref().map(parse_datetime).transpose()?;

    let (mut storage, passphrase) = ctx.open_storage(false)?;
    let storage_path = photo_storage_path(&session.user_id, args.stop, &args.file, Utc::now());

    let mut photo = NewPhoto::new(args.stop, storage_path.as_str()).public(args.public);
    if let Some(ref journal) = args.entry {
        photo = photo.with_journal(resolve_journal_id(&storage, &session, journal)?);
    }
    if let Some(ref caption) = args.caption {
        photo = photo.with_caption(caption.as_str());
    }
    if let Some(taken_at) = taken_at {
        photo = photo.with_taken_at(taken_at);
    }
    if let (Some(lat), Some(lon)) = (args.lat, args.lon) {
        photo = photo.with_location(lat, lon);
    }
    if let Some(ref temp_session) = args.session {
        photo = photo.with_temp_session(temp_session.as_str());
    }

    storage.upsert_profile(&session)?;
    let id = storage.add_photo(&session, &photo)?;
    let record = storage.get_photo(&id)?;
    storage.close(&passphrase)?;
    debug!(photo_id = %id, path = %storage_path, "photo recorded");

    let ui_ctx = ctx.ui_context(args.json, None);
    if ui_ctx.mode.is_json() {
        println!("{}", serde_json::to_string_pretty(&record.as_ref().map(photo_json))?);
        return Ok(());
    }
    if !ctx.quiet() {
        let photo_id = display_id(&ui_ctx, &id);
        println!(
            "{}",
            receipt(
                &ui_ctx,
                "Recorded photo",
                &[
                    ("Photo ID", photo_id.as_str()),
                    ("Storage path", storage_path.as_str())
                ],
            )
        );
    }
    Ok(())
}

fn handle_photo_list(ctx: &AppContext, args: &PhotoListArgs) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let (storage, _passphrase) = ctx.open_storage(false)?;

    let mut filter = PhotoFilter::new();
    if let Some(stop_id) = args.stop {
        filter = filter.stop(stop_id);
    }
    if let Some(ref journal) = args.entry {
        filter = filter.journal(resolve_journal_id(&storage, &session, journal)?);
    }
    let photos = storage.list_photos(&session, &filter)?;

    let ui_ctx = ctx.ui_context(args.json, None);
    if ui_ctx.mode.is_json() {
        let values: Vec<_> = photos.iter().map(photo_json).collect();
        println!("{}", serde_json::to_string_pretty(&values)?);
        return Ok(());
    }
    let itinerary = ctx.itinerary_if_configured();
    print_photo_list(&ui_ctx, &photos, itinerary.as_ref(), ctx.timezone()?);
    Ok(())
}

fn handle_photo_caption(ctx: &AppContext, args: &PhotoCaptionArgs) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let (mut storage, passphrase) = ctx.open_storage(false)?;
    let id = resolve_photo_id(&storage, &session, &args.id)?;

    storage.update_photo_caption(&session, &id, args.caption.as_deref())?;
    storage.close(&passphrase)?;

    if !ctx.quiet() {
        let ui_ctx = ctx.ui_context(false, None);
        let photo_id = display_id(&ui_ctx, &id);
        let caption = args.caption.as_deref().unwrap_or("(cleared)");
        println!(
            "{}",
            receipt(
                &ui_ctx,
                "Updated caption",
                &[("Photo ID", photo_id.as_str()), ("Caption", caption)],
            )
        );
    }
    Ok(())
}

fn handle_photo_publish(ctx: &AppContext, args: &PhotoPublishArgs) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let (mut storage, passphrase) = ctx.open_storage(false)?;
    let id = resolve_photo_id(&storage, &session, &args.id)?;

    let is_public = !args.private;
    storage.set_photo_public(&session, &id, is_public)?;
    storage.close(&passphrase)?;

    if !ctx.quiet() {
        let ui_ctx = ctx.ui_context(false, None);
        let photo_id = display_id(&ui_ctx, &id);
        let visibility = if is_public { "public" } else { "private" };
        println!(
            "{}",
            receipt(
                &ui_ctx,
                "Updated photo visibility",
                &[("Photo ID", photo_id.as_str()), ("Visibility", visibility)],
            )
        );
    }
    Ok(())
}

fn handle_photo_remove(ctx: &AppContext, args: &PhotoRemoveArgs) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let (mut storage, passphrase) = ctx.open_storage(false)?;
    let id = resolve_photo_id(&storage, &session, &args.id)?;

    let storage_path = storage.delete_photo(&session, &id)?;
    storage.close(&passphrase)?;

    if !ctx.quiet() {
        let ui_ctx = ctx.ui_context(false, None);
        let photo_id = display_id(&ui_ctx, &id);
        println!(
            "{}",
            receipt(
                &ui_ctx,
                "Removed photo record",
                &[
                    ("Photo ID", photo_id.as_str()),
                    ("Storage path", storage_path.as_str())
                ],
            )
        );
    }
    Ok(())
}
