use voyage_core::comment_threads;
use voyage_core::storage::{PhotoFilter, StorageEngine};

use crate::app::AppContext;
use crate::cli::ShowArgs;
use crate::errors::CliError;
use crate::helpers::resolve_journal_id;
use crate::output::{journal_detail_json, print_journal, JournalView};

pub fn handle_show(ctx: &AppContext, args: &ShowArgs) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let (storage, _passphrase) = ctx.open_storage(false)?;

    let id = resolve_journal_id(&storage, &session, &args.id)?;
    // Private entries of other users are reported as missing.
    let entry = storage
        .get_journal(&id)?
        .filter(|entry| entry.is_public || session.owns(&entry.user_id))
        .ok_or_else(|| {
            CliError::not_found(
                format!("Entry not found: {}", args.id),
                "Hint: Run `voyage list` or `voyage feed` to find entry IDs.",
            )
        })?;

    let photos = if session.owns(&entry.user_id) {
        storage.list_photos(&session, &PhotoFilter::new().journal(entry.id))?
    } else {
        storage.public_photos_for_journal(&entry.id)?
    };
    let reactions = storage.reaction_counts(&entry.id)?;
    let own_reaction = storage.user_reaction(&session, &entry.id)?;
    let threads = comment_threads(storage.list_comments(&entry.id)?);
    let itinerary = ctx.itinerary_if_configured();

    let ui_ctx = ctx.ui_context(args.json, None);
    if ui_ctx.mode.is_json() {
        let value = journal_detail_json(&entry, itinerary.as_ref(), &photos, &reactions, &threads);
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let view = JournalView {
        itinerary: itinerary.as_ref(),
        photos: &photos,
        reactions,
        own_reaction,
        threads: &threads,
        tz: ctx.timezone()?,
    };
    print_journal(&ui_ctx, &entry, &view);
    Ok(())
}
