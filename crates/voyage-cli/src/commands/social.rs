//! Reactions and the public feed.

use serde_json::json;

use voyage_core::storage::{ReactionChange, ReactionKind, StorageEngine};

use crate::app::AppContext;
use crate::cli::{FeedArgs, ReactArgs};
use crate::constants::DEFAULT_FEED_LIMIT;
use crate::helpers::resolve_journal_id;
use crate::output::{feed_json, print_feed};
use crate::ui::{badge, kv, short_id, Badge};

pub fn handle_react(ctx: &AppContext, args: &ReactArgs) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let kind: ReactionKind = args.kind.parse()?;

    let (mut storage, passphrase) = ctx.open_storage(false)?;
    let journal_id = resolve_journal_id(&storage, &session, &args.id)?;

    storage.upsert_profile(&session)?;
    let change = storage.toggle_reaction(&session, &journal_id, kind)?;
    let counts = storage.reaction_counts(&journal_id)?;
    storage.close(&passphrase)?;

    let ui_ctx = ctx.ui_context(args.json, None);
    if ui_ctx.mode.is_json() {
        let value = json!({
            "journal_id": journal_id,
            "change": change,
            "reactions": counts,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }
    if ctx.quiet() {
        return Ok(());
    }

    if ui_ctx.mode.is_pretty() {
        let message = match change {
            ReactionChange::Added { kind } => format!("Reacted {}", kind),
            ReactionChange::Removed { kind } => format!("Removed {} reaction", kind),
            ReactionChange::Changed { from, to } => format!("Changed reaction {} -> {}", from, to),
        };
        println!(
            "{}",
            badge(
                &ui_ctx,
                Badge::Ok,
                &format!("{} on {}", message, short_id(&journal_id))
            )
        );
    } else {
        println!("status=ok");
        println!("{}", kv(&ui_ctx, "entry_id", &journal_id.to_string()));
        let (action, kind) = match change {
            ReactionChange::Added { kind } => ("added", kind),
            ReactionChange::Removed { kind } => ("removed", kind),
            ReactionChange::Changed { to, .. } => ("changed", to),
        };
        println!("{}", kv(&ui_ctx, "action", action));
        println!("{}", kv(&ui_ctx, "kind", kind.as_str()));
    }
    for kind in ReactionKind::ALL {
        println!(
            "{}",
            kv(&ui_ctx, kind.as_str(), &counts.get(*kind).to_string())
        );
    }
    Ok(())
}

pub fn handle_feed(ctx: &AppContext, args: &FeedArgs) -> anyhow::Result<()> {
    ctx.session()?;
    let (storage, _passphrase) = ctx.open_storage(false)?;
    let items = storage.public_feed(Some(args.limit.unwrap_or(DEFAULT_FEED_LIMIT)))?;
    let itinerary = ctx.itinerary_if_configured();

    let ui_ctx = ctx.ui_context(args.json, args.format.as_deref());
    if ui_ctx.mode.is_json() {
        let values = feed_json(&items, itinerary.as_ref());
        println!("{}", serde_json::to_string_pretty(&values)?);
        return Ok(());
    }
    print_feed(&ui_ctx, &items, itinerary.as_ref(), ctx.timezone()?);
    Ok(())
}
