use voyage_core::StorageEngine;

use crate::app::AppContext;
use crate::cli::SearchArgs;
use crate::errors::CliError;
use crate::output::{journals_json, print_journal_list};

pub fn handle_search(ctx: &AppContext, args: &SearchArgs) -> anyhow::Result<()> {
    if args.query.trim().is_empty() {
        return Err(CliError::invalid_input("Search query cannot be empty").into());
    }
    let session = ctx.session()?;
    let (storage, _passphrase) = ctx.open_storage(false)?;

    let mut entries = storage.search_journals(&session, &args.query)?;
    if let Some(limit) = args.limit {
        entries.truncate(limit);
    }

    let itinerary = ctx.itinerary_if_configured();
    let ui_ctx = ctx.ui_context(args.json, args.format.as_deref());
    if ui_ctx.mode.is_json() {
        let output = serde_json::to_string_pretty(&journals_json(&entries, itinerary.as_ref()))?;
        println!("{}", output);
        return Ok(());
    }
    print_journal_list(
        &ui_ctx,
        &entries,
        itinerary.as_ref(),
        ctx.timezone()?,
        "search",
        Some(&args.query),
    );
    Ok(())
}
