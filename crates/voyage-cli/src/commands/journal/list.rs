use voyage_core::storage::{JournalFilter, StorageEngine};

use crate::app::AppContext;
use crate::cli::ListArgs;
use crate::output::{journals_json, print_journal_list, stop_label};

const DEFAULT_LIST_LIMIT: usize = 20;

pub fn handle_list(ctx: &AppContext, args: &ListArgs) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let (storage, _passphrase) = ctx.open_storage(false)?;

    let mut filter = JournalFilter::new().limit(args.limit.unwrap_or(DEFAULT_LIST_LIMIT));
    if let Some(stop_id) = args.stop {
        filter = filter.stop(stop_id);
    }
    let entries = storage.list_journals(&session, &filter)?;

    let itinerary = ctx.itinerary_if_configured();
    let ui_ctx = ctx.ui_context(args.json, args.format.as_deref());
    if ui_ctx.mode.is_json() {
        let output = serde_json::to_string_pretty(&journals_json(&entries, itinerary.as_ref()))?;
        println!("{}", output);
        return Ok(());
    }

    let context = args
        .stop
        .map(|stop_id| stop_label(itinerary.as_ref(), stop_id));
    print_journal_list(
        &ui_ctx,
        &entries,
        itinerary.as_ref(),
        ctx.timezone()?,
        "list",
        context.as_deref(),
    );
    Ok(())
}
