use std::io::IsTerminal;

use voyage_core::StorageEngine;

use crate::app::AppContext;
use crate::cli::DeleteArgs;
use crate::errors::CliError;
use crate::helpers::resolve_journal_id;
use crate::ui::{receipt, short_id, truncate};

pub fn handle_delete(ctx: &AppContext, args: &DeleteArgs) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let (mut storage, passphrase) = ctx.open_storage(false)?;
    let id = resolve_journal_id(&storage, &session, &args.id)?;
    let entry = storage
        .get_journal(&id)?
        .filter(|entry| session.owns(&entry.user_id))
        .ok_or_else(|| {
            CliError::not_found(
                format!("Entry not found: {}", args.id),
                "Hint: Only your own entries can be deleted. Run `voyage list`.",
            )
        })?;

    if !args.yes {
        if !std::io::stdin().is_terminal() {
            return Err(CliError::invalid_input("Refusing to delete without --yes").into());
        }
        let proceed = dialoguer::Confirm::new()
            .with_prompt(format!(
                "Delete \"{}\" with its comments and reactions?",
                truncate(&entry.title, 40)
            ))
            .default(false)
            .interact()?;
        if !proceed {
            return Err(anyhow::anyhow!("Delete cancelled"));
        }
    }

    storage.delete_journal(&session, &id)?;
    storage.close(&passphrase)?;

    if !ctx.quiet() {
        let ui_ctx = ctx.ui_context(false, None);
        let entry_id = if ui_ctx.mode.is_pretty() {
            short_id(&id)
        } else {
            id.to_string()
        };
        println!(
            "{}",
            receipt(&ui_ctx, "Deleted entry", &[("Entry ID", entry_id.as_str())])
        );
    }
    Ok(())
}
