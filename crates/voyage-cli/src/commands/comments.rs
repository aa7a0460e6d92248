use tracing::debug;
use uuid::Uuid;

use voyage_core::comment_threads;
use voyage_core::storage::{AgeSqliteStorage, JournalEntry, StorageEngine};
use voyage_core::Session;

use crate::app::AppContext;
use crate::cli::{CommentAddArgs, CommentArgs, CommentDeleteArgs, CommentListArgs, CommentSubcommand};
use crate::errors::CliError;
use crate::helpers::{parse_uuid, resolve_journal_id};
use crate::output::print_threads;
use crate::ui::{receipt, short_id};

pub fn handle_comment(ctx: &AppContext, args: &CommentArgs) -> anyhow::Result<()> {
    match &args.command {
        CommentSubcommand::Add(add) => handle_comment_add(ctx, add),
        CommentSubcommand::List(list) => handle_comment_list(ctx, list),
        CommentSubcommand::Delete(delete) => handle_comment_delete(ctx, delete),
    }
}

/// An entry the session may read: public or its own.
fn visible_entry(
    storage: &AgeSqliteStorage,
    session: &Session,
    id: &Uuid,
    raw: &str,
) -> anyhow::Result<JournalEntry> {
    storage
        .get_journal(id)?
        .filter(|entry| entry.is_public || session.owns(&entry.user_id))
        .ok_or_else(|| {
            CliError::not_found(
                format!("Entry not found: {}", raw),
                "Hint: Run `voyage list` or `voyage feed` to find entry IDs.",
            )
            .into()
        })
}

fn handle_comment_add(ctx: &AppContext, args: &CommentAddArgs) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let text = args.text.trim();
    if text.is_empty() {
        return Err(CliError::invalid_input("Comment text cannot be empty.").into());
    }
    let parent = args
        .reply_to
        .as_deref()
        .map(|value| parse_uuid(value, "comment"))
        .transpose()?;

    let (mut storage, passphrase) = ctx.open_storage(false)?;
    let journal_id = resolve_journal_id(&storage, &session, &args.entry)?;

    storage.upsert_profile(&session)?;
    let id = storage.add_comment(&session, &journal_id, text, parent.as_ref())?;
    storage.close(&passphrase)?;
    debug!(comment_id = %id, journal_id = %journal_id, "comment added");

    if !ctx.quiet() {
        let ui_ctx = ctx.ui_context(false, None);
        let (comment_id, entry_id) = if ui_ctx.mode.is_pretty() {
            (short_id(&id), short_id(&journal_id))
        } else {
            (id.to_string(), journal_id.to_string())
        };
        let title = if parent.is_some() {
            "Replied"
        } else {
            "Commented"
        };
        println!(
            "{}",
            receipt(
                &ui_ctx,
                title,
                &[
                    ("Comment ID", comment_id.as_str()),
                    ("Entry ID", entry_id.as_str())
                ],
            )
        );
    }
    Ok(())
}

fn handle_comment_list(ctx: &AppContext, args: &CommentListArgs) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let (storage, _passphrase) = ctx.open_storage(false)?;
    let journal_id = resolve_journal_id(&storage, &session, &args.entry)?;
    let entry = visible_entry(&storage, &session, &journal_id, &args.entry)?;

    let threads = comment_threads(storage.list_comments(&entry.id)?);

    let ui_ctx = ctx.ui_context(args.json, None);
    if ui_ctx.mode.is_json() {
        println!("{}", serde_json::to_string_pretty(&threads)?);
        return Ok(());
    }
    print_threads(&ui_ctx, &threads, ctx.timezone()?);
    Ok(())
}

fn handle_comment_delete(ctx: &AppContext, args: &CommentDeleteArgs) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let id = parse_uuid(&args.id, "comment")?;

    let (mut storage, passphrase) = ctx.open_storage(false)?;
    storage.delete_comment(&session, &id)?;
    storage.close(&passphrase)?;

    if !ctx.quiet() {
        let ui_ctx = ctx.ui_context(false, None);
        let comment_id = if ui_ctx.mode.is_pretty() {
            short_id(&id)
        } else {
            id.to_string()
        };
        println!(
            "{}",
            receipt(
                &ui_ctx,
                "Deleted comment",
                &[("Comment ID", comment_id.as_str())]
            )
        );
    }
    Ok(())
}
