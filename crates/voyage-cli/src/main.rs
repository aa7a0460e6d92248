//! Voyage CLI - an encrypted travel journal for a sailing itinerary
//!
//! This is the command-line interface for Voyage. It wires the parsed
//! arguments to the command handlers and maps errors to exit codes.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod helpers;
mod logging;
mod output;
mod ui;

use clap::Parser;
use voyage_core::VERSION;

use crate::app::AppContext;
use crate::cli::{Cli, Commands};
use crate::commands::{comments, init, journal, maintenance, misc, photos, social, stops};
use crate::errors::exit_code_for;
use crate::ui::render::print_error;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let ctx = AppContext::new(&cli);

    if let Err(e) = run(&ctx, &cli) {
        let ui_ctx = ctx.ui_context(false, None);
        let error_msg = format!("{}", e);
        let (message, hint) = split_error_hint(&error_msg);
        print_error(&ui_ctx, message, hint.as_deref());
        std::process::exit(exit_code_for(&e));
    }
}

/// Split an explicit "Hint:" line off an error message, or provide a
/// contextual hint for common error types.
fn split_error_hint(error: &str) -> (&str, Option<String>) {
    if let Some(idx) = error.find("\nHint:") {
        return (&error[..idx], Some(error[idx + 1..].to_string()));
    }

    let error_lower = error.to_lowercase();
    let hint = if error_lower.contains("entry") && error_lower.contains("not found") {
        Some("Hint: Run `voyage list` or `voyage feed` to find entry IDs.")
    } else if error_lower.contains("photo") && error_lower.contains("not found") {
        Some("Hint: Run `voyage photo list` to find photo IDs.")
    } else if error_lower.contains("comment") && error_lower.contains("not found") {
        Some("Hint: Run `voyage comment list <entry>` to find comment IDs.")
    } else if error_lower.contains("permission denied") {
        Some("Hint: Only the author can change or delete this.")
    } else if error_lower.contains("unknown mood")
        || error_lower.contains("unknown weather")
        || error_lower.contains("unknown reaction")
    {
        Some("Hint: Values are case-insensitive; see `voyage <command> --help`.")
    } else if error_lower.contains("backup") && error_lower.contains("destination") {
        Some("Hint: Ensure the destination path is writable.")
    } else {
        None
    };
    (error, hint.map(str::to_string))
}

fn run(ctx: &AppContext, cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::Init(args)) => {
            init::handle_init(ctx, args)?;
        }
        Some(Commands::Stops(args)) => {
            stops::handle_stops(ctx, args)?;
        }
        Some(Commands::Stop(args)) => {
            stops::handle_stop(ctx, args)?;
        }
        Some(Commands::Add(args)) => {
            journal::handle_add(ctx, args)?;
        }
        Some(Commands::Edit(args)) => {
            journal::handle_edit(ctx, args)?;
        }
        Some(Commands::List(args)) => {
            journal::handle_list(ctx, args)?;
        }
        Some(Commands::Show(args)) => {
            journal::handle_show(ctx, args)?;
        }
        Some(Commands::Delete(args)) => {
            journal::handle_delete(ctx, args)?;
        }
        Some(Commands::Search(args)) => {
            journal::handle_search(ctx, args)?;
        }
        Some(Commands::Photo(args)) => {
            photos::handle_photo(ctx, args)?;
        }
        Some(Commands::Comment(args)) => {
            comments::handle_comment(ctx, args)?;
        }
        Some(Commands::React(args)) => {
            social::handle_react(ctx, args)?;
        }
        Some(Commands::Feed(args)) => {
            social::handle_feed(ctx, args)?;
        }
        Some(Commands::Check) => {
            maintenance::handle_check(ctx)?;
        }
        Some(Commands::Backup(args)) => {
            maintenance::handle_backup(ctx, args)?;
        }
        Some(Commands::Completions(args)) => {
            misc::handle_completions(args)?;
        }
        None => {
            println!("Voyage v{}", VERSION);
            println!("\nQuickstart:");
            println!("  voyage init --itinerary stops.json");
            println!("  voyage stops");
            println!("  voyage add 3 --title \"Arrived\" --body \"Hello\"");
            println!("  voyage list");
            println!("  voyage show <id>");
            println!("\nRun `voyage --help` for full usage.");
        }
    }

    Ok(())
}
