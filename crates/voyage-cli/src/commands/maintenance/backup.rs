use std::io::IsTerminal;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;
use voyage_core::fs::rename_with_fallback;

use crate::app::{missing_journal_message, AppContext};
use crate::cli::BackupArgs;
use crate::ui::theme::{styled, styles};
use crate::ui::{badge, blank_line, format_bytes, hint, print, Badge, OutputMode};

pub fn handle_backup(ctx: &AppContext, args: &BackupArgs) -> anyhow::Result<()> {
    let source = ctx.journal_path()?;
    let source_path = Path::new(&source);
    if !source_path.exists() {
        return Err(anyhow::anyhow!(missing_journal_message(source_path)));
    }

    let ui_ctx = ctx.ui_context(false, None);

    if std::io::stdin().is_terminal() && !ctx.quiet() {
        let proceed = dialoguer::Confirm::new()
            .with_prompt(format!("Back up journal to {}?", args.destination))
            .default(true)
            .interact()?;
        if !proceed {
            match ui_ctx.mode {
                OutputMode::Pretty => {
                    print(&ui_ctx, &badge(&ui_ctx, Badge::Warn, "Backup cancelled"));
                }
                OutputMode::Plain | OutputMode::Json => {
                    println!("status=cancelled");
                }
            }
            return Err(anyhow::anyhow!("Backup cancelled"));
        }
    }

    let bytes = backup_atomic_copy(source_path, Path::new(&args.destination))?;
    if bytes == 0 {
        return Err(anyhow::anyhow!("Backup failed: zero bytes written"));
    }
    debug!(destination = %args.destination, bytes, "journal backed up");

    if !ctx.quiet() {
        match ui_ctx.mode {
            OutputMode::Pretty => {
                print(&ui_ctx, &badge(&ui_ctx, Badge::Ok, "Backup complete"));
                let context = format!(
                    "Path: {}  \u{00B7}  Size: {}",
                    args.destination,
                    format_bytes(bytes)
                );
                println!("{}", styled(&context, styles::dim(), ui_ctx.color));
                blank_line(&ui_ctx);
                print(&ui_ctx, &hint(&ui_ctx, "voyage check"));
            }
            OutputMode::Plain | OutputMode::Json => {
                println!("status=ok");
                println!("destination={}", args.destination);
                println!("bytes={}", bytes);
            }
        }
    }
    Ok(())
}

/// Copy the encrypted file next to `destination`, then rename it into place.
fn backup_atomic_copy(source: &Path, destination: &Path) -> anyhow::Result<u64> {
    let parent = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|e| {
        anyhow::anyhow!(
            "Failed to create backup destination directory {}: {}",
            parent.display(),
            e
        )
    })?;

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| anyhow::anyhow!("System time error: {}", e))?
        .as_nanos();
    let temp_path = parent.join(format!(".voyage-backup-{}.tmp", nanos));

    let bytes = std::fs::copy(source, &temp_path).map_err(|e| {
        anyhow::anyhow!(
            "Failed to copy journal from {} to {}: {}",
            source.display(),
            destination.display(),
            e
        )
    })?;

    rename_with_fallback(&temp_path, destination)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backup_atomic_copy_replaces_destination() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("voyage.journal");
        let destination = dir.path().join("backups").join("copy.journal");
        std::fs::write(&source, b"encrypted-bytes").unwrap();

        let bytes = backup_atomic_copy(&source, &destination).unwrap();
        assert_eq!(bytes, 15);
        assert_eq!(std::fs::read(&destination).unwrap(), b"encrypted-bytes");

        std::fs::write(&source, b"newer").unwrap();
        backup_atomic_copy(&source, &destination).unwrap();
        assert_eq!(std::fs::read(&destination).unwrap(), b"newer");

        let leftovers = std::fs::read_dir(destination.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }
}
