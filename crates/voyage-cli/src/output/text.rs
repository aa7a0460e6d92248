//! Text and table output for entries, photos, comments and the feed.

use chrono_tz::Tz;
use uuid::Uuid;

use voyage_core::content::JournalBlock;
use voyage_core::itinerary::Itinerary;
use voyage_core::storage::{
    CommentThread, FeedItem, JournalEntry, Photo, ReactionCounts, ReactionKind,
};

use crate::constants::LIST_PREVIEW_CHARS;
use crate::ui::format::wrap;
use crate::ui::theme::{styled, styles, PRIVATE, PUBLIC, REPLY};
use crate::ui::{
    blank_line, divider, format_date, format_datetime, header, hint, kv, short_id, simple_table,
    single_line, truncate, Column, OutputMode, UiContext,
};

/// Stop name with its ID, or just the ID when the itinerary is unknown.
pub fn stop_label(itinerary: Option<&Itinerary>, stop_id: i64) -> String {
    match itinerary.and_then(|it| it.stop(stop_id)) {
        Some(stop) => format!("{} (#{})", stop.name, stop.id),
        None => format!("#{}", stop_id),
    }
}

fn visibility(ui: &UiContext, is_public: bool) -> &'static str {
    if is_public {
        PUBLIC.get(ui.unicode)
    } else {
        PRIVATE.get(ui.unicode)
    }
}

fn visibility_word(is_public: bool) -> &'static str {
    if is_public {
        "public"
    } else {
        "private"
    }
}

/// Print entries as a table (pretty) or one line per entry (plain).
pub fn print_journal_list(
    ui: &UiContext,
    entries: &[JournalEntry],
    itinerary: Option<&Itinerary>,
    tz: Option<Tz>,
    command: &str,
    context: Option<&str>,
) {
    match ui.mode {
        OutputMode::Pretty => {
            println!("{}", header(ui, command, context));
            blank_line(ui);
            if entries.is_empty() {
                println!("No entries found.");
                println!("{}", hint(ui, "voyage add <stop> --title <title>"));
                return;
            }
            let columns = [
                Column::new(""),
                Column::new("ID"),
                Column::new("Date"),
                Column::new("Stop"),
                Column::new("Title"),
                Column::new("Preview"),
            ];
            let rows: Vec<Vec<String>> = entries
                .iter()
                .map(|entry| {
                    vec![
                        visibility(ui, entry.is_public).to_string(),
                        short_id(&entry.id),
                        format_date(&entry.created_at, tz),
                        stop_label(itinerary, entry.stop_id),
                        truncate(&entry.title, 32),
                        single_line(&entry.preview(LIST_PREVIEW_CHARS)),
                    ]
                })
                .collect();
            println!("{}", simple_table(ui, &columns, &rows));
            blank_line(ui);
            println!("{}", hint(ui, "voyage show <id>"));
        }
        OutputMode::Plain => {
            if entries.is_empty() {
                println!("count=0");
                return;
            }
            for entry in entries {
                println!(
                    "{} {} {} {} {}",
                    entry.id,
                    entry.created_at.to_rfc3339(),
                    entry.stop_id,
                    visibility_word(entry.is_public),
                    single_line(&entry.title)
                );
            }
        }
        OutputMode::Json => {}
    }
}

/// Everything shown alongside an entry body.
pub struct JournalView<'a> {
    pub itinerary: Option<&'a Itinerary>,
    pub photos: &'a [Photo],
    pub reactions: ReactionCounts,
    pub own_reaction: Option<ReactionKind>,
    pub threads: &'a [CommentThread],
    pub tz: Option<Tz>,
}

/// Print a single entry with its blocks, reactions and comments.
pub fn print_journal(ui: &UiContext, entry: &JournalEntry, view: &JournalView<'_>) {
    let pretty = ui.mode.is_pretty();

    if pretty {
        println!("{}", styled(&entry.title, styles::bold(), ui.color));
    } else {
        println!("{}", kv(ui, "Title", &single_line(&entry.title)));
    }
    println!("{}", kv(ui, "ID", &entry.id.to_string()));
    println!("{}", kv(ui, "Stop", &stop_label(view.itinerary, entry.stop_id)));
    println!(
        "{}",
        kv(ui, "Created", &format_datetime(&entry.created_at, pretty, view.tz))
    );
    if entry.updated_at != entry.created_at {
        println!(
            "{}",
            kv(ui, "Updated", &format_datetime(&entry.updated_at, pretty, view.tz))
        );
    }
    if let Some(mood) = entry.mood {
        println!("{}", kv(ui, "Mood", mood.as_str()));
    }
    if let Some(weather) = entry.weather {
        println!("{}", kv(ui, "Weather", weather.as_str()));
    }
    println!("{}", kv(ui, "Visibility", visibility_word(entry.is_public)));

    println!("{}", divider(ui));
    print_blocks(ui, &entry.blocks(), view.photos);
    println!("{}", divider(ui));

    print_reactions(ui, &view.reactions, view.own_reaction);
    print_threads(ui, view.threads, view.tz);
}

/// Blocks are numbered from 1 so `edit --remove-block N` can refer to them.
fn print_blocks(ui: &UiContext, blocks: &[JournalBlock], photos: &[Photo]) {
    let width = ui.width.clamp(24, 100) - 4;
    for (index, block) in blocks.iter().enumerate() {
        let number = index + 1;
        if ui.mode.is_pretty() {
            if index > 0 {
                println!();
            }
            print!("{} ", styled(&format!("{:>3}", number), styles::dim(), ui.color));
        } else {
            println!("block {} {}", number, block.kind());
        }
        match block {
            JournalBlock::Text(text) => {
                if ui.mode.is_pretty() {
                    let lines = wrap(&text.content, width);
                    if lines.is_empty() {
                        println!();
                    }
                    for (i, line) in lines.iter().enumerate() {
                        let gutter = if i == 0 { "" } else { "    " };
                        println!("{}{}", gutter, line);
                    }
                } else {
                    println!("{}", text.content);
                }
            }
            JournalBlock::Photo(photo) => {
                let record = Uuid::parse_str(&photo.photo_id)
                    .ok()
                    .and_then(|id| photos.iter().find(|p| p.id == id));
                let caption = photo
                    .caption
                    .as_deref()
                    .or_else(|| record.and_then(|p| p.caption.as_deref()));
                let label = match record {
                    Some(record) => format!("[photo {}]", record.storage_path),
                    None if photo.photo_id.is_empty() => "[photo]".to_string(),
                    None => format!("[photo {} unavailable]", photo.photo_id),
                };
                let line = match caption {
                    Some(caption) => format!("{} {}", label, caption),
                    None => label,
                };
                println!("{}", styled(&line, styles::cyan(), ui.color));
            }
        }
    }
}

fn print_reactions(ui: &UiContext, counts: &ReactionCounts, own: Option<ReactionKind>) {
    let summary = ReactionKind::ALL
        .iter()
        .map(|kind| format!("{} {}", kind.as_str(), counts.get(*kind)))
        .collect::<Vec<_>>()
        .join(", ");
    println!("{}", kv(ui, "Reactions", &summary));
    if let Some(kind) = own {
        println!("{}", kv(ui, "Your reaction", kind.as_str()));
    }
}

/// Print comment threads with replies indented under their parent.
pub fn print_threads(ui: &UiContext, threads: &[CommentThread], tz: Option<Tz>) {
    if threads.is_empty() {
        if ui.mode.is_pretty() {
            println!("No comments yet.");
        } else {
            println!("comments=0");
        }
        return;
    }
    if ui.mode.is_pretty() {
        println!("Comments:");
    }
    for thread in threads {
        print_thread(ui, thread, 0, tz);
    }
}

fn print_thread(ui: &UiContext, thread: &CommentThread, depth: usize, tz: Option<Tz>) {
    let comment = &thread.comment;
    let author = comment
        .author_name
        .clone()
        .unwrap_or_else(|| short_id(&comment.user_id));
    if ui.mode.is_pretty() {
        let indent = "  ".repeat(depth + 1);
        let marker = if depth > 0 {
            format!("{} ", REPLY.get(ui.unicode))
        } else {
            String::new()
        };
        let meta = styled(
            &format!(
                "{} \u{00B7} {} \u{00B7} {}",
                author,
                format_datetime(&comment.created_at, true, tz),
                short_id(&comment.id)
            ),
            styles::dim(),
            ui.color,
        );
        println!("{}{}{}", indent, marker, meta);
        for line in wrap(&comment.content, ui.width.clamp(20, 100)) {
            println!("{}{}{}", indent, " ".repeat(marker.chars().count()), line);
        }
    } else {
        println!(
            "comment {} depth={} parent={} author={} {}",
            comment.id,
            depth,
            comment
                .parent_comment_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string()),
            single_line(&author).replace(' ', "_"),
            single_line(&comment.content)
        );
    }
    for reply in &thread.replies {
        print_thread(ui, reply, depth + 1, tz);
    }
}

/// Print the public feed.
pub fn print_feed(
    ui: &UiContext,
    items: &[FeedItem],
    itinerary: Option<&Itinerary>,
    tz: Option<Tz>,
) {
    match ui.mode {
        OutputMode::Pretty => {
            println!("{}", header(ui, "feed", None));
            blank_line(ui);
            if items.is_empty() {
                println!("No public entries yet.");
                println!("{}", hint(ui, "voyage edit <id> --public"));
                return;
            }
            let columns = [
                Column::new("ID"),
                Column::new("Date"),
                Column::new("Stop"),
                Column::new("Title"),
                Column::new("Reactions"),
                Column::new("Comments"),
            ];
            let rows: Vec<Vec<String>> = items
                .iter()
                .map(|item| {
                    vec![
                        short_id(&item.journal.id),
                        format_date(&item.journal.created_at, tz),
                        stop_label(itinerary, item.journal.stop_id),
                        truncate(&item.journal.title, 40),
                        item.reaction_counts.total().to_string(),
                        item.comment_count.to_string(),
                    ]
                })
                .collect();
            println!("{}", simple_table(ui, &columns, &rows));
            blank_line(ui);
            println!("{}", hint(ui, "voyage react <id> heart"));
        }
        OutputMode::Plain => {
            if items.is_empty() {
                println!("count=0");
                return;
            }
            for item in items {
                println!(
                    "{} {} {} reactions={} comments={} {}",
                    item.journal.id,
                    item.journal.created_at.to_rfc3339(),
                    item.journal.stop_id,
                    item.reaction_counts.total(),
                    item.comment_count,
                    single_line(&item.journal.title)
                );
            }
        }
        OutputMode::Json => {}
    }
}

/// Print photo records.
pub fn print_photo_list(
    ui: &UiContext,
    photos: &[Photo],
    itinerary: Option<&Itinerary>,
    tz: Option<Tz>,
) {
    match ui.mode {
        OutputMode::Pretty => {
            println!("{}", header(ui, "photo list", None));
            blank_line(ui);
            if photos.is_empty() {
                println!("No photos found.");
                println!("{}", hint(ui, "voyage photo add <stop> <file>"));
                return;
            }
            let columns = [
                Column::new(""),
                Column::new("ID"),
                Column::new("Date"),
                Column::new("Stop"),
                Column::new("Entry"),
                Column::new("Caption"),
            ];
            let rows: Vec<Vec<String>> = photos
                .iter()
                .map(|photo| {
                    vec![
                        visibility(ui, photo.is_public).to_string(),
                        short_id(&photo.id),
                        format_date(photo.taken_at.as_ref().unwrap_or(&photo.created_at), tz),
                        stop_label(itinerary, photo.stop_id),
                        photo
                            .journal_id
                            .map(|id| short_id(&id))
                            .unwrap_or_else(|| "-".to_string()),
                        photo.caption.as_deref().map(|c| truncate(c, 40)).unwrap_or_default(),
                    ]
                })
                .collect();
            println!("{}", simple_table(ui, &columns, &rows));
        }
        OutputMode::Plain => {
            if photos.is_empty() {
                println!("count=0");
                return;
            }
            for photo in photos {
                println!(
                    "{} {} {} {} {}",
                    photo.id,
                    photo.stop_id,
                    photo
                        .journal_id
                        .map(|id| id.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    visibility_word(photo.is_public),
                    photo.storage_path
                );
            }
        }
        OutputMode::Json => {}
    }
}
