use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use voyage_core::VERSION;

/// Voyage - an encrypted travel journal for a sailing itinerary
#[derive(Parser)]
#[command(name = "voyage")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the journal file
    #[arg(short, long, global = true, env = "VOYAGE_PATH")]
    pub journal: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose logging to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Arguments for the `init` command
#[derive(Args)]
pub struct InitArgs {
    /// Path where the journal file will be created
    #[arg(value_name = "PATH")]
    pub path: Option<String>,

    /// Display name shown on your comments
    #[arg(long)]
    pub display_name: Option<String>,

    /// Itinerary JSON file with stops and phases
    #[arg(long, value_name = "FILE")]
    pub itinerary: Option<String>,

    /// Timezone for displayed timestamps (e.g. Europe/Athens)
    #[arg(long)]
    pub timezone: Option<String>,

    /// Default editor for composing entries
    #[arg(long)]
    pub editor: Option<String>,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `stops` command
#[derive(Args)]
pub struct StopsArgs {
    /// Match stop name or country
    #[arg(value_name = "QUERY")]
    pub query: Option<String>,

    /// Only stops in this country
    #[arg(long)]
    pub country: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `stop` command
#[derive(Args)]
pub struct StopArgs {
    /// Stop ID
    #[arg(value_name = "ID")]
    pub id: i64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `add` command
#[derive(Args)]
pub struct AddArgs {
    /// Stop the entry is about
    #[arg(value_name = "STOP")]
    pub stop: i64,

    /// Entry title
    #[arg(long)]
    pub title: String,

    /// Entry body (overrides stdin/editor)
    #[arg(long)]
    pub body: Option<String>,

    /// How the day went
    #[arg(long)]
    pub mood: Option<String>,

    /// Weather at the stop
    #[arg(long)]
    pub weather: Option<String>,

    /// Publish the entry and its photos
    #[arg(long)]
    pub public: bool,

    /// Attach an uploaded photo (repeatable)
    #[arg(long = "photo", value_name = "ID")]
    pub photos: Vec<String>,

    /// Set custom date/time (ISO-8601)
    #[arg(long)]
    pub date: Option<String>,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `edit` command
#[derive(Args)]
pub struct EditArgs {
    /// Entry ID (full UUID or prefix)
    #[arg(value_name = "ID")]
    pub id: String,

    /// New title
    #[arg(long)]
    pub title: Option<String>,

    /// Replace the body text
    #[arg(long)]
    pub body: Option<String>,

    /// Open the body in $EDITOR
    #[arg(long, conflicts_with = "body")]
    pub edit_body: bool,

    /// Set mood ("none" clears it)
    #[arg(long)]
    pub mood: Option<String>,

    /// Set weather ("none" clears it)
    #[arg(long)]
    pub weather: Option<String>,

    /// Publish the entry
    #[arg(long, conflicts_with = "private")]
    pub public: bool,

    /// Unpublish the entry
    #[arg(long)]
    pub private: bool,

    /// Remove block N (1-based, as numbered by `show`)
    #[arg(long, value_name = "N")]
    pub remove_block: Option<usize>,

    /// Move block N one place up
    #[arg(long, value_name = "N")]
    pub move_up: Option<usize>,

    /// Move block N one place down
    #[arg(long, value_name = "N")]
    pub move_down: Option<usize>,

    /// Set the caption of photo block N ("" clears it)
    #[arg(long, num_args = 2, value_names = ["N", "CAPTION"])]
    pub caption: Option<Vec<String>>,

    /// Append a text block
    #[arg(long, value_name = "TEXT")]
    pub append: Option<String>,

    /// Append a photo block (repeatable)
    #[arg(long = "photo", value_name = "ID")]
    pub photos: Vec<String>,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `list` command
#[derive(Args)]
pub struct ListArgs {
    /// Only entries for this stop
    #[arg(long)]
    pub stop: Option<i64>,

    /// Limit number of results
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Output format (table, plain)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<String>,
}

/// Arguments for the `show` command
#[derive(Args)]
pub struct ShowArgs {
    /// Entry ID (full UUID or prefix)
    #[arg(value_name = "ID")]
    pub id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `delete` command
#[derive(Args)]
pub struct DeleteArgs {
    /// Entry ID (full UUID or prefix)
    #[arg(value_name = "ID")]
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(long)]
    pub yes: bool,
}

/// Arguments for the `search` command
#[derive(Args)]
pub struct SearchArgs {
    /// Search query
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Limit number of results
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Output format (table, plain)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<String>,
}

/// Arguments for the `photo` command group
#[derive(Args)]
pub struct PhotoArgs {
    #[command(subcommand)]
    pub command: PhotoSubcommand,
}

#[derive(Subcommand)]
pub enum PhotoSubcommand {
    /// Record an uploaded photo
    Add(PhotoAddArgs),

    /// List your photos
    List(PhotoListArgs),

    /// Set or clear a caption
    Caption(PhotoCaptionArgs),

    /// Change photo visibility
    Publish(PhotoPublishArgs),

    /// Remove a photo record
    Remove(PhotoRemoveArgs),
}

#[derive(Args)]
pub struct PhotoAddArgs {
    /// Stop the photo was taken at
    #[arg(value_name = "STOP")]
    pub stop: i64,

    /// Original file name (used for the storage key extension)
    #[arg(value_name = "FILE")]
    pub file: String,

    /// Attach to an existing entry
    #[arg(long, value_name = "ID")]
    pub entry: Option<String>,

    #[arg(long)]
    pub caption: Option<String>,

    /// When the photo was taken (ISO-8601)
    #[arg(long)]
    pub taken_at: Option<String>,

    #[arg(long, allow_hyphen_values = true, requires = "lon")]
    pub lat: Option<f64>,

    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    pub lon: Option<f64>,

    /// Make the photo public
    #[arg(long)]
    pub public: bool,

    /// Editing session the upload belongs to
    #[arg(long, value_name = "ID")]
    pub session: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct PhotoListArgs {
    /// Only photos from this stop
    #[arg(long)]
    pub stop: Option<i64>,

    /// Only photos attached to this entry
    #[arg(long, value_name = "ID")]
    pub entry: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct PhotoCaptionArgs {
    /// Photo ID (full UUID or prefix)
    #[arg(value_name = "ID")]
    pub id: String,

    /// New caption; omit to clear
    #[arg(value_name = "CAPTION")]
    pub caption: Option<String>,
}

#[derive(Args)]
pub struct PhotoPublishArgs {
    /// Photo ID (full UUID or prefix)
    #[arg(value_name = "ID")]
    pub id: String,

    /// Make the photo private instead
    #[arg(long)]
    pub private: bool,
}

#[derive(Args)]
pub struct PhotoRemoveArgs {
    /// Photo ID (full UUID or prefix)
    #[arg(value_name = "ID")]
    pub id: String,
}

/// Arguments for the `comment` command group
#[derive(Args)]
pub struct CommentArgs {
    #[command(subcommand)]
    pub command: CommentSubcommand,
}

#[derive(Subcommand)]
pub enum CommentSubcommand {
    /// Comment on an entry
    Add(CommentAddArgs),

    /// Show the comment threads on an entry
    List(CommentListArgs),

    /// Delete one of your comments
    Delete(CommentDeleteArgs),
}

#[derive(Args)]
pub struct CommentAddArgs {
    /// Entry ID (full UUID or prefix)
    #[arg(value_name = "ENTRY")]
    pub entry: String,

    /// Comment text
    #[arg(value_name = "TEXT")]
    pub text: String,

    /// Reply to this comment
    #[arg(long, value_name = "COMMENT")]
    pub reply_to: Option<String>,
}

#[derive(Args)]
pub struct CommentListArgs {
    /// Entry ID (full UUID or prefix)
    #[arg(value_name = "ENTRY")]
    pub entry: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CommentDeleteArgs {
    /// Comment ID (full UUID)
    #[arg(value_name = "ID")]
    pub id: String,
}

/// Arguments for the `react` command
#[derive(Args)]
pub struct ReactArgs {
    /// Entry ID (full UUID or prefix)
    #[arg(value_name = "ID")]
    pub id: String,

    /// like, heart, amazed or inspired
    #[arg(value_name = "KIND")]
    pub kind: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `feed` command
#[derive(Args)]
pub struct FeedArgs {
    /// Limit number of results
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Output format (table, plain)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<String>,
}

/// Arguments for the `backup` command
#[derive(Args)]
pub struct BackupArgs {
    /// Destination path
    #[arg(value_name = "DEST")]
    pub destination: String,
}

/// Arguments for the `completions` command
#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_name = "SHELL")]
    pub shell: Shell,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an encrypted journal file and config
    Init(InitArgs),

    /// List itinerary stops
    Stops(StopsArgs),

    /// Show one itinerary stop
    Stop(StopArgs),

    /// Write a journal entry for a stop
    Add(AddArgs),

    /// Edit one of your entries
    Edit(EditArgs),

    /// List your entries
    List(ListArgs),

    /// Show an entry
    Show(ShowArgs),

    /// Delete one of your entries
    Delete(DeleteArgs),

    /// Search your entries using full-text search
    Search(SearchArgs),

    /// Manage photo records
    Photo(PhotoArgs),

    /// Comment on entries
    Comment(CommentArgs),

    /// Toggle a reaction on an entry
    React(ReactArgs),

    /// Public entries with reactions and comment counts
    Feed(FeedArgs),

    /// Check journal integrity
    Check,

    /// Backup the journal file
    Backup(BackupArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
