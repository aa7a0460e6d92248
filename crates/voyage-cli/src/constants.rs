//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// Resource not found (config, journal file, entry, photo, comment).
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Authentication failed (wrong passphrase, too many attempts).
    pub const AUTH_FAILED: i32 = 5;

    /// Integrity check failed.
    pub const INTEGRITY_FAILED: i32 = 6;
}

/// Characters of body preview shown in list views.
pub const LIST_PREVIEW_CHARS: usize = 80;

/// Shortest ID prefix accepted in place of a full UUID.
pub const MIN_ID_PREFIX: usize = 4;

/// Default number of feed items.
pub const DEFAULT_FEED_LIMIT: usize = 20;
