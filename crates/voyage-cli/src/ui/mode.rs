//! Output mode routing.

/// How a command formats its results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Machine-readable JSON only
    Json,
    /// Stable key=value and space-separated lines for scripts
    #[default]
    Plain,
    /// Tables and colors for a terminal
    Pretty,
}

impl OutputMode {
    /// Resolve output mode from flags and environment.
    ///
    /// `--json` or `--format json` wins. `--format plain` and `TERM=dumb`
    /// force plain. Otherwise pretty on a TTY, plain when piped.
    pub fn resolve(
        json_flag: bool,
        format_flag: Option<&str>,
        is_tty: bool,
        term_is_dumb: bool,
    ) -> Self {
        match format_flag.map(str::trim) {
            _ if json_flag => Self::Json,
            Some("json") => Self::Json,
            Some("plain") => Self::Plain,
            _ if term_is_dumb || !is_tty => Self::Plain,
            _ => Self::Pretty,
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json)
    }

    pub fn is_pretty(&self) -> bool {
        matches!(self, Self::Pretty)
    }
}
