use crate::config::{
    DEFAULT_MAX_RESULTS, DEFAULT_PAGE_SUFFIX, DEFAULT_SHOW_FIRST, FilePreferences, Preferences,
    SearchSettings, UserConfig,
};
use crate::error::Result;
use crate::render::{Reveal, ResultSink, Row};
use clap::Parser;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "docsearch")]
#[command(about = "Search a generated API documentation index", long_about = None)]
pub struct Cli {
    /// Search index payload (JSON, or a `Search.setIndex(...)` script)
    pub index: PathBuf,

    /// Query to run. Without one, queries are read line by line from stdin.
    pub query: Vec<String>,

    /// Match letter case exactly
    #[arg(long)]
    pub case_sensitive: bool,

    /// Search exactly this namespace (e.g. `Gtk-3.0`) instead of the newest
    /// version of every module. Repeatable.
    #[arg(short = 'm', long = "module")]
    pub modules: Vec<String>,

    /// Preference file (defaults to the user config directory)
    #[arg(long)]
    pub prefs: Option<PathBuf>,

    /// Store the flags above as the new preferences
    #[arg(long)]
    pub save_prefs: bool,

    /// Forget stored preferences before applying flags
    #[arg(long)]
    pub reset_prefs: bool,

    #[arg(short = 'n', long, default_value_t = DEFAULT_MAX_RESULTS)]
    pub max_results: usize,

    /// Rows printed before the reveal delay kicks in
    #[arg(long, default_value_t = DEFAULT_SHOW_FIRST)]
    pub show_first: usize,

    #[arg(long, default_value = DEFAULT_PAGE_SUFFIX)]
    pub page_suffix: String,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn settings(&self) -> SearchSettings {
        SearchSettings {
            max_results: self.max_results,
            show_first: self.show_first,
            page_suffix: self.page_suffix.clone(),
            ..SearchSettings::default()
        }
    }

    /// Stored preferences with command-line flags applied on top.
    ///
    /// Flags only persist with `--save-prefs`.
    pub fn preferences(&self) -> Result<UserConfig> {
        let path = self.prefs.clone().or_else(FilePreferences::default_path);
        let mut stored = path.map(|path| FilePreferences::open(path)).transpose()?;

        if self.reset_prefs
            && let Some(stored) = stored.as_mut()
        {
            stored.reset();
        }

        let mut config = stored
            .as_ref()
            .map_or_else(UserConfig::default, Preferences::snapshot);
        self.apply_overrides(&mut config);

        if self.save_prefs
            && let Some(stored) = stored.as_mut()
        {
            self.apply_overrides(stored);
        }

        Ok(config)
    }

    fn apply_overrides(&self, preferences: &mut impl Preferences) {
        if self.case_sensitive {
            preferences.set_case_insensitive(false);
        }
        if !self.modules.is_empty() {
            preferences.set_include_all_versions(false);
            preferences.set_selected_modules(self.modules.iter().cloned().collect::<BTreeSet<_>>());
        }
    }
}

/// Prints rows to a terminal as they are appended.
pub struct TerminalSink<W: Write> {
    out: W,
    printed: usize,
}

impl TerminalSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, printed: 0 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{}", line).and_then(|()| self.out.flush()) {
            tracing::warn!("Failed to write result row: {}", e);
        }
        self.printed += 1;
    }
}

impl<W: Write> ResultSink for TerminalSink<W> {
    fn clear(&mut self) {
        if self.printed > 0 {
            self.write_line("");
            self.printed = 0;
        }
    }

    fn append(&mut self, row: Row, _reveal: Reveal) {
        let line = match row {
            Row::Entry(entry) => format!("{:<48} {:<12} {}", entry.title, entry.category, entry.href),
            Row::Message(text) => text,
        };
        self.write_line(&line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::EntryRow;
    use assert2::check;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("docsearch").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["index.js", "gtk", "window"]);
        check!(cli.query == ["gtk", "window"]);
        check!(cli.verbose == 0);
        check!(cli.settings() == SearchSettings::default());
    }

    #[test]
    fn test_flags_override_stored_preferences() {
        let dir = TempDir::new().unwrap();
        let prefs = dir.path().join("prefs.toml");
        let prefs_arg = prefs.to_str().unwrap();

        let cli = parse(&["index.js", "--prefs", prefs_arg, "--case-sensitive", "-m", "Gtk-3.0"]);
        let config = cli.preferences().unwrap();
        check!(!config.case_insensitive);
        check!(!config.include_all_versions);
        check!(config.selected_modules.contains("Gtk-3.0"));

        // nothing saved without --save-prefs
        check!(!prefs.exists());
    }

    #[test]
    fn test_save_prefs_persists_flags() {
        let dir = TempDir::new().unwrap();
        let prefs = dir.path().join("prefs.toml");
        let prefs_arg = prefs.to_str().unwrap();

        parse(&["index.js", "--prefs", prefs_arg, "--case-sensitive", "--save-prefs"])
            .preferences()
            .unwrap();

        let config = parse(&["index.js", "--prefs", prefs_arg]).preferences().unwrap();
        check!(!config.case_insensitive);

        let config = parse(&["index.js", "--prefs", prefs_arg, "--reset-prefs"])
            .preferences()
            .unwrap();
        check!(config == UserConfig::default());
    }

    #[test]
    fn test_terminal_sink_output() {
        let mut sink = TerminalSink::new(Vec::new());
        sink.append(Row::Message("Loading Search Index...".to_string()), Reveal::Immediate);
        sink.clear();
        sink.append(
            Row::Entry(EntryRow {
                href: "Gtk-3.0/index.html".to_string(),
                title: "Gtk 3.0".to_string(),
                category: "module".to_string(),
            }),
            Reveal::Delayed,
        );

        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        check!(lines.len() == 3);
        check!(lines[0] == "Loading Search Index...");
        check!(lines[1].is_empty());
        check!(lines[2].starts_with("Gtk 3.0"));
        check!(lines[2].ends_with("Gtk-3.0/index.html"));
    }
}
