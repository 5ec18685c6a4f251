//! User preferences and runtime search settings.
//!
//! Preferences are the three persisted settings (case sensitivity, "include all
//! versions", explicit module allow-list). The search core only touches them
//! through the [`Preferences`] trait and reads a fresh [`UserConfig`] snapshot
//! for every query execution.

use crate::error::{Result, SearchError};
use crate::render::RenderLimits;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Maximum number of result rows shown for a query.
pub const DEFAULT_MAX_RESULTS: usize = 200;

/// Rows appended without a reveal delay before the rest trickle in.
pub const DEFAULT_SHOW_FIRST: usize = 30;

/// Suffix appended to a location path to form a page link.
pub const DEFAULT_PAGE_SUFFIX: &str = ".html";

/// Pause between delayed rows.
pub const DEFAULT_REVEAL_DELAY: Duration = Duration::from_millis(5);

/// Snapshot of the user's search preferences.
///
/// When `include_all_versions` is set, `selected_modules` is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserConfig {
    pub case_insensitive: bool,
    pub include_all_versions: bool,
    pub selected_modules: BTreeSet<String>,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            case_insensitive: true,
            include_all_versions: true,
            selected_modules: BTreeSet::new(),
        }
    }
}

/// Accessor contract for persisted preferences.
pub trait Preferences {
    fn case_insensitive(&self) -> bool;
    fn set_case_insensitive(&mut self, value: bool);

    fn include_all_versions(&self) -> bool;
    fn set_include_all_versions(&mut self, value: bool);

    fn selected_modules(&self) -> BTreeSet<String>;
    fn set_selected_modules(&mut self, modules: BTreeSet<String>);

    /// Restore all three settings to their defaults.
    fn reset(&mut self);

    /// Read all settings at once.
    fn snapshot(&self) -> UserConfig {
        UserConfig {
            case_insensitive: self.case_insensitive(),
            include_all_versions: self.include_all_versions(),
            selected_modules: self.selected_modules(),
        }
    }
}

/// In-memory preferences; nothing survives the process.
impl Preferences for UserConfig {
    fn case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    fn set_case_insensitive(&mut self, value: bool) {
        self.case_insensitive = value;
    }

    fn include_all_versions(&self) -> bool {
        self.include_all_versions
    }

    fn set_include_all_versions(&mut self, value: bool) {
        self.include_all_versions = value;
    }

    fn selected_modules(&self) -> BTreeSet<String> {
        self.selected_modules.clone()
    }

    fn set_selected_modules(&mut self, modules: BTreeSet<String>) {
        self.selected_modules = modules;
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn snapshot(&self) -> UserConfig {
        self.clone()
    }
}

/// On-disk shape. Absent keys fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct StoredPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    case_insensitive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    include_all: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    search_modules: Option<Vec<String>>,
}

/// Preferences persisted to a TOML file.
///
/// Every write goes straight to disk. Write failures are logged and otherwise
/// ignored; the in-memory value still changes.
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    stored: StoredPreferences,
}

impl FilePreferences {
    /// Default location: `<config dir>/docsearch/preferences.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("docsearch").join("preferences.toml"))
    }

    /// Open the preference file at `path`. A missing file means all defaults.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let stored = match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content)
                .with_context(|| format!("Failed to parse preferences at {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoredPreferences::default(),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read preferences at {}", path.display()));
            }
        };
        tracing::debug!("Loaded preferences from {}", path.display());
        Ok(Self { path, stored })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) {
        if let Err(e) = self.write() {
            tracing::warn!("Failed to save preferences to {}: {:#}", self.path.display(), e);
        }
    }

    fn write(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = toml::to_string(&self.stored).context("Failed to serialize preferences")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }
}

impl Preferences for FilePreferences {
    fn case_insensitive(&self) -> bool {
        self.stored.case_insensitive.unwrap_or(true)
    }

    fn set_case_insensitive(&mut self, value: bool) {
        self.stored.case_insensitive = Some(value);
        self.persist();
    }

    fn include_all_versions(&self) -> bool {
        self.stored.include_all.unwrap_or(true)
    }

    fn set_include_all_versions(&mut self, value: bool) {
        self.stored.include_all = Some(value);
        self.persist();
    }

    fn selected_modules(&self) -> BTreeSet<String> {
        self.stored
            .search_modules
            .iter()
            .flatten()
            .filter(|module| !module.is_empty())
            .cloned()
            .collect()
    }

    fn set_selected_modules(&mut self, modules: BTreeSet<String>) {
        self.stored.search_modules = Some(modules.into_iter().collect());
        self.persist();
    }

    fn reset(&mut self) {
        self.stored = StoredPreferences::default();
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!("Failed to remove preferences at {}: {}", self.path.display(), e);
            }
        }
    }
}

/// Knobs for how many results are shown and how rows are rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSettings {
    pub max_results: usize,
    pub show_first: usize,
    pub page_suffix: String,
    pub reveal_delay: Duration,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            show_first: DEFAULT_SHOW_FIRST,
            page_suffix: DEFAULT_PAGE_SUFFIX.to_string(),
            reveal_delay: DEFAULT_REVEAL_DELAY,
        }
    }
}

impl SearchSettings {
    /// Result limits for scored queries.
    pub fn limits(&self) -> std::result::Result<RenderLimits, SearchError> {
        RenderLimits::new(Some(self.max_results), Some(self.show_first))
    }
}
