//! Error handling types and utilities.

use thiserror::Error;

/// A specialized Result type for docsearch operations.
///
/// This is an alias for `anyhow::Result` with context added via `.context()` and
/// `.with_context()` methods on the loading and preference paths.
pub type Result<T> = anyhow::Result<T>;

/// Caller bugs detected by the search core.
///
/// These are never shown to the end user, who only ever sees the
/// "Loading Search Index..." and "No Results" placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// The index registration entry point was called a second time.
    #[error("search index was already registered")]
    IndexAlreadyLoaded,

    /// More rows were requested to appear immediately than may be shown at all.
    #[error("show_first ({show_first}) exceeds max_shown ({max_shown})")]
    InvalidRenderLimits { max_shown: usize, show_first: usize },
}
