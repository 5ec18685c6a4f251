//! Loading the search index payload from disk.
//!
//! The docs build writes the index either as plain JSON or as a script that
//! hands it to the page (`Search.setIndex({...})`). Both are accepted.

use crate::error::Result;
use crate::index::SearchIndex;
use anyhow::Context;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Registration call the index script makes when it is evaluated.
const SET_INDEX_CALL: &str = ".setIndex(";

/// Single-resolution handle for an index that is loading in the background.
///
/// Cloneable; every clone resolves to the same index or the same error.
pub type IndexFuture = Shared<BoxFuture<'static, std::result::Result<Arc<SearchIndex>, String>>>;

/// Parse an index payload in either supported form.
pub fn parse_payload(payload: &str) -> Result<SearchIndex> {
    let json = extract_json(payload)?;
    SearchIndex::from_json(json).context("Failed to parse search index")
}

/// Strip a `*.setIndex(...)` wrapper, if present.
fn extract_json(payload: &str) -> Result<&str> {
    let trimmed = payload.trim();
    if trimmed.starts_with('{') {
        return Ok(trimmed);
    }

    let start = trimmed
        .find(SET_INDEX_CALL)
        .context("Payload is neither JSON nor a setIndex(...) call")?
        + SET_INDEX_CALL.len();
    let end = trimmed
        .rfind(')')
        .filter(|&end| end >= start)
        .context("Unterminated setIndex(...) call")?;

    Ok(trimmed[start..end].trim())
}

/// Read and parse the index at `path`.
///
/// Parsing runs on the blocking pool since large indices take a while.
pub async fn load_index(path: &Path) -> Result<SearchIndex> {
    let start = std::time::Instant::now();
    let payload = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read search index at {}", path.display()))?;

    let index = tokio::task::spawn_blocking(move || parse_payload(&payload))
        .await
        .context("Index parsing task panicked")?
        .with_context(|| format!("Invalid search index at {}", path.display()))?;

    tracing::info!(
        "Loaded search index from {} ({} namespaces) in {:?}",
        path.display(),
        index.len(),
        start.elapsed()
    );
    Ok(index)
}

/// Start loading the index in the background.
///
/// Must be called from within a tokio runtime.
pub fn spawn_index_load(path: PathBuf) -> IndexFuture {
    let handle = tokio::spawn(async move {
        load_index(&path)
            .await
            .map(Arc::new)
            .map_err(|e| format!("{:#}", e))
    });

    async move {
        match handle.await {
            Ok(result) => result,
            Err(e) => Err(format!("Index loading task failed: {}", e)),
        }
    }
    .boxed()
    .shared()
}
