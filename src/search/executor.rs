//! Walks the resolved namespaces and scores every title and object name.

use super::namespaces::{ResolvedNamespaces, module_name, version_label};
use super::scoring::score_all;
use crate::index::NamespaceEntry;
use crate::types::{CandidateKind, CONTENT_PAGE_PENALTY, MODULE_PAGE_BOOST, ScoredCandidate};

/// Name of the landing page inside every namespace.
pub const INDEX_PAGE: &str = "index";

/// Score all candidates of `namespaces` against `terms`. The result is unsorted.
///
/// Without any terms this returns the default listing instead: one entry per
/// namespace, pointing at its landing page.
pub fn execute(
    namespaces: &ResolvedNamespaces<'_>,
    terms: &[String],
    case_insensitive: bool,
) -> Vec<ScoredCandidate> {
    if terms.is_empty() {
        return default_listing(namespaces);
    }

    let mut results = Vec::new();
    for (id, entry) in namespaces {
        search_titles(id, entry, terms, case_insensitive, &mut results);
        search_objects(id, entry, terms, case_insensitive, &mut results);
    }

    tracing::debug!(
        "Scored {} candidates in {} namespaces for {:?}",
        results.len(),
        namespaces.len(),
        terms
    );
    results
}

/// One landing-page entry per namespace, all with score 0.
pub fn default_listing(namespaces: &ResolvedNamespaces<'_>) -> Vec<ScoredCandidate> {
    namespaces
        .keys()
        .map(|id| ScoredCandidate {
            location: format!("{}/{}", id, INDEX_PAGE),
            label: format!("{} {}", module_name(id), version_label(id))
                .trim_end()
                .to_string(),
            category: "module".to_string(),
            anchor: String::new(),
            score: 0.0,
            kind: CandidateKind::Module,
        })
        .collect()
}

fn search_titles(
    namespace: &str,
    entry: &NamespaceEntry,
    terms: &[String],
    case_insensitive: bool,
    results: &mut Vec<ScoredCandidate>,
) {
    for (i, raw_title) in entry.titles.iter().enumerate() {
        let (title, version) = split_title_version(raw_title);

        let Some(score) = score_all(title, terms, case_insensitive) else {
            continue;
        };

        let Some(filename) = entry.filename(i) else {
            tracing::warn!(
                "Title {} in {} has no file name, skipping",
                i,
                namespace
            );
            continue;
        };
        let location = format!("{}/{}", namespace, filename);

        let (score, category, kind) = if is_module_page(&location) {
            let category = version.unwrap_or("module");
            (score + MODULE_PAGE_BOOST, category, CandidateKind::Module)
        } else {
            (score - CONTENT_PAGE_PENALTY, "page", CandidateKind::Page)
        };

        results.push(ScoredCandidate {
            location,
            label: title.to_string(),
            category: category.to_string(),
            anchor: String::new(),
            score,
            kind,
        });
    }
}

fn search_objects(
    namespace: &str,
    entry: &NamespaceEntry,
    terms: &[String],
    case_insensitive: bool,
    results: &mut Vec<ScoredCandidate>,
) {
    let module = module_name(namespace);

    for (prefix, name, record) in entry.objects() {
        let full_name = if prefix.is_empty() {
            format!("{}.{}", module, name)
        } else {
            format!("{}.{}.{}", module, prefix, name)
        };

        let Some(score) = score_all(&full_name, terms, case_insensitive) else {
            continue;
        };

        let (Some(filename), Some(category)) = (
            entry.filename(record.file_index),
            entry.category_label(record.category_index),
        ) else {
            tracing::warn!(
                "Object {} in {} points outside the file or category table, skipping",
                full_name,
                namespace
            );
            continue;
        };

        let anchor = if record.anchor.is_empty() {
            full_name.clone()
        } else {
            format!("{}.{}", module, record.anchor)
        };

        results.push(ScoredCandidate {
            location: format!("{}/{}", namespace, filename),
            label: full_name,
            category: category.to_string(),
            anchor,
            score,
            kind: CandidateKind::Object,
        });
    }
}

/// Split `"Gtk 3.0 (3.24.5)"` into `("Gtk 3.0", Some("3.24.5"))`.
///
/// The annotation runs from the first `" ("` to the last `)`. An empty
/// annotation counts as absent.
pub fn split_title_version(title: &str) -> (&str, Option<&str>) {
    let Some(start) = title.find(" (") else {
        return (title, None);
    };
    let rest = &title[start + 2..];
    let version = rest.rfind(')').map_or(rest, |end| &rest[..end]);
    (&title[..start], Some(version).filter(|v| !v.is_empty()))
}

/// Top-level landing page of a namespace: `<ns>/index`.
pub fn is_module_page(location: &str) -> bool {
    location.matches('/').count() <= 1
        && location.rsplit('/').next() == Some(INDEX_PAGE)
}
