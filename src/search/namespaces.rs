//! Selection of the namespaces that take part in a query.
//!
//! Namespace identifiers look like `Gtk-3.0`: a module name, a dash, and a
//! dotted version. Either the newest version of every module is searched, or
//! exactly the namespaces the user picked.

use crate::config::UserConfig;
use crate::index::{NamespaceEntry, SearchIndex};
use ahash::AHashMap;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Namespaces searched by one query execution. Never cached across queries.
pub type ResolvedNamespaces<'a> = BTreeMap<&'a str, &'a NamespaceEntry>;

/// A namespace identifier split into module name and version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceId<'a> {
    pub module: &'a str,
    pub version: Version,
}

impl<'a> NamespaceId<'a> {
    /// The module is everything before the first `-`; the version compared is
    /// the field after it, up to the next `-` (`Foo-1.0-beta` → `1.0`).
    /// An identifier without a dash has an empty version.
    pub fn parse(id: &'a str) -> Self {
        let mut fields = id.split('-');
        let module = fields.next().unwrap_or(id);
        Self {
            module,
            version: fields.next().map(Version::parse).unwrap_or_default(),
        }
    }
}

/// Module part of a namespace identifier (`Gtk-3.0` → `Gtk`).
pub fn module_name(id: &str) -> &str {
    id.split_once('-').map_or(id, |(module, _)| module)
}

/// Version part of a namespace identifier, verbatim (`Gtk-3.0` → `3.0`).
pub fn version_label(id: &str) -> &str {
    id.split_once('-').map_or("", |(_, version)| version)
}

/// One dot-separated version component.
///
/// Components that are not plain integers order below every number, so a
/// malformed version never outranks a well-formed one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Segment {
    Invalid(String),
    Number(u64),
}

/// Dotted version compared component-wise as integers.
///
/// A version that is a strict prefix of another is the smaller one
/// (`3` < `3.0` < `3.0.1`).
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version(Vec<Segment>);

impl Version {
    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            return Self::default();
        }
        Self(
            text.split('.')
                .map(|part| {
                    part.parse()
                        .map_or_else(|_| Segment::Invalid(part.to_string()), Segment::Number)
                })
                .collect(),
        )
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match segment {
                Segment::Number(n) => write!(f, "{}", n)?,
                Segment::Invalid(s) => f.write_str(s)?,
            }
        }
        Ok(())
    }
}

/// Compute the namespaces to search for the given configuration.
///
/// With `include_all_versions`, one namespace per module survives: the one with
/// the greatest version. Otherwise exactly the identifiers in
/// `selected_modules` that exist in the index are kept.
pub fn resolve<'a>(index: &'a SearchIndex, config: &UserConfig) -> ResolvedNamespaces<'a> {
    let resolved: ResolvedNamespaces<'a> = if config.include_all_versions {
        latest_versions(index.namespace_ids())
            .into_iter()
            .filter_map(|id| index.get(id).map(|entry| (id, entry)))
            .collect()
    } else {
        index
            .namespaces()
            .iter()
            .filter(|(id, _)| config.selected_modules.contains(id.as_str()))
            .map(|(id, entry)| (id.as_str(), entry))
            .collect()
    };

    tracing::debug!(
        "Resolved {} of {} namespaces (include_all_versions={})",
        resolved.len(),
        index.len(),
        config.include_all_versions
    );

    resolved
}

/// Pick the newest identifier per module name.
///
/// Ties between equal versions spelled differently (`1.0` and `1.00`) go to
/// the lexically greater identifier so the result does not depend on input order.
pub fn latest_versions<'a>(ids: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    let mut newest: AHashMap<&'a str, (Version, &'a str)> = AHashMap::new();

    for id in ids {
        let NamespaceId { module, version } = NamespaceId::parse(id);
        let replace = newest.get(module).is_none_or(|(best, best_id)| {
            compare(&version, id, best, best_id) == Ordering::Greater
        });
        if replace {
            newest.insert(module, (version, id));
        }
    }

    let mut selected: Vec<&'a str> = newest.into_values().map(|(_, id)| id).collect();
    selected.sort_unstable();
    selected
}

fn compare(version: &Version, id: &str, other: &Version, other_id: &str) -> Ordering {
    version.cmp(other).then_with(|| id.cmp(other_id))
}
