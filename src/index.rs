//! In-memory search index: namespaces, page titles and declared objects.
//!
//! The payload written by the docs build stores records as positional arrays;
//! they are read into named structs here and never change afterwards.

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Objects declared in one namespace: prefix scope → short name → record.
pub type ObjectTable = BTreeMap<String, BTreeMap<String, ObjectRecord>>;

/// The whole searchable index, keyed by namespace identifier (`"<module>-<version>"`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawSearchIndex")]
pub struct SearchIndex {
    namespaces: BTreeMap<String, NamespaceEntry>,
}

impl SearchIndex {
    pub fn new(namespaces: BTreeMap<String, NamespaceEntry>) -> Self {
        Self { namespaces }
    }

    /// Parse a JSON index payload.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn namespaces(&self) -> &BTreeMap<String, NamespaceEntry> {
        &self.namespaces
    }

    /// All namespace identifiers, in lexical order.
    pub fn namespace_ids(&self) -> impl Iterator<Item = &str> {
        self.namespaces.keys().map(String::as_str)
    }

    pub fn get(&self, id: &str) -> Option<&NamespaceEntry> {
        self.namespaces.get(id)
    }

    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}

/// One documented, versioned module set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NamespaceEntry {
    #[serde(default)]
    pub titles: Vec<String>,
    #[serde(default)]
    pub filenames: Vec<String>,
    #[serde(default)]
    pub docnames: Vec<String>,
    #[serde(default)]
    pub objects: ObjectTable,
    #[serde(default, deserialize_with = "deserialize_objnames")]
    pub objnames: Vec<ObjName>,
}

impl NamespaceEntry {
    /// File name for a title or object record, if the offset is in range.
    pub fn filename(&self, index: usize) -> Option<&str> {
        self.filenames.get(index).map(String::as_str)
    }

    /// Display label of an object category, if the offset is in range.
    pub fn category_label(&self, index: usize) -> Option<&str> {
        self.objnames.get(index).map(|name| name.label.as_str())
    }

    /// Iterate every declared object as `(prefix, name, record)`.
    pub fn objects(&self) -> impl Iterator<Item = (&str, &str, &ObjectRecord)> {
        self.objects.iter().flat_map(|(prefix, members)| {
            members
                .iter()
                .map(move |(name, record)| (prefix.as_str(), name.as_str(), record))
        })
    }

    pub fn object_count(&self) -> usize {
        self.objects.values().map(BTreeMap::len).sum()
    }
}

/// Location and category of a declared object.
///
/// Stored as `[fileIndex, categoryIndex, reserved, anchor]` in the payload.
/// The reserved slot may hold any JSON value; an integer there is kept as
/// `priority`, anything else reads as `None`. It plays no part in ranking.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "(usize, usize, Value, String)")]
pub struct ObjectRecord {
    pub file_index: usize,
    pub category_index: usize,
    pub priority: Option<i64>,
    pub anchor: String,
}

impl ObjectRecord {
    pub fn new(file_index: usize, category_index: usize, anchor: impl Into<String>) -> Self {
        Self {
            file_index,
            category_index,
            priority: None,
            anchor: anchor.into(),
        }
    }
}

impl From<(usize, usize, Value, String)> for ObjectRecord {
    fn from((file_index, category_index, reserved, anchor): (usize, usize, Value, String)) -> Self {
        Self {
            file_index,
            category_index,
            priority: reserved.as_i64(),
            anchor,
        }
    }
}

/// An object category as shown next to results.
///
/// Accepts both `[id, label]` and the three-element `[domain, label, description]`
/// form; only the label (always the second element) is kept.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<String>")]
pub struct ObjName {
    pub label: String,
}

impl ObjName {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl TryFrom<Vec<String>> for ObjName {
    type Error = String;

    fn try_from(parts: Vec<String>) -> Result<Self, Self::Error> {
        parts
            .into_iter()
            .nth(1)
            .map(|label| Self { label })
            .ok_or_else(|| "object name needs at least an id and a label".to_string())
    }
}

/// Wire shape: object names may live at the top level and be shared by all namespaces.
#[derive(Deserialize)]
struct RawSearchIndex {
    namespaces: BTreeMap<String, NamespaceEntry>,
    #[serde(default, deserialize_with = "deserialize_objnames")]
    objnames: Vec<ObjName>,
}

impl From<RawSearchIndex> for SearchIndex {
    fn from(raw: RawSearchIndex) -> Self {
        let RawSearchIndex {
            mut namespaces,
            objnames,
        } = raw;
        if !objnames.is_empty() {
            for entry in namespaces.values_mut() {
                if entry.objnames.is_empty() {
                    entry.objnames.clone_from(&objnames);
                }
            }
        }
        Self { namespaces }
    }
}

/// Reads object names from a sequence or from a map keyed `"0"`, `"1"`, ...
fn deserialize_objnames<'de, D>(deserializer: D) -> Result<Vec<ObjName>, D::Error>
where
    D: Deserializer<'de>,
{
    struct ObjNamesVisitor;

    impl<'de> Visitor<'de> for ObjNamesVisitor {
        type Value = Vec<ObjName>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a sequence or an index-keyed map of object names")
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut names = Vec::with_capacity(seq.size_hint().unwrap_or(0));
            while let Some(name) = seq.next_element()? {
                names.push(name);
            }
            Ok(names)
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut keyed = BTreeMap::new();
            while let Some((key, name)) = map.next_entry::<String, ObjName>()? {
                let index: usize = key.parse().map_err(|_| {
                    de::Error::custom(format!("object name key '{}' is not an index", key))
                })?;
                keyed.insert(index, name);
            }
            if let Some((expected, _)) = keyed
                .keys()
                .enumerate()
                .find(|(expected, index)| expected != *index)
            {
                return Err(de::Error::custom(format!(
                    "object name table is missing index {}",
                    expected
                )));
            }
            Ok(keyed.into_values().collect())
        }
    }

    deserializer.deserialize_any(ObjNamesVisitor)
}
