//! Shared fixtures for integration tests.

use docsearch::config::{SearchSettings, UserConfig};
use docsearch::controller::QueryController;
use docsearch::index::SearchIndex;
use docsearch::loader::parse_payload;
use docsearch::render::ListContainer;
use rstest::fixture;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Small index with two modules, one of them in two versions.
///
/// `objnames` uses the top-level map form, shared by every namespace.
pub const INDEX_JSON: &str = r#"{
    "namespaces": {
        "demo-1.0": {
            "titles": ["Demo (1.0)", "Window management", "Getting started"],
            "filenames": ["index", "guide/windows", "guide/start"],
            "docnames": ["index", "guide/windows", "guide/start"],
            "objects": {
                "": {"Window": [0, 0, 1, ""]},
                "Window": {"show": [0, 1, 1, "Window.show"]}
            }
        },
        "Gtk-3.0": {
            "titles": ["Gtk (3.0)"],
            "filenames": ["index"],
            "objects": {"": {"Widget": [0, 0, 1, ""]}}
        },
        "Gtk-4.0": {
            "titles": ["Gtk (4.0)"],
            "filenames": ["index"],
            "objects": {"": {"Widget": [0, 0, 1, ""]}}
        }
    },
    "objnames": {
        "0": ["py", "class", "Python class"],
        "1": ["py", "method", "Python method"]
    }
}"#;

/// Index where one module has three equally scored page titles.
pub const MANY_PAGES_JSON: &str = r#"{
    "namespaces": {
        "demo-1.0": {
            "titles": ["Widgets C", "Widgets A", "Labels", "Widgets B"],
            "filenames": ["c", "a", "labels", "b"]
        }
    }
}"#;

/// A search index written to a temporary directory.
///
/// The directory is removed when this is dropped.
#[allow(dead_code)] // Used across different integration test crates
pub struct TempIndex {
    _dir: TempDir,
    path: PathBuf,
}

#[allow(dead_code)]
impl TempIndex {
    /// Write `json` wrapped in a `Search.setIndex(...)` call, the way the
    /// docs build emits it.
    pub fn script(json: &str) -> Self {
        Self::write("searchindex.js", &format!("Search.setIndex({})", json))
    }

    pub fn write(name: &str, content: &str) -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let path = dir.path().join(name);
        std::fs::write(&path, content)
            .unwrap_or_else(|e| panic!("Failed to write index '{}': {}", path.display(), e));
        Self { _dir: dir, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub type TestController = QueryController<ListContainer, UserConfig>;

#[allow(dead_code)]
pub fn load(json: &str) -> Arc<SearchIndex> {
    Arc::new(parse_payload(json).expect("Fixture index must parse"))
}

#[allow(dead_code)]
pub fn controller_with(settings: &SearchSettings) -> TestController {
    QueryController::new(ListContainer::new(), UserConfig::default(), settings)
        .expect("Fixture settings must be valid")
}

#[fixture]
#[allow(dead_code)]
pub fn demo_index() -> Arc<SearchIndex> {
    load(INDEX_JSON)
}

#[fixture]
#[allow(dead_code)]
pub fn controller() -> TestController {
    controller_with(&SearchSettings::default())
}
