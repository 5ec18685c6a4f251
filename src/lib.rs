//! Offline text search over a generated API documentation index.
//!
//! The pieces, leaf first:
//! - [`search::scoring`]: substring relevance heuristic
//! - [`search::namespaces`]: which namespaces (module versions) take part in a query
//! - [`search::executor`]: scoring every title and object name of those namespaces
//! - [`controller`]: query lifecycle, deferral until the index is loaded
//! - [`render`]: incremental, generation-checked rendering into a result list

pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod index;
pub mod loader;
pub mod render;
pub mod search;
pub mod tracing;
pub mod types;

pub use config::{FilePreferences, Preferences, SearchSettings, UserConfig};
pub use controller::{Phase, QueryController, QueryState};
pub use error::SearchError;
pub use index::{NamespaceEntry, ObjName, ObjectRecord, SearchIndex};
pub use render::{
    EntryRow, Generation, ListContainer, RenderLimits, RenderOutcome, RenderTask, ResultRenderer,
    ResultSink, Reveal, Row,
};
pub use types::{CandidateKind, ScoredCandidate};
