//! Query evaluation over a loaded search index.
//!
//! This module provides tokenization, the substring scoring heuristic,
//! namespace/version selection, and the pass that turns an index plus terms
//! into unsorted scored candidates.

pub mod executor;
pub mod namespaces;
pub mod scoring;
pub mod tokenize;

pub use executor::{default_listing, execute};
pub use namespaces::{NamespaceId, ResolvedNamespaces, Version, resolve};
pub use scoring::{score, score_all};
pub use tokenize::tokenize;
