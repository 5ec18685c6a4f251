use std::cmp::Ordering;

/// Bonus for a namespace's top-level index page.
pub const MODULE_PAGE_BOOST: f64 = 100.0;

/// Penalty for every other page title.
pub const CONTENT_PAGE_PENALTY: f64 = 100.0;

/// What kind of candidate produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    /// A namespace landing page.
    Module,
    /// Any other page title.
    Page,
    /// A declared object (class, function, property...).
    Object,
}

/// One ranked hit, produced per query and discarded after rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    /// Namespace-relative page, without the page suffix (`Gtk-3.0/classes/Window`).
    pub location: String,
    pub label: String,
    pub category: String,
    /// In-page anchor without the leading `#`; empty for whole pages.
    pub anchor: String,
    pub score: f64,
    pub kind: CandidateKind,
}

impl ScoredCandidate {
    /// Navigation target: `<location><suffix>` plus `#<anchor>` when there is one.
    pub fn href(&self, page_suffix: &str) -> String {
        if self.anchor.is_empty() {
            format!("{}{}", self.location, page_suffix)
        } else {
            format!("{}{}#{}", self.location, page_suffix, self.anchor)
        }
    }
}

/// Ranking order: higher score first, then label ascending ignoring case.
pub fn rank_order(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.label.to_lowercase().cmp(&b.label.to_lowercase()))
}

/// Sort candidates into display order.
pub fn rank(candidates: &mut [ScoredCandidate]) {
    candidates.sort_by(rank_order);
}
