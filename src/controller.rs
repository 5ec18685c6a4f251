//! Query lifecycle: de-duplication, deferral until the index is ready,
//! execution and hand-off to the renderer.
//!
//! Superseding is implicit. Every accepted submission bumps the render
//! generation, so any render task from an older query stops at its next step.
//! Execution itself is synchronous; only rendering is split into steps.

use crate::config::{Preferences, SearchSettings};
use crate::error::{Result, SearchError};
use crate::index::SearchIndex;
use crate::loader::IndexFuture;
use crate::render::{
    Generation, LOADING_MESSAGE, RenderLimits, RenderTask, ResultRenderer, ResultSink,
};
use crate::search::{execute, resolve, tokenize};
use crate::types::rank;
use anyhow::anyhow;
use std::sync::Arc;

/// Where the controller is in handling the latest submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing submitted yet, or the latest render has completed.
    Idle,
    /// A query is queued until the index arrives.
    AwaitingIndex,
    /// Scoring is in progress. Only observable from within execution.
    Searching,
    /// Rows for the latest query are still being emitted.
    Rendering,
}

/// Snapshot of the controller's query bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryState {
    pub active_query: Option<String>,
    /// At most one query submitted before the index loaded; later ones overwrite it.
    pub queued_query: Option<String>,
    pub render_generation: Generation,
}

/// Owns the index, the preferences and the renderer for one result list.
pub struct QueryController<S, P> {
    renderer: ResultRenderer<S>,
    preferences: P,
    index: Option<Arc<SearchIndex>>,
    active_query: Option<String>,
    queued_query: Option<String>,
    phase: Phase,
    limits: RenderLimits,
}

impl<S: ResultSink, P: Preferences> QueryController<S, P> {
    pub fn new(
        sink: S,
        preferences: P,
        settings: &SearchSettings,
    ) -> std::result::Result<Self, SearchError> {
        Ok(Self {
            renderer: ResultRenderer::new(sink, settings),
            preferences,
            index: None,
            active_query: None,
            queued_query: None,
            phase: Phase::Idle,
            limits: settings.limits()?,
        })
    }

    /// Submit a raw query string.
    ///
    /// Re-submitting the active query is a no-op. Before the index is loaded
    /// the query is queued and a loading placeholder is shown; afterwards it
    /// runs immediately and the returned task renders its rows.
    pub fn submit(&mut self, query: &str) -> Option<RenderTask<S>> {
        if self.active_query.as_deref() == Some(query) {
            tracing::trace!("Ignoring re-submission of {:?}", query);
            return None;
        }
        self.active_query = Some(query.to_string());
        self.renderer.abort_fill();

        let Some(index) = self.index.clone() else {
            tracing::debug!("Index not loaded yet, queueing {:?}", query);
            self.queued_query = Some(query.to_string());
            self.renderer.show_message(LOADING_MESSAGE);
            self.phase = Phase::AwaitingIndex;
            return None;
        };

        Some(self.run_query(&index, query))
    }

    /// Register the loaded index. Runs the queued query, if any.
    ///
    /// The index can only be registered once.
    pub fn on_index_ready(
        &mut self,
        index: Arc<SearchIndex>,
    ) -> std::result::Result<Option<RenderTask<S>>, SearchError> {
        if self.index.is_some() {
            return Err(SearchError::IndexAlreadyLoaded);
        }
        tracing::info!("Search index ready ({} namespaces)", index.len());
        self.index = Some(Arc::clone(&index));

        Ok(self
            .queued_query
            .take()
            .map(|query| self.run_query(&index, &query)))
    }

    /// Wait for `index` if it is not registered yet, then submit `query`.
    ///
    /// Unlike [`submit`](Self::submit) this never shows the loading
    /// placeholder, so the container only ever holds the query's own rows.
    pub async fn submit_when_ready(
        &mut self,
        index: IndexFuture,
        query: &str,
    ) -> Result<Option<RenderTask<S>>> {
        if self.index.is_none() {
            let index = index.await.map_err(|e| anyhow!(e))?;
            let queued = self.on_index_ready(index)?;
            if self.active_query.as_deref() == Some(query) {
                return Ok(queued);
            }
        }
        Ok(self.submit(query))
    }

    /// Run the active query again, e.g. after the preferences changed.
    ///
    /// Returns `None` if nothing was submitted yet or the query is still
    /// waiting for the index.
    pub fn rerun(&mut self) -> Option<RenderTask<S>> {
        let index = self.index.clone()?;
        let query = self.active_query.clone()?;
        self.renderer.abort_fill();
        Some(self.run_query(&index, &query))
    }

    fn run_query(&mut self, index: &SearchIndex, query: &str) -> RenderTask<S> {
        self.phase = Phase::Searching;

        let terms = tokenize(query);
        let config = self.preferences.snapshot();
        let namespaces = resolve(index, &config);

        let mut results = execute(&namespaces, &terms, config.case_insensitive);
        rank(&mut results);

        let limits = if terms.is_empty() {
            RenderLimits::unbounded()
        } else {
            self.limits
        };

        tracing::debug!("Query {:?} produced {} results", query, results.len());
        let task = self.renderer.fill(results, limits);
        self.phase = Phase::Rendering;
        task
    }

    pub fn phase(&self) -> Phase {
        match self.phase {
            Phase::Rendering if self.renderer.is_finished() => Phase::Idle,
            phase => phase,
        }
    }

    pub fn state(&self) -> QueryState {
        QueryState {
            active_query: self.active_query.clone(),
            queued_query: self.queued_query.clone(),
            render_generation: self.renderer.generation(),
        }
    }

    pub fn generation(&self) -> Generation {
        self.renderer.generation()
    }

    pub fn has_index(&self) -> bool {
        self.index.is_some()
    }

    pub fn renderer(&self) -> &ResultRenderer<S> {
        &self.renderer
    }

    pub fn preferences(&self) -> &P {
        &self.preferences
    }

    pub fn preferences_mut(&mut self) -> &mut P {
        &mut self.preferences
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UserConfig;
    use crate::index::NamespaceEntry;
    use crate::render::{ListContainer, NO_RESULTS_MESSAGE, RenderOutcome, Step};
    use assert2::{check, let_assert};
    use std::collections::BTreeMap;

    type Controller = QueryController<ListContainer, UserConfig>;

    fn controller() -> Controller {
        QueryController::new(
            ListContainer::new(),
            UserConfig::default(),
            &SearchSettings::default(),
        )
        .unwrap()
    }

    fn index() -> Arc<SearchIndex> {
        let entry = NamespaceEntry {
            titles: vec!["Widgets".to_string(), "Labels".to_string()],
            filenames: vec!["widgets".to_string(), "labels".to_string()],
            ..NamespaceEntry::default()
        };
        Arc::new(SearchIndex::new(BTreeMap::from([(
            "demo-1.0".to_string(),
            entry,
        )])))
    }

    #[test]
    fn test_starts_idle() {
        let controller = controller();
        check!(controller.phase() == Phase::Idle);
        check!(controller.state() == QueryState::default());
    }

    #[test]
    fn test_resubmission_is_a_no_op() {
        let mut controller = controller();
        controller.on_index_ready(index()).unwrap();

        check!(controller.submit("widget").is_some());
        let generation = controller.generation();

        check!(controller.submit("widget").is_none());
        check!(controller.generation() == generation);
    }

    #[test]
    fn test_query_before_index_is_queued() {
        let mut controller = controller();
        check!(controller.submit("widget").is_none());
        check!(controller.phase() == Phase::AwaitingIndex);

        let sink = controller.renderer().sink();
        check!(sink.messages().collect::<Vec<_>>() == [LOADING_MESSAGE]);
    }

    #[test]
    fn test_only_latest_queued_query_runs() {
        let mut controller = controller();
        controller.submit("widget");
        controller.submit("label");
        check!(controller.state().queued_query.as_deref() == Some("label"));

        let_assert!(Ok(Some(mut task)) = controller.on_index_ready(index()));
        while let Step::Appended(_) = task.step() {}

        check!(controller.state().queued_query.is_none());
        let sink = controller.renderer().sink();
        let titles: Vec<_> = sink.entries().map(|e| e.title.as_str()).collect();
        check!(titles == ["Labels"]);
    }

    #[test]
    fn test_index_without_queue_runs_nothing() {
        let mut controller = controller();
        let_assert!(Ok(None) = controller.on_index_ready(index()));
        check!(controller.has_index());
    }

    #[test]
    fn test_double_registration_fails() {
        let mut controller = controller();
        controller.on_index_ready(index()).unwrap();
        let_assert!(Err(SearchError::IndexAlreadyLoaded) = controller.on_index_ready(index()));
    }

    #[test]
    fn test_new_submission_supersedes_render() {
        let mut controller = controller();
        controller.on_index_ready(index()).unwrap();

        let_assert!(Some(mut first) = controller.submit("s"));
        let_assert!(Some(_second) = controller.submit("l"));
        check!(first.step() == Step::Done(RenderOutcome::Superseded));
    }

    #[test]
    fn test_phase_follows_render() {
        let mut controller = controller();
        controller.on_index_ready(index()).unwrap();

        let_assert!(Some(mut task) = controller.submit("widgets"));
        check!(controller.phase() == Phase::Rendering);
        while let Step::Appended(_) = task.step() {}
        check!(controller.phase() == Phase::Idle);
    }

    #[test]
    fn test_no_match_shows_placeholder() {
        let mut controller = controller();
        controller.on_index_ready(index()).unwrap();

        let_assert!(Some(task) = controller.submit("xyzzy"));
        check!(task.is_done());
        let sink = controller.renderer().sink();
        check!(sink.messages().collect::<Vec<_>>() == [NO_RESULTS_MESSAGE]);
    }

    #[test]
    fn test_rerun_applies_changed_preferences() {
        let mut controller = controller();
        controller.on_index_ready(index()).unwrap();

        let_assert!(Some(mut task) = controller.submit("widgets"));
        while let Step::Appended(_) = task.step() {}
        check!(controller.renderer().sink().entries().count() == 1);

        controller.preferences_mut().set_case_insensitive(false);
        check!(controller.submit("widgets").is_none());

        let_assert!(Some(task) = controller.rerun());
        check!(task.is_done());
        let sink = controller.renderer().sink();
        check!(sink.messages().collect::<Vec<_>>() == [NO_RESULTS_MESSAGE]);
    }

    #[test]
    fn test_rerun_before_index_does_nothing() {
        let mut controller = controller();
        controller.submit("widget");
        check!(controller.rerun().is_none());
        check!(controller.phase() == Phase::AwaitingIndex);
    }
}
