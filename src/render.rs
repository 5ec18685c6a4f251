//! Incremental, cancelable rendering of ranked results into a list container.
//!
//! A fill clears the container, then emits rows one at a time through a
//! [`RenderTask`]. The first rows go in immediately; later ones are spaced by a
//! short reveal delay so the host stays responsive. Every step first checks the
//! render generation: once a newer fill or message bumps it, the old task stops
//! where it is and leaves its rows for the next clear to erase.
//!
//! Everything here lives on one thread. Tasks are driven with
//! `tokio::task::spawn_local` or awaited directly.

use crate::config::SearchSettings;
use crate::error::SearchError;
use crate::types::ScoredCandidate;
use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;
use std::time::Duration;

/// Placeholder shown while a query waits for the index.
pub const LOADING_MESSAGE: &str = "Loading Search Index...";

/// Placeholder shown when a query matched nothing.
pub const NO_RESULTS_MESSAGE: &str = "No Results";

/// A navigable result row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRow {
    pub href: String,
    pub title: String,
    pub category: String,
}

/// Anything the renderer can put into the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    Entry(EntryRow),
    Message(String),
}

/// How a row should appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reveal {
    Immediate,
    Delayed,
}

/// The output list the renderer writes into.
///
/// Implementations only need to support clearing and appending; the renderer
/// never reads back from the container.
pub trait ResultSink {
    fn clear(&mut self);
    fn append(&mut self, row: Row, reveal: Reveal);
}

/// A plain in-memory list of rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListContainer {
    rows: Vec<(Row, Reveal)>,
}

impl ListContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[(Row, Reveal)] {
        &self.rows
    }

    pub fn entries(&self) -> impl Iterator<Item = &EntryRow> {
        self.rows.iter().filter_map(|(row, _)| match row {
            Row::Entry(entry) => Some(entry),
            Row::Message(_) => None,
        })
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().filter_map(|(row, _)| match row {
            Row::Message(text) => Some(text.as_str()),
            Row::Entry(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl ResultSink for ListContainer {
    fn clear(&mut self) {
        self.rows.clear();
    }

    fn append(&mut self, row: Row, reveal: Reveal) {
        self.rows.push((row, reveal));
    }
}

/// How many rows to show in total and how many to show without delay.
/// `None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderLimits {
    max_shown: Option<usize>,
    show_first: Option<usize>,
}

impl RenderLimits {
    pub fn new(max_shown: Option<usize>, show_first: Option<usize>) -> Result<Self, SearchError> {
        if let (Some(max_shown), Some(show_first)) = (max_shown, show_first)
            && show_first > max_shown
        {
            return Err(SearchError::InvalidRenderLimits {
                max_shown,
                show_first,
            });
        }
        Ok(Self {
            max_shown,
            show_first,
        })
    }

    /// Show everything, all at once.
    pub const fn unbounded() -> Self {
        Self {
            max_shown: None,
            show_first: None,
        }
    }

    pub const fn max_shown(&self) -> Option<usize> {
        self.max_shown
    }

    pub const fn show_first(&self) -> Option<usize> {
        self.show_first
    }
}

/// Monotonic render generation. Work tagged with an older value is stale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub const fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
struct GenerationState {
    current: Cell<u64>,
    finished: Cell<u64>,
}

impl GenerationState {
    fn current(&self) -> Generation {
        Generation(self.current.get())
    }

    fn bump(&self) -> Generation {
        let next = self.current.get() + 1;
        self.current.set(next);
        Generation(next)
    }

    fn is_current(&self, generation: Generation) -> bool {
        self.current.get() == generation.0
    }

    fn finish(&self, generation: Generation) {
        if self.is_current(generation) {
            self.finished.set(generation.0);
        }
    }

    fn is_finished(&self) -> bool {
        self.finished.get() == self.current.get()
    }
}

/// Owns the container handle and the generation counter.
pub struct ResultRenderer<S> {
    sink: Rc<RefCell<S>>,
    generation: Rc<GenerationState>,
    page_suffix: String,
    reveal_delay: Duration,
}

impl<S: ResultSink> ResultRenderer<S> {
    pub fn new(sink: S, settings: &SearchSettings) -> Self {
        Self {
            sink: Rc::new(RefCell::new(sink)),
            generation: Rc::default(),
            page_suffix: settings.page_suffix.clone(),
            reveal_delay: settings.reveal_delay,
        }
    }

    /// Borrow the container, e.g. to inspect what has been rendered so far.
    ///
    /// Must not be held across an await point while a render task runs.
    pub fn sink(&self) -> Ref<'_, S> {
        self.sink.borrow()
    }

    pub fn generation(&self) -> Generation {
        self.generation.current()
    }

    /// Whether the latest fill or message has been fully emitted.
    pub fn is_finished(&self) -> bool {
        self.generation.is_finished()
    }

    /// Invalidate any render in flight.
    pub fn abort_fill(&self) -> Generation {
        let generation = self.generation.bump();
        tracing::trace!("Render generation now {}", generation.value());
        generation
    }

    /// Replace the container content with a single status line.
    pub fn show_message(&self, text: &str) {
        let generation = self.abort_fill();
        {
            let mut sink = self.sink.borrow_mut();
            sink.clear();
            sink.append(Row::Message(text.to_string()), Reveal::Immediate);
        }
        self.generation.finish(generation);
    }

    /// Start rendering `results`, which must already be in display order.
    ///
    /// Only the first `max_shown` rows are rendered; the remainder is summarized
    /// as "and N more...". An empty list shows the "No Results" placeholder and
    /// returns an already finished task.
    pub fn fill(&self, mut results: Vec<ScoredCandidate>, limits: RenderLimits) -> RenderTask<S> {
        let not_shown = match limits.max_shown() {
            Some(max_shown) if results.len() > max_shown => {
                let hidden = results.len() - max_shown;
                results.truncate(max_shown);
                hidden
            }
            _ => 0,
        };

        if results.is_empty() && not_shown == 0 {
            self.show_message(NO_RESULTS_MESSAGE);
            let generation = self.generation();
            return RenderTask {
                sink: Rc::clone(&self.sink),
                state: Rc::clone(&self.generation),
                generation,
                rows: Vec::new().into_iter(),
                emitted: 0,
                show_first: limits.show_first(),
                not_shown: 0,
                reveal_delay: self.reveal_delay,
                outcome: Some(RenderOutcome::Finished),
            };
        }

        let generation = self.abort_fill();
        self.sink.borrow_mut().clear();

        let rows: Vec<EntryRow> = results
            .into_iter()
            .map(|hit| EntryRow {
                href: hit.href(&self.page_suffix),
                title: hit.label,
                category: hit.category,
            })
            .collect();

        tracing::debug!(
            "Rendering {} rows ({} not shown) as generation {}",
            rows.len(),
            not_shown,
            generation.value()
        );

        RenderTask {
            sink: Rc::clone(&self.sink),
            state: Rc::clone(&self.generation),
            generation,
            rows: rows.into_iter(),
            emitted: 0,
            show_first: limits.show_first(),
            not_shown,
            reveal_delay: self.reveal_delay,
            outcome: None,
        }
    }
}

/// How a render task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Every row (and the "more" summary, if any) was emitted.
    Finished,
    /// A newer render took over before this one completed.
    Superseded,
}

/// Result of a single render step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Appended(Reveal),
    Done(RenderOutcome),
}

/// An in-flight fill: the remaining rows plus the generation they belong to.
pub struct RenderTask<S> {
    sink: Rc<RefCell<S>>,
    state: Rc<GenerationState>,
    generation: Generation,
    rows: std::vec::IntoIter<EntryRow>,
    emitted: usize,
    show_first: Option<usize>,
    not_shown: usize,
    reveal_delay: Duration,
    outcome: Option<RenderOutcome>,
}

impl<S: ResultSink> RenderTask<S> {
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Rows not yet emitted.
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }

    pub fn is_done(&self) -> bool {
        self.outcome.is_some()
    }

    /// Emit the next row, unless a newer render has started.
    pub fn step(&mut self) -> Step {
        if let Some(outcome) = self.outcome {
            return Step::Done(outcome);
        }

        if !self.state.is_current(self.generation) {
            tracing::debug!(
                "Render generation {} superseded after {} rows",
                self.generation.value(),
                self.emitted
            );
            return self.complete(RenderOutcome::Superseded);
        }

        let Some(row) = self.rows.next() else {
            if self.not_shown > 0 {
                self.sink.borrow_mut().append(
                    Row::Message(format!("and {} more...", self.not_shown)),
                    Reveal::Immediate,
                );
            }
            self.state.finish(self.generation);
            return self.complete(RenderOutcome::Finished);
        };

        let reveal = if self.show_first.is_none_or(|n| self.emitted < n) {
            Reveal::Immediate
        } else {
            Reveal::Delayed
        };
        self.emitted += 1;
        self.sink.borrow_mut().append(Row::Entry(row), reveal);
        Step::Appended(reveal)
    }

    /// Drive the task to completion, pausing after every delayed row.
    pub async fn run(mut self) -> RenderOutcome {
        loop {
            match self.step() {
                Step::Appended(Reveal::Immediate) => {}
                Step::Appended(Reveal::Delayed) => tokio::time::sleep(self.reveal_delay).await,
                Step::Done(outcome) => return outcome,
            }
        }
    }

    fn complete(&mut self, outcome: RenderOutcome) -> Step {
        self.outcome = Some(outcome);
        Step::Done(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CandidateKind;
    use assert2::{check, let_assert};

    fn hit(label: &str, score: f64) -> ScoredCandidate {
        ScoredCandidate {
            location: format!("demo-1.0/{}", label),
            label: label.to_string(),
            category: "class".to_string(),
            anchor: String::new(),
            score,
            kind: CandidateKind::Object,
        }
    }

    fn renderer() -> ResultRenderer<ListContainer> {
        ResultRenderer::new(ListContainer::new(), &SearchSettings::default())
    }

    #[test]
    fn test_limits_validation() {
        check!(RenderLimits::new(Some(2), Some(1)).is_ok());
        check!(RenderLimits::new(Some(2), Some(2)).is_ok());
        check!(RenderLimits::new(None, Some(50)).is_ok());
        check!(RenderLimits::new(Some(5), None).is_ok());
        let_assert!(
            Err(SearchError::InvalidRenderLimits {
                max_shown: 1,
                show_first: 2
            }) = RenderLimits::new(Some(1), Some(2))
        );
    }

    #[test]
    fn test_top_rows_shown_with_summary() {
        let renderer = renderer();
        let limits = RenderLimits::new(Some(2), Some(1)).unwrap();
        let mut task = renderer.fill(vec![hit("a", 3.0), hit("b", 2.0), hit("c", 1.0)], limits);

        check!(task.step() == Step::Appended(Reveal::Immediate));
        check!(task.step() == Step::Appended(Reveal::Delayed));
        check!(task.step() == Step::Done(RenderOutcome::Finished));
        check!(renderer.is_finished());

        let sink = renderer.sink();
        let titles: Vec<_> = sink.entries().map(|e| e.title.as_str()).collect();
        check!(titles == ["a", "b"]);
        check!(sink.messages().collect::<Vec<_>>() == ["and 1 more..."]);
    }

    #[test]
    fn test_empty_results_show_placeholder() {
        let renderer = renderer();
        let mut task = renderer.fill(Vec::new(), RenderLimits::unbounded());

        check!(task.is_done());
        check!(task.step() == Step::Done(RenderOutcome::Finished));
        check!(renderer.sink().rows() == [(Row::Message(NO_RESULTS_MESSAGE.to_string()), Reveal::Immediate)]);
    }

    #[test]
    fn test_row_carries_link_and_labels() {
        let renderer = renderer();
        let mut found = hit("Window", 1.0);
        found.anchor = "demo.Window".to_string();
        let mut task = renderer.fill(vec![found], RenderLimits::unbounded());
        task.step();

        let sink = renderer.sink();
        let_assert!(Some(row) = sink.entries().next());
        check!(row.href == "demo-1.0/Window.html#demo.Window");
        check!(row.title == "Window");
        check!(row.category == "class");
    }

    #[test]
    fn test_superseded_render_stops_without_rollback() {
        let renderer = renderer();
        let mut old = renderer.fill(
            vec![hit("a", 3.0), hit("b", 2.0), hit("c", 1.0)],
            RenderLimits::unbounded(),
        );
        old.step();

        renderer.abort_fill();
        check!(old.step() == Step::Done(RenderOutcome::Superseded));
        check!(old.step() == Step::Done(RenderOutcome::Superseded));
        check!(renderer.sink().len() == 1);
        check!(!renderer.is_finished());
    }

    #[test]
    fn test_new_fill_clears_previous_rows() {
        let renderer = renderer();
        let mut first = renderer.fill(vec![hit("a", 1.0)], RenderLimits::unbounded());
        first.step();

        let mut second = renderer.fill(vec![hit("z", 1.0)], RenderLimits::unbounded());
        check!(renderer.sink().is_empty());
        second.step();
        check!(first.step() == Step::Done(RenderOutcome::Superseded));

        let sink = renderer.sink();
        let titles: Vec<_> = sink.entries().map(|e| e.title.as_str()).collect();
        check!(titles == ["z"]);
    }

    #[test]
    fn test_show_message_replaces_content() {
        let renderer = renderer();
        let before = renderer.generation();
        renderer.show_message(LOADING_MESSAGE);

        check!(renderer.generation() > before);
        check!(renderer.is_finished());
        check!(renderer.sink().messages().collect::<Vec<_>>() == [LOADING_MESSAGE]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_paces_delayed_rows() {
        let renderer = renderer();
        let limits = RenderLimits::new(Some(10), Some(1)).unwrap();
        let task = renderer.fill(vec![hit("a", 3.0), hit("b", 2.0), hit("c", 1.0)], limits);

        let start = tokio::time::Instant::now();
        check!(task.run().await == RenderOutcome::Finished);
        check!(start.elapsed() >= SearchSettings::default().reveal_delay * 2);

        let sink = renderer.sink();
        let reveals: Vec<_> = sink.rows().iter().map(|(_, reveal)| *reveal).collect();
        check!(reveals == [Reveal::Immediate, Reveal::Delayed, Reveal::Delayed]);
    }
}
