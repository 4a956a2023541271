//! Visualization session: one tree, one run guard, one highlight set
//!
//! All mutable state of a visualization lives here and is passed explicitly;
//! independent sessions can coexist in one process.

use tracing::{debug, info, instrument, warn};

use crate::application::pacing::Pacer;
use crate::application::sequencer::{
    Admission, AnimationEvent, Frame, HighlightClass, Notice, RunKind, RunOutcome, Sequencer,
};
use crate::config::Settings;
use crate::domain::{estimate, BstArena, Key, Layout, NodeId, Scene, Verdict};

/// Statistics shown next to the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub height: usize,
    pub count: usize,
    /// Comparisons of the last search, None if no search since the last clear
    pub steps: Option<usize>,
    pub verdict: Verdict,
}

/// Result of a non-animated batch insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertSummary {
    pub inserted: usize,
    pub attempted: usize,
}

impl InsertSummary {
    pub fn duplicates(&self) -> usize {
        self.attempted - self.inserted
    }
}

#[derive(Debug)]
pub struct Session {
    tree: BstArena,
    sequencer: Sequencer,
    highlights: Vec<(NodeId, HighlightClass)>,
    trace: Vec<Notice>,
    layout: Layout,
    last_search_steps: Option<usize>,
    settings: Settings,
}

impl Session {
    /// Session with an empty tree.
    pub fn new(settings: Settings) -> Self {
        let tree = BstArena::new();
        let layout = Layout::compute(&tree, &settings.layout);
        Self {
            tree,
            sequencer: Sequencer::new(settings.animation.step_delay()),
            highlights: Vec::new(),
            trace: Vec::new(),
            layout,
            last_search_steps: None,
            settings,
        }
    }

    /// Session preloaded with the configured sample keys.
    pub fn with_sample(settings: Settings) -> Self {
        let mut session = Self::new(settings);
        session.load_sample();
        session
    }

    fn sample_keys(&self) -> Vec<Key> {
        self.settings
            .sample
            .iter()
            .filter_map(|&v| match Key::new(v) {
                Ok(key) => Some(key),
                Err(e) => {
                    warn!("sample key skipped: {}", e);
                    None
                }
            })
            .collect()
    }

    fn load_sample(&mut self) {
        for key in self.sample_keys() {
            self.tree.insert_key(key);
        }
        self.relayout();
    }

    /// Rebuild the sample tree and clear the trace.
    ///
    /// Ignored while an animation is running, since the run owns the tree
    /// until it finishes.
    #[instrument(level = "debug", skip(self))]
    pub fn reset(&mut self) -> bool {
        if self.sequencer.is_running() {
            warn!("reset ignored: animation running");
            return false;
        }
        self.tree.reset();
        self.load_sample();
        self.clear_trace();
        true
    }

    /// Drop trace lines, highlights and last-search statistics.
    pub fn clear_trace(&mut self) {
        self.trace.clear();
        self.highlights.clear();
        self.last_search_steps = None;
    }

    pub fn tree(&self) -> &BstArena {
        &self.tree
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn highlights(&self) -> &[(NodeId, HighlightClass)] {
        &self.highlights
    }

    /// Latest highlight class of a node, if any.
    pub fn highlight_of(&self, id: NodeId) -> Option<HighlightClass> {
        self.highlights
            .iter()
            .rev()
            .find(|(node, _)| *node == id)
            .map(|(_, class)| *class)
    }

    pub fn trace(&self) -> &[Notice] {
        &self.trace
    }

    pub fn is_running(&self) -> bool {
        self.sequencer.is_running()
    }

    pub fn running_kind(&self) -> Option<RunKind> {
        self.sequencer.running_kind()
    }

    pub fn scene(&self) -> Scene {
        Scene::build(&self.tree, &self.layout)
    }

    pub fn stats(&self) -> RunStats {
        let height = self.tree.height();
        let count = self.tree.count();
        let verdict = match self.last_search_steps {
            Some(steps) => estimate(height, steps, count),
            None => Verdict::Undetermined,
        };
        RunStats {
            height,
            count,
            steps: self.last_search_steps,
            verdict,
        }
    }

    fn relayout(&mut self) {
        self.layout = Layout::compute(&self.tree, &self.settings.layout);
    }

    /// Start an animated search for `target`.
    pub fn begin_search(&mut self, target: Key) -> Admission {
        if self.sequencer.is_running() {
            return Admission::Busy;
        }
        self.clear_trace();
        self.sequencer.begin_search(&self.tree, target)
    }

    /// Start an animated batch insert.
    pub fn begin_insert(&mut self, keys: Vec<Key>) -> Admission {
        if self.sequencer.is_running() {
            return Admission::Busy;
        }
        let admission = self.sequencer.begin_insert(keys);
        if admission == Admission::Admitted {
            self.highlights.clear();
            self.last_search_steps = None;
        }
        admission
    }

    /// Insert all keys at once with a single relayout and one summary notice.
    ///
    /// Returns None while an animation is running.
    #[instrument(level = "debug", skip(self))]
    pub fn insert_instant(&mut self, keys: &[Key]) -> Option<InsertSummary> {
        if self.sequencer.is_running() {
            warn!("instant insert ignored: animation running");
            return None;
        }
        let inserted = keys
            .iter()
            .filter(|&&key| self.tree.insert_key(key).inserted)
            .count();
        let summary = InsertSummary {
            inserted,
            attempted: keys.len(),
        };
        self.highlights.clear();
        self.last_search_steps = None;
        self.trace.push(Notice::Summary {
            inserted: summary.inserted,
            attempted: summary.attempted,
        });
        self.relayout();
        info!("instant insert: {}/{}", summary.inserted, summary.attempted);
        Some(summary)
    }

    /// Pull the next frame of the active run and apply it to session state.
    pub fn next_frame(&mut self) -> Option<Frame> {
        let frame = self
            .sequencer
            .next_frame(&mut self.tree, &self.settings.layout)?;
        self.apply(&frame.event);
        Some(frame)
    }

    fn apply(&mut self, event: &AnimationEvent) {
        match event {
            AnimationEvent::ClearHighlights => self.highlights.clear(),
            AnimationEvent::Highlight { node, class } => self.highlights.push((*node, *class)),
            AnimationEvent::Relayout(layout) => self.layout = layout.clone(),
            AnimationEvent::Notice(notice) => self.trace.push(notice.clone()),
            AnimationEvent::Finished(report) => {
                debug!("apply finished: {:?}", report);
                if let RunOutcome::Search(_) = report.outcome {
                    self.last_search_steps = Some(report.steps);
                }
            }
        }
    }

    /// Drain the active run, handing each frame to `sink` and pausing after it.
    ///
    /// Returns the number of frames played.
    pub fn play<P, F>(&mut self, pacer: &mut P, mut sink: F) -> usize
    where
        P: Pacer + ?Sized,
        F: FnMut(&Session, &Frame),
    {
        let mut played = 0;
        while let Some(frame) = self.next_frame() {
            sink(self, &frame);
            played += 1;
            if !frame.pause.is_zero() {
                pacer.pause(frame.pause);
            }
        }
        played
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::pacing::NoPacer;

    #[test]
    fn given_sample_session_when_created_then_seven_nodes_laid_out() {
        let session = Session::with_sample(Settings::default());
        assert_eq!(session.tree().count(), 7);
        assert_eq!(session.layout().len(), 7);
        assert!(!session.is_running());
    }

    #[test]
    fn given_running_animation_when_resetting_then_ignored() {
        let mut session = Session::with_sample(Settings::default());
        assert_eq!(session.begin_insert(vec![Key::from(1)]), Admission::Admitted);
        assert!(!session.reset());
        session.play(&mut NoPacer, |_, _| {});
        assert!(session.reset());
        assert_eq!(session.tree().count(), 7);
        assert!(session.trace().is_empty());
    }

    #[test]
    fn given_instant_insert_when_duplicates_then_summary_counts() {
        let mut session = Session::with_sample(Settings::default());
        let summary = session
            .insert_instant(&[Key::from(50), Key::from(55), Key::from(55)])
            .unwrap();
        assert_eq!(summary.inserted, 1);
        assert_eq!(summary.duplicates(), 2);
        assert_eq!(session.trace().len(), 1);
        assert_eq!(session.layout().len(), 8);
    }
}
