//! Animation sequencer: timed replay of decision paths
//!
//! The sequencer is a pull-based state machine (`Idle -> Running -> Idle`).
//! A caller admits a run with [`Sequencer::begin_search`] or
//! [`Sequencer::begin_insert`] and then pulls [`Frame`]s one at a time, waiting
//! `frame.pause` between them. While a run is active every new request is
//! answered with [`Admission::Busy`] and has no effect.
//!
//! # Invariants
//!
//! 1. At most one run is active.
//! 2. Frames of a run are produced in path order and never interleave with
//!    frames of another run.
//! 3. Every admitted run ends with exactly one [`AnimationEvent::Finished`]
//!    frame; handing it out returns the sequencer to idle, also for runs
//!    without any comparison steps.
//! 4. An admitted run cannot be cancelled; it always runs to completion.
//! 5. Batch inserts mutate the tree one key at a time, as the previous key's
//!    frames are exhausted, so the tree grows incrementally.

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use tracing::{debug, instrument, warn};

use crate::domain::{
    BstArena, Decision, DecisionStep, Key, Layout, LayoutConfig, NodeId, SearchOutcome, SearchStatus,
};

/// Visual class attached to a highlighted node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HighlightClass {
    /// Compared against on the way down
    Visited,
    /// Matched the probe key
    Found,
    /// Last node visited by an unsuccessful search
    Miss,
    /// Node created by the current insert
    Inserted,
}

impl fmt::Display for HighlightClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HighlightClass::Visited => "visited",
            HighlightClass::Found => "found",
            HighlightClass::Miss => "miss",
            HighlightClass::Inserted => "inserted",
        };
        write!(f, "{}", name)
    }
}

/// Trace line emitted during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// One comparison of `target` against the key at a node
    Step {
        at: Key,
        target: Key,
        decision: Decision,
    },
    /// Unsuccessful search stopped at `last`
    NotFound { last: Key },
    /// Search requested on a tree without nodes
    EmptyTree,
    /// Key became the root of an empty tree
    BecameRoot { key: Key },
    /// Key attached below `parent`
    Attached {
        key: Key,
        parent: Key,
        side: Decision,
    },
    /// Key already present, nothing changed
    Duplicate { key: Key },
    /// Batch result
    Summary { inserted: usize, attempted: usize },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Step {
                at,
                target,
                decision: Decision::Left,
            } => write!(f, "{}: target {} < {} → go LEFT", at, target, at),
            Notice::Step {
                at,
                target,
                decision: Decision::Right,
            } => write!(f, "{}: target {} > {} → go RIGHT", at, target, at),
            Notice::Step {
                at,
                target,
                decision: Decision::Found,
            } => write!(f, "{}: target {} found ✅", at, target),
            Notice::NotFound { last } => write!(
                f,
                "Stopped at {}; next child is null → target not found ❌",
                last
            ),
            Notice::EmptyTree => write!(f, "Tree is empty. Insert values first."),
            Notice::BecameRoot { key } => write!(f, "{} became the root", key),
            Notice::Attached { key, parent, side } => {
                write!(f, "{} attached as {} child of {}", key, side, parent)
            }
            Notice::Duplicate { key } => write!(f, "{} is already in the tree; ignored", key),
            Notice::Summary {
                inserted,
                attempted,
            } => write!(
                f,
                "Inserted {}/{} value(s). Duplicates are ignored.",
                inserted, attempted
            ),
        }
    }
}

/// Which operation a run replays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    Search,
    Insert,
}

/// Final result of a run, carried by the `Finished` frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Search(SearchStatus),
    Insert { inserted: usize, attempted: usize },
}

/// Summary of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub outcome: RunOutcome,
    /// Comparisons replayed over the whole run
    pub steps: usize,
}

impl RunReport {
    pub fn kind(&self) -> RunKind {
        match self.outcome {
            RunOutcome::Search(_) => RunKind::Search,
            RunOutcome::Insert { .. } => RunKind::Insert,
        }
    }
}

/// Something the render boundary should apply.
#[derive(Debug, Clone, PartialEq)]
pub enum AnimationEvent {
    ClearHighlights,
    Highlight { node: NodeId, class: HighlightClass },
    /// Fresh layout after a structural change
    Relayout(Layout),
    Notice(Notice),
    Finished(RunReport),
}

/// One event plus the time to wait after applying it.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub event: AnimationEvent,
    pub pause: Duration,
}

impl Frame {
    fn now(event: AnimationEvent) -> Self {
        Self {
            event,
            pause: Duration::ZERO,
        }
    }

    fn paced(event: AnimationEvent, pause: Duration) -> Self {
        Self { event, pause }
    }
}

/// Answer to a run request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Run started; pull frames until `Finished`
    Admitted,
    /// Another run is active; the request was ignored
    Busy,
    /// Nothing to replay (e.g. no valid keys); no run started
    NothingToDo,
}

#[derive(Debug)]
struct Run {
    kind: RunKind,
    frames: VecDeque<Frame>,
    /// Batch keys not yet inserted
    remaining: VecDeque<Key>,
    inserted: usize,
    attempted: usize,
    steps: usize,
}

impl Run {
    fn new(kind: RunKind) -> Self {
        Self {
            kind,
            frames: VecDeque::new(),
            remaining: VecDeque::new(),
            inserted: 0,
            attempted: 0,
            steps: 0,
        }
    }

    fn next_frame(&mut self, tree: &mut BstArena, layout: &LayoutConfig, delay: Duration) -> Frame {
        loop {
            if let Some(frame) = self.frames.pop_front() {
                return frame;
            }
            if let Some(key) = self.remaining.pop_front() {
                self.stage_insert(tree, layout, key, delay);
                continue;
            }
            // Only insert runs get here: a search run queues its Finished frame
            // up front and is dropped once that frame is handed out.
            self.stage_close();
        }
    }

    fn report(&self) -> RunReport {
        RunReport {
            outcome: RunOutcome::Insert {
                inserted: self.inserted,
                attempted: self.attempted,
            },
            steps: self.steps,
        }
    }

    fn stage_close(&mut self) {
        self.frames
            .push_back(Frame::now(AnimationEvent::Notice(Notice::Summary {
                inserted: self.inserted,
                attempted: self.attempted,
            })));
        self.frames
            .push_back(Frame::now(AnimationEvent::Finished(self.report())));
    }

    /// Insert one key and queue the replay of its path.
    fn stage_insert(&mut self, tree: &mut BstArena, layout: &LayoutConfig, key: Key, delay: Duration) {
        let outcome = tree.insert_key(key);
        self.attempted += 1;
        self.steps += outcome.path.len();

        self.frames.push_back(Frame::now(AnimationEvent::ClearHighlights));
        stage_steps(&mut self.frames, key, outcome.path.steps(), delay);

        if let Some(new_node) = outcome.new_node {
            self.inserted += 1;
            let notice = match outcome.path.last() {
                Some(parent) => Notice::Attached {
                    key,
                    parent: parent.key,
                    side: parent.decision,
                },
                None => Notice::BecameRoot { key },
            };
            self.frames.push_back(Frame::now(AnimationEvent::Relayout(
                Layout::compute(tree, layout),
            )));
            self.frames.push_back(Frame::now(AnimationEvent::Highlight {
                node: new_node,
                class: HighlightClass::Inserted,
            }));
            self.frames
                .push_back(Frame::paced(AnimationEvent::Notice(notice), delay));
        } else if let Some(existing) = outcome.path.last().filter(|_| outcome.duplicate) {
            self.frames.push_back(Frame::now(AnimationEvent::Highlight {
                node: existing.node,
                class: HighlightClass::Found,
            }));
            self.frames.push_back(Frame::paced(
                AnimationEvent::Notice(Notice::Duplicate { key }),
                delay,
            ));
        }
    }
}

/// Queue a visited highlight and a trace line per step, pausing after each.
fn stage_steps(
    frames: &mut VecDeque<Frame>,
    target: Key,
    steps: &[DecisionStep],
    delay: Duration,
) {
    for step in steps {
        frames.push_back(Frame::now(AnimationEvent::Highlight {
            node: step.node,
            class: HighlightClass::Visited,
        }));
        frames.push_back(Frame::paced(
            AnimationEvent::Notice(Notice::Step {
                at: step.key,
                target,
                decision: step.decision,
            }),
            delay,
        ));
    }
}

#[derive(Debug)]
enum RunState {
    Idle,
    Running(Run),
}

/// Drives at most one replay at a time.
#[derive(Debug)]
pub struct Sequencer {
    state: RunState,
    step_delay: Duration,
}

impl Sequencer {
    pub fn new(step_delay: Duration) -> Self {
        Self {
            state: RunState::Idle,
            step_delay,
        }
    }

    pub fn step_delay(&self) -> Duration {
        self.step_delay
    }

    /// The run guard: true while a run is admitted and not yet finished.
    pub fn is_running(&self) -> bool {
        matches!(self.state, RunState::Running(_))
    }

    pub fn running_kind(&self) -> Option<RunKind> {
        match &self.state {
            RunState::Running(run) => Some(run.kind),
            RunState::Idle => None,
        }
    }

    /// Admit a search replay. The search itself runs now; frames replay it.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn begin_search(&mut self, tree: &BstArena, target: Key) -> Admission {
        if self.is_running() {
            warn!("search {} ignored: animation already running", target);
            return Admission::Busy;
        }
        let outcome = tree.search_key(target);
        let mut run = Run::new(RunKind::Search);
        run.steps = outcome.path.len();
        run.frames.push_back(Frame::now(AnimationEvent::ClearHighlights));
        stage_steps(&mut run.frames, target, outcome.path.steps(), self.step_delay);
        stage_search_end(&mut run.frames, &outcome);
        run.frames.push_back(Frame::now(AnimationEvent::Finished(RunReport {
            outcome: RunOutcome::Search(outcome.status),
            steps: outcome.path.len(),
        })));
        debug!("search {} admitted: {:?}, {} steps", target, outcome.status, run.steps);
        self.state = RunState::Running(run);
        Admission::Admitted
    }

    /// Admit a batch insert replay. Keys are inserted lazily, one per stage.
    #[instrument(level = "debug", skip(self))]
    pub fn begin_insert(&mut self, keys: Vec<Key>) -> Admission {
        if self.is_running() {
            warn!("insert of {} key(s) ignored: animation already running", keys.len());
            return Admission::Busy;
        }
        if keys.is_empty() {
            return Admission::NothingToDo;
        }
        let mut run = Run::new(RunKind::Insert);
        run.remaining = keys.into();
        self.state = RunState::Running(run);
        Admission::Admitted
    }

    /// Pull the next frame of the active run; None when idle.
    ///
    /// Handing out the `Finished` frame clears the run guard.
    pub fn next_frame(&mut self, tree: &mut BstArena, layout: &LayoutConfig) -> Option<Frame> {
        let delay = self.step_delay;
        let RunState::Running(run) = &mut self.state else {
            return None;
        };
        let frame = run.next_frame(tree, layout, delay);
        if matches!(frame.event, AnimationEvent::Finished(_)) {
            debug!("run finished: {:?}", frame.event);
            self.state = RunState::Idle;
        }
        Some(frame)
    }
}

fn stage_search_end(frames: &mut VecDeque<Frame>, outcome: &SearchOutcome) {
    match (outcome.status, outcome.last_visited()) {
        (SearchStatus::Found, Some(last)) => {
            frames.push_back(Frame::now(AnimationEvent::Highlight {
                node: last.node,
                class: HighlightClass::Found,
            }));
        }
        (SearchStatus::Exhausted, Some(last)) => {
            frames.push_back(Frame::now(AnimationEvent::Highlight {
                node: last.node,
                class: HighlightClass::Miss,
            }));
            frames.push_back(Frame::now(AnimationEvent::Notice(Notice::NotFound {
                last: last.key,
            })));
        }
        (SearchStatus::EmptyTree, _) => {
            frames.push_back(Frame::now(AnimationEvent::Notice(Notice::EmptyTree)));
        }
        _ => {}
    }
}
