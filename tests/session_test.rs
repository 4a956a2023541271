//! Tests for the animated session: paced replay, run guard and batch inserts

use std::time::Duration;

use bstviz::application::{
    Admission, AnimationEvent, Frame, HighlightClass, NoPacer, Notice, Pacer, RunKind,
    RunOutcome, Session,
};
use bstviz::config::Settings;
use bstviz::domain::{Decision, Key, SearchStatus, Verdict};
use bstviz::util::testing::init_test_setup;
use rstest::{fixture, rstest};

/// Records every requested pause instead of sleeping.
#[derive(Debug, Default)]
struct RecordingPacer {
    pauses: Vec<Duration>,
}

impl Pacer for RecordingPacer {
    fn pause(&mut self, delay: Duration) {
        self.pauses.push(delay);
    }
}

fn settings_with_delay(ms: u64) -> Settings {
    let mut settings = Settings::default();
    settings.animation.step_delay_ms = ms;
    settings
}

#[fixture]
fn session() -> Session {
    init_test_setup();
    Session::with_sample(settings_with_delay(25))
}

fn key_of(session: &Session, frame: &Frame) -> Option<(f64, HighlightClass)> {
    match &frame.event {
        AnimationEvent::Highlight { node, class } => {
            session.tree().key_of(*node).map(|k| (k.value(), *class))
        }
        _ => None,
    }
}

/// Play the active run, collecting highlight (key, class) pairs in order.
fn play_highlights(session: &mut Session, pacer: &mut dyn Pacer) -> Vec<(f64, HighlightClass)> {
    let mut seen = Vec::new();
    session.play(pacer, |s, frame| {
        if let Some(pair) = key_of(s, frame) {
            seen.push(pair);
        }
    });
    seen
}

// ============================================================
// Search replay
// ============================================================

#[rstest]
fn given_sample_when_searching_40_then_paced_visits_and_found(mut session: Session) {
    assert_eq!(session.begin_search(Key::from(40)), Admission::Admitted);
    assert_eq!(session.running_kind(), Some(RunKind::Search));

    let mut pacer = RecordingPacer::default();
    let seen = play_highlights(&mut session, &mut pacer);

    assert_eq!(
        seen,
        vec![
            (50.0, HighlightClass::Visited),
            (30.0, HighlightClass::Visited),
            (40.0, HighlightClass::Visited),
            (40.0, HighlightClass::Found),
        ]
    );
    assert_eq!(pacer.pauses, vec![Duration::from_millis(25); 3]);
    assert!(!session.is_running());

    let stats = session.stats();
    assert_eq!(stats.steps, Some(3));
    assert_eq!(stats.height, 3);
    assert_eq!(stats.count, 7);
    assert_eq!(
        stats.verdict,
        Verdict::NearBalanced {
            steps: 3,
            reference: 3
        }
    );
}

#[rstest]
fn given_sample_when_searching_25_then_miss_at_20_with_not_found_notice(mut session: Session) {
    session.begin_search(Key::from(25));
    let seen = play_highlights(&mut session, &mut NoPacer);

    assert_eq!(seen.last(), Some(&(20.0, HighlightClass::Miss)));
    assert_eq!(session.highlights().len(), 4);
    assert_eq!(
        session.trace(),
        &[
            Notice::Step {
                at: Key::from(50),
                target: Key::from(25),
                decision: Decision::Left
            },
            Notice::Step {
                at: Key::from(30),
                target: Key::from(25),
                decision: Decision::Left
            },
            Notice::Step {
                at: Key::from(20),
                target: Key::from(25),
                decision: Decision::Right
            },
            Notice::NotFound {
                last: Key::from(20)
            },
        ]
    );
    assert_eq!(
        session.trace().last().map(ToString::to_string),
        Some("Stopped at 20; next child is null → target not found ❌".to_string())
    );
}

#[test]
fn given_empty_tree_when_searching_then_empty_notice_and_idle() {
    init_test_setup();
    let mut session = Session::new(settings_with_delay(25));
    assert_eq!(session.begin_search(Key::from(1)), Admission::Admitted);

    let mut pacer = RecordingPacer::default();
    let mut outcome = None;
    session.play(&mut pacer, |_, frame| {
        if let AnimationEvent::Finished(report) = &frame.event {
            outcome = Some(report.outcome);
        }
    });

    assert_eq!(outcome, Some(RunOutcome::Search(SearchStatus::EmptyTree)));
    assert!(pacer.pauses.is_empty());
    assert_eq!(session.trace(), &[Notice::EmptyTree]);
    assert!(!session.is_running());
    assert_eq!(session.stats().verdict, Verdict::Undetermined);
}

// ============================================================
// Batch insert replay
// ============================================================

#[rstest]
fn given_batch_when_playing_then_tree_grows_one_key_per_relayout(mut session: Session) {
    assert_eq!(
        session.begin_insert(vec![Key::from(45), Key::from(10)]),
        Admission::Admitted
    );
    assert_eq!(session.running_kind(), Some(RunKind::Insert));
    // Nothing is inserted before the first frame is pulled
    assert_eq!(session.tree().count(), 7);

    let mut counts_at_relayout = Vec::new();
    let mut inserted_after_relayout = Vec::new();
    let mut last_was_relayout = false;
    session.play(&mut NoPacer, |s, frame| {
        match &frame.event {
            AnimationEvent::Relayout(layout) => {
                counts_at_relayout.push((s.tree().count(), layout.len()));
                last_was_relayout = true;
                return;
            }
            AnimationEvent::Highlight {
                node,
                class: HighlightClass::Inserted,
            } => {
                assert!(last_was_relayout);
                assert!(s.layout().position(*node).is_some());
                inserted_after_relayout.push(s.tree().key_of(*node).map(|k| k.value()));
            }
            _ => {}
        }
        last_was_relayout = false;
    });

    assert_eq!(counts_at_relayout, vec![(8, 8), (9, 9)]);
    assert_eq!(inserted_after_relayout, vec![Some(45.0), Some(10.0)]);
    assert_eq!(session.layout().len(), 9);
    assert!(!session.is_running());
    assert_eq!(
        session.trace().last(),
        Some(&Notice::Summary {
            inserted: 2,
            attempted: 2
        })
    );
}

#[rstest]
fn given_batch_when_pulling_frames_then_second_key_waits_for_first(mut session: Session) {
    session.begin_insert(vec![Key::from(45), Key::from(10)]);
    // ClearHighlights plus the three comparisons of 45
    for _ in 0..7 {
        session.next_frame().expect("frame");
    }
    assert_eq!(session.tree().count(), 8);
    assert!(session.tree().search(10.0).status == SearchStatus::Exhausted);
    session.play(&mut NoPacer, |_, _| {});
    assert_eq!(session.tree().count(), 9);
}

#[rstest]
fn given_duplicate_in_batch_when_playing_then_notice_and_found_highlight(mut session: Session) {
    session.begin_insert(vec![Key::from(60), Key::from(65)]);
    let seen = play_highlights(&mut session, &mut NoPacer);

    assert!(seen.contains(&(60.0, HighlightClass::Found)));
    assert!(seen.contains(&(65.0, HighlightClass::Inserted)));
    assert!(session.trace().contains(&Notice::Duplicate {
        key: Key::from(60)
    }));
    assert!(session.trace().contains(&Notice::Attached {
        key: Key::from(65),
        parent: Key::from(60),
        side: Decision::Right
    }));
    assert_eq!(
        session.trace().last().map(ToString::to_string),
        Some("Inserted 1/2 value(s). Duplicates are ignored.".to_string())
    );
    assert_eq!(session.tree().count(), 8);
}

#[test]
fn given_empty_tree_when_inserting_then_first_key_becomes_root() {
    init_test_setup();
    let mut session = Session::new(settings_with_delay(25));
    session.begin_insert(vec![Key::from(7), Key::from(3)]);

    let mut pacer = RecordingPacer::default();
    session.play(&mut pacer, |_, _| {});

    assert_eq!(session.trace()[0], Notice::BecameRoot { key: Key::from(7) });
    // 7: attach notice; 3: one comparison plus attach notice
    assert_eq!(pacer.pauses.len(), 3);
    let root = session.tree().root().expect("root");
    assert_eq!(session.tree().key_of(root), Some(Key::from(7)));
}

#[rstest]
fn given_empty_batch_when_inserting_then_nothing_to_do(mut session: Session) {
    assert_eq!(session.begin_insert(Vec::new()), Admission::NothingToDo);
    assert!(!session.is_running());
}

// ============================================================
// Run guard
// ============================================================

#[rstest]
fn given_running_insert_when_new_requests_arrive_then_busy_and_ignored(mut session: Session) {
    session.begin_insert(vec![Key::from(45), Key::from(10)]);
    session.next_frame().expect("first frame");
    session.next_frame().expect("second frame");

    assert_eq!(session.begin_search(Key::from(3)), Admission::Busy);
    assert_eq!(session.begin_insert(vec![Key::from(3)]), Admission::Busy);
    assert_eq!(session.insert_instant(&[Key::from(3)]), None);
    assert!(!session.reset());
    assert_eq!(session.running_kind(), Some(RunKind::Insert));

    session.play(&mut NoPacer, |_, _| {});

    assert!(!session.is_running());
    assert!(!session.tree().search(3.0).found);
    assert_eq!(session.tree().count(), 9);
    let mentions_three = session.trace().iter().any(|n| match n {
        Notice::Step { target, .. } => *target == Key::from(3),
        Notice::Attached { key, .. } | Notice::Duplicate { key } | Notice::BecameRoot { key } => {
            *key == Key::from(3)
        }
        _ => false,
    });
    assert!(!mentions_three);
}

#[rstest]
fn given_finished_run_when_starting_next_then_admitted(mut session: Session) {
    session.begin_search(Key::from(80));
    assert_eq!(session.begin_search(Key::from(20)), Admission::Busy);
    let played = session.play(&mut NoPacer, |_, _| {});
    assert!(played > 0);
    assert_eq!(session.play(&mut NoPacer, |_, _| {}), 0);
    assert_eq!(session.begin_search(Key::from(20)), Admission::Admitted);
}

// ============================================================
// Instant mode and reset
// ============================================================

#[rstest]
fn given_instant_insert_when_applied_then_single_summary_no_frames(mut session: Session) {
    let summary = session
        .insert_instant(&[Key::from(45), Key::from(10), Key::from(50)])
        .expect("idle session");
    assert_eq!(summary.inserted, 2);
    assert_eq!(summary.attempted, 3);
    assert_eq!(summary.duplicates(), 1);
    assert_eq!(
        session.trace(),
        &[Notice::Summary {
            inserted: 2,
            attempted: 3
        }]
    );
    assert_eq!(session.layout().len(), 9);
    assert!(!session.is_running());
    assert!(session.next_frame().is_none());
}

#[rstest]
fn given_modified_tree_when_reset_then_sample_restored(mut session: Session) {
    session.insert_instant(&[Key::from(1), Key::from(2)]);
    session.begin_search(Key::from(2));
    session.play(&mut NoPacer, |_, _| {});
    assert!(session.stats().steps.is_some());

    assert!(session.reset());
    assert_eq!(session.tree().count(), 7);
    assert_eq!(session.layout().len(), 7);
    assert!(session.trace().is_empty());
    assert!(session.highlights().is_empty());
    assert_eq!(session.stats().steps, None);
}

#[rstest]
fn given_session_when_building_scene_then_matches_layout(session: Session) {
    let scene = session.scene();
    assert_eq!(scene.nodes.len(), 7);
    assert_eq!(scene.width, session.layout().canvas_width);
    assert_eq!(scene.height, session.layout().canvas_height);
}
