use drawing_app::history::{RedoPolicy, StrokeLog};
use drawing_app::color::rgb;
use drawing_app::stroke::Stroke;
use egui::Pos2;

fn create_test_stroke(i: usize) -> Stroke {
    let x = i as f32 * 10.0;
    Stroke::new(
        rgb(i as u8, 0, 0),
        2.0 + i as f32,
        vec![Pos2::new(x, 0.0), Pos2::new(x, 10.0)],
    )
    .unwrap()
}

fn committed_log(n: usize, policy: RedoPolicy) -> (StrokeLog, Vec<Stroke>) {
    let mut log = StrokeLog::new(policy);
    let strokes: Vec<Stroke> = (0..n).map(create_test_stroke).collect();
    for stroke in &strokes {
        log.commit(stroke.clone());
    }
    (log, strokes)
}

#[test]
fn test_n_commits_m_undos() {
    const N: usize = 6;
    for m in 0..=N {
        let (mut log, strokes) = committed_log(N, RedoPolicy::default());
        for _ in 0..m {
            assert!(log.undo());
        }

        assert_eq!(log.committed().len(), N - m);
        assert_eq!(log.undone().len(), m);

        // Committed keeps creation order.
        assert_eq!(log.committed(), &strokes[..N - m]);
        // Undone is ordered by undo time: newest stroke undone first.
        let expected_undone: Vec<Stroke> = strokes[N - m..].iter().rev().cloned().collect();
        assert_eq!(log.undone(), expected_undone.as_slice());
    }
}

#[test]
fn test_undo_then_redo_restores_order() {
    for n in 1..5 {
        let (mut log, strokes) = committed_log(n, RedoPolicy::default());
        let before = log.committed().to_vec();

        assert!(log.undo());
        assert!(log.redo());

        assert_eq!(log.committed(), before.as_slice());
        assert_eq!(log.committed(), strokes.as_slice());
        assert!(log.undone().is_empty());
    }
}

#[test]
fn test_multiple_redos_replay_in_reverse_undo_order() {
    let (mut log, strokes) = committed_log(3, RedoPolicy::default());
    log.undo();
    log.undo();
    log.undo();
    assert!(log.committed().is_empty());

    log.redo();
    assert_eq!(log.committed(), &strokes[..1]);
    log.redo();
    log.redo();
    assert_eq!(log.committed(), strokes.as_slice());
}

#[test]
fn test_empty_boundaries_are_noops() {
    let mut log = StrokeLog::default();
    assert!(!log.undo());
    assert!(!log.redo());
    assert!(log.committed().is_empty());
    assert!(log.undone().is_empty());
    assert!(!log.can_undo());
    assert!(!log.can_redo());

    let (mut log, strokes) = committed_log(2, RedoPolicy::default());
    assert!(!log.redo());
    assert_eq!(log.committed(), strokes.as_slice());

    log.undo();
    log.undo();
    let revision = log.revision();
    assert!(!log.undo());
    assert_eq!(log.revision(), revision);
    assert_eq!(log.undone().len(), 2);
}

#[test]
fn test_commit_after_undo_discards_redo_by_default() {
    let (mut log, strokes) = committed_log(3, RedoPolicy::DiscardOnCommit);
    log.undo();
    log.undo();
    assert!(log.can_redo());

    let fresh = create_test_stroke(9);
    log.commit(fresh.clone());

    assert!(!log.can_redo());
    assert_eq!(log.committed(), &[strokes[0].clone(), fresh]);
}

#[test]
fn test_commit_after_undo_can_retain_redo() {
    let (mut log, strokes) = committed_log(3, RedoPolicy::Retain);
    log.undo();

    let fresh = create_test_stroke(9);
    log.commit(fresh.clone());
    assert_eq!(log.undone(), &strokes[2..]);

    // The retained stroke lands on top of the newer one.
    assert!(log.redo());
    assert_eq!(
        log.committed(),
        &[strokes[0].clone(), strokes[1].clone(), fresh, strokes[2].clone()]
    );
}

#[test]
fn test_stroke_never_in_both_stacks() {
    let (mut log, _) = committed_log(4, RedoPolicy::Retain);
    log.undo();
    log.undo();
    log.redo();
    log.commit(create_test_stroke(7));
    log.undo();

    for stroke in log.committed() {
        assert!(log.undone().iter().all(|s| s.id() != stroke.id()));
    }
    assert_eq!(log.committed().len() + log.undone().len(), 5);
}
