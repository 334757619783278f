use nova_pp::{CancellationToken, Difficulty, Error, GradualDifficulty};

mod common;

#[test]
fn final_step_matches_full_calculation() {
    let objects = common::circle_map(48, 170.0);
    let difficulty = Difficulty::new().cs(4.0).ar(9.0).od(8.0);

    let gradual_last = GradualDifficulty::new(difficulty.clone(), &objects)
        .last()
        .unwrap();
    let full = difficulty.calculate(&objects).unwrap();

    assert_eq!(gradual_last, full);
}

#[test]
fn interrupted_run_equals_straight_run() {
    let objects = common::circle_map(60, 160.0);
    let difficulty = Difficulty::new();
    let token = CancellationToken::new();

    let mut stepped = GradualDifficulty::new(difficulty.clone(), &objects);

    for k in [5, 17, 33, 60] {
        stepped.process_to(k, &token).unwrap();
    }

    let stepped_attrs = stepped.process_to(60, &token).unwrap();

    let mut straight = GradualDifficulty::new(difficulty, &objects);
    let straight_attrs = straight.process_to(60, &token).unwrap();

    assert_eq!(stepped_attrs, straight_attrs);
}

#[test]
fn snapshot_resumes_identically() {
    let objects = common::circle_map(40, 180.0);
    let difficulty = Difficulty::new().ar(9.4);
    let token = CancellationToken::new();

    let mut original = GradualDifficulty::new(difficulty.clone(), &objects);
    original.process_to(20, &token).unwrap();

    let snapshot = original.state().clone();
    let mut resumed = GradualDifficulty::with_state(difficulty, &objects, snapshot);

    assert_eq!(resumed.state().processed(), 20);
    assert_eq!(
        original.process_to(40, &token).unwrap(),
        resumed.process_to(40, &token).unwrap(),
    );
}

#[test]
fn cancellation_commits_nothing() {
    // Large enough that a calculation would take a while if it were not
    // aborted at the first object boundary.
    let objects = common::circle_map(50_000, 100.0);
    let mut gradual = GradualDifficulty::new(Difficulty::new(), &objects);

    let token = CancellationToken::new();
    gradual.process_to(1_000, &token).unwrap();
    let committed = gradual.state().clone();

    let cancelled = CancellationToken::new();
    cancelled.cancel();

    assert_eq!(
        gradual.process_to(50_000, &cancelled),
        Err(Error::Cancelled)
    );
    assert_eq!(gradual.state(), &committed);

    // Retrying the identical request with a fresh token succeeds.
    let attrs = gradual.process_to(50_000, &token).unwrap();
    assert!(attrs.stars > 0.0);
}

#[test]
fn cancelling_a_full_calculation_bails() {
    let objects = common::circle_map(50_000, 100.0);

    let token = CancellationToken::new();
    token.cancel();

    let res = Difficulty::new()
        .cancellation_token(token)
        .calculate(&objects);

    assert_eq!(res, Err(Error::Cancelled));
}

#[test]
#[should_panic(expected = "cannot move backwards")]
fn requesting_a_smaller_prefix_panics() {
    let objects = common::circle_map(16, 200.0);
    let mut gradual = GradualDifficulty::new(Difficulty::new(), &objects);
    let token = CancellationToken::new();

    gradual.process_to(10, &token).unwrap();
    let _ = gradual.process_to(4, &token);
}

#[test]
fn iterator_yields_every_prefix() {
    let objects = common::mixed_map();
    let gradual = GradualDifficulty::new(Difficulty::new(), &objects);

    let steps: Vec<_> = gradual.collect();

    assert_eq!(steps.len(), 4);
    assert_eq!(steps[0].n_objects(), 1);
    assert_eq!(steps[3].n_objects(), 4);
    assert!(steps[3].stars >= steps[0].stars);
}

#[test]
fn nth_skips_without_changing_results() {
    let objects = common::circle_map(24, 150.0);

    let via_nth = GradualDifficulty::new(Difficulty::new(), &objects)
        .nth(9)
        .unwrap();

    let mut stepped = GradualDifficulty::new(Difficulty::new(), &objects);
    let via_next = stepped.by_ref().take(10).last().unwrap();

    let via_process = GradualDifficulty::new(Difficulty::new(), &objects)
        .process_to(10, &CancellationToken::new())
        .unwrap();

    assert_eq!(via_nth, via_next);
    assert_eq!(via_nth, via_process);
}
