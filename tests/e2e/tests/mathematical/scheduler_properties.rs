//! Mathematical properties of the FSRS scheduler.
//!
//! Pins the invariants the rest of the system leans on: monotonic initial
//! stabilities, bounded difficulty, lapse decay, interval ordering, and
//! the forgetting-curve identities.

use chrono::{Duration, Utc};
use glossa_core::{
    retrievability, stability_to_interval, CardState, CardStore, FsrsScheduler, Rating,
    MIN_STABILITY,
};
use glossa_e2e_tests::harness::TestDatabaseManager;

#[test]
fn initial_stability_strictly_increasing_in_rating() {
    let scheduler = FsrsScheduler::default();
    let now = Utc::now();
    let stabilities: Vec<f64> = [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy]
        .into_iter()
        .map(|r| scheduler.initial_state(r, now).stability)
        .collect();
    assert!(stabilities.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn first_good_review_matches_weight_table() {
    // New card, first review Good: reps 1, lapses 0, stability w2 = 2.4,
    // due = now + 9 * 2.4 * (1/0.9 - 1) days = now + 2.4 days
    let scheduler = FsrsScheduler::default();
    let now = Utc::now();
    let state = scheduler.initial_state(Rating::Good, now);

    assert_eq!(state.reps, 1);
    assert_eq!(state.lapses, 0);
    assert!((state.stability - 2.4).abs() < 1e-12);

    let expected_interval = 9.0 * 2.4 * (1.0 / 0.9 - 1.0);
    let actual_days = (state.due - now).num_milliseconds() as f64 / 86_400_000.0;
    assert!((actual_days - expected_interval).abs() < 1e-3);
}

#[test]
fn lapse_at_due_halves_stability_at_most() {
    // Card with stability 10, difficulty 0.3, reviewed exactly at due with
    // Again: lapses increment, stability drops to at most half, reps hold
    let scheduler = FsrsScheduler::default();
    let now = Utc::now();
    let state = CardState {
        stability: 10.0,
        difficulty: 0.3,
        due: now,
        reps: 4,
        lapses: 0,
    };

    let result = scheduler.review(&state, Rating::Again, now).unwrap();
    assert_eq!(result.new_state.lapses, 1);
    assert_eq!(result.new_state.reps, 4);
    assert!(result.new_state.stability <= 5.0);
    assert!(result.new_state.stability >= MIN_STABILITY);
}

#[test]
fn success_keeps_stability_above_floor_and_growing() {
    let scheduler = FsrsScheduler::default();
    let mut state = scheduler.initial_state(Rating::Good, Utc::now());
    let mut previous = state.stability;

    for _ in 0..20 {
        let result = scheduler.review(&state, Rating::Good, state.due).unwrap();
        assert!(result.new_state.stability >= MIN_STABILITY);
        assert!(result.new_state.stability > previous);
        previous = result.new_state.stability;
        state = result.new_state;
    }
}

#[test]
fn difficulty_bounded_for_any_rating_sequence() {
    let scheduler = FsrsScheduler::default();
    // Walk several fixed rating cycles; difficulty must never escape its bounds
    for pattern in [
        [Rating::Again, Rating::Again, Rating::Again, Rating::Again],
        [Rating::Easy, Rating::Easy, Rating::Easy, Rating::Easy],
        [Rating::Again, Rating::Easy, Rating::Hard, Rating::Good],
        [Rating::Hard, Rating::Again, Rating::Easy, Rating::Again],
    ] {
        let mut state = scheduler.initial_state(pattern[0], Utc::now());
        for _ in 0..25 {
            for rating in pattern {
                state = scheduler
                    .review(&state, rating, state.due)
                    .unwrap()
                    .new_state;
                assert!((0.01..=0.99).contains(&state.difficulty));
            }
        }
    }
}

#[test]
fn interval_ordering_hard_good_easy() {
    let scheduler = FsrsScheduler::default();
    let now = Utc::now();
    let state = CardState {
        stability: 6.0,
        difficulty: 0.5,
        due: now,
        reps: 3,
        lapses: 1,
    };

    let hard = scheduler.review(&state, Rating::Hard, now).unwrap().interval_days;
    let good = scheduler.review(&state, Rating::Good, now).unwrap().interval_days;
    let easy = scheduler.review(&state, Rating::Easy, now).unwrap().interval_days;
    assert!(hard <= good);
    assert!(good <= easy);
}

#[test]
fn lower_retention_never_shortens_intervals() {
    for stability in [0.5, 2.4, 10.0, 50.0] {
        let relaxed = stability_to_interval(stability, 0.8);
        let baseline = stability_to_interval(stability, 0.9);
        assert!(relaxed >= baseline);
    }
}

#[test]
fn retrievability_stays_in_unit_interval() {
    for elapsed in [0.0, 0.1, 1.0, 9.0, 100.0, 10_000.0] {
        for stability in [0.1, 1.0, 10.0, 365.0] {
            let r = retrievability(elapsed, stability);
            assert!(r > 0.0 && r <= 1.0, "elapsed={} stability={}", elapsed, stability);
        }
    }
    assert_eq!(retrievability(0.0, 10.0), 1.0);
}

#[test]
fn card_state_survives_storage_roundtrip_bit_identical() {
    let db = TestDatabaseManager::new_temp();
    let scheduler = FsrsScheduler::default();

    // Run a realistic review history, persisting after each step
    let mut card = db.seed_new_card("l1", "pani");
    card.state = scheduler.initial_state(Rating::Good, Utc::now());
    db.store.save_card(&card).unwrap();

    for rating in [Rating::Good, Rating::Hard, Rating::Again, Rating::Easy] {
        let loaded = db.store.get_card(&card.id).unwrap().unwrap();
        let result = scheduler
            .review(&loaded.state, rating, loaded.state.due)
            .unwrap();
        card.state = result.new_state;
        db.store.save_card(&card).unwrap();

        let reloaded = db.store.get_card(&card.id).unwrap().unwrap();
        assert_eq!(
            reloaded.state.stability.to_bits(),
            card.state.stability.to_bits()
        );
        assert_eq!(
            reloaded.state.difficulty.to_bits(),
            card.state.difficulty.to_bits()
        );
        assert_eq!(reloaded.state.due, card.state.due);
        assert_eq!(reloaded.state.reps, card.state.reps);
        assert_eq!(reloaded.state.lapses, card.state.lapses);
    }
}

#[test]
fn overdue_reviews_grow_stability_more_than_on_time() {
    // A recall that survived a long delay was more surprising, so the
    // stability reward is larger
    let scheduler = FsrsScheduler::default();
    let now = Utc::now();
    let state = CardState {
        stability: 5.0,
        difficulty: 0.4,
        due: now,
        reps: 2,
        lapses: 0,
    };

    let on_time = scheduler.review(&state, Rating::Good, now).unwrap();
    let overdue = scheduler
        .review(&state, Rating::Good, now + Duration::days(30))
        .unwrap();
    assert!(overdue.new_state.stability > on_time.new_state.stability);
    assert!(overdue.retrievability < on_time.retrievability);
}
