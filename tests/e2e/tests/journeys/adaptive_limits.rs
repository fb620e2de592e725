//! Journey: session limits adapt to recent performance.
//!
//! Carries a session context across starts the way an orchestrating layer
//! would, and watches the policy throttle and restore new-card flow.

use chrono::Utc;
use glossa_core::{
    AdaptivePolicy, CardStore, EngineConfig, ExactAssessor, ExerciseKind, Grade, Rating,
    ReviewEvent, SessionContext, SessionRegistry,
};
use glossa_e2e_tests::harness::TestDatabaseManager;
use glossa_e2e_tests::mocks::exercise_pool_for;

fn event(card_id: &str, rating: Rating, grade: Grade) -> ReviewEvent {
    ReviewEvent {
        card_id: card_id.to_string(),
        term: card_id.to_string(),
        exercise_kind: ExerciseKind::Mcq,
        rating,
        grade,
        time_ms: 900,
        timestamp: Utc::now(),
    }
}

#[test]
fn struggling_learner_gets_fewer_new_cards() {
    let db = TestDatabaseManager::new_temp();
    let mut cards = Vec::new();
    for i in 0..12 {
        cards.push(db.seed_due_card("l1", &format!("due{}", i), i + 1));
    }
    for i in 0..10 {
        cards.push(db.seed_new_card("l1", &format!("new{}", i)));
    }

    // A context showing 50% accuracy over 6 reviews, ending on a correct
    // answer so the streak override stays out of the picture
    let mut ctx = SessionContext::new("l1", Utc::now());
    for i in 0..3 {
        ctx.record_review(event(&format!("bad{}", i), Rating::Again, Grade::Incorrect));
        ctx.record_review(event(&format!("ok{}", i), Rating::Easy, Grade::Correct));
    }

    let registry = SessionRegistry::new(7200);
    let start = registry
        .start(
            db.card_store(),
            Box::new(exercise_pool_for(&cards)),
            Box::new(ExactAssessor::new()),
            ctx,
            &EngineConfig::default(),
            Utc::now(),
        )
        .unwrap();

    // base_new 10 drops to max(2, 10/3) = 3; the ratio cap (12 due * 0.25
    // = 3) happens to agree
    assert_eq!(start.new_cards, 3);
    assert!(start.reasoning.contains("reducing new cards"));
}

#[test]
fn failure_streak_pauses_new_cards_entirely() {
    let db = TestDatabaseManager::new_temp();
    let mut cards = Vec::new();
    for i in 0..8 {
        cards.push(db.seed_due_card("l1", &format!("due{}", i), i + 1));
    }
    cards.push(db.seed_new_card("l1", "fresh"));

    // Strong aggregate accuracy, but the last three answers were misses
    let mut ctx = SessionContext::new("l1", Utc::now());
    for i in 0..10 {
        ctx.record_review(event(&format!("ok{}", i), Rating::Easy, Grade::Correct));
    }
    for i in 0..3 {
        ctx.record_review(event(&format!("bad{}", i), Rating::Again, Grade::Incorrect));
    }

    let registry = SessionRegistry::new(7200);
    let start = registry
        .start(
            db.card_store(),
            Box::new(exercise_pool_for(&cards)),
            Box::new(ExactAssessor::new()),
            ctx,
            &EngineConfig::default(),
            Utc::now(),
        )
        .unwrap();

    assert_eq!(start.new_cards, 0);
    assert_eq!(start.due_cards, 8);
    assert!(start.reasoning.contains("pausing new cards"));
}

#[test]
fn difficulty_hint_follows_card_maturity_within_a_session() {
    let db = TestDatabaseManager::new_temp();
    let ctx = SessionContext::new("l1", Utc::now());
    let policy = AdaptivePolicy::new(&EngineConfig::default());

    // A mature, stable card climbs to production exercises
    let mut mature = db.seed_due_card("l1", "mature", 1);
    mature.state.reps = 9;
    mature.state.stability = 40.0;
    db.store.save_card(&mature).unwrap();
    let decision = policy.difficulty_hint(&mature, &ctx);
    assert_eq!(
        decision.tier.preferred_kind(),
        ExerciseKind::Translation
    );

    // Three lapses drag the same card back to recognition
    mature.state.lapses = 3;
    let decision = policy.difficulty_hint(&mature, &ctx);
    assert_eq!(decision.tier.preferred_kind(), ExerciseKind::Mcq);
}
