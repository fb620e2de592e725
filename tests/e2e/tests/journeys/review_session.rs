//! Journey: a learner works through a full review session.
//!
//! Covers the serving-layer contract end to end: start a session, pull
//! cards one at a time, submit answers, watch card state evolve in the
//! store, and collect the final summary.

use chrono::Utc;
use glossa_core::{
    AnswerSubmission, CardStore, EngineConfig, ExactAssessor, Grade, Rating, SessionContext,
    SessionError, SessionRegistry,
};
use glossa_e2e_tests::harness::TestDatabaseManager;
use glossa_e2e_tests::mocks::{exercise_pool_for, FixedAssessor, FlakyAssessor};

fn answer_for(card: &glossa_core::SessionCard, response: &str) -> AnswerSubmission {
    AnswerSubmission {
        card_id: card.card.id.clone(),
        exercise_id: card.exercise.id.clone(),
        response: response.to_string(),
        time_ms: 1200,
        self_rating: None,
    }
}

#[test]
fn full_session_from_start_to_summary() {
    let db = TestDatabaseManager::new_temp();
    let mut cards = Vec::new();
    for (i, term) in ["pani", "ghar", "kitab", "darvaza"].iter().enumerate() {
        cards.push(db.seed_due_card("l1", term, i as i64 + 1));
    }
    cards.push(db.seed_new_card("l1", "khidki"));

    let registry = SessionRegistry::new(7200);
    let start = registry
        .start(
            db.card_store(),
            Box::new(exercise_pool_for(&cards)),
            Box::new(ExactAssessor::new()),
            SessionContext::new("l1", Utc::now()),
            &EngineConfig::default(),
            Utc::now(),
        )
        .unwrap();

    assert_eq!(start.due_cards, 4);
    assert_eq!(start.new_cards, 1);
    assert_eq!(start.total, 5);

    // Work through the whole queue, answering every card correctly
    let mut answered = 0;
    loop {
        let next = registry
            .with_session(&start.session_id, |s| s.get_next())
            .unwrap();
        let Some(presented) = next else { break };

        let term = presented.card.term.clone();
        let outcome = registry
            .with_session(&start.session_id, |s| {
                s.submit_answer(answer_for(&presented, &term))
            })
            .unwrap();

        answered += 1;
        assert_eq!(outcome.assessment.grade, Grade::Correct);
        assert!(outcome.review.interval_days > 0.0);
        assert_eq!(outcome.remaining, start.total - answered);
    }

    assert_eq!(answered, 5);

    // Every reviewed card was rescheduled into the future
    for card in &cards {
        let stored = db.store.get_card(&card.id).unwrap().unwrap();
        assert!(stored.state.due > Utc::now());
        assert!(stored.state.reps >= 1);
    }

    let summary = registry.end(&start.session_id).unwrap();
    assert_eq!(summary.stats.cards_reviewed, 5);
    assert_eq!(summary.stats.new_cards_seen, 1);
    assert!(summary.struggling_terms.is_empty());

    // The audit log has one row per answer
    assert_eq!(db.store.review_count("l1").unwrap(), 5);
}

#[test]
fn failed_reviews_reschedule_sooner_and_track_struggle() {
    let db = TestDatabaseManager::new_temp();
    let card = db.seed_due_card("l1", "pani", 1);

    let registry = SessionRegistry::new(7200);
    let start = registry
        .start(
            db.card_store(),
            Box::new(exercise_pool_for(std::slice::from_ref(&card))),
            Box::new(ExactAssessor::new()),
            SessionContext::new("l1", Utc::now()),
            &EngineConfig::default(),
            Utc::now(),
        )
        .unwrap();

    let presented = registry
        .with_session(&start.session_id, |s| s.get_next())
        .unwrap()
        .unwrap();
    let outcome = registry
        .with_session(&start.session_id, |s| {
            s.submit_answer(answer_for(&presented, "completely wrong"))
        })
        .unwrap();

    assert_eq!(outcome.applied_rating, Rating::Again);

    let stored = db.store.get_card(&card.id).unwrap().unwrap();
    assert_eq!(stored.state.lapses, 1);
    assert!(stored.state.stability <= card.state.stability * 0.5);

    let summary = registry.end(&start.session_id).unwrap();
    assert_eq!(summary.struggling_terms, vec!["pani".to_string()]);
    assert_eq!(summary.stats.incorrect, 1);
}

#[test]
fn transient_assessment_failure_leaves_session_resumable() {
    let db = TestDatabaseManager::new_temp();
    let card = db.seed_due_card("l1", "pani", 1);

    let registry = SessionRegistry::new(7200);
    let start = registry
        .start(
            db.card_store(),
            Box::new(exercise_pool_for(std::slice::from_ref(&card))),
            Box::new(FlakyAssessor::new(1)),
            SessionContext::new("l1", Utc::now()),
            &EngineConfig::default(),
            Utc::now(),
        )
        .unwrap();

    let presented = registry
        .with_session(&start.session_id, |s| s.get_next())
        .unwrap()
        .unwrap();

    // First submit hits the outage and propagates the failure
    let err = registry
        .with_session(&start.session_id, |s| {
            s.submit_answer(answer_for(&presented, "pani"))
        })
        .unwrap_err();
    assert!(matches!(err, SessionError::Assessment(_)));

    // No state moved: the card was not rescheduled and the log is empty
    let stored = db.store.get_card(&card.id).unwrap().unwrap();
    assert_eq!(stored.state.reps, card.state.reps);
    assert_eq!(db.store.review_count("l1").unwrap(), 0);

    // The retry succeeds against the same presentation
    let outcome = registry
        .with_session(&start.session_id, |s| {
            s.submit_answer(answer_for(&presented, "pani"))
        })
        .unwrap();
    assert!(outcome.session_complete);
}

#[test]
fn close_grade_schedules_as_good_but_counts_separately() {
    let db = TestDatabaseManager::new_temp();
    let card = db.seed_due_card("l1", "pani", 1);

    let registry = SessionRegistry::new(7200);
    let start = registry
        .start(
            db.card_store(),
            Box::new(exercise_pool_for(std::slice::from_ref(&card))),
            // An assessor that grades the typo-style near-miss
            Box::new(FixedAssessor::new(Grade::Close)),
            SessionContext::new("l1", Utc::now()),
            &EngineConfig::default(),
            Utc::now(),
        )
        .unwrap();

    let presented = registry
        .with_session(&start.session_id, |s| s.get_next())
        .unwrap()
        .unwrap();
    let outcome = registry
        .with_session(&start.session_id, |s| {
            s.submit_answer(answer_for(&presented, "panee"))
        })
        .unwrap();

    // A near-miss schedules like a full Good recall
    assert_eq!(outcome.applied_rating, Rating::Good);
    let stored = db.store.get_card(&card.id).unwrap().unwrap();
    assert_eq!(stored.state.reps, 2);
    assert_eq!(stored.state.lapses, 0);

    // But the summary keeps it out of the correct tally
    let summary = registry.end(&start.session_id).unwrap();
    assert_eq!(summary.stats.close, 1);
    assert_eq!(summary.stats.correct, 0);
}

#[test]
fn self_rating_wins_over_assessment() {
    let db = TestDatabaseManager::new_temp();
    let card = db.seed_due_card("l1", "pani", 1);

    let registry = SessionRegistry::new(7200);
    let start = registry
        .start(
            db.card_store(),
            Box::new(exercise_pool_for(std::slice::from_ref(&card))),
            Box::new(ExactAssessor::new()),
            SessionContext::new("l1", Utc::now()),
            &EngineConfig::default(),
            Utc::now(),
        )
        .unwrap();

    let presented = registry
        .with_session(&start.session_id, |s| s.get_next())
        .unwrap()
        .unwrap();
    let mut answer = answer_for(&presented, &presented.card.term);
    answer.self_rating = Some(2);

    let outcome = registry
        .with_session(&start.session_id, |s| s.submit_answer(answer))
        .unwrap();
    assert_eq!(outcome.applied_rating, Rating::Hard);
    assert_eq!(outcome.assessment.suggested_rating, Rating::Easy);
}
