//! Perspective engine behaviour against scripted generators.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use playbook_core::aggregate::AggregateRoot;
use playbook_core::error::DomainError;
use playbook_narrative::application::perspective_engine::PerspectiveEngine;
use playbook_narrative::domain::generator::PerceptionGenerator;
use playbook_session::domain::aggregates::Session;
use playbook_story::application::loader::builtin_story;
use playbook_test_support::{FailingGenerator, FixedClock, RecordingGenerator, SlowGenerator};
use uuid::Uuid;

fn engine_with(generator: Arc<dyn PerceptionGenerator>, timeout: Duration) -> PerspectiveEngine {
    PerspectiveEngine::new(Arc::new(builtin_story().unwrap()), generator, timeout)
}

#[tokio::test]
async fn test_generator_is_consulted_once_per_pair() {
    // Arrange
    let generator = Arc::new(RecordingGenerator::new());
    let engine = engine_with(generator.clone(), Duration::from_secs(1));

    // Act
    engine.render("sunset", "ahab").await.unwrap();
    engine.render("sunset", "ahab").await.unwrap();
    engine.render("sunset", "starbuck").await.unwrap();

    // Assert
    assert_eq!(generator.requests().len(), 2);
    assert_eq!(engine.cached_count(), 2);
}

#[tokio::test]
async fn test_request_carries_voice_and_knowledge_of_character() {
    // Arrange
    let generator = Arc::new(RecordingGenerator::new());
    let engine = engine_with(generator.clone(), Duration::from_secs(1));

    // Act
    let perception = engine.render("the-quarter-deck", "ahab").await.unwrap();

    // Assert
    let request = &generator.requests()[0];
    assert_eq!(request.voice.tone, "commanding");
    assert_eq!(request.knowledge.len(), 2);
    assert!(request.event.witnessed);
    assert_eq!(perception.emotional_state, "brooding");
    assert!(perception.text.starts_with("The Pequod, quarter-deck: "));
}

#[tokio::test]
async fn test_timeout_surfaces_generation_failure_and_is_not_cached() {
    // Arrange
    let engine = engine_with(
        Arc::new(SlowGenerator(Duration::from_secs(5))),
        Duration::from_millis(20),
    );

    // Act
    let result = engine.render("opening", "ishmael").await;

    // Assert
    assert!(matches!(result, Err(DomainError::GenerationFailure(_))));
    assert_eq!(engine.cached_count(), 0);
}

#[tokio::test]
async fn test_generator_error_message_is_surfaced() {
    // Arrange
    let engine = engine_with(Arc::new(FailingGenerator), Duration::from_secs(1));

    // Act
    let result = engine.render("opening", "ishmael").await;

    // Assert
    assert!(matches!(
        result,
        Err(DomainError::GenerationFailure(ref m)) if m.contains("model offline")
    ));
}

#[tokio::test]
async fn test_apply_choice_leaves_input_session_untouched() {
    // Arrange
    let engine = engine_with(Arc::new(RecordingGenerator::new()), Duration::from_secs(1));
    let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap());
    let mut session = Session::new(Uuid::new_v4());
    session
        .start(engine.graph(), "ishmael", Uuid::new_v4(), &clock)
        .unwrap();
    session.mark_committed();
    let before = session.clone();

    // Act
    let (next, perception) = engine
        .apply_choice(&session, "call-me-ishmael", Uuid::new_v4(), &clock)
        .await
        .unwrap();

    // Assert
    assert_eq!(session, before);
    assert_eq!(next.current_plot_point(), "chapter-1");
    assert_eq!(next.uncommitted_events().len(), 1);
    assert_eq!(perception.plot_point_id, "chapter-1");
}

#[tokio::test]
async fn test_apply_choice_failure_returns_no_session() {
    // Arrange
    let engine = engine_with(Arc::new(FailingGenerator), Duration::from_secs(1));
    let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap());
    let mut session = Session::new(Uuid::new_v4());
    session
        .start(engine.graph(), "ishmael", Uuid::new_v4(), &clock)
        .unwrap();
    session.mark_committed();
    let before = session.clone();

    // Act
    let result = engine
        .apply_choice(&session, "call-me-ishmael", Uuid::new_v4(), &clock)
        .await;

    // Assert
    assert!(matches!(result, Err(DomainError::GenerationFailure(_))));
    assert_eq!(session, before);
}
