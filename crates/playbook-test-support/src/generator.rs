//! Test generators: `PerceptionGenerator` doubles for the engine's failure
//! and context-passing paths.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use playbook_narrative::domain::generator::{GenerationError, PerceptionGenerator};
use playbook_narrative::domain::perception::{GeneratedPerception, PerceptionRequest};

/// A generator whose backing service is always down.
#[derive(Debug)]
pub struct FailingGenerator;

#[async_trait]
impl PerceptionGenerator for FailingGenerator {
    async fn generate(
        &self,
        _request: &PerceptionRequest,
    ) -> Result<GeneratedPerception, GenerationError> {
        Err(GenerationError::Unavailable("model offline".into()))
    }
}

/// A generator that sleeps for the given duration before answering.
#[derive(Debug)]
pub struct SlowGenerator(pub Duration);

#[async_trait]
impl PerceptionGenerator for SlowGenerator {
    async fn generate(
        &self,
        request: &PerceptionRequest,
    ) -> Result<GeneratedPerception, GenerationError> {
        tokio::time::sleep(self.0).await;
        Ok(GeneratedPerception {
            text: request.event.summary.clone(),
            emotional_state: request.voice.default_emotion.clone(),
        })
    }
}

/// A generator that records every request and answers with
/// `"<location>: <summary>"`.
#[derive(Debug, Default)]
pub struct RecordingGenerator {
    requests: Mutex<Vec<PerceptionRequest>>,
}

impl RecordingGenerator {
    /// Create a generator with an empty request log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every request received, oldest first.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn requests(&self) -> Vec<PerceptionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PerceptionGenerator for RecordingGenerator {
    async fn generate(
        &self,
        request: &PerceptionRequest,
    ) -> Result<GeneratedPerception, GenerationError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(GeneratedPerception {
            text: format!("{}: {}", request.event.location, request.event.summary),
            emotional_state: request.voice.default_emotion.clone(),
        })
    }
}
