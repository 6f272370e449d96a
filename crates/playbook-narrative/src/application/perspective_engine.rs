//! The perspective engine: renders perceptions and advances sessions.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use playbook_core::clock::Clock;
use playbook_core::error::DomainError;
use playbook_session::domain::aggregates::Session;
use playbook_story::domain::graph::StoryGraph;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::generator::PerceptionGenerator;
use crate::domain::perception::{Perception, PerceptionRequest};

type CacheKey = (String, String);

/// Renders plot points through characters and applies choices to sessions.
///
/// Successful renders are cached per (plot point, character) pair, so a
/// generator is consulted at most once per pair for the life of the engine.
pub struct PerspectiveEngine {
    graph: Arc<StoryGraph>,
    generator: Arc<dyn PerceptionGenerator>,
    timeout: Duration,
    cache: RwLock<HashMap<CacheKey, Perception>>,
}

impl std::fmt::Debug for PerspectiveEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerspectiveEngine")
            .field("timeout", &self.timeout)
            .field("cached", &self.cached_count())
            .finish_non_exhaustive()
    }
}

impl PerspectiveEngine {
    /// Creates an engine over `graph`, bounding each generator call by
    /// `timeout`.
    #[must_use]
    pub fn new(
        graph: Arc<StoryGraph>,
        generator: Arc<dyn PerceptionGenerator>,
        timeout: Duration,
    ) -> Self {
        Self {
            graph,
            generator,
            timeout,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the story graph.
    #[must_use]
    pub fn graph(&self) -> &Arc<StoryGraph> {
        &self.graph
    }

    /// Number of cached perceptions.
    #[must_use]
    pub fn cached_count(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Renders `plot_point_id` as `character_id` perceives it.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` for an unknown plot point or
    /// character, and `DomainError::GenerationFailure` if the generator fails
    /// or exceeds the timeout.
    pub async fn render(
        &self,
        plot_point_id: &str,
        character_id: &str,
    ) -> Result<Perception, DomainError> {
        self.render_after(plot_point_id, character_id, None).await
    }

    /// Renders `plot_point_id` as `character_id` perceives it, offering the
    /// character's cached perception of `previous` as context.
    ///
    /// # Errors
    ///
    /// See [`PerspectiveEngine::render`].
    pub async fn render_after(
        &self,
        plot_point_id: &str,
        character_id: &str,
        previous: Option<&str>,
    ) -> Result<Perception, DomainError> {
        let plot_point = self.graph.get_plot_point(plot_point_id)?;
        let character = self.graph.get_character(character_id)?;

        if let Some(hit) = self.cached(plot_point_id, character_id) {
            debug!(plot_point_id, character_id, "perception cache hit");
            return Ok(hit);
        }

        let prior = previous
            .and_then(|prev| self.cached(prev, character_id))
            .map(|p| p.text);
        let request = PerceptionRequest::new(plot_point, character, prior);

        let generated = match tokio::time::timeout(self.timeout, self.generator.generate(&request))
            .await
        {
            Ok(Ok(generated)) => generated,
            Ok(Err(e)) => {
                warn!(plot_point_id, character_id, error = %e, "perception generation failed");
                return Err(DomainError::GenerationFailure(e.to_string()));
            }
            Err(_) => {
                warn!(
                    plot_point_id,
                    character_id,
                    timeout = ?self.timeout,
                    "perception generation timed out"
                );
                return Err(DomainError::GenerationFailure(format!(
                    "perception generation timed out after {} ms",
                    self.timeout.as_millis()
                )));
            }
        };

        let perception = Perception {
            plot_point_id: plot_point.id.clone(),
            character_id: character.id.clone(),
            text: generated.text,
            emotional_state: generated.emotional_state,
        };
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                (plot_point.id.clone(), character.id.clone()),
                perception.clone(),
            );
        Ok(perception)
    }

    /// Takes `choice_id` on a copy of `session` and renders the plot point it
    /// leads to. `session` itself is never modified; the caller persists the
    /// returned session only once both steps succeed.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidChoice` if the choice is not offered, or
    /// any render error.
    pub async fn apply_choice(
        &self,
        session: &Session,
        choice_id: &str,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(Session, Perception), DomainError> {
        let mut next = session.clone();
        next.apply_choice(&self.graph, choice_id, correlation_id, clock)?;
        let perception = self
            .render_after(
                next.current_plot_point(),
                next.character_id(),
                Some(session.current_plot_point()),
            )
            .await?;
        Ok((next, perception))
    }

    fn cached(&self, plot_point_id: &str, character_id: &str) -> Option<Perception> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(plot_point_id.to_owned(), character_id.to_owned()))
            .cloned()
    }
}
