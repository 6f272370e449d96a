//! Divergence from the canonical narration.
//!
//! A step diverges when the plot point it lands on is canonically narrated by
//! someone other than the active character. The score is a plain count, so it
//! never decreases along a path.

use playbook_core::error::DomainError;
use playbook_story::domain::graph::StoryGraph;
use playbook_story::domain::model::PlotPoint;

/// Returns whether landing on `target` as `character_id` diverges.
#[must_use]
pub fn is_divergent(target: &PlotPoint, character_id: &str) -> bool {
    target.narrator != character_id
}

/// Scores a full choice history for `character_id`.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if a history entry or its target is not in
/// the graph.
pub fn score_history(
    graph: &StoryGraph,
    character_id: &str,
    history: &[String],
) -> Result<u32, DomainError> {
    let mut score = 0;
    for choice_id in history {
        let choice = graph.get_choice(choice_id)?;
        if is_divergent(graph.get_plot_point(&choice.target)?, character_id) {
            score += 1;
        }
    }
    Ok(score)
}
