//! The immutable story graph.

use std::collections::HashMap;

use playbook_core::error::DomainError;

use super::model::{Character, Choice, Persona, PlotPoint, StoryDocument};
use super::validation;

/// Validated, indexed, read-only story content.
///
/// Constructed once at startup and shared behind an `Arc`; nothing mutates it
/// afterwards.
#[derive(Debug)]
pub struct StoryGraph {
    document: StoryDocument,
    content_hash: String,
    plot_points: HashMap<String, usize>,
    characters: HashMap<String, usize>,
    /// Choice id -> (plot point index, choice index).
    choices: HashMap<String, (usize, usize)>,
}

impl StoryGraph {
    /// Validates `document` and builds the lookup indexes.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InternalInvariant` if the document violates any
    /// graph invariant.
    pub fn new(document: StoryDocument, content_hash: String) -> Result<Self, DomainError> {
        validation::validate(&document)?;

        let plot_points = document
            .plot_points
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id.clone(), i))
            .collect();
        let characters = document
            .characters
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();
        let mut choices = HashMap::new();
        for (pi, plot_point) in document.plot_points.iter().enumerate() {
            for (ci, choice) in plot_point.choices.iter().enumerate() {
                choices.insert(choice.id.clone(), (pi, ci));
            }
        }

        Ok(Self {
            document,
            content_hash,
            plot_points,
            characters,
            choices,
        })
    }

    /// Title of the source novel.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.document.title
    }

    /// SHA-256 hex digest of the content this graph was loaded from.
    #[must_use]
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    /// The designated start node.
    #[must_use]
    pub fn start(&self) -> &PlotPoint {
        // Validation guarantees the start node exists.
        &self.document.plot_points[self.plot_points[&self.document.start]]
    }

    /// The character sessions use when none is chosen.
    #[must_use]
    pub fn default_character(&self) -> &Character {
        // Validation guarantees at least one character.
        &self.document.characters[0]
    }

    /// Looks up a plot point.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if no plot point has this id.
    pub fn get_plot_point(&self, id: &str) -> Result<&PlotPoint, DomainError> {
        self.plot_points
            .get(id)
            .map(|&i| &self.document.plot_points[i])
            .ok_or_else(|| DomainError::not_found("plot point", id))
    }

    /// Choices offered at `plot_point_id` given `history`, in source order.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if the plot point does not exist.
    pub fn get_choices(
        &self,
        plot_point_id: &str,
        history: &[String],
    ) -> Result<Vec<&Choice>, DomainError> {
        let plot_point = self.get_plot_point(plot_point_id)?;
        Ok(plot_point
            .choices
            .iter()
            .filter(|choice| choice.is_available(history))
            .collect())
    }

    /// True if `plot_point_id` offers no choices under `history`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if the plot point does not exist.
    pub fn is_ending(&self, plot_point_id: &str, history: &[String]) -> Result<bool, DomainError> {
        Ok(self.get_choices(plot_point_id, history)?.is_empty())
    }

    /// Looks up a choice anywhere in the graph.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if no choice has this id.
    pub fn get_choice(&self, id: &str) -> Result<&Choice, DomainError> {
        self.choices
            .get(id)
            .map(|&(pi, ci)| &self.document.plot_points[pi].choices[ci])
            .ok_or_else(|| DomainError::not_found("choice", id))
    }

    /// Looks up a character.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if no character has this id.
    pub fn get_character(&self, id: &str) -> Result<&Character, DomainError> {
        self.characters
            .get(id)
            .map(|&i| &self.document.characters[i])
            .ok_or_else(|| DomainError::not_found("character", id))
    }

    /// Resolves a character by id or, case-insensitively, by display name.
    #[must_use]
    pub fn find_character(&self, name_or_id: &str) -> Option<&Character> {
        let wanted = name_or_id.trim();
        self.document.characters.iter().find(|c| {
            c.id.eq_ignore_ascii_case(wanted) || c.name.eq_ignore_ascii_case(wanted)
        })
    }

    /// All characters in select-screen order.
    #[must_use]
    pub fn characters(&self) -> &[Character] {
        &self.document.characters
    }

    /// All plot points in source order.
    #[must_use]
    pub fn plot_points(&self) -> &[PlotPoint] {
        &self.document.plot_points
    }

    /// All personas in source order.
    #[must_use]
    pub fn personas(&self) -> &[Persona] {
        &self.document.personas
    }

    /// Looks up a persona.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if no persona has this id.
    pub fn get_persona(&self, id: &str) -> Result<&Persona, DomainError> {
        self.document
            .personas
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| DomainError::not_found("persona", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::loader;

    fn graph() -> StoryGraph {
        loader::builtin_story().unwrap()
    }

    fn ids(choices: &[&Choice]) -> Vec<String> {
        choices.iter().map(|c| c.id.clone()).collect()
    }

    #[test]
    fn test_start_is_opening() {
        assert_eq!(graph().start().id, "opening");
        assert_eq!(graph().default_character().id, "ishmael");
    }

    #[test]
    fn test_opening_offers_four_choices_in_source_order() {
        let graph = graph();

        let choices = graph.get_choices("opening", &[]).unwrap();

        assert_eq!(
            ids(&choices),
            vec![
                "walk-the-waterfront",
                "visit-the-battery",
                "call-me-ishmael",
                "stay-ashore"
            ]
        );
        assert_eq!(choices[2].target, "chapter-1");
    }

    #[test]
    fn test_get_choices_filters_unsatisfied_preconditions() {
        let graph = graph();
        let without_chapel = vec!["sail-for-nantucket".to_owned()];
        let with_chapel = vec!["attend-the-chapel".to_owned()];

        let before = graph
            .get_choices("signing-the-pequod", &without_chapel)
            .unwrap();
        let after = graph.get_choices("signing-the-pequod", &with_chapel).unwrap();

        assert_eq!(ids(&before), vec!["sign-the-articles"]);
        assert_eq!(ids(&after), vec!["sign-the-articles", "heed-elijah"]);
    }

    #[test]
    fn test_choices_excluded_for_a_history_stay_excluded_for_its_prefixes() {
        let graph = graph();
        let history: Vec<String> = [
            "call-me-ishmael",
            "travel-to-new-bedford",
            "share-the-bed",
            "attend-the-chapel",
        ]
        .iter()
        .map(|s| (*s).to_owned())
        .collect();

        for plot_point in graph.plot_points() {
            let full = ids(&graph.get_choices(&plot_point.id, &history).unwrap());
            for len in 0..=history.len() {
                let prefix = ids(&graph.get_choices(&plot_point.id, &history[..len]).unwrap());
                assert!(
                    prefix.iter().all(|id| full.contains(id)),
                    "{} offered {prefix:?} with a prefix but {full:?} with the full history",
                    plot_point.id
                );
            }
        }
    }

    #[test]
    fn test_get_plot_point_unknown_id_is_not_found() {
        match graph().get_plot_point("chapter-99").unwrap_err() {
            DomainError::NotFound { kind, id } => {
                assert_eq!(kind, "plot point");
                assert_eq!(id, "chapter-99");
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_endings_have_no_choices() {
        let graph = graph();
        assert!(graph.is_ending("ashore", &[]).unwrap());
        assert!(graph.is_ending("the-sinking", &[]).unwrap());
        assert!(!graph.is_ending("opening", &[]).unwrap());
    }

    #[test]
    fn test_find_character_matches_id_or_name_case_insensitively() {
        let graph = graph();
        assert_eq!(graph.find_character("QUEEQUEG").unwrap().id, "queequeg");
        assert_eq!(graph.find_character("moby dick").unwrap().id, "moby-dick");
        assert!(graph.find_character("fedallah").is_none());
    }

    #[test]
    fn test_get_choice_resolves_any_choice() {
        let graph = graph();
        assert_eq!(graph.get_choice("keep-the-watch").unwrap().target, "the-chase");
        assert!(graph.get_choice("jump-overboard").is_err());
    }
}
