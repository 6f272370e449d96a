//! Load-time validation of story content.
//!
//! A story that fails here must never reach a session: every violation is
//! an `InternalInvariant` and aborts startup.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use playbook_core::error::DomainError;

use super::model::StoryDocument;

/// Checks every graph invariant of `document`.
///
/// All violations are collected so an author sees them in one pass.
///
/// # Errors
///
/// Returns `DomainError::InternalInvariant` listing every violation found.
pub fn validate(document: &StoryDocument) -> Result<(), DomainError> {
    let mut problems = Vec::new();

    let plot_ids = unique_ids(
        "plot point",
        document.plot_points.iter().map(|p| p.id.as_str()),
        &mut problems,
    );
    let character_ids = unique_ids(
        "character",
        document.characters.iter().map(|c| c.id.as_str()),
        &mut problems,
    );
    let choice_ids = unique_ids(
        "choice",
        document
            .plot_points
            .iter()
            .flat_map(|p| p.choices.iter().map(|c| c.id.as_str())),
        &mut problems,
    );
    unique_ids(
        "persona",
        document.personas.iter().map(|p| p.id.as_str()),
        &mut problems,
    );

    if document.characters.is_empty() {
        problems.push("story defines no characters".to_owned());
    }
    if !plot_ids.contains(document.start.as_str()) {
        problems.push(format!("start plot point {} does not exist", document.start));
    }

    for plot_point in &document.plot_points {
        if !character_ids.contains(plot_point.narrator.as_str()) {
            problems.push(format!(
                "plot point {} is narrated by unknown character {}",
                plot_point.id, plot_point.narrator
            ));
        }
        for present in &plot_point.present {
            if !character_ids.contains(present.as_str()) {
                problems.push(format!(
                    "plot point {} lists unknown character {present} as present",
                    plot_point.id
                ));
            }
        }
        for choice in &plot_point.choices {
            if !plot_ids.contains(choice.target.as_str()) {
                problems.push(format!(
                    "choice {} at {} targets missing plot point {}",
                    choice.id, plot_point.id, choice.target
                ));
            }
            for required in &choice.requires {
                if !choice_ids.contains(required.as_str()) {
                    problems.push(format!(
                        "choice {} requires unknown choice {required}",
                        choice.id
                    ));
                }
            }
        }
    }

    for character in &document.characters {
        for plot_point_id in character.knowledge.keys() {
            if !plot_ids.contains(plot_point_id.as_str()) {
                problems.push(format!(
                    "character {} has knowledge at unknown plot point {plot_point_id}",
                    character.id
                ));
            }
        }
    }

    if plot_ids.contains(document.start.as_str()) {
        check_reachability(document, &mut problems);
    }
    check_knowledge_monotonic(document, &mut problems);

    if problems.is_empty() {
        Ok(())
    } else {
        Err(DomainError::InternalInvariant(problems.join("; ")))
    }
}

fn unique_ids<'a>(
    kind: &str,
    ids: impl Iterator<Item = &'a str>,
    problems: &mut Vec<String>,
) -> HashSet<&'a str> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            problems.push(format!("duplicate {kind} id {id}"));
        }
    }
    seen
}

/// Every plot point must be reachable from the start node, following edges
/// regardless of preconditions.
fn check_reachability(document: &StoryDocument, problems: &mut Vec<String>) {
    let edges: HashMap<&str, Vec<&str>> = document
        .plot_points
        .iter()
        .map(|p| {
            (
                p.id.as_str(),
                p.choices.iter().map(|c| c.target.as_str()).collect(),
            )
        })
        .collect();

    let mut reached = HashSet::from([document.start.as_str()]);
    let mut queue = VecDeque::from([document.start.as_str()]);
    while let Some(current) = queue.pop_front() {
        for &next in edges.get(current).into_iter().flatten() {
            if reached.insert(next) {
                queue.push_back(next);
            }
        }
    }

    for plot_point in &document.plot_points {
        if !reached.contains(plot_point.id.as_str()) {
            problems.push(format!(
                "plot point {} is unreachable from {}",
                plot_point.id, document.start
            ));
        }
    }
}

/// A character never forgets: along every edge P -> Q, what they know at P
/// is a subset of what they know at Q.
fn check_knowledge_monotonic(document: &StoryDocument, problems: &mut Vec<String>) {
    for character in &document.characters {
        for plot_point in &document.plot_points {
            let before: BTreeSet<String> = character.knowledge_at(&plot_point.id);
            if before.is_empty() {
                continue;
            }
            for choice in &plot_point.choices {
                let after = character.knowledge_at(&choice.target);
                let forgotten: Vec<&String> = before.difference(&after).collect();
                if !forgotten.is_empty() {
                    problems.push(format!(
                        "character {} forgets {forgotten:?} moving from {} to {}",
                        character.id, plot_point.id, choice.target
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Character, Choice, PlotPoint, VoiceProfile};
    use std::collections::BTreeMap;

    fn voice() -> VoiceProfile {
        VoiceProfile {
            tone: "plain".to_owned(),
            focus: "events".to_owned(),
            metaphors: "none".to_owned(),
            openers: vec![],
            required_phrases: vec![],
            forbidden_phrases: vec![],
            absent_template: "I was not at {location}.".to_owned(),
            emotions: BTreeMap::new(),
            default_emotion: "calm".to_owned(),
        }
    }

    fn plot_point(id: &str, targets: &[&str]) -> PlotPoint {
        PlotPoint {
            id: id.to_owned(),
            title: id.to_owned(),
            chapter: 1,
            event: format!("Something happens at {id}."),
            location: "Nantucket".to_owned(),
            time: "1851".to_owned(),
            narrator: "ishmael".to_owned(),
            present: vec!["ishmael".to_owned()],
            themes: vec![],
            choices: targets
                .iter()
                .map(|t| Choice {
                    id: format!("{id}-to-{t}"),
                    text: format!("Go to {t}"),
                    target: (*t).to_owned(),
                    requires: vec![],
                })
                .collect(),
        }
    }

    fn document(plot_points: Vec<PlotPoint>) -> StoryDocument {
        StoryDocument {
            title: "Test".to_owned(),
            start: "a".to_owned(),
            characters: vec![Character {
                id: "ishmael".to_owned(),
                name: "ISHMAEL".to_owned(),
                description: String::new(),
                special_ability: String::new(),
                perspective: String::new(),
                voice: voice(),
                knowledge: BTreeMap::new(),
            }],
            plot_points,
            personas: vec![],
        }
    }

    fn invariant_message(result: Result<(), DomainError>) -> String {
        match result.unwrap_err() {
            DomainError::InternalInvariant(msg) => msg,
            other => panic!("expected InternalInvariant, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_document_passes() {
        let doc = document(vec![plot_point("a", &["b"]), plot_point("b", &[])]);
        assert!(validate(&doc).is_ok());
    }

    #[test]
    fn test_dangling_target_is_rejected() {
        let doc = document(vec![plot_point("a", &["nowhere"])]);
        let msg = invariant_message(validate(&doc));
        assert!(msg.contains("targets missing plot point nowhere"));
    }

    #[test]
    fn test_unreachable_plot_point_is_rejected() {
        let doc = document(vec![plot_point("a", &[]), plot_point("island", &[])]);
        let msg = invariant_message(validate(&doc));
        assert!(msg.contains("plot point island is unreachable from a"));
    }

    #[test]
    fn test_missing_start_is_rejected() {
        let mut doc = document(vec![plot_point("a", &[])]);
        doc.start = "prologue".to_owned();
        let msg = invariant_message(validate(&doc));
        assert!(msg.contains("start plot point prologue does not exist"));
    }

    #[test]
    fn test_duplicate_choice_ids_are_rejected() {
        let mut b = plot_point("b", &["a"]);
        b.choices[0].id = "a-to-b".to_owned();
        let doc = document(vec![plot_point("a", &["b"]), b]);
        let msg = invariant_message(validate(&doc));
        assert!(msg.contains("duplicate choice id a-to-b"));
    }

    #[test]
    fn test_unknown_precondition_is_rejected() {
        let mut a = plot_point("a", &["b"]);
        a.choices[0].requires = vec!["never-offered".to_owned()];
        let doc = document(vec![a, plot_point("b", &[])]);
        let msg = invariant_message(validate(&doc));
        assert!(msg.contains("requires unknown choice never-offered"));
    }

    #[test]
    fn test_unknown_narrator_is_rejected() {
        let mut a = plot_point("a", &[]);
        a.narrator = "fedallah".to_owned();
        let doc = document(vec![a]);
        let msg = invariant_message(validate(&doc));
        assert!(msg.contains("narrated by unknown character fedallah"));
    }

    #[test]
    fn test_forgetting_along_an_edge_is_rejected() {
        let mut doc = document(vec![plot_point("a", &["b"]), plot_point("b", &[])]);
        doc.characters[0]
            .knowledge
            .insert("a".to_owned(), vec!["Ahab lost a leg.".to_owned()]);
        let msg = invariant_message(validate(&doc));
        assert!(msg.contains("character ishmael forgets"));
    }

    #[test]
    fn test_all_violations_are_reported_together() {
        let doc = document(vec![plot_point("a", &["nowhere"]), plot_point("island", &[])]);
        let msg = invariant_message(validate(&doc));
        assert!(msg.contains("nowhere"));
        assert!(msg.contains("island"));
    }
}
