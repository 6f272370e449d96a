//! Deterministic, rule-based perception generator.
//!
//! Output is a pure function of the request: the opener is drawn from an RNG
//! seeded with a digest of the event and the voice tone, so the same plot
//! point seen by the same character always reads the same way.

use async_trait::async_trait;
use playbook_core::rng::{DeterministicRng, SeededRng};
use sha2::{Digest, Sha256};

use super::generator::{GenerationError, PerceptionGenerator};
use super::perception::{GeneratedPerception, PerceptionRequest};

/// Renders perceptions from the structured voice profile alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedGenerator;

impl RuleBasedGenerator {
    /// Composes a perception for `request`, drawing the opener from `rng`.
    #[must_use]
    pub fn compose(request: &PerceptionRequest, rng: &mut dyn DeterministicRng) -> GeneratedPerception {
        let voice = &request.voice;
        let event = &request.event;

        let mut text = if event.witnessed {
            match pick_opener(&voice.openers, rng) {
                Some(opener) => format!("{opener} {}", event.summary),
                None => event.summary.clone(),
            }
        } else {
            voice.absent_template.replace("{location}", &event.location)
        };

        if !request.knowledge.is_empty() {
            let facts: Vec<&str> = request
                .knowledge
                .iter()
                .map(|fact| fact.trim_end_matches('.'))
                .collect();
            text.push_str(" I know this much: ");
            text.push_str(&facts.join("; "));
            text.push('.');
        }

        for rule in &voice.forbidden_phrases {
            text = replace_ignore_ascii_case(&text, &rule.phrase, &rule.replacement);
        }
        for phrase in &voice.required_phrases {
            if !contains_ignore_ascii_case(&text, phrase) {
                text.push(' ');
                text.push_str(phrase);
            }
        }

        let emotional_state = event
            .themes
            .iter()
            .find_map(|theme| voice.emotions.get(theme))
            .unwrap_or(&voice.default_emotion)
            .clone();

        GeneratedPerception {
            text,
            emotional_state,
        }
    }
}

#[async_trait]
impl PerceptionGenerator for RuleBasedGenerator {
    async fn generate(
        &self,
        request: &PerceptionRequest,
    ) -> Result<GeneratedPerception, GenerationError> {
        let mut rng = SeededRng::from_seed(seed_for(request));
        Ok(Self::compose(request, &mut rng))
    }
}

fn seed_for(request: &PerceptionRequest) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(request.event.location.as_bytes());
    hasher.update([0]);
    hasher.update(request.event.summary.as_bytes());
    hasher.update([0]);
    hasher.update(request.voice.tone.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

fn pick_opener<'a>(openers: &'a [String], rng: &mut dyn DeterministicRng) -> Option<&'a str> {
    let index = rng.pick_index(openers.len())?;
    openers.get(index).map(String::as_str)
}

fn contains_ignore_ascii_case(text: &str, phrase: &str) -> bool {
    text.to_ascii_lowercase()
        .contains(&phrase.to_ascii_lowercase())
}

// ASCII lowercasing keeps byte offsets, so match positions in the folded
// copy index straight into the original.
fn replace_ignore_ascii_case(text: &str, phrase: &str, replacement: &str) -> String {
    if phrase.is_empty() {
        return text.to_owned();
    }
    let haystack = text.to_ascii_lowercase();
    let needle = phrase.to_ascii_lowercase();
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    while let Some(found) = haystack[cursor..].find(&needle) {
        let start = cursor + found;
        out.push_str(&text[cursor..start]);
        out.push_str(replacement);
        cursor = start + needle.len();
    }
    out.push_str(&text[cursor..]);
    out
}
