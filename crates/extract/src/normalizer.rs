use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::entities::EntityIndex;

/// Characters stripped from both ends of a span that matched no entity.
const STRIP_CHARS: &[char] = &[
    ',', '.', '!', '?', ';', ':', '\'', '"', '(', ')', '[', ']', '{', '}',
];

/// How strictly a span has to overlap an entity's surface text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrictness {
    /// Literal substring containment, no word boundaries.
    #[default]
    Substring,
    /// Containment only counts when the contained text sits on word boundaries.
    WordBoundary,
}

/// Maps raw subject/object spans onto node labels.
///
/// A span that overlaps a known entity (the span inside the entity text, or
/// the entity text inside the span) collapses to the entity's full surface
/// text; the first entity in index order wins. This is a heuristic: short
/// entity names can match inside unrelated words under `Substring`.
pub struct EntityNormalizer<'a> {
    index: &'a EntityIndex,
    /// One boundary pattern per index entry when matching on word boundaries.
    patterns: Option<Vec<Option<Regex>>>,
}

impl<'a> EntityNormalizer<'a> {
    pub fn new(index: &'a EntityIndex) -> Self {
        Self {
            index,
            patterns: None,
        }
    }

    pub fn with_strictness(index: &'a EntityIndex, strictness: MatchStrictness) -> Result<Self> {
        let patterns = match strictness {
            MatchStrictness::Substring => None,
            MatchStrictness::WordBoundary => Some(
                index
                    .iter()
                    .map(|(text, _)| boundary_pattern(text))
                    .collect::<Result<Vec<_>>>()?,
            ),
        };
        Ok(Self { index, patterns })
    }

    /// Canonical label for a span. An empty result means the span carries
    /// nothing usable and its triple should be dropped.
    pub fn normalize(&self, span: &str) -> String {
        match self.find_entity(span) {
            Some(entity) => entity.to_string(),
            None => clean_span(span),
        }
    }

    fn find_entity(&self, span: &str) -> Option<&'a str> {
        if span.trim().is_empty() {
            return None;
        }

        match &self.patterns {
            None => self
                .index
                .iter()
                .map(|(text, _)| text)
                .find(|text| !text.is_empty() && (text.contains(span) || span.contains(text))),
            Some(patterns) => {
                let span_pattern = boundary_pattern(span).ok().flatten()?;
                self.index
                    .iter()
                    .zip(patterns)
                    .find(|((text, _), pattern)| {
                        span_pattern.is_match(text)
                            || pattern.iter().any(|p| p.is_match(span))
                    })
                    .map(|((text, _), _)| text)
            }
        }
    }
}

/// `text` delimited by start/end of input or a non-word character.
fn boundary_pattern(text: &str) -> Result<Option<Regex>> {
    if text.is_empty() {
        return Ok(None);
    }
    let pattern = format!(r"(?:^|\W){}(?:$|\W)", regex::escape(text));
    Regex::new(&pattern)
        .map(Some)
        .with_context(|| format!("Failed to build entity pattern for {:?}", text))
}

/// Trim whitespace, strip surrounding punctuation and flatten newlines.
pub fn clean_span(span: &str) -> String {
    span.trim().trim_matches(STRIP_CHARS).replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::EntityMention;

    fn index(entries: &[(&str, &str)]) -> EntityIndex {
        let mentions: Vec<EntityMention> = entries
            .iter()
            .map(|(t, l)| EntityMention::new(*t, *l))
            .collect();
        EntityIndex::from_mentions(&mentions)
    }

    #[test]
    fn test_span_containing_entity_collapses_to_entity() {
        let index = index(&[("Acme Corp", "ORG")]);
        let normalizer = EntityNormalizer::new(&index);

        assert_eq!(
            normalizer.normalize("the leading tech company Acme Corp today"),
            "Acme Corp"
        );
    }

    #[test]
    fn test_span_inside_entity_expands_to_entity() {
        let index = index(&[("Acme Corp", "ORG")]);
        let normalizer = EntityNormalizer::new(&index);

        assert_eq!(normalizer.normalize("Acme"), "Acme Corp");
        // Containment is case-sensitive.
        assert_eq!(normalizer.normalize("acme"), "acme");
    }

    #[test]
    fn test_first_entity_in_index_order_wins() {
        let index = index(&[("Acme Labs", "ORG"), ("Acme Corp", "ORG")]);
        let normalizer = EntityNormalizer::new(&index);

        assert_eq!(normalizer.normalize("Acme"), "Acme Labs");
    }

    #[test]
    fn test_unmatched_span_is_cleaned() {
        let index = index(&[("Acme Corp", "ORG")]);
        let normalizer = EntityNormalizer::new(&index);

        assert_eq!(normalizer.normalize("  \"a new vaccine.\" "), "a new vaccine");
        assert_eq!(normalizer.normalize("(results\nfrom trials)"), "results from trials");
    }

    #[test]
    fn test_punctuation_only_span_is_empty() {
        let index = index(&[("Acme Corp", "ORG")]);
        let normalizer = EntityNormalizer::new(&index);

        assert_eq!(normalizer.normalize("...,,;"), "");
        assert_eq!(normalizer.normalize("   "), "");
    }

    #[test]
    fn test_substring_matching_ignores_word_boundaries() {
        let index = index(&[("US", "GPE")]);
        let normalizer = EntityNormalizer::new(&index);

        assert_eq!(normalizer.normalize("USB cables"), "US");
    }

    #[test]
    fn test_word_boundary_matching() {
        let index = index(&[("US", "GPE"), ("Acme Corp", "ORG")]);
        let normalizer =
            EntityNormalizer::with_strictness(&index, MatchStrictness::WordBoundary).unwrap();

        assert_eq!(normalizer.normalize("USB cables"), "USB cables");
        assert_eq!(normalizer.normalize("the US government"), "US");
        assert_eq!(normalizer.normalize("Acme"), "Acme Corp");
        assert_eq!(normalizer.normalize("Acm"), "Acm");
    }

    #[test]
    fn test_clean_span_strips_only_the_ends() {
        assert_eq!(clean_span("Smith, Jones and Co."), "Smith, Jones and Co");
        assert_eq!(clean_span("[draft]"), "draft");
    }
}
