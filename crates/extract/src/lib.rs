pub mod entities;
pub mod normalizer;
pub mod parse;
pub mod parser;
pub mod schema;
pub mod triples;

pub use entities::EntityIndex;
pub use normalizer::{EntityNormalizer, MatchStrictness, clean_span};
pub use parse::{DocJson, DocumentBuilder, ParsedDocument, Sentence, Token, TokenRef};
pub use parser::{DependencyParser, SpacyClient};
pub use schema::{EntityMention, Triple};

use anyhow::{Context, Result};
use std::sync::Arc;

/// Everything the graph needs from one document.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Mentions in document order, duplicates included.
    pub entities: Vec<EntityMention>,
    pub index: EntityIndex,
    /// Normalized relations; both ends are non-empty.
    pub relations: Vec<Triple>,
}

pub struct Extractor {
    parser: Arc<dyn DependencyParser>,
    strictness: MatchStrictness,
}

impl Extractor {
    pub fn new(parser: Arc<dyn DependencyParser>, strictness: MatchStrictness) -> Self {
        Self { parser, strictness }
    }

    pub fn parser(&self) -> &Arc<dyn DependencyParser> {
        &self.parser
    }

    /// Parse text and extract its normalized relations.
    pub async fn extract_from_text(&self, text: &str) -> Result<ExtractionResult> {
        let doc = self
            .parser
            .parse(text)
            .await
            .context("Failed to parse document")?;

        extract_document(&doc, self.strictness)
    }
}

/// Run triple extraction over every sentence and normalize each end
/// against the document's entities. Triples with an empty end are dropped.
pub fn extract_document(doc: &ParsedDocument, strictness: MatchStrictness) -> Result<ExtractionResult> {
    let entities = doc.entities().to_vec();
    let index = EntityIndex::from_mentions(&entities);

    let relations = {
        let normalizer = EntityNormalizer::with_strictness(&index, strictness)?;
        let mut relations = Vec::new();
        let mut dropped = 0usize;

        for raw in triples::extract_document(doc) {
            let subject = normalizer.normalize(&raw.subject);
            let object = normalizer.normalize(&raw.object);

            if subject.is_empty() || object.is_empty() {
                dropped += 1;
                continue;
            }
            relations.push(Triple::new(subject, raw.verb, object));
        }

        tracing::debug!(
            chars = doc.text().chars().count(),
            entities = entities.len(),
            relations = relations.len(),
            dropped,
            "Extracted relations"
        );
        relations
    };

    Ok(ExtractionResult {
        entities,
        index,
        relations,
    })
}
