//! Read-only view over a dependency-parsed document.
//!
//! Tokens live in a flat arena; heads and children are indices into it.
//! The wire format is the JSON emitted by spaCy's `Doc.to_json()`, where
//! every `start`/`end` is a character offset into `text` and `head` is an
//! absolute token index (a root points at itself).

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::schema::EntityMention;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocJson {
    pub text: String,
    #[serde(default)]
    pub ents: Vec<EntJson>,
    #[serde(default)]
    pub sents: Vec<SentJson>,
    pub tokens: Vec<TokenJson>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntJson {
    pub start: usize,
    pub end: usize,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentJson {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenJson {
    pub id: usize,
    pub start: usize,
    pub end: usize,
    #[serde(default)]
    pub pos: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub dep: String,
    pub head: usize,
    #[serde(default)]
    pub lemma: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub lemma: String,
    pub pos: String,
    pub tag: String,
    pub dep: String,
    pub head: usize,
}

#[derive(Debug, Clone)]
pub struct ParsedDocument {
    text: String,
    tokens: Vec<Token>,
    children: Vec<Vec<usize>>,
    sentences: Vec<Range<usize>>,
    entities: Vec<EntityMention>,
}

impl ParsedDocument {
    /// Assemble a document from already-resolved tokens. Sentences are token
    /// index ranges; an empty list means one sentence spanning every token.
    pub fn from_parts(
        text: String,
        tokens: Vec<Token>,
        mut sentences: Vec<Range<usize>>,
        entities: Vec<EntityMention>,
    ) -> Result<Self> {
        let n = tokens.len();

        for (i, token) in tokens.iter().enumerate() {
            if token.head >= n {
                bail!("Token {} has head {} outside the document ({} tokens)", i, token.head, n);
            }
        }

        // Every head chain has to end in a root within n hops.
        for start in 0..n {
            let mut current = start;
            let mut hops = 0;
            while tokens[current].head != current {
                current = tokens[current].head;
                hops += 1;
                if hops > n {
                    bail!("Dependency cycle through token {}", start);
                }
            }
        }

        let mut children = vec![Vec::new(); n];
        for (i, token) in tokens.iter().enumerate() {
            if token.head != i {
                children[token.head].push(i);
            }
        }

        if sentences.is_empty() && n > 0 {
            sentences.push(0..n);
        }
        for sent in &sentences {
            if sent.start > sent.end || sent.end > n {
                bail!("Sentence range {:?} outside the document ({} tokens)", sent, n);
            }
        }

        Ok(Self {
            text,
            tokens,
            children,
            sentences,
            entities,
        })
    }

    /// Build from the parser's JSON payload.
    pub fn from_json(doc: DocJson) -> Result<Self> {
        let offsets = CharOffsets::new(&doc.text);

        let mut tokens = Vec::with_capacity(doc.tokens.len());
        for (i, tok) in doc.tokens.iter().enumerate() {
            if tok.id != i {
                bail!("Token ids must be sequential: expected {}, found {}", i, tok.id);
            }
            let text = offsets
                .slice(&doc.text, tok.start, tok.end)
                .with_context(|| format!("Token {} has invalid offsets", i))?
                .to_string();
            let lemma = match &tok.lemma {
                Some(lemma) if !lemma.is_empty() => lemma.clone(),
                _ => text.clone(),
            };
            tokens.push(Token {
                text,
                lemma,
                pos: tok.pos.clone(),
                tag: tok.tag.clone(),
                dep: tok.dep.clone(),
                head: tok.head,
            });
        }

        let sentences = doc
            .sents
            .iter()
            .map(|sent| {
                let first = doc.tokens.partition_point(|t| t.start < sent.start);
                let last = doc.tokens.partition_point(|t| t.start < sent.end);
                first..last.max(first)
            })
            .collect();

        let mut entities = Vec::with_capacity(doc.ents.len());
        for ent in &doc.ents {
            let text = offsets
                .slice(&doc.text, ent.start, ent.end)
                .with_context(|| format!("Entity {:?} has invalid offsets", ent.label))?;
            entities.push(EntityMention::new(text, ent.label.clone()));
        }

        Self::from_parts(doc.text, tokens, sentences, entities)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn token(&self, index: usize) -> TokenRef<'_> {
        assert!(index < self.tokens.len(), "token index {} out of range", index);
        TokenRef { doc: self, index }
    }

    pub fn sentences(&self) -> impl Iterator<Item = Sentence<'_>> {
        self.sentences.iter().map(move |range| Sentence {
            doc: self,
            range: range.clone(),
        })
    }

    pub fn entities(&self) -> &[EntityMention] {
        &self.entities
    }
}

/// A borrowed token handle; cheap to copy.
#[derive(Clone, Copy)]
pub struct TokenRef<'a> {
    doc: &'a ParsedDocument,
    index: usize,
}

impl<'a> TokenRef<'a> {
    pub fn index(self) -> usize {
        self.index
    }

    fn data(self) -> &'a Token {
        &self.doc.tokens[self.index]
    }

    pub fn text(self) -> &'a str {
        &self.data().text
    }

    pub fn lemma(self) -> &'a str {
        &self.data().lemma
    }

    pub fn pos(self) -> &'a str {
        &self.data().pos
    }

    pub fn dep(self) -> &'a str {
        &self.data().dep
    }

    pub fn head(self) -> TokenRef<'a> {
        TokenRef {
            doc: self.doc,
            index: self.data().head,
        }
    }

    pub fn children(self) -> impl Iterator<Item = TokenRef<'a>> {
        let doc = self.doc;
        doc.children[self.index]
            .iter()
            .map(move |&index| TokenRef { doc, index })
    }

    /// Children that precede this token.
    pub fn lefts(self) -> impl Iterator<Item = TokenRef<'a>> {
        let index = self.index;
        self.children().filter(move |child| child.index < index)
    }

    /// Children that follow this token.
    pub fn rights(self) -> impl Iterator<Item = TokenRef<'a>> {
        let index = self.index;
        self.children().filter(move |child| child.index > index)
    }

    /// This token and everything it dominates, left to right.
    pub fn subtree(self) -> Vec<TokenRef<'a>> {
        let mut indices = vec![self.index];
        let mut stack = vec![self.index];
        while let Some(current) = stack.pop() {
            for &child in &self.doc.children[current] {
                indices.push(child);
                stack.push(child);
            }
        }
        indices.sort_unstable();
        indices
            .into_iter()
            .map(|index| TokenRef { doc: self.doc, index })
            .collect()
    }

    pub fn subtree_text(self) -> String {
        self.subtree()
            .into_iter()
            .map(|t| t.text())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl std::fmt::Debug for TokenRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenRef")
            .field("index", &self.index)
            .field("text", &self.text())
            .field("dep", &self.dep())
            .finish()
    }
}

#[derive(Clone)]
pub struct Sentence<'a> {
    doc: &'a ParsedDocument,
    range: Range<usize>,
}

impl<'a> Sentence<'a> {
    pub fn tokens(&self) -> impl Iterator<Item = TokenRef<'a>> {
        let doc = self.doc;
        self.range.clone().map(move |index| TokenRef { doc, index })
    }

    pub fn text(&self) -> String {
        self.tokens().map(|t| t.text()).collect::<Vec<_>>().join(" ")
    }
}

/// Maps character offsets to byte offsets.
struct CharOffsets {
    bytes: Vec<usize>,
}

impl CharOffsets {
    fn new(text: &str) -> Self {
        let mut bytes: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        bytes.push(text.len());
        Self { bytes }
    }

    fn slice<'t>(&self, text: &'t str, start: usize, end: usize) -> Result<&'t str> {
        if start > end || end >= self.bytes.len() {
            bail!("offsets {}..{} outside text of {} chars", start, end, self.bytes.len() - 1);
        }
        Ok(&text[self.bytes[start]..self.bytes[end]])
    }
}

/// Builds documents token by token. Text is the tokens joined by single
/// spaces; heads are given relative to the start of the current sentence.
#[derive(Default)]
pub struct DocumentBuilder {
    tokens: Vec<Token>,
    sentences: Vec<Range<usize>>,
    entities: Vec<EntityMention>,
    sentence_start: usize,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(mut self, text: &str, lemma: &str, pos: &str, dep: &str, head: usize) -> Self {
        self.tokens.push(Token {
            text: text.to_string(),
            lemma: lemma.to_string(),
            pos: pos.to_string(),
            tag: String::new(),
            dep: dep.to_string(),
            head: self.sentence_start + head,
        });
        self
    }

    pub fn end_sentence(mut self) -> Self {
        let end = self.tokens.len();
        self.sentences.push(self.sentence_start..end);
        self.sentence_start = end;
        self
    }

    pub fn entity(mut self, text: &str, label: &str) -> Self {
        self.entities.push(EntityMention::new(text, label));
        self
    }

    pub fn build(mut self) -> Result<ParsedDocument> {
        if self.sentence_start < self.tokens.len() {
            self = self.end_sentence();
        }
        let text = self
            .tokens
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        ParsedDocument::from_parts(text, self.tokens, self.sentences, self.entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn acme_json() -> DocJson {
        serde_json::from_value(json!({
            "text": "Acme Corp built it. Café opened.",
            "ents": [{"start": 0, "end": 9, "label": "ORG"}],
            "sents": [{"start": 0, "end": 19}, {"start": 20, "end": 32}],
            "tokens": [
                {"id": 0, "start": 0, "end": 4, "pos": "PROPN", "tag": "NNP", "dep": "compound", "head": 1, "lemma": "Acme"},
                {"id": 1, "start": 5, "end": 9, "pos": "PROPN", "tag": "NNP", "dep": "nsubj", "head": 2, "lemma": "Corp"},
                {"id": 2, "start": 10, "end": 15, "pos": "VERB", "tag": "VBD", "dep": "ROOT", "head": 2, "lemma": "build"},
                {"id": 3, "start": 16, "end": 18, "pos": "PRON", "tag": "PRP", "dep": "dobj", "head": 2, "lemma": "it"},
                {"id": 4, "start": 18, "end": 19, "pos": "PUNCT", "tag": ".", "dep": "punct", "head": 2},
                {"id": 5, "start": 20, "end": 24, "pos": "PROPN", "tag": "NNP", "dep": "nsubj", "head": 6, "lemma": "Café"},
                {"id": 6, "start": 25, "end": 31, "pos": "VERB", "tag": "VBD", "dep": "ROOT", "head": 6, "lemma": "open"},
                {"id": 7, "start": 31, "end": 32, "pos": "PUNCT", "tag": ".", "dep": "punct", "head": 6}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_from_json_resolves_text_and_sentences() {
        let doc = ParsedDocument::from_json(acme_json()).unwrap();

        assert_eq!(doc.len(), 8);
        assert_eq!(doc.entities(), &[EntityMention::new("Acme Corp", "ORG")]);

        let sentences: Vec<String> = doc.sentences().map(|s| s.text()).collect();
        assert_eq!(sentences, vec!["Acme Corp built it .", "Café opened ."]);

        // Multi-byte characters are addressed by char offset.
        assert_eq!(doc.token(6).text(), "opened");
        assert_eq!(doc.token(4).lemma(), ".");
    }

    #[test]
    fn test_token_navigation() {
        let doc = ParsedDocument::from_json(acme_json()).unwrap();
        let verb = doc.token(2);

        let lefts: Vec<&str> = verb.lefts().map(|t| t.text()).collect();
        let rights: Vec<&str> = verb.rights().map(|t| t.text()).collect();
        assert_eq!(lefts, vec!["Corp"]);
        assert_eq!(rights, vec!["it", "."]);

        assert_eq!(doc.token(1).subtree_text(), "Acme Corp");
        assert_eq!(doc.token(0).head().text(), "Corp");
        assert_eq!(verb.head().index(), 2);
    }

    #[test]
    fn test_missing_sents_means_single_sentence() {
        let mut json = acme_json();
        json.sents.clear();
        let doc = ParsedDocument::from_json(json).unwrap();
        assert_eq!(doc.sentences().count(), 1);
    }

    #[test]
    fn test_rejects_out_of_range_head() {
        let result = DocumentBuilder::new()
            .token("runs", "run", "VERB", "ROOT", 3)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_cycles() {
        let result = DocumentBuilder::new()
            .token("a", "a", "NOUN", "dep", 1)
            .token("b", "b", "NOUN", "dep", 0)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_bad_offsets() {
        let mut json = acme_json();
        json.tokens[0].end = 400;
        assert!(ParsedDocument::from_json(json).is_err());
    }

    #[test]
    fn test_builder_heads_are_sentence_relative() {
        let doc = DocumentBuilder::new()
            .token("Bob", "Bob", "PROPN", "nsubj", 1)
            .token("ran", "run", "VERB", "ROOT", 1)
            .end_sentence()
            .token("Ann", "Ann", "PROPN", "nsubj", 1)
            .token("sat", "sit", "VERB", "ROOT", 1)
            .build()
            .unwrap();

        assert_eq!(doc.text(), "Bob ran Ann sat");
        assert_eq!(doc.token(2).head().text(), "sat");
        assert_eq!(doc.sentences().count(), 2);
    }
}
