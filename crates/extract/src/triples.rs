use crate::parse::{ParsedDocument, Sentence, TokenRef};
use crate::schema::Triple;

const SUBJECT_DEPS: &[&str] = &["nsubj", "nsubjpass"];
const OBJECT_DEPS: &[&str] = &["dobj", "attr", "obj", "oprd"];

/// Collect raw (subject, verb lemma, object) triples from one sentence.
///
/// Every VERB token is a pivot. Subjects are its left nominal subjects plus,
/// when the verb is itself a passive auxiliary, the `agent` children of its
/// head. Objects are its right direct objects/attributes and the `pobj` of
/// any right `prep` child. Each pivot yields the subject x object product.
pub fn extract_sentence(sentence: &Sentence<'_>) -> Vec<Triple> {
    let mut triples = Vec::new();

    for verb in sentence.tokens().filter(|t| t.pos() == "VERB") {
        let subjects = subjects_of(verb);
        if subjects.is_empty() {
            continue;
        }
        let objects = objects_of(verb);

        for subject in &subjects {
            for object in &objects {
                triples.push(Triple::new(subject.as_str(), verb.lemma(), object.as_str()));
            }
        }
    }

    triples
}

/// Triples for every sentence, in sentence order.
pub fn extract_document(doc: &ParsedDocument) -> Vec<Triple> {
    doc.sentences()
        .flat_map(|sentence| extract_sentence(&sentence))
        .collect()
}

fn subjects_of(verb: TokenRef<'_>) -> Vec<String> {
    let mut subjects: Vec<String> = verb
        .lefts()
        .filter(|t| SUBJECT_DEPS.contains(&t.dep()))
        .map(|t| t.subtree_text())
        .collect();

    // "X was done by Y": the auxiliary's head carries the agent.
    if verb.dep() == "auxpass" {
        subjects.extend(
            verb.head()
                .children()
                .filter(|t| t.dep() == "agent")
                .map(|t| t.subtree_text()),
        );
    }

    subjects
}

fn objects_of(verb: TokenRef<'_>) -> Vec<String> {
    let mut objects = Vec::new();

    for token in verb.rights() {
        if OBJECT_DEPS.contains(&token.dep()) {
            objects.push(token.subtree_text());
        } else if token.dep() == "prep" {
            objects.extend(
                token
                    .children()
                    .filter(|c| c.dep() == "pobj")
                    .map(|c| c.subtree_text()),
            );
        }
    }

    objects
}
