use serde::{Deserialize, Serialize};

/// One entity mention as reported by the recognizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMention {
    pub text: String,
    #[serde(rename = "type")]
    pub label: String,
}

impl EntityMention {
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
        }
    }
}

/// A (subject, verb, object) relation. Raw triples carry subtree spans,
/// normalized ones carry node labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject: String,
    pub verb: String,
    pub object: String,
}

impl Triple {
    pub fn new(subject: impl Into<String>, verb: impl Into<String>, object: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            verb: verb.into(),
            object: object.into(),
        }
    }
}
