use std::collections::HashMap;

use crate::schema::EntityMention;

/// Surface text -> entity type, iterated in first-insertion order.
///
/// Re-inserting a known surface text replaces its type but keeps its
/// position, so lookups that scan the index stay deterministic.
#[derive(Debug, Clone, Default)]
pub struct EntityIndex {
    entries: Vec<(String, String)>,
    positions: HashMap<String, usize>,
}

impl EntityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_mentions<'m>(mentions: impl IntoIterator<Item = &'m EntityMention>) -> Self {
        let mut index = Self::new();
        for mention in mentions {
            index.insert(&mention.text, &mention.label);
        }
        index
    }

    pub fn insert(&mut self, text: &str, label: &str) {
        match self.positions.get(text) {
            Some(&pos) => self.entries[pos].1 = label.to_string(),
            None => {
                self.positions.insert(text.to_string(), self.entries.len());
                self.entries.push((text.to_string(), label.to_string()));
            }
        }
    }

    pub fn get(&self, text: &str) -> Option<&str> {
        self.positions
            .get(text)
            .map(|&pos| self.entries[pos].1.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(t, l)| (t.as_str(), l.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
