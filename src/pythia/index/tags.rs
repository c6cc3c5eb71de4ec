use super::SecondaryIndex;
use crate::model::{Answer, RecordId};
use std::collections::{BTreeSet, HashMap};

/// Maps each tag token to the answers carrying it.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TagIndex {
    postings: HashMap<String, Vec<RecordId>>,
    available: Vec<String>,
}

impl TagIndex {
    /// Ids of the answers tagged with `tag`, empty when the tag is unused.
    pub fn postings(&self, tag: &str) -> &[RecordId] {
        self.postings.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every tag in use, sorted and de-duplicated.
    pub fn available_tags(&self) -> &[String] {
        &self.available
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Ids of the answers carrying every whitespace separated tag in `query`.
    ///
    /// An empty query matches nothing. Tags absent from the index contribute no
    /// candidates, so any unknown tag empties the result.
    pub fn search(&self, query: &str) -> Vec<RecordId> {
        let wanted: BTreeSet<&str> = query.split_whitespace().collect();
        if wanted.is_empty() {
            return Vec::new();
        }

        let mut hits: HashMap<RecordId, usize> = HashMap::new();
        for tag in &wanted {
            for id in self.postings(tag) {
                *hits.entry(*id).or_default() += 1;
            }
        }

        let mut found: Vec<RecordId> = hits
            .into_iter()
            .filter(|(_, count)| *count == wanted.len())
            .map(|(id, _)| id)
            .collect();
        found.sort();
        found
    }
}

impl SecondaryIndex<Answer> for TagIndex {
    fn insert(&mut self, id: RecordId, answer: &Answer) {
        for tag in answer.tag_set() {
            let ids = self.postings.entry(tag.to_string()).or_default();
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }

    fn finish(&mut self) {
        self.available = self.postings.keys().cloned().collect();
        self.available.sort();
    }
}
