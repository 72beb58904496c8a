use crate::error::{Result, SearchError};
use crate::index::trie::Trie;
use crate::index::types::{DocId, Document, Position, Postings, SearchConfig};
use crate::query::parser::QueryUnit;
use crate::query::phrase::match_phrase;
use crate::utils::Token;
use std::collections::HashMap;

/// In-memory word index over a fixed set of documents.
///
/// Owns the configuration it was built with, the canonical document list
/// (document ids are positions in that list) and the trie of postings.
/// Only ingestion mutates it; every query method takes `&self`.
#[derive(Debug, Clone)]
pub struct SearchIndex {
    config: SearchConfig,
    documents: Vec<Document>,
    doc_ids: HashMap<String, DocId>,
    trie: Trie,
}

impl SearchIndex {
    /// Create an empty index
    pub fn new(config: SearchConfig) -> Result<Self> {
        config.validate()?;
        let trie = Trie::new(config.end_indicator);
        Ok(Self {
            config,
            documents: Vec::new(),
            doc_ids: HashMap::new(),
            trie,
        })
    }

    /// Reassemble an index from restored parts
    pub(crate) fn from_parts(
        config: SearchConfig,
        documents: Vec<Document>,
        trie: Trie,
    ) -> Result<Self> {
        let mut doc_ids = HashMap::with_capacity(documents.len());
        for doc in &documents {
            if doc_ids.insert(doc.name.clone(), doc.doc_id).is_some() {
                return Err(SearchError::CorruptSession(format!(
                    "document {:?} listed twice",
                    doc.name
                )));
            }
        }
        Ok(Self {
            config,
            documents,
            doc_ids,
            trie,
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn trie(&self) -> &Trie {
        &self.trie
    }

    /// Documents in canonical enumeration order (ascending id)
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn document(&self, doc_id: DocId) -> Option<&Document> {
        self.documents.get(doc_id as usize)
    }

    pub fn doc_id(&self, name: &str) -> Option<DocId> {
        self.doc_ids.get(name).copied()
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Register a document, returning its id. Registering a known name is a no-op.
    pub fn add_document(&mut self, name: &str) -> DocId {
        if let Some(&id) = self.doc_ids.get(name) {
            return id;
        }
        let doc_id = self.documents.len() as DocId;
        self.documents.push(Document {
            doc_id,
            name: name.to_string(),
            word_count: 0,
        });
        self.doc_ids.insert(name.to_string(), doc_id);
        doc_id
    }

    /// Ingest one `(word, document, position)` triple
    pub fn insert(&mut self, word: &str, document: &str, position: Position) -> Result<()> {
        let doc_id = self
            .doc_id(document)
            .unwrap_or(self.documents.len() as DocId);
        // The trie rejects sentinel collisions before anything is recorded
        self.trie.insert(word, doc_id, position)?;
        let doc_id = self.add_document(document);
        self.bump_word_count(doc_id, position);
        Ok(())
    }

    /// Ingest a tokenized document that was already registered
    pub fn insert_tokens(&mut self, doc_id: DocId, tokens: &[Token]) -> Result<()> {
        for token in tokens {
            self.trie.insert(&token.word, doc_id, token.position)?;
            self.bump_word_count(doc_id, token.position);
        }
        Ok(())
    }

    fn bump_word_count(&mut self, doc_id: DocId, position: Position) {
        if let Some(doc) = self.documents.get_mut(doc_id as usize) {
            doc.word_count = doc.word_count.max(position.saturating_add(1));
        }
    }

    /// Documents and positions where `word` occurs
    pub fn lookup(&self, word: &str) -> Postings {
        self.trie.lookup(word)
    }

    /// Documents and start positions where `phrase` occurs contiguously
    pub fn match_phrase<S: AsRef<str>>(&self, phrase: &[S]) -> Postings {
        match_phrase(&self.trie, phrase)
    }

    /// Resolve a query unit to the documents containing it
    pub fn resolve(&self, unit: &QueryUnit) -> Postings {
        match unit {
            QueryUnit::Word(word) => self.lookup(word),
            QueryUnit::Phrase(words) => self.match_phrase(words),
        }
    }

    /// Rebuild every document's word sequence from the trie leaves, indexed by doc id
    pub fn reconstruct_documents(&self) -> Vec<Vec<String>> {
        let mut placed: Vec<Vec<(Position, &str)>> = vec![Vec::new(); self.documents.len()];
        let words = self.trie.words();
        for (word, postings) in &words {
            for (&doc_id, positions) in postings.iter() {
                if let Some(slots) = placed.get_mut(doc_id as usize) {
                    slots.extend(positions.iter().map(|&p| (p, word.as_str())));
                }
            }
        }

        placed
            .into_iter()
            .map(|mut slots| {
                slots.sort_by_key(|&(p, _)| p);
                slots.into_iter().map(|(_, w)| w.to_string()).collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> SearchIndex {
        let mut index = SearchIndex::new(SearchConfig::default()).unwrap();
        for (doc, text) in [("a.txt", "the cat sat"), ("b.txt", "the dog sat")] {
            for (pos, word) in text.split_whitespace().enumerate() {
                index.insert(word, doc, pos as Position).unwrap();
            }
        }
        index
    }

    #[test]
    fn test_documents_registered_in_order() {
        let index = index();
        let names: Vec<&str> = index.documents().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
        assert_eq!(index.doc_id("b.txt"), Some(1));
        assert_eq!(index.document(0).unwrap().word_count, 3);
    }

    #[test]
    fn test_sentinel_collision_registers_nothing() {
        let mut index = index();
        assert!(index.insert("pri$e", "c.txt", 0).is_err());
        assert_eq!(index.document_count(), 2);
        assert_eq!(index.doc_id("c.txt"), None);
        assert_eq!(index.lookup("sat").len(), 2);
    }

    #[test]
    fn test_resolve_units() {
        let index = index();
        let cat = index.resolve(&QueryUnit::Word("cat".to_string()));
        assert_eq!(cat.keys().copied().collect::<Vec<_>>(), vec![0]);

        let phrase = QueryUnit::Phrase(vec!["dog".to_string(), "sat".to_string()]);
        assert_eq!(index.resolve(&phrase).get(&1), Some(&vec![1]));
    }

    #[test]
    fn test_reconstruct_documents() {
        let index = index();
        let docs = index.reconstruct_documents();
        assert_eq!(docs[0], vec!["the", "cat", "sat"]);
        assert_eq!(docs[1], vec!["the", "dog", "sat"]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SearchConfig {
            maximum_report: 0,
            ..SearchConfig::default()
        };
        assert!(SearchIndex::new(config).is_err());
    }
}
