//! Exact phrase matching over word positions.
//!
//! Starts from the postings of the first word and, for the word at offset
//! `i`, keeps only the start positions `p` where that word occurs at
//! `p + i` in the same document. Work is proportional to the postings
//! carried forward, never to the size of the corpus.

use crate::index::trie::Trie;
use crate::index::types::{Position, Postings};

/// Documents and phrase start positions where `phrase` occurs contiguously.
///
/// A one-word phrase is a plain lookup. An empty phrase, or one containing a
/// word that was never indexed, matches nothing.
pub fn match_phrase<S: AsRef<str>>(trie: &Trie, phrase: &[S]) -> Postings {
    let Some((first, rest)) = phrase.split_first() else {
        return Postings::new();
    };

    let mut starts = match trie.postings(first.as_ref()) {
        Some(postings) if !postings.is_empty() => postings.clone(),
        _ => return Postings::new(),
    };

    for (i, word) in rest.iter().enumerate() {
        let Some(next) = trie.postings(word.as_ref()) else {
            return Postings::new();
        };
        let offset = i as Position + 1;

        starts.retain(|doc_id, positions| {
            let Some(following) = next.get(doc_id) else {
                return false;
            };
            positions.retain(|&start| {
                start
                    .checked_add(offset)
                    .is_some_and(|expected| following.binary_search(&expected).is_ok())
            });
            !positions.is_empty()
        });

        if starts.is_empty() {
            break;
        }
    }

    starts
}
