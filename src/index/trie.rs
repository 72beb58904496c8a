//! Character-keyed prefix tree holding the word postings.
//!
//! Every word is stored as its characters followed by a single [`Symbol::End`]
//! sentinel, so "cat" and "catalog" end on different leaves even though they
//! share the `c-a-t` path. Only `End` nodes carry postings.
//!
//! Nodes live in an arena (`Vec<TrieNode>`) and refer to their children by
//! index. The root is always node 0. Nodes are never removed.

use crate::error::{Result, SearchError};
use crate::index::types::{DocId, Position, Postings};

/// Index of a node in the trie arena
pub type NodeId = u32;

/// The root node is always the first node in the arena
pub const ROOT: NodeId = 0;

/// Highest position a word may be recorded at, so a document's word count still fits a `u32`
pub const MAX_POSITION: Position = Position::MAX - 1;

/// Edge label of a trie node
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    Root,
    Char(char),
    /// End-of-word sentinel
    End,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrieNode {
    pub(crate) symbol: Symbol,
    /// Sorted by symbol, at most one entry per symbol
    pub(crate) children: Vec<(Symbol, NodeId)>,
    /// Present exactly on `End` nodes
    pub(crate) postings: Option<Postings>,
}

impl TrieNode {
    pub(crate) fn new(symbol: Symbol) -> Self {
        let postings = (symbol == Symbol::End).then(Postings::new);
        Self {
            symbol,
            children: Vec::new(),
            postings,
        }
    }

    pub fn symbol(&self) -> Symbol {
        self.symbol
    }

    pub fn is_leaf(&self) -> bool {
        self.symbol == Symbol::End
    }

    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children.iter().map(|&(_, id)| id)
    }

    pub fn postings(&self) -> Option<&Postings> {
        self.postings.as_ref()
    }
}

/// Prefix tree of all indexed words
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trie {
    nodes: Vec<TrieNode>,
    end_indicator: char,
}

impl Trie {
    pub fn new(end_indicator: char) -> Self {
        Self {
            nodes: vec![TrieNode::new(Symbol::Root)],
            end_indicator,
        }
    }

    /// Rebuild a trie from an arena whose structure was already checked
    pub(crate) fn from_nodes(nodes: Vec<TrieNode>, end_indicator: char) -> Self {
        debug_assert!(nodes.first().is_some_and(|n| n.symbol == Symbol::Root));
        Self {
            nodes,
            end_indicator,
        }
    }

    pub fn end_indicator(&self) -> char {
        self.end_indicator
    }

    pub fn node(&self, id: NodeId) -> &TrieNode {
        &self.nodes[id as usize]
    }

    /// True when no word has been inserted
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of distinct words (sentinel leaves)
    pub fn word_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    fn child(&self, node: NodeId, symbol: Symbol) -> Option<NodeId> {
        let children = &self.nodes[node as usize].children;
        children
            .binary_search_by_key(&symbol, |&(s, _)| s)
            .ok()
            .map(|i| children[i].1)
    }

    /// Record that `word` occurs in `doc_id` at `position`.
    ///
    /// Fails without touching the tree if `word` contains the end indicator,
    /// if `position` is past [`MAX_POSITION`], if the arena could overflow
    /// [`NodeId`], or if `position` is lower than the last position recorded
    /// for the word in that document.
    pub fn insert(&mut self, word: &str, doc_id: DocId, position: Position) -> Result<()> {
        if word.contains(self.end_indicator) {
            return Err(SearchError::SentinelCollision {
                word: word.to_string(),
                end_indicator: self.end_indicator,
            });
        }
        if position > MAX_POSITION {
            return Err(SearchError::PositionOutOfRange {
                word: word.to_string(),
                position,
            });
        }
        // Worst case the whole word plus its end node is new
        let limit = NodeId::MAX as usize;
        if self.nodes.len() + word.chars().count() + 1 > limit {
            return Err(SearchError::TrieFull { limit });
        }

        let mut symbols = word.chars().map(Symbol::Char).chain(std::iter::once(Symbol::End));
        let mut node = ROOT;
        while let Some(symbol) = symbols.next() {
            match self.child(node, symbol) {
                Some(child) => node = child,
                None => {
                    node = self.grow_twig(node, std::iter::once(symbol).chain(&mut symbols));
                    break;
                }
            }
        }

        let positions = self.nodes[node as usize]
            .postings
            .get_or_insert_with(Postings::new)
            .entry(doc_id)
            .or_default();
        // A freshly grown twig has no positions yet, so nothing was mutated above on failure
        if let Some(&last) = positions.last() {
            if position < last {
                return Err(SearchError::PositionOutOfOrder {
                    word: word.to_string(),
                    position,
                    last,
                });
            }
        }
        positions.push(position);
        Ok(())
    }

    /// Hang a chain of single-child nodes spelling `symbols` below `from`.
    /// Returns the last node created.
    fn grow_twig(&mut self, from: NodeId, symbols: impl Iterator<Item = Symbol>) -> NodeId {
        let mut current = from;
        for symbol in symbols {
            debug_assert!(self.nodes.len() < NodeId::MAX as usize);
            let id = self.nodes.len() as NodeId;
            self.nodes.push(TrieNode::new(symbol));

            let children = &mut self.nodes[current as usize].children;
            let slot = children
                .binary_search_by_key(&symbol, |&(s, _)| s)
                .unwrap_or_else(|i| i);
            children.insert(slot, (symbol, id));
            current = id;
        }
        current
    }

    /// Borrow the postings of `word`, if it was ever inserted
    pub fn postings(&self, word: &str) -> Option<&Postings> {
        let mut node = ROOT;
        for ch in word.chars() {
            node = self.child(node, Symbol::Char(ch))?;
        }
        let leaf = self.child(node, Symbol::End)?;
        self.nodes[leaf as usize].postings.as_ref()
    }

    /// Documents and positions where `word` occurs.
    ///
    /// Returns an owned copy; an unknown word yields an empty map.
    pub fn lookup(&self, word: &str) -> Postings {
        self.postings(word).cloned().unwrap_or_default()
    }

    /// Every stored word with its postings, depth first
    pub fn words(&self) -> Vec<(String, &Postings)> {
        let mut words = Vec::new();
        let mut stack = vec![(ROOT, String::new())];

        while let Some((id, prefix)) = stack.pop() {
            let node = &self.nodes[id as usize];
            for &(symbol, child) in node.children.iter().rev() {
                match symbol {
                    Symbol::Char(ch) => {
                        let mut word = prefix.clone();
                        word.push(ch);
                        stack.push((child, word));
                    }
                    Symbol::End => {
                        if let Some(postings) = &self.nodes[child as usize].postings {
                            words.push((prefix.clone(), postings));
                        }
                    }
                    Symbol::Root => {}
                }
            }
        }

        words
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Trie {
        let mut trie = Trie::new('$');
        for (pos, word) in ["the", "cat", "sat", "on", "the", "catalog"].iter().enumerate() {
            trie.insert(word, 0, pos as Position).unwrap();
        }
        trie.insert("the", 1, 0).unwrap();
        trie.insert("dog", 1, 1).unwrap();
        trie
    }

    #[test]
    fn test_lookup_positions() {
        let trie = sample();
        let the = trie.lookup("the");
        assert_eq!(the.get(&0), Some(&vec![0, 4]));
        assert_eq!(the.get(&1), Some(&vec![0]));
        assert_eq!(trie.lookup("dog").keys().copied().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_prefix_is_not_a_match() {
        let trie = sample();
        assert_eq!(trie.lookup("cat").get(&0), Some(&vec![1]));
        assert_eq!(trie.lookup("catalog").get(&0), Some(&vec![5]));
        assert!(trie.lookup("ca").is_empty());
        assert!(trie.lookup("cats").is_empty());
        assert!(trie.lookup("").is_empty());
    }

    #[test]
    fn test_shared_prefix_nodes() {
        let mut trie = Trie::new('$');
        trie.insert("cat", 0, 0).unwrap();
        // root + c + a + t + $
        assert_eq!(trie.node_count(), 5);
        trie.insert("catalog", 0, 1).unwrap();
        // shares c-a-t, adds a-l-o-g-$
        assert_eq!(trie.node_count(), 10);
        trie.insert("cat", 1, 0).unwrap();
        assert_eq!(trie.node_count(), 10);
        assert_eq!(trie.word_count(), 2);
    }

    #[test]
    fn test_repeated_positions_are_kept() {
        let mut trie = Trie::new('$');
        trie.insert("la", 0, 0).unwrap();
        trie.insert("la", 0, 1).unwrap();
        trie.insert("la", 0, 2).unwrap();
        assert_eq!(trie.lookup("la").get(&0), Some(&vec![0, 1, 2]));
    }

    #[test]
    fn test_sentinel_collision_leaves_tree_intact() {
        let mut trie = sample();
        let before = trie.clone();

        let err = trie.insert("co$t", 0, 9).unwrap_err();
        assert!(matches!(err, SearchError::SentinelCollision { end_indicator: '$', .. }));
        assert!(trie.insert("$", 0, 9).is_err());

        assert_eq!(trie, before);
        assert_eq!(trie.lookup("cat").get(&0), Some(&vec![1]));
    }

    #[test]
    fn test_positions_must_not_go_backwards() {
        let mut trie = Trie::new('$');
        trie.insert("cat", 0, 5).unwrap();
        let err = trie.insert("cat", 0, 2).unwrap_err();
        assert!(matches!(err, SearchError::PositionOutOfOrder { position: 2, last: 5, .. }));
        // Other documents have their own sequence
        trie.insert("cat", 1, 0).unwrap();
        assert_eq!(trie.lookup("cat").get(&0), Some(&vec![5]));
    }

    #[test]
    fn test_last_position_is_rejected() {
        let mut trie = sample();
        let before = trie.clone();

        let err = trie.insert("zebra", 2, Position::MAX).unwrap_err();
        assert!(matches!(err, SearchError::PositionOutOfRange { position: Position::MAX, .. }));
        assert_eq!(trie, before);

        trie.insert("zebra", 2, MAX_POSITION).unwrap();
        assert_eq!(trie.lookup("zebra").get(&2), Some(&vec![MAX_POSITION]));
    }

    #[test]
    fn test_custom_sentinel() {
        let mut trie = Trie::new('#');
        trie.insert("us$", 0, 0).unwrap();
        assert_eq!(trie.lookup("us$").get(&0), Some(&vec![0]));
        assert!(trie.insert("c#", 0, 1).is_err());
    }

    #[test]
    fn test_lookup_returns_copy() {
        let trie = sample();
        let mut copy = trie.lookup("the");
        copy.get_mut(&0).unwrap().push(99);
        copy.remove(&1);
        assert_eq!(trie.lookup("the").get(&0), Some(&vec![0, 4]));
        assert!(trie.lookup("the").contains_key(&1));
    }

    #[test]
    fn test_words_lists_every_leaf() {
        let trie = sample();
        let mut words: Vec<String> = trie.words().into_iter().map(|(w, _)| w).collect();
        words.sort();
        assert_eq!(words, vec!["cat", "catalog", "dog", "on", "sat", "the"]);
    }

    #[test]
    fn test_children_stay_sorted() {
        let mut trie = Trie::new('$');
        for (pos, word) in ["b", "a", "c", "ab"].iter().enumerate() {
            trie.insert(word, 0, pos as Position).unwrap();
        }
        let root = trie.node(ROOT);
        let symbols: Vec<Symbol> = root.children().map(|id| trie.node(id).symbol()).collect();
        assert_eq!(
            symbols,
            vec![Symbol::Char('a'), Symbol::Char('b'), Symbol::Char('c')]
        );
        assert!(trie.node(ROOT).postings().is_none());
    }

    #[test]
    fn test_empty_trie() {
        let trie = Trie::new('$');
        assert!(trie.is_empty());
        assert!(trie.lookup("anything").is_empty());
        assert!(trie.words().is_empty());
    }
}
