pub mod build;
pub mod corpus;
pub mod snapshot;
pub mod stats;
pub mod trie;
pub mod types;

pub use build::{build_index, build_index_with_threads, verify_round_trip, VerifyReport};
pub use corpus::SearchIndex;
pub use trie::{Symbol, Trie, TrieNode};
pub use types::*;
