//! # simplesearch - word and phrase search over a directory of text files
//!
//! Every word of every document is stored in a character trie. The leaf under
//! each word records, per document, the positions where the word occurs, so
//! a single walk answers a word query and adjacent positions answer a phrase
//! query.
//!
//! ## Architecture
//!
//! - [`index`] - Trie, document table, directory builder, session format
//! - [`query`] - Query parsing, phrase matching, scoring and ranking
//! - [`session`] - An index with its score counters, saved and loaded as one file
//! - [`repl`] - Interactive line shell
//! - [`output`] - Report formatting
//! - [`utils`] - Tokenizer, varint encoding, app config, progress bars
//!
//! ## Quick Start
//!
//! ```no_run
//! use simplesearch::index::{build_index, SearchConfig};
//! use simplesearch::session::SearchSession;
//! use std::path::Path;
//!
//! let index = build_index(Path::new("/path/to/texts"), SearchConfig::default(), true).unwrap();
//! let mut session = SearchSession::new(index);
//!
//! for entry in session.search_str("quick fox").entries() {
//!     println!("{}: {:.2}%", entry.name, entry.percentage);
//! }
//! ```
//!
//! ## Scoring
//!
//! A query is a list of units, each a single word or a phrase. A document
//! scores one point per unit it contains, and reports give that score as a
//! percentage of the number of units in the query.

pub mod error;
pub mod index;
pub mod output;
pub mod query;
pub mod repl;
pub mod session;
pub mod utils;

pub use error::{Result, SearchError};
pub use session::SearchSession;
