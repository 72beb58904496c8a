//! Utility functions and data structures.
//!
//! - [`app_data`] - Application data directory and persistent defaults
//! - [`encoding`] - Variable-length integer encoding (varint) for sessions
//! - [`progress`] - Progress bars, no-op without the `progress` feature
//! - [`tokenizer`] - Word splitting, punctuation stripping, case folding
//!
//! ```no_run
//! use simplesearch::index::SearchConfig;
//! use simplesearch::utils::tokenize_words;
//!
//! let words = tokenize_words("The cat (sat).", &SearchConfig::default());
//! // Returns: ["the", "cat", "sat"]
//! ```

pub mod app_data;
pub mod encoding;
pub mod progress;
pub mod tokenizer;

pub use app_data::*;
pub use encoding::*;
pub use tokenizer::*;
