pub mod parser;
pub mod phrase;
pub mod scorer;

pub use parser::{parse_query, Query, QueryUnit};
pub use phrase::match_phrase;
pub use scorer::{RankedDocument, Report, Scorer};
