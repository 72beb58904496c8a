#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use simplesearch::index::SearchConfig;
use simplesearch::query::parse_query;

#[derive(Arbitrary, Debug)]
struct Input<'a> {
    query: &'a str,
    case_sensitive: bool,
    ignore_punctuation: bool,
}

fuzz_target!(|input: Input| {
    let config = SearchConfig {
        case_sensitive: input.case_sensitive,
        ignore_punctuation: input.ignore_punctuation,
        ..SearchConfig::default()
    };
    let query = parse_query(input.query, &config);
    // Every parsed unit carries at least one non-empty word
    for unit in &query.units {
        assert!(!unit.words().is_empty());
        assert!(unit.words().iter().all(|w| !w.is_empty()));
    }
});
