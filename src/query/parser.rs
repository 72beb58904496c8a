use crate::index::types::SearchConfig;
use crate::utils::normalize_word;

/// Suffix that switches a query into comma-separated phrase mode
pub const PHRASE_MODE_SUFFIX: &str = "-p";

/// The atomic thing a document either matches or not when scoring
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryUnit {
    /// Single word lookup
    Word(String),
    /// Words that must occur at consecutive positions
    Phrase(Vec<String>),
}

impl QueryUnit {
    pub fn words(&self) -> &[String] {
        match self {
            QueryUnit::Word(word) => std::slice::from_ref(word),
            QueryUnit::Phrase(words) => words,
        }
    }
}

/// Parsed query representation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub units: Vec<QueryUnit>,
}

impl Query {
    pub fn new(units: Vec<QueryUnit>) -> Self {
        Self { units }
    }

    /// One `Word` unit per word, no normalization
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(words.into_iter().map(|w| QueryUnit::Word(w.into())).collect())
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Parse a query string into word and phrase units.
///
/// - `cat "sat on"` gives the word `cat` and the phrase `sat on`
/// - `the cat, sat on -p` gives the phrases `the cat` and `sat on`
///
/// Words are normalized with the index configuration so they compare equal
/// to the indexed words; units left empty after normalization are dropped.
pub fn parse_query(input: &str, config: &SearchConfig) -> Query {
    let input = input.trim();
    if let Some(body) = strip_phrase_suffix(input, config) {
        return parse_phrase_list(body, config);
    }
    QueryParser::new(input, config).parse()
}

/// The query without its phrase-mode suffix, matched without case unless
/// the index is case sensitive
fn strip_phrase_suffix<'a>(input: &'a str, config: &SearchConfig) -> Option<&'a str> {
    if config.case_sensitive {
        return input.strip_suffix(PHRASE_MODE_SUFFIX);
    }
    let split = input.len().checked_sub(PHRASE_MODE_SUFFIX.len())?;
    if !input.is_char_boundary(split) {
        return None;
    }
    let (body, suffix) = input.split_at(split);
    suffix.eq_ignore_ascii_case(PHRASE_MODE_SUFFIX).then_some(body)
}

fn parse_phrase_list(body: &str, config: &SearchConfig) -> Query {
    let units = body
        .split(',')
        .filter_map(|part| phrase_unit(part, config))
        .collect();
    Query::new(units)
}

fn phrase_unit(text: &str, config: &SearchConfig) -> Option<QueryUnit> {
    let words: Vec<String> = text
        .split_whitespace()
        .filter_map(|w| normalize_word(w, config))
        .collect();
    if words.is_empty() {
        None
    } else {
        Some(QueryUnit::Phrase(words))
    }
}

/// Query parser
struct QueryParser<'a> {
    input: &'a str,
    pos: usize,
    config: &'a SearchConfig,
}

impl<'a> QueryParser<'a> {
    fn new(input: &'a str, config: &'a SearchConfig) -> Self {
        Self {
            input,
            pos: 0,
            config,
        }
    }

    fn parse(&mut self) -> Query {
        let mut units = Vec::new();

        loop {
            self.skip_whitespace();
            if self.is_eof() {
                break;
            }

            if self.consume_char('"') {
                let text = self.take_while(|ch| ch != '"');
                self.consume_char('"');
                if let Some(unit) = phrase_unit(text, self.config) {
                    units.push(unit);
                }
            } else {
                let word = self.take_while(|ch| !ch.is_whitespace() && ch != '"');
                if let Some(word) = normalize_word(word, self.config) {
                    units.push(QueryUnit::Word(word));
                }
            }
        }

        Query::new(units)
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(ch) = self.peek_char() {
            if !pred(ch) {
                break;
            }
            self.pos += ch.len_utf8();
        }
        &self.input[start..self.pos]
    }

    fn skip_whitespace(&mut self) {
        self.take_while(char::is_whitespace);
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn consume_char(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(w: &str) -> QueryUnit {
        QueryUnit::Word(w.to_string())
    }

    fn phrase(words: &[&str]) -> QueryUnit {
        QueryUnit::Phrase(words.iter().map(|w| w.to_string()).collect())
    }

    #[test]
    fn test_plain_words() {
        let q = parse_query("The cat  sat", &SearchConfig::default());
        assert_eq!(q.units, vec![word("the"), word("cat"), word("sat")]);
    }

    #[test]
    fn test_phrase_mode_suffix() {
        let q = parse_query("the cat, sat on the mat -p", &SearchConfig::default());
        assert_eq!(
            q.units,
            vec![phrase(&["the", "cat"]), phrase(&["sat", "on", "the", "mat"])]
        );
    }

    #[test]
    fn test_phrase_mode_suffix_ignores_case() {
        let q = parse_query("The cat, sat -P", &SearchConfig::default());
        assert_eq!(q.units, vec![phrase(&["the", "cat"]), phrase(&["sat"])]);

        let config = SearchConfig {
            case_sensitive: true,
            ..SearchConfig::default()
        };
        let q = parse_query("The cat -P", &config);
        assert_eq!(q.units, vec![word("The"), word("cat"), word("-P")]);

        // A multi-byte character right before the suffix position
        let q = parse_query("xé", &SearchConfig::default());
        assert_eq!(q.units, vec![word("xé")]);
    }

    #[test]
    fn test_phrase_mode_skips_empty_parts() {
        let q = parse_query("cat,, ,dog-p", &SearchConfig::default());
        assert_eq!(q.units, vec![phrase(&["cat"]), phrase(&["dog"])]);
    }

    #[test]
    fn test_quoted_phrase() {
        let q = parse_query("dog \"the cat\" sat", &SearchConfig::default());
        assert_eq!(q.units, vec![word("dog"), phrase(&["the", "cat"]), word("sat")]);
    }

    #[test]
    fn test_unterminated_quote() {
        let q = parse_query("\"the cat", &SearchConfig::default());
        assert_eq!(q.units, vec![phrase(&["the", "cat"])]);
    }

    #[test]
    fn test_normalization_follows_config() {
        let q = parse_query("Cat! (dog)", &SearchConfig::default());
        assert_eq!(q.units, vec![word("cat"), word("dog")]);

        let config = SearchConfig {
            case_sensitive: true,
            ignore_punctuation: false,
            ..SearchConfig::default()
        };
        let q = parse_query("Cat!", &config);
        assert_eq!(q.units, vec![word("Cat!")]);
    }

    #[test]
    fn test_punctuation_only_words_dropped() {
        let q = parse_query("... ?! cat", &SearchConfig::default());
        assert_eq!(q.units, vec![word("cat")]);
    }

    #[test]
    fn test_empty_query() {
        assert!(parse_query("", &SearchConfig::default()).is_empty());
        assert!(parse_query("   ", &SearchConfig::default()).is_empty());
        assert!(parse_query("-p", &SearchConfig::default()).is_empty());
    }

    #[test]
    fn test_from_words() {
        let q = Query::from_words(["the", "cat"]);
        assert_eq!(q.len(), 2);
        assert_eq!(q.units[1].words(), &["cat".to_string()]);
    }
}
