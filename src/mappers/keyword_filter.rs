//! src/mappers/keyword_filter.rs
use crate::functions::{MapEmitter, Mapper};
use crate::job_conf::JobConf;
use crate::keywords::KeywordSet;

const DELIMITERS: [char; 5] = [' ', '\t', '\n', '\r', '\x0c'];

/// Splits a record into whitespace-delimited tokens. Tokens are returned
/// verbatim: no case folding, no punctuation stripping.
pub fn tokenize(record: &str) -> impl Iterator<Item = &str> {
    record
        .split(&DELIMITERS[..])
        .filter(|token| !token.is_empty())
}

/// Emits `(token, document)` once per occurrence of a configured keyword.
#[derive(Debug, Clone)]
pub struct KeywordFilter {
    keywords: KeywordSet,
}

impl KeywordFilter {
    pub fn new(keywords: KeywordSet) -> Self {
        Self { keywords }
    }

    pub fn from_conf(conf: &JobConf) -> anyhow::Result<Self> {
        Ok(Self::new(KeywordSet::from_conf(conf)?))
    }

    pub fn keywords(&self) -> &KeywordSet {
        &self.keywords
    }
}

impl Mapper for KeywordFilter {
    fn map(&self, key: &str, value: &str, emitter: &mut dyn MapEmitter) -> anyhow::Result<()> {
        for token in tokenize(value) {
            if self.keywords.contains(token) {
                emitter.emit(token.to_string(), key.to_string());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::{Key, Value};
    use proptest::prelude::*;

    fn run(mapper: &KeywordFilter, document: &str, record: &str) -> Vec<(Key, Value)> {
        let mut emitted: Vec<(Key, Value)> = vec![];
        mapper
            .map(document, record, &mut emitted)
            .expect("Keyword filter never fails");
        emitted
    }

    fn pair(term: &str, document: &str) -> (Key, Value) {
        (term.to_string(), document.to_string())
    }

    #[test]
    fn should_emit_one_pair_per_keyword_occurrence_in_token_order() {
        let mapper = KeywordFilter::new(KeywordSet::new(["the", "sat"]));

        let emitted = run(&mapper, "doc1", "the cat sat on the mat");

        assert_eq!(
            emitted,
            vec![pair("the", "doc1"), pair("sat", "doc1"), pair("the", "doc1")]
        );
    }

    #[test]
    fn matching_should_be_exact_and_case_sensitive() {
        let mapper = KeywordFilter::new(KeywordSet::new(["book"]));

        let emitted = run(&mapper, "alice.txt", "a book, the Book, book. book");

        assert_eq!(emitted, vec![pair("book", "alice.txt")]);
    }

    #[test]
    fn tabs_and_repeated_spaces_should_separate_tokens() {
        let mapper = KeywordFilter::new(KeywordSet::new(["sat"]));

        let emitted = run(&mapper, "doc", "\tsat  \x0csat\r\n");

        assert_eq!(emitted.len(), 2);
    }

    #[test]
    fn an_empty_keyword_set_should_emit_nothing() {
        let mapper = KeywordFilter::new(KeywordSet::default());
        assert!(run(&mapper, "doc1", "the cat sat on the mat").is_empty());
    }

    #[test]
    fn should_be_configured_from_job_configuration() {
        let mut conf = JobConf::new();
        KeywordSet::new(["mat"]).write_to(&mut conf);

        let mapper = KeywordFilter::from_conf(&conf).expect("Failed to configure mapper");

        assert_eq!(run(&mapper, "doc1", "the mat"), vec![pair("mat", "doc1")]);
    }

    proptest! {
        #[test]
        fn emitted_pairs_equal_exact_token_matches(
            words in prop::collection::vec("[a-cA-C,.]{1,3}", 0..40),
            keywords in prop::collection::vec("[a-cA-C]{1,2}", 0..5),
        ) {
            let record = words.join(" ");
            let keyword_set = KeywordSet::new(keywords);
            let mapper = KeywordFilter::new(keyword_set.clone());

            let emitted = run(&mapper, "doc", &record);

            for keyword in keyword_set.iter() {
                let expected = words.iter().filter(|w| w.as_str() == keyword).count();
                let actual = emitted.iter().filter(|(term, _)| term == keyword).count();
                prop_assert_eq!(expected, actual);
            }
            prop_assert!(emitted.iter().all(|(term, doc)| keyword_set.contains(term) && doc == "doc"));
        }

        #[test]
        fn mapping_twice_yields_identical_output(
            record in "[ a-c\t]{0,60}",
        ) {
            let mapper = KeywordFilter::new(KeywordSet::new(["a", "bc"]));
            prop_assert_eq!(run(&mapper, "doc", &record), run(&mapper, "doc", &record));
        }
    }
}
