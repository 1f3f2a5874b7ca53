//! Text normalization shared by indexing and querying.
//!
//! The same [`Pipeline`] must run over document fields and over query
//! strings; the index owns one instance and uses it on both sides.

use std::collections::HashSet;
use std::sync::LazyLock;

/// English stop words, lowercase.
const STOP_WORDS: &[&str] = &[
    "a", "able", "about", "across", "after", "all", "almost", "also", "am", "among", "an", "and",
    "any", "are", "as", "at", "be", "because", "been", "but", "by", "can", "cannot", "could",
    "dear", "did", "do", "does", "either", "else", "ever", "every", "for", "from", "get", "got",
    "had", "has", "have", "he", "her", "hers", "him", "his", "how", "however", "i", "if", "in",
    "into", "is", "it", "its", "just", "least", "let", "like", "likely", "may", "me", "might",
    "most", "must", "my", "neither", "no", "nor", "not", "of", "off", "often", "on", "only", "or",
    "other", "our", "own", "rather", "said", "say", "says", "she", "should", "since", "so",
    "some", "than", "that", "the", "their", "them", "then", "there", "these", "they", "this",
    "tis", "to", "too", "twas", "us", "wants", "was", "we", "were", "what", "when", "where",
    "which", "while", "who", "whom", "why", "will", "with", "would", "yet", "you", "your",
];

static STOP_WORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOP_WORDS.iter().copied().collect());

/// Check if a token is a stop word.
#[inline]
pub fn is_stop_word(token: &str) -> bool {
    STOP_WORD_SET.contains(token)
}

/// Word characters for trimming: alphanumeric or underscore.
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Split text into lowercase tokens on whitespace and hyphens.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| c.is_whitespace() || c == '-')
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

/// Strip leading and trailing non-word characters.
pub fn trim_token(token: &str) -> &str {
    token.trim_matches(|c: char| !is_word_char(c))
}

/// A single normalization step. Returning `None` drops the token.
pub type Stage = fn(String) -> Option<String>;

/// Trimmer stage.
pub fn trimmer(token: String) -> Option<String> {
    let trimmed = trim_token(&token);
    if trimmed.len() == token.len() {
        Some(token)
    } else {
        Some(trimmed.to_string())
    }
}

/// Stop-word filter stage.
pub fn stop_word_filter(token: String) -> Option<String> {
    if is_stop_word(&token) {
        None
    } else {
        Some(token)
    }
}

/// Ordered normalization stages applied after tokenizing.
#[derive(Debug, Clone)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    /// A pipeline with no stages (tokenize only).
    pub fn empty() -> Self {
        Self { stages: Vec::new() }
    }

    /// Append a stage.
    pub fn add(&mut self, stage: Stage) -> &mut Self {
        self.stages.push(stage);
        self
    }

    /// Tokenize `text` and run every token through the stages.
    ///
    /// Empty tokens are dropped after each stage.
    pub fn run(&self, text: &str) -> Vec<String> {
        tokenize(text)
            .filter_map(|token| {
                self.stages.iter().try_fold(token, |token, stage| {
                    stage(token).filter(|t| !t.is_empty())
                })
            })
            .filter(|t| !t.is_empty())
            .collect()
    }
}

impl Default for Pipeline {
    /// Trimmer followed by the stop-word filter.
    fn default() -> Self {
        let mut pipeline = Self::empty();
        pipeline.add(trimmer).add(stop_word_filter);
        pipeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn tokenizes_on_whitespace_and_hyphens() {
        let tokens: Vec<_> = tokenize("  Rate-Limit   HEADERS\tand\nmore ").collect();
        assert_eq!(tokens, vec!["rate", "limit", "headers", "and", "more"]);
    }

    #[test]
    fn trims_non_word_boundaries() {
        assert_eq!(trim_token("\"hello,\""), "hello");
        assert_eq!(trim_token("(api_key)"), "api_key");
        assert_eq!(trim_token("v1.2"), "v1.2");
        assert_eq!(trim_token("..."), "");
    }

    #[test]
    fn default_pipeline_drops_stop_words_and_punctuation() {
        let pipeline = Pipeline::default();
        assert_eq!(pipeline.run("The Quick, brown Fox!"), vec!["quick", "brown", "fox"]);
        assert_eq!(pipeline.run("-- ... --"), Vec::<String>::new());
    }

    #[test]
    fn stop_words_are_checked_after_trimming() {
        let pipeline = Pipeline::default();
        assert_eq!(pipeline.run("(the) \"and\""), Vec::<String>::new());
    }

    #[test]
    fn empty_pipeline_only_tokenizes() {
        assert_eq!(Pipeline::empty().run("The fox."), vec!["the", "fox."]);
    }

    #[test]
    fn same_pipeline_on_both_sides_is_symmetric() {
        let pipeline = Pipeline::default();
        let indexed = pipeline.run("The Quick Fox");
        let query = pipeline.run("quick");
        assert!(query.iter().all(|q| indexed.contains(q)));
    }
}
