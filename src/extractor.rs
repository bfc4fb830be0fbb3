//! Text extraction pipeline: tokenize → split → case-fold → stopword-filter
//! → stem.
//!
//! Input is plain synopsis text or already-folded markup text, so the
//! tokenizer is a single boundary predicate plus `str::split`, no lexer
//! state machine needed. Stemming uses English Snowball (Porter2) via the
//! `rust-stemmers` crate.

use crate::markup::{fold_text, Markup, MonospacePolicy};
use crate::{Error, HashSet};
use rust_stemmers::{Algorithm, Stemmer};

/// Characters that split an already-whitespace-delimited token into
/// fragments: `)`, `-`, `/`. Handled separately from the initial
/// tokenization boundary so both the whole token and its pieces can be
/// emitted.
const FRAGMENT_SPLIT_CHARS: [char; 3] = [')', '-', '/'];

fn is_tokenize_boundary(c: char) -> bool {
    if c.is_whitespace() {
        return true;
    }
    if !c.is_ascii_punctuation() {
        return false;
    }
    // `)`, `-`, `/` are not boundaries here; they're handled by the
    // fragment-split step below instead.
    !FRAGMENT_SPLIT_CHARS.contains(&c)
}

fn tokenize_words(text: &str) -> Vec<&str> {
    text.split(is_tokenize_boundary)
        .filter(|s| !s.is_empty())
        .collect()
}

fn is_all_punctuation(token: &str) -> bool {
    !token.chars().any(|c| c.is_alphanumeric())
}

/// Splits `token` on `)`, `-`, `/`. When the token actually contains one of
/// those characters, both the whole token and every non-empty fragment are
/// returned; otherwise just the token itself.
fn split_fragments(token: &str) -> Vec<&str> {
    let pieces: Vec<&str> = token
        .split(|c| FRAGMENT_SPLIT_CHARS.contains(&c))
        .filter(|s| !s.is_empty())
        .collect();
    if pieces.len() > 1 {
        let mut out = Vec::with_capacity(pieces.len() + 1);
        out.push(token);
        out.extend(pieces);
        out
    } else {
        vec![token]
    }
}

/// Turns raw text and markup trees into normalized, stemmed term sequences.
/// Holds a caller-supplied, already-case-folded stopword set and an English
/// Snowball stemmer.
pub struct Extractor {
    stopwords: HashSet<String>,
    monospace_policy: MonospacePolicy,
    stemmer: Option<Stemmer>,
}

impl Extractor {
    /// Defaults to English Snowball stemming.
    pub fn new(stopwords: HashSet<String>) -> Self {
        Self {
            stopwords,
            monospace_policy: MonospacePolicy::default(),
            stemmer: Some(Stemmer::create(Algorithm::English)),
        }
    }

    /// Picks a stemmer by name. `"english"`/`"snowball"`/`"porter"` select
    /// English Snowball stemming; `""`/`"none"` disable stemming entirely
    /// (terms pass through case-folded only).
    pub fn with_stemmer_name(stopwords: HashSet<String>, name: &str) -> Result<Self, Error> {
        let stemmer = match name {
            "english" | "snowball" | "porter" => Some(Stemmer::create(Algorithm::English)),
            "" | "none" => None,
            other => return Err(Error::UnknownStemmer(other.to_string())),
        };
        Ok(Self {
            stopwords,
            monospace_policy: MonospacePolicy::default(),
            stemmer,
        })
    }

    pub fn with_monospace_policy(mut self, policy: MonospacePolicy) -> Self {
        self.monospace_policy = policy;
        self
    }

    /// Runs the extraction pipeline over plain synopsis text.
    pub fn extract_synopsis_terms(&self, text: &str) -> Vec<String> {
        self.pipeline(text)
    }

    /// Takes an already-parsed [`Markup`] tree rather than raw text: markup
    /// lexing/parsing is expected to happen upstream of this crate.
    pub fn extract_description_terms(&self, markup: &Markup) -> Vec<String> {
        let text = fold_text(markup, self.monospace_policy);
        self.pipeline(&text)
    }

    fn pipeline(&self, text: &str) -> Vec<String> {
        let mut terms = Vec::new();
        for token in tokenize_words(text) {
            if is_all_punctuation(token) {
                continue;
            }
            for fragment in split_fragments(token) {
                let folded = fragment.to_lowercase();
                if folded.is_empty() || self.stopwords.contains(&folded) {
                    continue;
                }
                match &self.stemmer {
                    Some(stemmer) => terms.push(stemmer.stem(&folded).into_owned()),
                    None => terms.push(folded),
                }
            }
        }
        terms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stopwords(words: &[&str]) -> HashSet<String> {
        words.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn drops_stopwords_and_stems() {
        let ex = Extractor::new(stopwords(&["the"]));
        let terms = ex.extract_synopsis_terms("The running dogs");
        assert_eq!(terms, vec!["run", "dog"]);
    }

    #[test]
    fn stemming_unifies_inflections() {
        let ex = Extractor::new(stopwords(&["the"]));
        let a = ex.extract_synopsis_terms("running dogs");
        let b = ex.extract_synopsis_terms("runs dog");
        assert_eq!(a, vec!["run", "dog"]);
        assert_eq!(b, vec!["run", "dog"]);
    }

    #[test]
    fn pure_punctuation_tokens_are_dropped() {
        let ex = Extractor::new(stopwords(&[]));
        // "**" is split apart by the whitespace/punctuation boundary before
        // it ever reaches the punctuation filter; a lone "-" survives that
        // boundary step (it's one of the fragment-split characters) and is
        // dropped by the "entirely punctuation" filter instead.
        let terms = ex.extract_synopsis_terms("hello ** world - there");
        assert_eq!(terms, vec!["hello", "world", "there"]);
    }

    #[test]
    fn fragment_split_emits_whole_and_pieces() {
        let ex = Extractor::new(stopwords(&[]));
        // "read/write" splits on '/': emits the whole token plus both
        // fragments, three terms in total.
        let terms = ex.extract_synopsis_terms("read/write");
        assert_eq!(terms.len(), 3);
        assert!(terms.contains(&"read".to_string()));
        assert!(terms.contains(&"write".to_string()));
    }

    #[test]
    fn hyphen_split_emits_whole_and_pieces() {
        let ex = Extractor::new(stopwords(&[]));
        let terms = ex.extract_synopsis_terms("well-formed");
        assert_eq!(terms.len(), 3);
        assert!(terms.contains(&"well".to_string()));
        assert!(terms.contains(&"form".to_string()));
    }

    #[test]
    fn no_separator_emits_token_once() {
        let ex = Extractor::new(stopwords(&[]));
        let terms = ex.extract_synopsis_terms("parser");
        assert_eq!(terms, vec!["parser"]);
    }

    #[test]
    fn description_terms_fold_markup_first() {
        let ex = Extractor::new(stopwords(&["the"]));
        let markup = Markup::Paragraph(Box::new(Markup::Append(
            Box::new(Markup::String("running the".into())),
            Box::new(Markup::String("dogs".into())),
        )));
        let terms = ex.extract_description_terms(&markup);
        assert_eq!(terms, vec!["run", "dog"]);
    }

    #[test]
    fn named_stemmer_none_skips_stemming() {
        let ex = Extractor::with_stemmer_name(stopwords(&[]), "none").unwrap();
        let terms = ex.extract_synopsis_terms("running dogs");
        assert_eq!(terms, vec!["running", "dogs"]);
    }

    #[test]
    fn unknown_stemmer_name_is_an_error() {
        let err = Extractor::with_stemmer_name(stopwords(&[]), "bogus").unwrap_err();
        match err {
            Error::UnknownStemmer(name) => assert_eq!(name, "bogus"),
            other => panic!("expected UnknownStemmer, got {:?}", other),
        }
    }

    #[test]
    fn failed_markup_yields_no_terms() {
        // An empty markup tree folds to no text and thus no terms.
        let ex = Extractor::new(stopwords(&[]));
        assert!(ex.extract_description_terms(&Markup::Empty).is_empty());
    }
}
