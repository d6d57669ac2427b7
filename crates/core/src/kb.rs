//! Knowledge-base matcher
//!
//! Answers FAQ queries by token overlap: a query matches an entry when the
//! entry's keyword set is a subset of the query's token set. Matching is
//! order-independent and synonym-aware, and entries are scanned in
//! declaration order with first match winning.

use std::collections::BTreeSet;

use crate::config::KbConfig;

/// A canonical question/answer pair. The keyword set is derived from the
/// configured phrase (whitespace-split, lowercased) at construction time
/// and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KbEntry {
    keywords: BTreeSet<String>,
    answer: String,
}

impl KbEntry {
    pub fn new(phrase: &str, answer: impl Into<String>) -> Self {
        let keywords =
            phrase.split_whitespace().map(|word| word.to_ascii_lowercase()).collect();
        Self { keywords, answer: answer.into() }
    }

    pub fn keywords(&self) -> &BTreeSet<String> {
        &self.keywords
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }
}

/// Additive token expansion applied to query token sets before matching.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Synonym {
    pub token: String,
    pub expands_to: String,
}

#[derive(Clone, Debug)]
pub struct KnowledgeBase {
    entries: Vec<KbEntry>,
    synonyms: Vec<Synonym>,
    fallback: String,
}

impl KnowledgeBase {
    pub fn new(entries: Vec<KbEntry>, synonyms: Vec<Synonym>, fallback: impl Into<String>) -> Self {
        Self { entries, synonyms, fallback: fallback.into() }
    }

    pub fn from_config(config: &KbConfig) -> Self {
        let entries = config
            .entries
            .iter()
            .map(|entry| KbEntry::new(&entry.phrase, entry.answer.clone()))
            .collect();
        let synonyms = config
            .synonyms
            .iter()
            .map(|synonym| Synonym {
                token: synonym.token.to_ascii_lowercase(),
                expands_to: synonym.expands_to.to_ascii_lowercase(),
            })
            .collect();
        Self::new(entries, synonyms, config.fallback.clone())
    }

    /// Look up the best answer for a query.
    ///
    /// Entries are checked in declaration order; the first entry whose
    /// keyword set is fully contained in the query token set wins. Partial
    /// keyword overlap never matches. Returns the fallback message when no
    /// entry matches (an empty query can never match, since every entry
    /// carries at least one keyword).
    pub fn lookup(&self, query: &str) -> &str {
        let mut tokens = tokenize(query);
        for synonym in &self.synonyms {
            if tokens.contains(&synonym.token) {
                tokens.insert(synonym.expands_to.clone());
            }
        }

        for entry in &self.entries {
            if entry.keywords.is_subset(&tokens) {
                return &entry.answer;
            }
        }

        &self.fallback
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Split text into a set of lowercase tokens, where a token is a maximal
/// run of ASCII-alphanumeric characters. Duplicates collapse; order is
/// irrelevant to matching.
pub fn tokenize(text: &str) -> BTreeSet<String> {
    let mut tokens = BTreeSet::new();
    let mut current = String::new();

    for character in text.chars() {
        if character.is_ascii_alphanumeric() {
            current.push(character.to_ascii_lowercase());
        } else if !current.is_empty() {
            tokens.insert(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.insert(current);
    }

    tokens
}
