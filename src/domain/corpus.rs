// ============================================================
// Layer 1 - TaggedCorpus
// ============================================================
// In-memory implementation of the Corpus trait. Loaders build
// one of these sentence by sentence; tests build them inline.

use serde::{Deserialize, Serialize};

use crate::domain::traits::Corpus;

/// Sentences with per-token tags and CVE flags, stored as three
/// parallel lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaggedCorpus {
    words: Vec<Vec<String>>,
    tags:  Vec<Vec<String>>,
    flags: Vec<Vec<String>>,
}

impl TaggedCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one sentence. Accepts anything string-like so callers
    /// can pass `&["a", "b"]` or owned vectors.
    pub fn push_sentence<W, T, F>(&mut self, words: W, tags: T, flags: F)
    where
        W: IntoIterator,
        W::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        self.words.push(words.into_iter().map(Into::into).collect());
        self.tags.push(tags.into_iter().map(Into::into).collect());
        self.flags.push(flags.into_iter().map(Into::into).collect());
    }

    /// Builder-style variant of `push_sentence`.
    pub fn with_sentence<W, T, F>(mut self, words: W, tags: T, flags: F) -> Self
    where
        W: IntoIterator,
        W::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        self.push_sentence(words, tags, flags);
        self
    }

    /// Total number of tokens across all sentences.
    pub fn token_count(&self) -> usize {
        self.words.iter().map(Vec::len).sum()
    }
}

impl Corpus for TaggedCorpus {
    fn words(&self) -> &[Vec<String>] {
        &self.words
    }

    fn tags(&self) -> &[Vec<String>] {
        &self.tags
    }

    fn flags(&self) -> &[Vec<String>] {
        &self.flags
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentences_stay_parallel() {
        let corpus = TaggedCorpus::new()
            .with_sentence(["CVE-2021-44228", "is", "bad"], ["could_be_exploited"; 3], ["cve", "O", "O"])
            .with_sentence(["fine"], ["unclear"], ["O"]);

        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.token_count(), 4);
        assert_eq!(corpus.words()[0][0], "CVE-2021-44228");
        assert_eq!(corpus.flags()[0][0], "cve");
        assert_eq!(corpus.tags()[1], vec!["unclear".to_string()]);
    }

    #[test]
    fn test_empty_corpus() {
        let corpus = TaggedCorpus::new();
        assert!(corpus.is_empty());
        assert_eq!(corpus.token_count(), 0);
    }
}
