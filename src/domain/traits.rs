// ============================================================
// Layer 1 - Core Traits (Abstractions)
// ============================================================
// The vocabulary never reads files itself. Whatever parses the
// training corpus or the pretrained embedding file implements
// one of these traits, and the vocabulary works against the
// trait only:
//   - TaggedCorpus        implements Corpus
//   - PretrainedEmbeddings implements EmbeddingSource
//   - (external) CoNLL readers, GloVe/word2vec readers, ...

// ─── Corpus ──────────────────────────────────────────────────────────────────
/// A tagged corpus exposed as three parallel lists of sentences.
///
/// `words()[i]`, `tags()[i]` and `flags()[i]` describe the same
/// sentence and are expected to have the same length.
pub trait Corpus {
    /// Token text per sentence.
    fn words(&self) -> &[Vec<String>];

    /// Exploitability label per token.
    fn tags(&self) -> &[Vec<String>];

    /// CVE flag per token.
    fn flags(&self) -> &[Vec<String>];

    /// Number of sentences.
    fn len(&self) -> usize {
        self.words().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ─── EmbeddingSource ─────────────────────────────────────────────────────────
/// A table of pretrained word vectors.
pub trait EmbeddingSource {
    /// The source's own spelling of the unknown token, if it has one.
    fn unk(&self) -> Option<&str>;

    /// Length of every vector.
    fn dim(&self) -> usize;

    /// Whether `token` has a vector.
    fn contains(&self, token: &str) -> bool {
        self.vector(token).is_some()
    }

    /// The vector for `token`.
    fn vector(&self, token: &str) -> Option<&[f32]>;

    /// Every token with a vector, in source order.
    fn tokens(&self) -> &[String];
}
