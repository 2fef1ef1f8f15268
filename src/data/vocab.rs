// ============================================================
// Layer 2 - Vocabulary
// ============================================================
// Assigns stable integer ids to words, characters, tags and
// CVE flags.
//
// Layout of the word and char tables:
//
//   id 0   <PAD>
//   id 1   <UNK>            (or the pretrained spelling of it)
//   id 2.. corpus entries, sorted by code point
//   id n.. entries appended by `extend`, sorted per call
//
// Tags and flags are fixed enumerations from `domain::labels`.
//
// Lookups never fail: unknown words and chars map to UNK,
// unknown tags to `unclear`, unknown flags to PAD.
//
// The tensor-producing methods live in `numericalize.rs` and
// the embedding matrix in `embedding_matrix.rs`; this file
// holds the tables and the pure id lookups they build on.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::data::embedding_matrix::EmbeddingMatrix;
use crate::domain::labels::{CVE_FLAGS, DEFAULT_TAG, PAD, PAD_INDEX, TAGS, UNK, UNK_INDEX};
use crate::domain::traits::Corpus;
use crate::errors::{Result, TaggerError};

/// Tokens made only of Unicode punctuation.
static PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\p{P}+$").expect("static regex"));

// ─── Vocabulary ──────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "VocabState", into = "VocabState")]
pub struct Vocabulary {
    words:     Vec<String>,
    chars:     Vec<String>,
    tags:      Vec<String>,
    cve_flags: Vec<String>,

    word_dict: HashMap<String, usize>,
    char_dict: HashMap<String, usize>,
    tag_dict:  HashMap<String, usize>,
    flag_dict: HashMap<String, usize>,

    /// Sorted ids of words that are pure punctuation.
    puncts: Vec<usize>,

    /// Word count before any `extend`; ids below this came from
    /// the training corpus.
    n_train_words: usize,

    embeddings: Option<EmbeddingMatrix>,
}

impl Vocabulary {
    /// Build a vocabulary from corpus words and characters.
    ///
    /// Both lists are sorted and deduplicated, then placed after
    /// the PAD and UNK sentinels.
    pub fn new<W, C>(words: W, chars: C) -> Self
    where
        W: IntoIterator,
        W::Item: Into<String>,
        C: IntoIterator<Item = char>,
    {
        let words: BTreeSet<String> = words.into_iter().map(Into::into).collect();
        let chars: BTreeSet<char>   = chars.into_iter().collect();

        let mut vocab = Self {
            words:     sentinels().chain(words).collect(),
            chars:     sentinels().chain(chars.into_iter().map(String::from)).collect(),
            tags:      TAGS.iter().map(|t| t.to_string()).collect(),
            cve_flags: CVE_FLAGS.iter().map(|f| f.to_string()).collect(),
            word_dict: HashMap::new(),
            char_dict: HashMap::new(),
            tag_dict:  HashMap::new(),
            flag_dict: HashMap::new(),
            puncts:    Vec::new(),
            n_train_words: 0,
            embeddings: None,
        };
        vocab.tag_dict  = index_of(&vocab.tags);
        vocab.flag_dict = index_of(&vocab.cve_flags);
        vocab.rebuild();
        vocab.n_train_words = vocab.words.len();
        vocab
    }

    /// Count lower-cased words across the corpus and keep those
    /// seen at least `min_freq` times. Every character of every
    /// word (original case) enters the char table.
    ///
    /// Tags and flags are not taken from the corpus. Labels outside
    /// the fixed enumerations are logged and will be read as
    /// `unclear` / PAD.
    pub fn from_corpus<C: Corpus + ?Sized>(corpus: &C, min_freq: usize) -> Self {
        let mut freq: HashMap<String, usize> = HashMap::new();
        for word in corpus.words().iter().flatten() {
            *freq.entry(word.to_lowercase()).or_insert(0) += 1;
        }
        let words = freq
            .into_iter()
            .filter(|(_, n)| *n >= min_freq)
            .map(|(w, _)| w);

        let chars: HashSet<char> = corpus
            .words()
            .iter()
            .flatten()
            .flat_map(|w| w.chars())
            .collect();

        let corpus_tags: BTreeSet<&str> = corpus
            .tags()
            .iter()
            .flatten()
            .map(String::as_str)
            .collect();
        let unknown_tags: Vec<&str> = corpus_tags
            .into_iter()
            .filter(|t| !TAGS.contains(t))
            .collect();
        if !unknown_tags.is_empty() {
            tracing::warn!(
                "Corpus carries {} tag(s) outside the fixed tag set, they will read as '{}': {:?}",
                unknown_tags.len(),
                DEFAULT_TAG,
                unknown_tags
            );
        }

        let vocab = Self::new(words, chars);
        tracing::info!(
            "Built vocabulary from {} sentences (min_freq={}): {}",
            corpus.len(),
            min_freq,
            vocab
        );
        vocab
    }

    // ─── Accessors ───────────────────────────────────────────────────────────

    pub fn pad_index(&self) -> usize {
        PAD_INDEX
    }

    pub fn unk_index(&self) -> usize {
        UNK_INDEX
    }

    /// Current spelling of the unknown word.
    pub fn unk_token(&self) -> &str {
        &self.words[UNK_INDEX]
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn chars(&self) -> &[String] {
        &self.chars
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn cve_flags(&self) -> &[String] {
        &self.cve_flags
    }

    pub fn puncts(&self) -> &[usize] {
        &self.puncts
    }

    pub fn n_words(&self) -> usize {
        self.words.len()
    }

    pub fn n_chars(&self) -> usize {
        self.chars.len()
    }

    pub fn n_tags(&self) -> usize {
        self.tags.len()
    }

    pub fn n_train_words(&self) -> usize {
        self.n_train_words
    }

    pub fn embeddings(&self) -> Option<&EmbeddingMatrix> {
        self.embeddings.as_ref()
    }

    /// Exact id of a word table entry (no lower-casing).
    pub fn word_id(&self, word: &str) -> Option<usize> {
        self.word_dict.get(word).copied()
    }

    /// Exact id of a char table entry, sentinels included.
    pub fn char_id(&self, entry: &str) -> Option<usize> {
        self.char_dict.get(entry).copied()
    }

    pub fn tag_id(&self, tag: &str) -> Option<usize> {
        self.tag_dict.get(tag).copied()
    }

    pub fn flag_id(&self, flag: &str) -> Option<usize> {
        self.flag_dict.get(flag).copied()
    }

    // ─── Id lookups ──────────────────────────────────────────────────────────

    /// Lower-cased word ids, unknown words → UNK.
    pub fn word_ids<S: AsRef<str>>(&self, sequence: &[S]) -> Vec<i64> {
        sequence
            .iter()
            .map(|w| {
                self.word_dict
                    .get(&w.as_ref().to_lowercase())
                    .copied()
                    .unwrap_or(UNK_INDEX) as i64
            })
            .collect()
    }

    /// Char ids as a row-major `[sequence.len(), max_length]` buffer.
    ///
    /// Each word keeps its first `max_length` chars; the rest of its
    /// row is PAD. Unknown chars → UNK.
    pub fn char_ids<S: AsRef<str>>(&self, sequence: &[S], max_length: usize) -> Vec<i64> {
        let mut ids = vec![PAD_INDEX as i64; sequence.len() * max_length];
        let mut buf = [0u8; 4];
        for (row, word) in ids.chunks_mut(max_length.max(1)).zip(sequence) {
            for (slot, c) in row.iter_mut().zip(word.as_ref().chars()) {
                let key: &str = c.encode_utf8(&mut buf);
                *slot = self.char_dict.get(key).copied().unwrap_or(UNK_INDEX) as i64;
            }
        }
        ids
    }

    /// Tag ids, unknown tags → `unclear`.
    pub fn tag_ids<S: AsRef<str>>(&self, sequence: &[S]) -> Vec<i64> {
        let fallback = self.tag_dict[DEFAULT_TAG];
        sequence
            .iter()
            .map(|t| self.tag_dict.get(t.as_ref()).copied().unwrap_or(fallback) as i64)
            .collect()
    }

    /// Flag ids, unknown flags → PAD.
    pub fn flag_ids<S: AsRef<str>>(&self, sequence: &[S]) -> Vec<i64> {
        sequence
            .iter()
            .map(|f| self.flag_dict.get(f.as_ref()).copied().unwrap_or(PAD_INDEX) as i64)
            .collect()
    }

    /// Map tag ids back to their labels.
    ///
    /// Fails on the first id outside `0..n_tags`.
    pub fn id2tag(&self, ids: &[i64]) -> Result<Vec<&str>> {
        ids.iter()
            .map(|&id| {
                usize::try_from(id)
                    .ok()
                    .and_then(|i| self.tags.get(i))
                    .map(String::as_str)
                    .ok_or(TaggerError::TagOutOfRange { id, n_tags: self.tags.len() })
            })
            .collect()
    }

    // ─── Mutation ────────────────────────────────────────────────────────────

    /// Append unseen words and characters.
    ///
    /// New words are appended in sorted order, new chars likewise.
    /// Existing ids never move. Calling this twice with the same
    /// input changes nothing the second time.
    pub fn extend<S: AsRef<str>>(&mut self, words: &[S]) {
        let new_words: BTreeSet<&str> = words
            .iter()
            .map(AsRef::as_ref)
            .filter(|w| !self.word_dict.contains_key(*w))
            .collect();

        let mut buf = [0u8; 4];
        let new_chars: BTreeSet<char> = words
            .iter()
            .flat_map(|w| w.as_ref().chars())
            .filter(|c| !self.char_dict.contains_key(c.encode_utf8(&mut buf) as &str))
            .collect();

        if new_words.is_empty() && new_chars.is_empty() {
            return;
        }

        tracing::debug!(
            "Extending vocabulary with {} words and {} chars",
            new_words.len(),
            new_chars.len()
        );
        self.words.extend(new_words.into_iter().map(str::to_string));
        self.chars.extend(new_chars.into_iter().map(String::from));
        self.rebuild();
    }

    /// Rename the UNK sentinel at id 1.
    ///
    /// Skipped (with a warning) when the spelling already names a
    /// different word, since renaming would create a duplicate.
    pub(crate) fn adopt_unk(&mut self, spelling: &str) {
        if spelling == self.unk_token() {
            return;
        }
        if let Some(id) = self.word_id(spelling) {
            tracing::warn!(
                "Pretrained UNK '{}' already present as word id {}, keeping '{}'",
                spelling,
                id,
                self.unk_token()
            );
            return;
        }
        tracing::debug!("Adopting pretrained UNK spelling '{}'", spelling);
        self.words[UNK_INDEX] = spelling.to_string();
        self.rebuild();
    }

    pub(crate) fn set_embeddings(&mut self, embeddings: EmbeddingMatrix) {
        self.embeddings = Some(embeddings);
    }

    /// Swap the embedding matrix, returning the old one.
    pub(crate) fn replace_embeddings(&mut self, embeddings: Option<EmbeddingMatrix>) -> Option<EmbeddingMatrix> {
        std::mem::replace(&mut self.embeddings, embeddings)
    }

    /// Recompute the word and char maps and the punctuation ids.
    fn rebuild(&mut self) {
        self.word_dict = index_of(&self.words);
        self.char_dict = index_of(&self.chars);
        self.puncts = self
            .word_dict
            .iter()
            .filter(|(w, _)| PUNCT.is_match(w))
            .map(|(_, &i)| i)
            .collect();
        self.puncts.sort_unstable();
    }
}

impl fmt::Display for Vocabulary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Vocabulary: {} words, {} chars, {} tags",
            self.n_words(),
            self.n_chars(),
            self.n_tags()
        )
    }
}

fn sentinels() -> impl Iterator<Item = String> {
    [PAD, UNK].into_iter().map(str::to_string)
}

fn index_of(entries: &[String]) -> HashMap<String, usize> {
    entries
        .iter()
        .enumerate()
        .map(|(i, e)| (e.clone(), i))
        .collect()
}

// ─── Saved State ─────────────────────────────────────────────────────────────
// What goes to disk. The lookup maps, tags, flags and puncts are
// derived, so they are rebuilt on load instead of being stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabState {
    pub words:         Vec<String>,
    pub chars:         Vec<String>,
    pub n_train_words: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embeddings:    Option<EmbeddingMatrix>,
}

impl From<Vocabulary> for VocabState {
    fn from(v: Vocabulary) -> Self {
        Self {
            words:         v.words,
            chars:         v.chars,
            n_train_words: v.n_train_words,
            embeddings:    v.embeddings,
        }
    }
}

impl TryFrom<VocabState> for Vocabulary {
    type Error = TaggerError;

    fn try_from(state: VocabState) -> Result<Self> {
        for (name, table) in [("words", &state.words), ("chars", &state.chars)] {
            if table.len() < 2 || table[PAD_INDEX] != PAD {
                return Err(TaggerError::InvalidState(format!(
                    "{name} table must start with {PAD} and an unknown sentinel"
                )));
            }
            let distinct: HashSet<&String> = table.iter().collect();
            if distinct.len() != table.len() {
                return Err(TaggerError::InvalidState(format!("{name} table has duplicates")));
            }
        }
        if state.n_train_words > state.words.len() {
            return Err(TaggerError::InvalidState(format!(
                "n_train_words {} exceeds {} words",
                state.n_train_words,
                state.words.len()
            )));
        }
        // `extend` grows the word table without resizing the matrix,
        // so fewer rows than words is a valid state.
        if let Some(e) = &state.embeddings {
            if e.rows() > state.words.len() {
                return Err(TaggerError::InvalidState(format!(
                    "embedding matrix has {} rows for {} words",
                    e.rows(),
                    state.words.len()
                )));
            }
            if e.values().len() != e.rows() * e.dim() {
                return Err(TaggerError::InvalidState(format!(
                    "embedding matrix holds {} values, expected {} x {}",
                    e.values().len(),
                    e.rows(),
                    e.dim()
                )));
            }
        }

        let tags: Vec<String>      = TAGS.iter().map(|t| t.to_string()).collect();
        let cve_flags: Vec<String> = CVE_FLAGS.iter().map(|f| f.to_string()).collect();
        let mut vocab = Self {
            tag_dict:  index_of(&tags),
            flag_dict: index_of(&cve_flags),
            words:     state.words,
            chars:     state.chars,
            tags,
            cve_flags,
            word_dict: HashMap::new(),
            char_dict: HashMap::new(),
            puncts:    Vec::new(),
            n_train_words: state.n_train_words,
            embeddings:    state.embeddings,
        };
        vocab.rebuild();
        Ok(vocab)
    }
}
