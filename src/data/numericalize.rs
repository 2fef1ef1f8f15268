// ============================================================
// Layer 2 - Numericalization
// ============================================================
// Turns string sequences into Burn Int tensors using the
// vocabulary's lookup tables:
//
//   word2id  ["The", "CVE"]        → [n]              lower-cased
//   char2id  ["The", "CVE"], 20    → [n, max_length]  PAD-filled
//   tag2id   ["unclear", ...]      → [n]              default `unclear`
//   flag2id  ["cve", "O", ...]     → [n]              default PAD
//
// `numericalize` applies these to every sentence of a corpus.

use std::time::Instant;

use burn::{prelude::*, tensor::TensorData};

use crate::data::dataset::TaggedSample;
use crate::data::vocab::Vocabulary;
use crate::domain::traits::Corpus;
use crate::errors::Result;

/// Per-sentence tensors for a whole corpus.
///
/// `tags` is only filled when numericalizing for training.
#[derive(Debug, Clone)]
pub struct Numericalized<B: Backend> {
    pub words: Vec<Tensor<B, 1, Int>>,
    pub chars: Vec<Tensor<B, 2, Int>>,
    pub flags: Vec<Tensor<B, 1, Int>>,
    pub tags:  Option<Vec<Tensor<B, 1, Int>>>,
}

impl<B: Backend> Numericalized<B> {
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Vocabulary {
    /// Word ids as a `[n]` tensor.
    pub fn word2id<B: Backend>(&self, sequence: &[impl AsRef<str>], device: &B::Device) -> Tensor<B, 1, Int> {
        ids_1d(self.word_ids(sequence), device)
    }

    /// Char ids as a `[n, max_length]` tensor.
    pub fn char2id<B: Backend>(
        &self,
        sequence:   &[impl AsRef<str>],
        max_length: usize,
        device:     &B::Device,
    ) -> Tensor<B, 2, Int> {
        let ids = self.char_ids(sequence, max_length);
        Tensor::from_data(TensorData::new(ids, [sequence.len(), max_length]), device)
    }

    /// Tag ids as a `[n]` tensor.
    pub fn tag2id<B: Backend>(&self, sequence: &[impl AsRef<str>], device: &B::Device) -> Tensor<B, 1, Int> {
        ids_1d(self.tag_ids(sequence), device)
    }

    /// Flag ids as a `[n]` tensor.
    pub fn flag2id<B: Backend>(&self, sequence: &[impl AsRef<str>], device: &B::Device) -> Tensor<B, 1, Int> {
        ids_1d(self.flag_ids(sequence), device)
    }

    /// Decode a tensor of tag ids, e.g. the argmax of a tagger.
    pub fn tensor2tags<B: Backend>(&self, ids: Tensor<B, 1, Int>) -> Result<Vec<&str>> {
        let ids: Vec<i64> = ids.into_data().iter::<i64>().collect();
        self.id2tag(&ids)
    }

    /// Convert every sentence of `corpus` to tensors.
    ///
    /// Chars use `max_char_len` columns. Tags are produced only
    /// when `training` is set. Logs the throughput at info level.
    pub fn numericalize<B, C>(
        &self,
        corpus:       &C,
        max_char_len: usize,
        training:     bool,
        device:       &B::Device,
    ) -> Numericalized<B>
    where
        B: Backend,
        C: Corpus + ?Sized,
    {
        let started = Instant::now();

        let words: Vec<Tensor<B, 1, Int>> = corpus
            .words()
            .iter()
            .map(|s| self.word2id::<B>(s, device))
            .collect();
        let chars: Vec<Tensor<B, 2, Int>> = corpus
            .words()
            .iter()
            .map(|s| self.char2id::<B>(s, max_char_len, device))
            .collect();
        let flags: Vec<Tensor<B, 1, Int>> = corpus
            .flags()
            .iter()
            .map(|s| self.flag2id::<B>(s, device))
            .collect();
        let tags: Option<Vec<Tensor<B, 1, Int>>> = training.then(|| {
            corpus
                .tags()
                .iter()
                .map(|s| self.tag2id::<B>(s, device))
                .collect()
        });

        let secs = started.elapsed().as_secs_f64();
        tracing::info!(
            "Numericalized {} sentences in {:.3}s ({:.1} sentences/s)",
            corpus.len(),
            secs,
            corpus.len() as f64 / secs.max(f64::EPSILON)
        );

        Numericalized { words, chars, flags, tags }
    }

    /// Id vectors for every sentence, for building a `TaggedDataset`.
    ///
    /// If the parallel lists differ in length, only the sentences
    /// present in all of them (tags included when `training`) are
    /// kept.
    pub fn samples<C: Corpus + ?Sized>(&self, corpus: &C, max_char_len: usize, training: bool) -> Vec<TaggedSample> {
        let mut n = corpus.words().len().min(corpus.flags().len());
        if training {
            n = n.min(corpus.tags().len());
        }
        if n < corpus.len() {
            tracing::warn!(
                "Corpus lists differ in length, keeping {} of {} sentences",
                n,
                corpus.len()
            );
        }

        corpus
            .words()
            .iter()
            .zip(corpus.flags())
            .take(n)
            .enumerate()
            .map(|(i, (words, flags))| TaggedSample {
                words:        self.word_ids(words),
                chars:        self.char_ids(words, max_char_len),
                max_char_len,
                flags:        self.flag_ids(flags),
                tags:         training.then(|| self.tag_ids(&corpus.tags()[i])),
            })
            .collect()
    }
}

fn ids_1d<B: Backend>(ids: Vec<i64>, device: &B::Device) -> Tensor<B, 1, Int> {
    Tensor::<B, 1, Int>::from_ints(ids.as_slice(), device)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::corpus::TaggedCorpus;
    use crate::domain::labels::DEFAULT_MAX_CHAR_LEN;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn ints<const D: usize>(t: Tensor<TestBackend, D, Int>) -> Vec<i64> {
        t.into_data().iter::<i64>().collect()
    }

    fn corpus() -> TaggedCorpus {
        TaggedCorpus::new()
            .with_sentence(
                ["Apache", "Log4j", "CVE-2021-44228"],
                ["unclear", "unclear", "could_be_exploited"],
                ["O", "O", "cve"],
            )
            .with_sentence(["patched", "."], ["unlikely_to_be_exploited", "bogus"], ["O", "O"])
    }

    #[test]
    fn test_flag2id_defaults_to_pad() {
        let device = Default::default();
        let v = Vocabulary::from_corpus(&corpus(), 1);
        let t = v.flag2id::<TestBackend>(&["cve", "x", "cve"], &device);
        assert_eq!(ints(t), vec![1, 0, 1]);
    }

    #[test]
    fn test_word2id_lowercases() {
        let device = Default::default();
        let v = Vocabulary::from_corpus(&corpus(), 1);
        let t = v.word2id::<TestBackend>(&["APACHE", "apache", "nginx"], &device);
        let apache = v.word_id("apache").unwrap() as i64;
        assert_eq!(ints(t), vec![apache, apache, 1]);
    }

    #[test]
    fn test_char2id_shape_and_padding() {
        let device = Default::default();
        let v = Vocabulary::from_corpus(&corpus(), 1);
        let t = v.char2id::<TestBackend>(&["Log4j", "."], 4, &device);
        assert_eq!(t.dims(), [2, 4]);

        let ids = ints(t);
        // "Log4j" is cut to "Log4"
        assert!(ids[..4].iter().all(|&id| id > 1));
        assert_eq!(&ids[5..], &[0, 0, 0]);
    }

    #[test]
    fn test_tensor2tags_round_trip() {
        let device = Default::default();
        let v = Vocabulary::from_corpus(&corpus(), 1);
        let t = v.tag2id::<TestBackend>(&["could_be_exploited", "bogus"], &device);
        assert_eq!(v.tensor2tags(t).unwrap(), ["could_be_exploited", "unclear"]);
    }

    #[test]
    fn test_numericalize_training_includes_tags() {
        let device = Default::default();
        let c = corpus();
        let v = Vocabulary::from_corpus(&c, 1);
        let out = v.numericalize::<TestBackend, _>(&c, DEFAULT_MAX_CHAR_LEN, true, &device);

        assert_eq!(out.len(), 2);
        assert_eq!(out.chars[0].dims(), [3, DEFAULT_MAX_CHAR_LEN]);
        let tags = out.tags.expect("training output carries tags");
        assert_eq!(ints(tags[0].clone()), vec![1, 1, 2]);
        assert_eq!(ints(tags[1].clone()), vec![0, 1]);
        assert_eq!(ints(out.flags[0].clone()), vec![0, 0, 1]);
    }

    #[test]
    fn test_numericalize_inference_skips_tags() {
        let device = Default::default();
        let c = corpus();
        let v = Vocabulary::from_corpus(&c, 1);
        let out = v.numericalize::<TestBackend, _>(&c, 8, false, &device);
        assert!(out.tags.is_none());
        assert_eq!(out.words.len(), 2);
        assert_eq!(out.flags.len(), 2);
    }

    #[test]
    fn test_samples_match_tensors() {
        let device = Default::default();
        let c = corpus();
        let v = Vocabulary::from_corpus(&c, 1);
        let samples = v.samples(&c, 6, true);
        let out = v.numericalize::<TestBackend, _>(&c, 6, true, &device);

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].words, ints(out.words[0].clone()));
        assert_eq!(samples[1].chars, ints(out.chars[1].clone()));
        assert_eq!(samples[1].tags.as_deref(), Some(&[0, 1][..]));
    }

    /// Corpus whose flag and tag lists are shorter than its words.
    struct Ragged {
        words: Vec<Vec<String>>,
        tags:  Vec<Vec<String>>,
        flags: Vec<Vec<String>>,
    }

    impl Corpus for Ragged {
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

    #[test]
    fn test_samples_stop_at_shortest_list() {
        let sentence = |ws: &[&str]| ws.iter().map(|w| w.to_string()).collect::<Vec<_>>();
        let ragged = Ragged {
            words: vec![sentence(&["heap", "spray"]), sentence(&["rop"]), sentence(&["uaf"])],
            tags:  vec![sentence(&["unclear", "unclear"])],
            flags: vec![sentence(&["O", "O"]), sentence(&["cve"])],
        };
        let v = Vocabulary::from_corpus(&ragged, 1);

        let training = v.samples(&ragged, 4, true);
        assert_eq!(training.len(), 1);
        assert_eq!(training[0].tags.as_deref(), Some(&[1, 1][..]));

        let inference = v.samples(&ragged, 4, false);
        assert_eq!(inference.len(), 2);
        assert_eq!(inference[1].flags, vec![1]);
    }
}
