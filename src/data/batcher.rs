// ============================================================
// Layer 2 - Tagging Batcher
// ============================================================
// Implements Burn's Batcher trait to stack variable-length
// TaggedSamples into padded tensors.
//
// Sentences differ in length, so every sample is right-padded
// with PAD (id 0) up to the longest sentence in the batch:
//
//   words  [batch, seq]
//   chars  [batch, seq, max_char_len]
//   flags  [batch, seq]
//   mask   [batch, seq]        1 = real token, 0 = padding
//   tags   [batch, seq]        only if every sample has tags
//
// Padded tag positions hold id 0; callers must apply `mask`
// before computing a loss.

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
    tensor::TensorData,
};

use crate::data::dataset::TaggedSample;
use crate::domain::labels::PAD_INDEX;

// ─── TaggingBatch ────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct TaggingBatch<B: Backend> {
    pub words: Tensor<B, 2, Int>,
    pub chars: Tensor<B, 3, Int>,
    pub flags: Tensor<B, 2, Int>,
    pub mask:  Tensor<B, 2, Int>,
    pub tags:  Option<Tensor<B, 2, Int>>,
}

// ─── TaggingBatcher ──────────────────────────────────────────────────────────
/// Holds the target device so tensors are created on the
/// correct GPU/CPU.
#[derive(Clone, Debug)]
pub struct TaggingBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> TaggingBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<TaggedSample, TaggingBatch<B>> for TaggingBatcher<B> {
    fn batch(&self, items: Vec<TaggedSample>) -> TaggingBatch<B> {
        let batch_size = items.len();
        let seq_len    = items.iter().map(TaggedSample::seq_len).max().unwrap_or(0);
        let char_len   = items.iter().map(|s| s.max_char_len).max().unwrap_or(0);
        let pad        = PAD_INDEX as i64;

        let mut words = vec![pad; batch_size * seq_len];
        let mut flags = vec![pad; batch_size * seq_len];
        let mut mask  = vec![0i64; batch_size * seq_len];
        let mut chars = vec![pad; batch_size * seq_len * char_len];

        for (b, sample) in items.iter().enumerate() {
            let row = b * seq_len;
            let n   = sample.seq_len();
            words[row..row + n].copy_from_slice(&sample.words);
            flags[row..row + n].copy_from_slice(&sample.flags);
            mask[row..row + n].fill(1);

            for t in 0..n {
                let src   = sample.char_row(t);
                let start = (row + t) * char_len;
                chars[start..start + src.len()].copy_from_slice(src);
            }
        }

        // Tags only make sense if the whole batch is labelled
        let tags = items
            .iter()
            .map(|s| s.tags.as_deref())
            .collect::<Option<Vec<&[i64]>>>()
            .map(|all| {
                let mut flat = vec![pad; batch_size * seq_len];
                for (b, t) in all.into_iter().enumerate() {
                    flat[b * seq_len..b * seq_len + t.len()].copy_from_slice(t);
                }
                self.int_tensor([batch_size, seq_len], flat)
            });

        TaggingBatch {
            words: self.int_tensor([batch_size, seq_len], words),
            chars: self.int_tensor([batch_size, seq_len, char_len], chars),
            flags: self.int_tensor([batch_size, seq_len], flags),
            mask:  self.int_tensor([batch_size, seq_len], mask),
            tags,
        }
    }
}

impl<B: Backend> TaggingBatcher<B> {
    fn int_tensor<const D: usize>(&self, shape: [usize; D], values: Vec<i64>) -> Tensor<B, D, Int> {
        Tensor::from_data(TensorData::new(values, shape), &self.device)
    }
}
