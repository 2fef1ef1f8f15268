use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

/// One numericalized sentence.
///
/// `chars` is row-major `[words.len(), max_char_len]`.
/// `tags` is `None` for inference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedSample {
    pub words:        Vec<i64>,
    pub chars:        Vec<i64>,
    pub max_char_len: usize,
    pub flags:        Vec<i64>,
    pub tags:         Option<Vec<i64>>,
}

impl TaggedSample {
    pub fn seq_len(&self) -> usize {
        self.words.len()
    }

    /// Char ids of the `i`-th word.
    pub fn char_row(&self, i: usize) -> &[i64] {
        &self.chars[i * self.max_char_len..(i + 1) * self.max_char_len]
    }
}

pub struct TaggedDataset {
    samples: Vec<TaggedSample>,
}

impl TaggedDataset {
    pub fn new(samples: Vec<TaggedSample>) -> Self { Self { samples } }

    pub fn sample_count(&self) -> usize { self.samples.len() }

    pub fn token_count(&self) -> usize {
        self.samples.iter().map(TaggedSample::seq_len).sum()
    }
}

impl Dataset<TaggedSample> for TaggedDataset {
    fn get(&self, index: usize) -> Option<TaggedSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(n: usize) -> TaggedSample {
        TaggedSample {
            words:        vec![2; n],
            chars:        (0..n as i64 * 2).collect(),
            max_char_len: 2,
            flags:        vec![0; n],
            tags:         None,
        }
    }

    #[test]
    fn test_dataset_access() {
        let ds = TaggedDataset::new(vec![sample(3), sample(1)]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.sample_count(), 2);
        assert_eq!(ds.token_count(), 4);
        assert_eq!(ds.get(1), Some(sample(1)));
        assert!(ds.get(2).is_none());
    }

    #[test]
    fn test_char_row() {
        let s = sample(3);
        assert_eq!(s.char_row(1), &[2, 3]);
    }
}
