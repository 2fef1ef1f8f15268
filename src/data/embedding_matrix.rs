// ============================================================
// Layer 2 - Word Embedding Matrix
// ============================================================
// One row per word id. Built either from a pretrained source
// (`Vocabulary::read_embeddings`) or from scratch
// (`Vocabulary::randomly_initialise_embeddings`), and handed to
// the model as a Burn tensor via `to_tensor`.
//
// Smoothing divides the whole matrix by its global standard
// deviation (unbiased, n - 1). There is no guard against a
// zero deviation: a constant matrix smooths to NaN/inf.

use burn::{prelude::*, tensor::TensorData};
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::data::vocab::Vocabulary;
use crate::domain::traits::EmbeddingSource;
use crate::errors::{Result, TaggerError};

/// Dense row-major `[rows, dim]` matrix of f32.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingMatrix {
    rows:   usize,
    dim:    usize,
    values: Vec<f32>,
}

impl EmbeddingMatrix {
    /// Uniform samples in `[0, 1)`.
    pub fn uniform(rows: usize, dim: usize) -> Self {
        let mut rng = rand::thread_rng();
        let values = (0..rows * dim).map(|_| rng.gen::<f32>()).collect();
        Self { rows, dim, values }
    }

    /// Standard normal samples.
    pub fn normal(rows: usize, dim: usize) -> Self {
        let mut rng = rand::thread_rng();
        let values = (0..rows * dim).map(|_| rng.sample::<f32, _>(StandardNormal)).collect();
        Self { rows, dim, values }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn row(&self, i: usize) -> &[f32] {
        &self.values[i * self.dim..(i + 1) * self.dim]
    }

    /// Overwrite row `i`. `vector` must have `dim` entries.
    pub fn set_row(&mut self, i: usize, vector: &[f32]) {
        self.values[i * self.dim..(i + 1) * self.dim].copy_from_slice(vector);
    }

    /// Global sample standard deviation.
    pub fn std(&self) -> f32 {
        let n = self.values.len() as f64;
        let mean = self.values.iter().map(|&x| x as f64).sum::<f64>() / n;
        let ss: f64 = self
            .values
            .iter()
            .map(|&x| {
                let d = x as f64 - mean;
                d * d
            })
            .sum();
        (ss / (n - 1.0)).sqrt() as f32
    }

    /// Divide every entry by the global standard deviation.
    pub fn smooth(&mut self) {
        let std = self.std();
        self.values.iter_mut().for_each(|x| *x /= std);
    }

    /// Copy into a `[rows, dim]` float tensor on `device`.
    pub fn to_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 2> {
        Tensor::from_data(
            TensorData::new(self.values.clone(), [self.rows, self.dim]),
            device,
        )
    }
}

// ─── Vocabulary integration ──────────────────────────────────────────────────
impl Vocabulary {
    /// Merge a pretrained embedding table into the vocabulary.
    ///
    /// Steps:
    ///   1. Adopt the source's UNK spelling, if it has one
    ///   2. Extend the vocabulary with every source token
    ///   3. Fill a `[n_words, dim]` matrix with uniform noise
    ///   4. Copy pretrained vectors over the rows they cover
    ///   5. Optionally smooth
    ///
    /// The steps run on a staged copy. On error `self` is left
    /// exactly as it was.
    pub fn read_embeddings<E>(&mut self, embed: &E, smooth: bool) -> Result<()>
    where
        E: EmbeddingSource + ?Sized,
    {
        // The old matrix is replaced anyway, keep it out of the copy.
        let previous = self.replace_embeddings(None);
        let mut staged = self.clone();
        self.replace_embeddings(previous);

        if let Some(unk) = embed.unk() {
            staged.adopt_unk(unk);
        }
        staged.extend(embed.tokens());

        let dim = embed.dim();
        let mut matrix = EmbeddingMatrix::uniform(staged.n_words(), dim);
        let mut covered = 0usize;
        for (i, word) in staged.words().iter().enumerate() {
            if let Some(vector) = embed.vector(word) {
                if vector.len() != dim {
                    return Err(TaggerError::EmbeddingDim {
                        token: word.clone(),
                        expected: dim,
                        found: vector.len(),
                    });
                }
                matrix.set_row(i, vector);
                covered += 1;
            }
        }
        if smooth {
            matrix.smooth();
        }

        tracing::info!(
            "Read {}-dim embeddings: {} of {} words pretrained ({} from training data)",
            dim,
            covered,
            staged.n_words(),
            staged.n_train_words()
        );
        staged.set_embeddings(matrix);
        *self = staged;
        Ok(())
    }

    /// Standard-normal `[n_words, n_dim]` embeddings.
    pub fn randomly_initialise_embeddings(&mut self, n_dim: usize, smooth: bool) {
        let mut matrix = EmbeddingMatrix::normal(self.n_words(), n_dim);
        if smooth {
            matrix.smooth();
        }
        tracing::debug!("Randomly initialised {}x{} embeddings", self.n_words(), n_dim);
        self.set_embeddings(matrix);
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::embedding::PretrainedEmbeddings;
    use crate::domain::labels::UNK;
    use burn::backend::NdArray;

    fn vocab() -> Vocabulary {
        Vocabulary::new(["buffer", "overflow"], "bufferoverflow".chars())
    }

    #[test]
    fn test_random_embeddings_smooth_to_unit_std() {
        let mut v = vocab();
        v.randomly_initialise_embeddings(50, true);
        let e = v.embeddings().unwrap();
        assert_eq!((e.rows(), e.dim()), (v.n_words(), 50));
        assert!((e.std() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_unsmoothed_random_embeddings_keep_shape() {
        let mut v = vocab();
        v.randomly_initialise_embeddings(8, false);
        assert_eq!(v.embeddings().unwrap().values().len(), v.n_words() * 8);
    }

    #[test]
    fn test_read_embeddings_extends_and_copies_rows() {
        let mut v = vocab();
        let embed = PretrainedEmbeddings::from_pairs(
            3,
            None,
            [("overflow", vec![1.0, 2.0, 3.0]), ("heap", vec![4.0, 5.0, 6.0])],
        )
        .unwrap();

        v.read_embeddings(&embed, false).unwrap();

        let heap = v.word_id("heap").unwrap();
        assert_eq!(heap, v.n_words() - 1);
        assert_eq!(v.n_train_words(), 4);

        let e = v.embeddings().unwrap();
        assert_eq!(e.rows(), v.n_words());
        assert_eq!(e.row(v.word_id("overflow").unwrap()), &[1.0, 2.0, 3.0]);
        assert_eq!(e.row(heap), &[4.0, 5.0, 6.0]);
        // rows without a pretrained vector hold uniform noise
        assert!(e.row(v.word_id("buffer").unwrap()).iter().all(|x| (0.0..1.0).contains(x)));
    }

    #[test]
    fn test_read_embeddings_adopts_pretrained_unk() {
        let mut v = vocab();
        let embed = PretrainedEmbeddings::from_pairs(2, Some("<unk>"), [("<unk>", vec![9.0, 9.0])]).unwrap();

        v.read_embeddings(&embed, false).unwrap();

        assert_eq!(v.unk_token(), "<unk>");
        assert_eq!(v.word_id("<unk>"), Some(v.unk_index()));
        assert_eq!(v.word_id(UNK), None);
        assert_eq!(v.embeddings().unwrap().row(1), &[9.0, 9.0]);
        assert_eq!(v.word_ids(&["never-seen"]), vec![1]);
    }

    #[test]
    fn test_read_embeddings_smooths() {
        let mut v = vocab();
        let embed = PretrainedEmbeddings::from_pairs(4, None, [("stack", vec![10.0, -10.0, 3.0, 0.5])]).unwrap();
        v.read_embeddings(&embed, true).unwrap();
        assert!((v.embeddings().unwrap().std() - 1.0).abs() < 1e-4);
    }

    /// Source that hands out a vector shorter than its declared dim.
    struct ShortVectors {
        tokens: Vec<String>,
        short:  Vec<f32>,
    }

    impl EmbeddingSource for ShortVectors {
        fn unk(&self) -> Option<&str> {
            Some("unk")
        }

        fn dim(&self) -> usize {
            3
        }

        fn vector(&self, token: &str) -> Option<&[f32]> {
            (token == "x").then_some(self.short.as_slice())
        }

        fn tokens(&self) -> &[String] {
            &self.tokens
        }
    }

    #[test]
    fn test_failed_read_leaves_vocab_untouched() {
        let mut v = vocab();
        v.randomly_initialise_embeddings(3, false);
        let words = v.words().to_vec();
        let chars = v.chars().to_vec();
        let matrix = v.embeddings().cloned();

        let source = ShortVectors {
            tokens: vec!["x".into(), "y".into()],
            short:  vec![1.0],
        };
        let err = v.read_embeddings(&source, false).unwrap_err();

        assert!(matches!(err, TaggerError::EmbeddingDim { expected: 3, found: 1, .. }));
        assert_eq!(v.words(), words.as_slice());
        assert_eq!(v.chars(), chars.as_slice());
        assert_eq!(v.unk_token(), UNK);
        assert_eq!(v.word_id("x"), None);
        assert_eq!(v.embeddings().cloned(), matrix);
    }

    #[test]
    fn test_constant_matrix_smooths_to_non_finite() {
        let mut m = EmbeddingMatrix { rows: 2, dim: 2, values: vec![3.0; 4] };
        assert_eq!(m.std(), 0.0);
        m.smooth();
        assert!(m.values().iter().all(|x| !x.is_finite()));
    }

    #[test]
    fn test_to_tensor_shape() {
        let device = Default::default();
        let mut v = vocab();
        v.randomly_initialise_embeddings(6, false);
        let t = v.embeddings().unwrap().to_tensor::<NdArray>(&device);
        assert_eq!(t.dims(), [v.n_words(), 6]);
    }
}
