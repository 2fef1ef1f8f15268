// ============================================================
// Layer 5 - PrepareUseCase
// ============================================================
// Runs the preparation pipeline in order:
//
//   Step 1: Build vocabulary from the corpus   (data)
//   Step 2: Pretrained or random embeddings    (data)
//   Step 3: Numericalize into a dataset        (data)
//   Step 4: Build the projection block         (ml)
//   Step 5: Save vocab, configs and weights    (infra)
//
// The training loop itself lives outside this crate; it picks
// up the returned `Prepared` value.

use anyhow::{Context, Result};
use burn::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data::{dataset::TaggedDataset, vocab::Vocabulary};
use crate::domain::labels::DEFAULT_MAX_CHAR_LEN;
use crate::domain::traits::{Corpus, EmbeddingSource};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::mlp::{Mlp, MlpConfig};

// ─── Preparation Configuration ───────────────────────────────────────────────
// Serialisable so the exact settings of a run are saved next
// to its checkpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepareConfig {
    pub checkpoint_dir: String,
    pub min_freq:       usize,
    pub max_char_len:   usize,
    /// Used only when no pretrained embeddings are supplied.
    pub embed_dim:      usize,
    pub smooth:         bool,
    pub n_hidden:       usize,
    pub dropout:        f64,
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            checkpoint_dir: "checkpoints".to_string(),
            min_freq:       2,
            max_char_len:   DEFAULT_MAX_CHAR_LEN,
            embed_dim:      100,
            smooth:         true,
            n_hidden:       200,
            dropout:        0.2,
        }
    }
}

/// Output of a preparation run.
pub struct Prepared<B: Backend> {
    pub vocab:   Vocabulary,
    pub dataset: TaggedDataset,
    pub mlp:     Mlp<B>,
}

// ─── PrepareUseCase ──────────────────────────────────────────────────────────
pub struct PrepareUseCase {
    config: PrepareConfig,
}

impl PrepareUseCase {
    pub fn new(config: PrepareConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PrepareConfig {
        &self.config
    }

    /// Execute the full preparation pipeline end to end.
    pub fn execute<B, C>(
        &self,
        corpus:     &C,
        pretrained: Option<&dyn EmbeddingSource>,
        device:     &B::Device,
    ) -> Result<Prepared<B>>
    where
        B: Backend,
        C: Corpus + ?Sized,
    {
        let cfg = &self.config;

        // ── Step 1: Vocabulary ────────────────────────────────────────────────
        tracing::info!("Building vocabulary from {} sentences", corpus.len());
        let mut vocab = Vocabulary::from_corpus(corpus, cfg.min_freq);

        // ── Step 2: Embeddings ────────────────────────────────────────────────
        match pretrained {
            Some(embed) => vocab
                .read_embeddings(embed, cfg.smooth)
                .context("Cannot merge pretrained embeddings")?,
            None => vocab.randomly_initialise_embeddings(cfg.embed_dim, cfg.smooth),
        }
        let embed_dim = vocab
            .embeddings()
            .map(|e| e.dim())
            .unwrap_or(cfg.embed_dim);

        // ── Step 3: Dataset ───────────────────────────────────────────────────
        let dataset = TaggedDataset::new(vocab.samples(corpus, cfg.max_char_len, true));
        tracing::info!(
            "Dataset ready: {} sentences, {} tokens",
            dataset.sample_count(),
            dataset.token_count()
        );

        // ── Step 4: Projection block ──────────────────────────────────────────
        let mlp_cfg = MlpConfig::new(embed_dim, cfg.n_hidden).with_dropout(cfg.dropout);
        let mlp: Mlp<B> = mlp_cfg.init(device);
        tracing::info!("MLP ready: {} → {}", embed_dim, cfg.n_hidden);

        // ── Step 5: Persist ───────────────────────────────────────────────────
        let ckpt = CheckpointManager::new(&cfg.checkpoint_dir);
        ckpt.save_config(cfg)?;
        ckpt.save_vocab(&vocab)?;
        ckpt.save_mlp_config(&mlp_cfg)?;
        ckpt.save_mlp(&mlp)?;
        tracing::info!("Checkpoint written to '{}'", cfg.checkpoint_dir);

        Ok(Prepared { vocab, dataset, mlp })
    }
}
