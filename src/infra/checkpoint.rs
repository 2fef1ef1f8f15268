// ============================================================
// Layer 4 - Checkpoint Manager
// ============================================================
// Saves and restores the pieces of a prepared tagger.
//
// File layout:
//   checkpoints/
//     vocab.json           ← words, chars, UNK spelling,
//                            n_train_words, embeddings
//     prepare_config.json  ← PrepareConfig used for the run
//     mlp_config.json      ← MlpConfig (architecture)
//     mlp.mpk.gz           ← MLP weights (CompactRecorder)
//
// The MLP config is saved separately because the module must
// be rebuilt with the right shape before weights are loaded
// into it.

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};

use crate::application::prepare_use_case::PrepareConfig;
use crate::data::vocab::Vocabulary;
use crate::ml::mlp::{Mlp, MlpConfig};

const VOCAB_FILE:          &str = "vocab.json";
const PREPARE_CONFIG_FILE: &str = "prepare_config.json";
const MLP_CONFIG_FILE:     &str = "mlp_config.json";
const MLP_FILE:            &str = "mlp";

/// Manages saving and loading of tagger checkpoints.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a new CheckpointManager.
    /// Creates the directory if it doesn't already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    // ─── Vocabulary ──────────────────────────────────────────────────────────

    pub fn save_vocab(&self, vocab: &Vocabulary) -> Result<()> {
        let path = self.dir.join(VOCAB_FILE);
        let json = serde_json::to_string(vocab)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write vocabulary to '{}'", path.display()))?;
        tracing::debug!("Saved {} to '{}'", vocab, path.display());
        Ok(())
    }

    pub fn load_vocab(&self) -> Result<Vocabulary> {
        let path = self.dir.join(VOCAB_FILE);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read vocabulary from '{}'", path.display()))?;
        let vocab: Vocabulary = serde_json::from_str(&json)
            .with_context(|| format!("Invalid vocabulary file '{}'", path.display()))?;
        tracing::info!("Loaded {}", vocab);
        Ok(vocab)
    }

    // ─── Configs ─────────────────────────────────────────────────────────────

    pub fn save_config(&self, cfg: &PrepareConfig) -> Result<()> {
        self.write_json(PREPARE_CONFIG_FILE, cfg)
    }

    pub fn load_config(&self) -> Result<PrepareConfig> {
        self.read_json(PREPARE_CONFIG_FILE)
    }

    pub fn save_mlp_config(&self, cfg: &MlpConfig) -> Result<()> {
        self.write_json(MLP_CONFIG_FILE, cfg)
    }

    pub fn load_mlp_config(&self) -> Result<MlpConfig> {
        self.read_json(MLP_CONFIG_FILE)
    }

    // ─── MLP weights ─────────────────────────────────────────────────────────

    /// Save MLP weights with CompactRecorder (MessagePack, gzip,
    /// half precision). The recorder adds the file extension.
    pub fn save_mlp<B: Backend>(&self, mlp: &Mlp<B>) -> Result<()> {
        let path = self.dir.join(MLP_FILE);
        CompactRecorder::new()
            .record(mlp.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save MLP to '{}'", path.display()))?;
        tracing::debug!("Saved MLP weights to '{}'", path.display());
        Ok(())
    }

    /// Load saved weights into `mlp`, which must have been built
    /// from the saved MlpConfig.
    pub fn load_mlp<B: Backend>(&self, mlp: Mlp<B>, device: &B::Device) -> Result<Mlp<B>> {
        let path = self.dir.join(MLP_FILE);
        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load MLP weights '{}'. Has the tagger been prepared?", path.display())
            })?;
        Ok(mlp.load_record(record))
    }

    /// Rebuild the MLP from its saved config and weights.
    pub fn restore_mlp<B: Backend>(&self, device: &B::Device) -> Result<Mlp<B>> {
        let cfg = self.load_mlp_config()?;
        self.load_mlp(cfg.init(device), device)
    }

    fn write_json<T: serde::Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let path = self.dir.join(name);
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;
        tracing::debug!("Saved '{}'", path.display());
        Ok(())
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, name: &str) -> Result<T> {
        let path = self.dir.join(name);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read '{}'", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Invalid JSON in '{}'", path.display()))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::corpus::TaggedCorpus;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("exploit-tagger-{name}-{}", std::process::id()));
        fs::remove_dir_all(&dir).ok();
        dir
    }

    #[test]
    fn test_vocab_round_trip() {
        let dir = scratch_dir("vocab");
        let ckpt = CheckpointManager::new(&dir);

        let corpus = TaggedCorpus::new().with_sentence(["heap", "overflow", ";"], ["unclear"; 3], ["O"; 3]);
        let mut vocab = Vocabulary::from_corpus(&corpus, 1);
        vocab.randomly_initialise_embeddings(4, true);

        ckpt.save_vocab(&vocab).unwrap();
        let loaded = ckpt.load_vocab().unwrap();

        assert_eq!(loaded.words(), vocab.words());
        assert_eq!(loaded.chars(), vocab.chars());
        assert_eq!(loaded.puncts(), vocab.puncts());
        assert_eq!(loaded.embeddings(), vocab.embeddings());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_vocab_is_an_error() {
        let dir = scratch_dir("missing");
        let ckpt = CheckpointManager::new(&dir);
        let err = ckpt.load_vocab().unwrap_err();
        assert!(err.to_string().contains("Cannot read vocabulary"));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_mlp_round_trip() {
        let dir = scratch_dir("mlp");
        let ckpt = CheckpointManager::new(&dir);
        let device = Default::default();

        let cfg = MlpConfig::new(6, 3);
        let mlp = cfg.init::<TestBackend>(&device);
        ckpt.save_mlp_config(&cfg).unwrap();
        ckpt.save_mlp(&mlp).unwrap();

        let restored = ckpt.restore_mlp::<TestBackend>(&device).unwrap();
        let a: Vec<f32> = mlp.linear.weight.val().into_data().iter::<f32>().collect();
        let b: Vec<f32> = restored.linear.weight.val().into_data().iter::<f32>().collect();
        assert_eq!(a.len(), b.len());
        // CompactRecorder stores half precision
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-2);
        }
        fs::remove_dir_all(&dir).ok();
    }
}
