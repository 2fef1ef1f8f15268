// ============================================================
// Layer 2 - Data Pipeline
// ============================================================
// Everything between a tagged corpus and model-ready tensors.
//
//   Corpus (domain)
//       │
//       ▼
//   Vocabulary        → word/char/tag/flag tables, extension
//       │
//       ├──► numericalize  → per-sentence Int tensors
//       │
//       ├──► embeddings    → [n_words, dim] matrix
//       │
//       ▼
//   TaggedDataset     → implements Burn's Dataset trait
//       │
//       ▼
//   TaggingBatcher    → pads sentences into batch tensors
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Vocabulary tables, id lookups and extension
pub mod vocab;

/// Tensor encoding of sequences and corpora
pub mod numericalize;

/// Word embedding matrix and its initialisation
pub mod embedding_matrix;

/// Implements Burn's Dataset trait for numericalized sentences
pub mod dataset;

/// Implements Burn's Batcher trait with per-batch padding
pub mod batcher;
