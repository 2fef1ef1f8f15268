// ============================================================
// Layer 5 - Application / Use Cases
// ============================================================
// Orchestrates the other layers to get from a tagged corpus
// to everything a training loop needs.
//
// Rules for this layer:
//   - No tensor math here (that's the ml layer)
//   - No file formats here (that's infra)
//   - Only workflow coordination

// Corpus → vocabulary, embeddings, dataset and MLP
pub mod prepare_use_case;
