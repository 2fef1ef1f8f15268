// ============================================================
// Layer 1 - Domain Layer
// ============================================================
// Plain Rust types and traits describing what the tagger
// consumes: tagged corpora, pretrained embedding sources and
// the fixed label sets.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain structs, constants and traits
//
// The corpus reader and the embedding file reader live
// outside this crate. They only need to implement the traits
// in `traits.rs` to plug into the vocabulary.

/// Sentinel tokens, tag labels and CVE flags
pub mod labels;

/// Core abstractions implemented by external collaborators
pub mod traits;

/// In-memory tagged corpus
pub mod corpus;

/// In-memory pretrained embedding table
pub mod embedding;
