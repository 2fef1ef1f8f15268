// ============================================================
// Layer 4 - Infrastructure Layer
// ============================================================
// Persistence for everything the tagger needs to rebuild
// itself at inference time:
//
//   checkpoint.rs - vocabulary state (JSON), MLP config
//                   (JSON) and MLP weights (Burn's
//                   CompactRecorder), all in one directory.
//
// Reference: Burn Book §5 (Records and Checkpointing)

/// Vocabulary and model checkpoint saving and loading
pub mod checkpoint;
