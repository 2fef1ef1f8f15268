// ============================================================
// Layer 3 - ML / Model Layer (Burn)
// ============================================================
// Burn modules used by the tagger.
//
//   mlp.rs   - the projection block: dropout, affine map
//              to n_hidden, leaky ReLU (slope 0.1)
//
//   init.rs  - orthogonal weight initialisation used by
//              the projection block
//
// Reference: Burn Book §3 (Building Blocks)
//            Saxe et al. (2014) Exact solutions to the
//            nonlinear dynamics of learning in deep linear
//            neural networks (orthogonal init)

/// Projection block (MLP)
pub mod mlp;

/// Orthogonal initialisation
pub mod init;
