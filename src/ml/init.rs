// ============================================================
// Layer 3 - Orthogonal Initialisation
// ============================================================
// Draws a standard-normal matrix and orthonormalises it with
// modified Gram-Schmidt, then scales by `gain`.
//
// For a [rows, cols] matrix:
//   rows >= cols  →  orthonormal columns  (Wᵀ W = I)
//   rows <  cols  →  orthonormal rows     (W Wᵀ = I)

use burn::{prelude::*, tensor::TensorData};
use rand::Rng;
use rand_distr::StandardNormal;

/// Orthogonal `[rows, cols]` float tensor.
pub fn orthogonal<B: Backend>(rows: usize, cols: usize, gain: f64, device: &B::Device) -> Tensor<B, 2> {
    Tensor::from_data(
        TensorData::new(orthogonal_values(rows, cols, gain), [rows, cols]),
        device,
    )
}

/// Row-major values of an orthogonal `[rows, cols]` matrix.
pub fn orthogonal_values(rows: usize, cols: usize, gain: f64) -> Vec<f32> {
    // Orthonormalise the shorter side: `count` vectors of length `len`.
    let transposed   = rows < cols;
    let (len, count) = if transposed { (cols, rows) } else { (rows, cols) };

    let mut rng = rand::thread_rng();
    let mut basis: Vec<Vec<f64>> = Vec::with_capacity(count);
    while basis.len() < count {
        let mut v: Vec<f64> = (0..len).map(|_| rng.sample(StandardNormal)).collect();
        for b in &basis {
            let dot: f64 = v.iter().zip(b).map(|(x, y)| x * y).sum();
            v.iter_mut().zip(b).for_each(|(x, y)| *x -= dot * y);
        }
        let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
        // resample the (vanishingly rare) near-dependent draw
        if norm < 1e-6 {
            continue;
        }
        v.iter_mut().for_each(|x| *x /= norm);
        basis.push(v);
    }

    let mut out = vec![0f32; rows * cols];
    for (k, v) in basis.iter().enumerate() {
        for (i, x) in v.iter().enumerate() {
            let (r, c) = if transposed { (k, i) } else { (i, k) };
            out[r * cols + c] = (gain * x) as f32;
        }
    }
    out
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    /// Gram matrix of the shorter side, which must be the identity.
    fn assert_orthonormal(values: &[f32], rows: usize, cols: usize) {
        let at = |r: usize, c: usize| values[r * cols + c] as f64;
        // vector k, component i
        let get = |k: usize, i: usize| if rows >= cols { at(i, k) } else { at(k, i) };
        let (n, m) = if rows >= cols { (cols, rows) } else { (rows, cols) };
        for a in 0..n {
            for b in 0..n {
                let dot: f64 = (0..m).map(|i| get(a, i) * get(b, i)).sum();
                let expected = if a == b { 1.0 } else { 0.0 };
                assert!((dot - expected).abs() < 1e-4, "gram[{a}][{b}] = {dot}");
            }
        }
    }

    #[test]
    fn test_tall_matrix_has_orthonormal_columns() {
        let w = orthogonal_values(16, 5, 1.0);
        assert_eq!(w.len(), 80);
        assert_orthonormal(&w, 16, 5);
    }

    #[test]
    fn test_wide_matrix_has_orthonormal_rows() {
        let w = orthogonal_values(3, 12, 1.0);
        assert_orthonormal(&w, 3, 12);
    }

    #[test]
    fn test_square_matrix() {
        let w = orthogonal_values(7, 7, 1.0);
        assert_orthonormal(&w, 7, 7);
    }

    #[test]
    fn test_gain_scales_norms() {
        let w = orthogonal_values(10, 1, 2.0);
        let norm: f32 = w.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_empty_shapes() {
        assert!(orthogonal_values(0, 4, 1.0).is_empty());
        assert!(orthogonal_values(4, 0, 1.0).is_empty());
    }
}
