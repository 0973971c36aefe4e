//! Flat f32 slice math for the parity harness.
//!
//! All operations are free functions on flat slices with explicit dimensions.
//! Row-major layout throughout; shape agreement is checked with
//! `debug_assert!` so release builds pay nothing.

/// Matrix multiply: C[M,N] = A[M,K] @ B[K,N].
/// `out` must be pre-allocated with M*N elements (overwritten).
pub fn matmul_f32(a: &[f32], b: &[f32], out: &mut [f32], m: usize, k: usize, n: usize) {
    debug_assert_eq!(a.len(), m * k);
    debug_assert_eq!(b.len(), k * n);
    debug_assert_eq!(out.len(), m * n);

    for i in 0..m {
        for j in 0..n {
            let mut sum = 0.0f32;
            for p in 0..k {
                sum += a[i * k + p] * b[p * n + j];
            }
            out[i * n + j] = sum;
        }
    }
}

/// Transpose A[M,K] → out[K,M].
pub fn transpose_f32(a: &[f32], out: &mut [f32], m: usize, k: usize) {
    debug_assert_eq!(a.len(), m * k);
    debug_assert_eq!(out.len(), k * m);

    for i in 0..m {
        for j in 0..k {
            out[j * m + i] = a[i * k + j];
        }
    }
}

/// Affine layer forward: out[R,O] = X[R,I] @ W[I,O] + b[O] broadcast per row.
pub fn linear_forward(x: &[f32], w: &[f32], b: &[f32], out: &mut [f32], rows: usize, i_dim: usize, o_dim: usize) {
    debug_assert_eq!(b.len(), o_dim);
    matmul_f32(x, w, out, rows, i_dim, o_dim);
    for r in 0..rows {
        for j in 0..o_dim {
            out[r * o_dim + j] += b[j];
        }
    }
}

/// Mean cross-entropy over `rows` rows of `classes` logits each, with
/// integer targets. Numerically stable log-sum-exp per row.
pub fn cross_entropy_loss(logits: &[f32], targets: &[usize], rows: usize, classes: usize) -> f32 {
    debug_assert_eq!(logits.len(), rows * classes);
    debug_assert_eq!(targets.len(), rows);
    if rows == 0 {
        return 0.0;
    }

    let mut total = 0.0f32;
    for r in 0..rows {
        let row = &logits[r * classes..(r + 1) * classes];
        let max_val = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let mut sum_exp = 0.0f32;
        for &z in row {
            sum_exp += (z - max_val).exp();
        }
        total += sum_exp.ln() + max_val - row[targets[r]];
    }
    total / rows as f32
}

/// Cross-entropy gradient w.r.t. logits: (softmax(row) - one_hot(target)) / rows.
/// `d_logits` must be pre-allocated with rows*classes elements (overwritten).
pub fn cross_entropy_backward(
    logits: &[f32],
    targets: &[usize],
    d_logits: &mut [f32],
    rows: usize,
    classes: usize,
) {
    debug_assert_eq!(logits.len(), rows * classes);
    debug_assert_eq!(targets.len(), rows);
    debug_assert_eq!(d_logits.len(), rows * classes);
    if rows == 0 {
        return;
    }

    let inv_rows = 1.0 / rows as f32;
    for r in 0..rows {
        let base = r * classes;
        let row = &logits[base..base + classes];
        let max_val = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let mut sum_exp = 0.0f32;
        for j in 0..classes {
            let e = (row[j] - max_val).exp();
            d_logits[base + j] = e;
            sum_exp += e;
        }
        for j in 0..classes {
            d_logits[base + j] /= sum_exp;
        }
        d_logits[base + targets[r]] -= 1.0;
        for j in 0..classes {
            d_logits[base + j] *= inv_rows;
        }
    }
}

/// Count rows whose argmax logit equals the target class.
/// Ties resolve to the lowest index, matching a plain argmax scan.
pub fn count_correct(logits: &[f32], targets: &[usize], rows: usize, classes: usize) -> usize {
    debug_assert_eq!(logits.len(), rows * classes);
    debug_assert_eq!(targets.len(), rows);

    let mut correct = 0;
    for r in 0..rows {
        let row = &logits[r * classes..(r + 1) * classes];
        let mut best = 0;
        for j in 1..classes {
            if row[j] > row[best] {
                best = j;
            }
        }
        if best == targets[r] {
            correct += 1;
        }
    }
    correct
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matmul_identity() {
        let a = [1.0, 0.0, 0.0, 1.0f32];
        let b = [1.0, 2.0, 3.0, 4.0f32];
        let mut out = [0.0f32; 4];
        matmul_f32(&a, &b, &mut out, 2, 2, 2);
        assert_eq!(out, b);
    }

    #[test]
    fn test_matmul_2x3_3x2() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0f32];
        let b = [7.0, 8.0, 9.0, 10.0, 11.0, 12.0f32];
        let mut out = [0.0f32; 4];
        matmul_f32(&a, &b, &mut out, 2, 3, 2);
        assert_eq!(out, [58.0, 64.0, 139.0, 154.0]);
    }

    #[test]
    fn test_transpose() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0f32];
        let mut out = [0.0f32; 6];
        transpose_f32(&a, &mut out, 2, 3);
        assert_eq!(out, [1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }

    #[test]
    fn test_linear_forward_bias() {
        // 1x2 input, identity-ish weights, bias shifts each output.
        let x = [1.0, 2.0f32];
        let w = [1.0, 0.0, 0.0, 1.0f32]; // [2,2]
        let b = [10.0, 20.0f32];
        let mut out = [0.0f32; 2];
        linear_forward(&x, &w, &b, &mut out, 1, 2, 2);
        assert_eq!(out, [11.0, 22.0]);
    }

    #[test]
    fn test_cross_entropy_uniform_logits() {
        let logits = [0.0f32; 4]; // 2 rows, 2 classes
        let targets = [0usize, 1];
        let loss = cross_entropy_loss(&logits, &targets, 2, 2);
        let expected = (2.0f32).ln();
        assert!(
            (loss - expected).abs() < 1e-6,
            "uniform logits should give loss ln(2)={}, got {}",
            expected,
            loss
        );
    }

    #[test]
    fn test_cross_entropy_confident_correct() {
        let logits = [10.0, -10.0, -10.0, 10.0f32];
        let targets = [0usize, 1];
        let loss = cross_entropy_loss(&logits, &targets, 2, 2);
        assert!(loss < 1e-3, "confident correct prediction, got loss {}", loss);
    }

    #[test]
    fn test_cross_entropy_empty_batch() {
        let loss = cross_entropy_loss(&[], &[], 0, 2);
        assert_eq!(loss, 0.0);
    }

    #[test]
    fn test_cross_entropy_backward_rows_sum_to_zero() {
        // softmax - one_hot sums to zero per row.
        let logits = [0.3, -1.2, 2.0, 0.5f32];
        let targets = [1usize, 0];
        let mut d = [0.0f32; 4];
        cross_entropy_backward(&logits, &targets, &mut d, 2, 2);
        assert!((d[0] + d[1]).abs() < 1e-6);
        assert!((d[2] + d[3]).abs() < 1e-6);
        // gradient at the target position is negative
        assert!(d[1] < 0.0);
        assert!(d[2] < 0.0);
    }

    #[test]
    fn test_count_correct() {
        let logits = [1.0, 0.0, 0.0, 1.0, 2.0, 3.0f32]; // argmax: 0, 1, 1
        let targets = [0usize, 1, 0];
        assert_eq!(count_correct(&logits, &targets, 3, 2), 2);
    }
}
