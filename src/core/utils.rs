//! Helper routines shared by the simulation core:
//! - Operator expansion from local qubits to the full system.
//! - Outer products and traces.
//! - Completeness checks for measurements and channels.

use ndarray::{Array1, Array2};
use num_complex::Complex64;

/// Computes the trace of a matrix (sum of diagonal elements).
pub fn trace(matrix: &Array2<Complex64>) -> Complex64 {
    matrix.diag().sum()
}

/// Computes the outer product of two vectors $|a\rangle\langle b|$.
pub fn outer_product(a: &Array1<Complex64>, b: &Array1<Complex64>) -> Array2<Complex64> {
    let n = a.len();
    let m = b.len();
    let mut res = Array2::zeros((n, m));

    for i in 0..n {
        for j in 0..m {
            res[[i, j]] = a[i] * b[j].conj();
        }
    }
    res
}

/// Embeds a local operator into the full $2^N \times 2^N$ system space.
///
/// The operator acts on the qubits listed in `targets` (little-endian: the
/// i-th bit of a local index belongs to `targets[i]`) and as identity on
/// every other qubit.
pub fn expand_operator(
    num_total_qubits: usize,
    matrix: &Array2<Complex64>,
    targets: &[usize],
) -> Array2<Complex64> {
    let dim = 1 << num_total_qubits;
    let mut full_matrix = Array2::<Complex64>::zeros((dim, dim));

    let mut target_mask = 0usize;
    for &t in targets {
        target_mask |= 1 << t;
    }
    // Bits outside the targets pass through untouched.
    let passive_mask = !target_mask;

    for col_idx in 0..dim {
        // Local column index: the target bits of this basis state.
        let small_col = extract_bits(col_idx, targets);

        for small_row in 0..matrix.nrows() {
            let val = matrix[[small_row, small_col]];
            if val.norm_sqr() < f64::EPSILON {
                continue;
            }
            // Scatter the local row bits back to their physical positions.
            let row_idx = (col_idx & passive_mask) | deposit_bits(small_row, targets);
            full_matrix[[row_idx, col_idx]] = val;
        }
    }
    full_matrix
}

/// Gathers the bits of `value` at the positions in `indices` into a compact index.
fn extract_bits(value: usize, indices: &[usize]) -> usize {
    let mut result = 0;
    for (i, &pos) in indices.iter().enumerate() {
        if (value >> pos) & 1 == 1 {
            result |= 1 << i;
        }
    }
    result
}

/// Scatters the bits of `compact_value` to the positions in `indices`.
fn deposit_bits(compact_value: usize, indices: &[usize]) -> usize {
    let mut result = 0;
    for (i, &pos) in indices.iter().enumerate() {
        if (compact_value >> i) & 1 == 1 {
            result |= 1 << pos;
        }
    }
    result
}

/// Finds the first repeated index in a slice, if any.
pub fn find_duplicate(indices: &[usize]) -> Option<usize> {
    let mut seen = std::collections::HashSet::new();
    indices.iter().find(|&&idx| !seen.insert(idx)).copied()
}

/// Checks the completeness relation $\sum M_k^\dagger M_k = I$.
pub fn check_completeness(ops: &[Array2<Complex64>], dim: usize) -> bool {
    let eye = Array2::<Complex64>::eye(dim);
    let sum = ops
        .iter()
        .fold(Array2::<Complex64>::zeros((dim, dim)), |acc, op| {
            let dag = op.t().mapv(|c| c.conj());
            acc + dag.dot(op)
        });
    sum.iter()
        .zip(eye.iter())
        .all(|(a, b)| (a - b).norm() < 1e-9)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.0)
    }

    #[test]
    fn expand_keeps_identity_on_passive_qubits() {
        // X on qubit 1 of a 2-qubit system swaps |00>/|10> and |01>/|11>.
        let x = arr2(&[[c(0.0), c(1.0)], [c(1.0), c(0.0)]]);
        let full = expand_operator(2, &x, &[1]);

        assert_eq!(full[[2, 0]], c(1.0));
        assert_eq!(full[[0, 2]], c(1.0));
        assert_eq!(full[[3, 1]], c(1.0));
        assert_eq!(full[[1, 3]], c(1.0));
        assert_eq!(full[[0, 0]], c(0.0));
    }

    #[test]
    fn duplicate_detection() {
        assert_eq!(find_duplicate(&[0, 1, 2]), None);
        assert_eq!(find_duplicate(&[0, 1, 1]), Some(1));
    }

    #[test]
    fn projector_pair_is_complete() {
        let p0 = arr2(&[[c(1.0), c(0.0)], [c(0.0), c(0.0)]]);
        let p1 = arr2(&[[c(0.0), c(0.0)], [c(0.0), c(1.0)]]);
        assert!(check_completeness(&[p0.clone(), p1], 2));
        assert!(!check_completeness(&[p0], 2));
    }
}
