use std::borrow::Cow;
use std::f64::consts::PI;

use serde::{
    Deserialize,
    Serialize
};

use crate::math::matherror::MathError;

// ─────────────────────────────────────────────
// Node distributions
// ─────────────────────────────────────────────
//
// All selectors map (array, n) to n indices into the array and never touch
// the array itself. Whenever n >= array.len() the selection is the identity
// (every index, in order).
//
// Boundary policy for the value-based selectors (Equidistant, Chebyshev):
//   - indices are strictly increasing
//   - the first index is 0 and the last is len - 1
//   - once the unvisited tail of the array is no longer than the number of
//     slots still open, every remaining element is taken

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeDistribution {
    /// Evenly spaced positions in the array.
    Uniform,
    /// Evenly spaced values between the first and last element.
    Equidistant,
    /// Chebyshev nodes mapped onto [first, last]; well conditioned for
    /// global polynomial interpolation.
    Chebyshev,
}

fn identity_indices(len: usize) -> Vec<usize> {
    (0..len).collect()
}

/// `n` indices spread evenly over `0..len`, rounded to the nearest index.
pub fn uniform_indices(len: usize, n: usize) -> Vec<usize> {
    if n >= len {
        return identity_indices(len);
    }
    match n {
        0 => Vec::new(),
        1 => vec![0],
        _ => {
            let stride = (len as f64 - 1.0) / (n as f64 - 1.0);
            (0..n)
                .map(|i| (stride * i as f64).round() as usize)
                .collect()
        }
    }
}

/// Indices of the first elements reaching `n` equally spaced values between
/// `sorted[0]` and `sorted[len - 1]`. `sorted` must be ascending.
pub fn equidistant_indices(sorted: &[f64], n: usize) -> Vec<usize> {
    if n >= sorted.len() {
        return identity_indices(sorted.len());
    }
    if n < 2 {
        return uniform_indices(sorted.len(), n);
    }

    let a = sorted[0];
    let b = sorted[sorted.len() - 1];
    let step = (b - a) / (n as f64 - 1.0);
    let targets: Vec<f64> = (0..n).map(|k| a + k as f64 * step).collect();
    snap_to_indices(sorted, &targets)
}

/// Indices of the first elements reaching each of the `n` classical
/// Chebyshev nodes on `[sorted[0], sorted[len - 1]]`.
///
/// Nodes are generated in ascending order:
///   t_k = (a+b)/2 + (a-b)/2 · cos((2k-1)π / 2n),  k = 1..n
pub fn chebyshev_indices(sorted: &[f64], n: usize) -> Vec<usize> {
    if n >= sorted.len() {
        return identity_indices(sorted.len());
    }
    if n < 2 {
        return uniform_indices(sorted.len(), n);
    }

    let a = sorted[0];
    let b = sorted[sorted.len() - 1];
    let targets: Vec<f64> = (1..=n)
        .map(|k| {
            let theta = (2 * k - 1) as f64 / (2 * n) as f64 * PI;
            0.5 * (a + b) + 0.5 * (a - b) * theta.cos()
        })
        .collect();
    snap_to_indices(sorted, &targets)
}

/// Single pass over `sorted`, assigning each target the first element that
/// meets or exceeds it. Requires `2 <= targets.len() < sorted.len()`.
fn snap_to_indices(sorted: &[f64], targets: &[f64]) -> Vec<usize> {
    let len = sorted.len();
    let n = targets.len();
    let mut indices = Vec::with_capacity(n);

    for (i, &value) in sorted.iter().enumerate() {
        let open = n - indices.len();
        if open == 0 {
            break;
        }
        if value >= targets[indices.len()] || len - i <= open {
            indices.push(i);
        }
    }

    indices[0] = 0;
    indices[n - 1] = len - 1;
    indices
}

/// Dispatches to the selector for `distribution`.
pub fn select_indices(sorted: &[f64], distribution: NodeDistribution, n: usize) -> Vec<usize> {
    match distribution {
        NodeDistribution::Uniform     => uniform_indices(sorted.len(), n),
        NodeDistribution::Equidistant => equidistant_indices(sorted, n),
        NodeDistribution::Chebyshev   => chebyshev_indices(sorted, n),
    }
}

// ─────────────────────────────────────────────
// Array reduction
// ─────────────────────────────────────────────

/// Picks `n` evenly indexed elements. Returns the input untouched when no
/// reduction is necessary.
pub fn reduce_array(input: &[f64], n: usize) -> Cow<'_, [f64]> {
    reduce_array_with(input, NodeDistribution::Uniform, n)
}

/// Reduces `input` to `n` elements chosen by `distribution`.
pub fn reduce_array_with(input: &[f64], distribution: NodeDistribution, n: usize) -> Cow<'_, [f64]> {
    if n >= input.len() {
        return Cow::Borrowed(input);
    }
    let indices = select_indices(input, distribution, n);
    Cow::Owned(indices.iter().map(|&i| input[i]).collect())
}

/// Applies a previously computed index set to another array, e.g. reducing
/// y after the indices were chosen from x.
pub fn reduce_by_indices<T: Copy>(input: &[T], indices: &[usize]) -> Result<Vec<T>, MathError> {
    indices
        .iter()
        .map(|&i| {
            input.get(i).copied().ok_or_else(|| {
                MathError::invalid_input(format!(
                    "index {} out of bounds for array of length {}",
                    i,
                    input.len()
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linspace(a: f64, b: f64, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| a + (b - a) * i as f64 / (len - 1) as f64)
            .collect()
    }

    fn assert_endpoint_preserving(indices: &[usize], n: usize, len: usize) {
        assert_eq!(indices.len(), n);
        assert_eq!(indices[0], 0);
        assert_eq!(*indices.last().unwrap(), len - 1);
        assert!(indices.windows(2).all(|w| w[0] < w[1]), "{:?}", indices);
    }

    #[test]
    fn test_uniform_indices() {
        assert_eq!(uniform_indices(11, 3), vec![0, 5, 10]);
        assert_eq!(uniform_indices(10, 4), vec![0, 3, 6, 9]);
        assert_eq!(uniform_indices(5, 1), vec![0]);
        assert!(uniform_indices(5, 0).is_empty());
        assert_eq!(uniform_indices(3, 7), vec![0, 1, 2]);
    }

    #[test]
    fn test_equidistant_on_uneven_samples() {
        let x = [0.0, 0.1, 0.2, 0.3, 0.9, 1.0, 1.1, 1.2, 1.9, 2.0];
        let indices = equidistant_indices(&x, 3);
        assert_eq!(indices, vec![0, 5, 9]);
    }

    #[test]
    fn test_value_selectors_preserve_endpoints() {
        for &len in &[5usize, 17, 200, 1001] {
            let x: Vec<f64> = linspace(-3.0, 4.5, len).iter().map(|v| v * v.abs()).collect();
            for n in 2..len.min(40) {
                assert_endpoint_preserving(&equidistant_indices(&x, n), n, len);
                assert_endpoint_preserving(&chebyshev_indices(&x, n), n, len);
            }
        }
    }

    #[test]
    fn test_chebyshev_clusters_towards_ends() {
        let x = linspace(0.0, 1.0, 1001);
        let indices = chebyshev_indices(&x, 10);
        let first_gap = indices[1] - indices[0];
        let middle_gap = indices[5] - indices[4];
        assert!(first_gap < middle_gap);
    }

    #[test]
    fn test_reduction_is_identity_when_not_needed() {
        let x = vec![1.0, 2.0, 3.0];
        let reduced = reduce_array(&x, 3);
        assert!(matches!(reduced, Cow::Borrowed(_)));
        assert_eq!(&*reduced, x.as_slice());
        assert_eq!(&*reduce_array_with(&x, NodeDistribution::Chebyshev, 10), x.as_slice());
    }

    #[test]
    fn test_reduce_array_uniform() {
        let x: Vec<f64> = (0..11).map(|i| i as f64).collect();
        assert_eq!(&*reduce_array(&x, 3), &[0.0, 5.0, 10.0]);
    }

    #[test]
    fn test_reduce_by_indices() {
        let y = [10.0, 11.0, 12.0, 13.0];
        assert_eq!(reduce_by_indices(&y, &[0, 2, 3]).unwrap(), vec![10.0, 12.0, 13.0]);
        assert!(reduce_by_indices(&y, &[0, 4]).is_err());
    }
}
