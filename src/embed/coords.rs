use super::bounds::BoundsMatrix;
use crate::geometry::Vec3;
use nalgebra::{DMatrix, SymmetricEigen};
use rand::Rng;

/// Eigenvalues at or below this are treated as zero.
const EIGEN_FLOOR: f64 = 1e-6;

/// Samples a distance matrix within `bounds` and recovers 3D coordinates
/// from the three largest eigenpairs of its metric matrix.
///
/// Returns `None` when fewer positive eigenvalues are found than the
/// molecule needs dimensions for.
pub(crate) fn metric_embedding<R: Rng + ?Sized>(bounds: &BoundsMatrix, rng: &mut R) -> Option<Vec<Vec3>> {
    let n = bounds.len();
    if n == 0 {
        return Some(Vec::new());
    }

    let mut d2 = DMatrix::<f64>::zeros(n, n);
    for i in 0..n {
        for j in (i + 1)..n {
            let (lower, upper) = (bounds.lower(i, j), bounds.upper(i, j));
            let d = if upper - lower > 1e-9 {
                rng.gen_range(lower..=upper)
            } else {
                lower
            };
            d2[(i, j)] = d * d;
            d2[(j, i)] = d * d;
        }
    }

    let nf = n as f64;
    let pair_sum: f64 = (0..n).map(|i| (i + 1..n).map(|j| d2[(i, j)]).sum::<f64>()).sum();
    let mean = pair_sum / (nf * nf);
    let to_centroid: Vec<f64> = (0..n).map(|i| d2.row(i).sum() / nf - mean).collect();

    let metric = DMatrix::from_fn(n, n, |i, j| 0.5 * (to_centroid[i] + to_centroid[j] - d2[(i, j)]));
    let eigen = SymmetricEigen::new(metric);

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));

    let needed = (n - 1).min(3);
    let mut coords = vec![[0.0; 3]; n];
    for (axis, &idx) in order.iter().take(3).enumerate() {
        let lambda = eigen.eigenvalues[idx];
        if lambda <= EIGEN_FLOOR {
            if axis < needed {
                return None;
            }
            continue;
        }
        let scale = lambda.sqrt();
        for (atom, c) in coords.iter_mut().enumerate() {
            c[axis] = scale * eigen.eigenvectors[(atom, idx)];
        }
    }
    Some(coords)
}

/// Uniform coordinates in a cube of edge `edge` centered on the origin.
pub(crate) fn random_coordinates<R: Rng + ?Sized>(n: usize, edge: f64, rng: &mut R) -> Vec<Vec3> {
    let half = 0.5 * edge.abs().max(1e-3);
    (0..n)
        .map(|_| {
            [
                rng.gen_range(-half..=half),
                rng.gen_range(-half..=half),
                rng.gen_range(-half..=half),
            ]
        })
        .collect()
}
