use crate::geometry::{self, Vec3};
use crate::model::molecule::Molecule;
use nalgebra::Matrix3;

/// RMSD between two point sets after optimal rigid superposition (Kabsch).
///
/// Both slices must have the same length.
pub fn superposed_rmsd(a: &[Vec3], b: &[Vec3]) -> f64 {
    let n = a.len().min(b.len());
    if n == 0 {
        return 0.0;
    }
    let ca = geometry::centroid(&a[..n]);
    let cb = geometry::centroid(&b[..n]);

    let mut covariance = Matrix3::<f64>::zeros();
    let mut sum_sq = 0.0;
    for (p, q) in a.iter().zip(b) {
        let p = geometry::sub(*p, ca);
        let q = geometry::sub(*q, cb);
        sum_sq += geometry::dot(p, p) + geometry::dot(q, q);
        for r in 0..3 {
            for c in 0..3 {
                covariance[(r, c)] += p[r] * q[c];
            }
        }
    }

    let svd = covariance.svd(false, false);
    let s = svd.singular_values;
    let reflection = if covariance.determinant() < 0.0 { -1.0 } else { 1.0 };
    let overlap = s[0] + s[1] + reflection * s[2];
    ((sum_sq - 2.0 * overlap).max(0.0) / n as f64).sqrt()
}

/// [`superposed_rmsd`] over the heavy atoms of two conformers of `mol`.
pub(crate) fn heavy_atom_rmsd(mol: &Molecule, a: &[Vec3], b: &[Vec3]) -> f64 {
    let heavy: Vec<usize> = (0..mol.atom_count())
        .filter(|&i| !mol.atoms[i].is_hydrogen())
        .collect();
    let pick = |p: &[Vec3]| heavy.iter().map(|&i| p[i]).collect::<Vec<_>>();
    superposed_rmsd(&pick(a), &pick(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rotate_z(p: Vec3, angle: f64) -> Vec3 {
        let (s, c) = angle.sin_cos();
        [c * p[0] - s * p[1], s * p[0] + c * p[1], p[2]]
    }

    const SHAPE: [Vec3; 5] = [
        [0.0, 0.0, 0.0],
        [1.5, 0.0, 0.0],
        [2.0, 1.4, 0.0],
        [3.5, 1.4, 0.3],
        [1.0, -0.7, 1.2],
    ];

    #[test]
    fn rigid_motion_gives_zero_rmsd() {
        let moved: Vec<Vec3> = SHAPE
            .iter()
            .map(|&p| geometry::add(rotate_z(p, 1.1), [3.0, -2.0, 0.5]))
            .collect();
        assert!(superposed_rmsd(&SHAPE, &moved) < 1e-6);
    }

    #[test]
    fn mirror_images_are_not_superposable() {
        let mirrored: Vec<Vec3> = SHAPE.iter().map(|p| [p[0], p[1], -p[2]]).collect();
        assert!(superposed_rmsd(&SHAPE, &mirrored) > 0.1);
    }

    #[test]
    fn displacement_is_measured() {
        let mut shifted = SHAPE;
        shifted[3][0] += 1.0;
        let rmsd = superposed_rmsd(&SHAPE, &shifted);
        assert!(rmsd > 0.1 && rmsd < 1.0 / 5f64.sqrt() + 1e-9);
    }
}
