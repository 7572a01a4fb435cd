use crate::geometry::{self, Vec3};
use crate::model::molecule::Molecule;

/// Triple product of unit bond vectors below which a tetrahedral center is
/// considered flat. A regular tetrahedron gives about 0.77.
const FLAT_CENTER_VOLUME: f64 = 0.2;

/// Every resolved stereo center has the written handedness and is not flat.
pub(crate) fn chirality_ok(mol: &Molecule, positions: &[Vec3]) -> bool {
    mol.stereo_centers.iter().all(|sc| {
        let Some([_, a, b, c]) = sc.resolved_neighbors() else {
            return true;
        };
        let o = positions[sc.center];
        let unit = |n: usize| geometry::normalize(geometry::sub(positions[n], o));
        let volume = geometry::dot(unit(a), geometry::cross(unit(b), unit(c)));
        volume.abs() >= FLAT_CENTER_VOLUME && sc.matches(positions) == Some(true)
    })
}

pub(crate) fn double_bonds_ok(mol: &Molecule, positions: &[Vec3]) -> bool {
    mol.double_bond_stereo.iter().all(|s| s.matches(positions))
}
