//! Stereochemical annotations carried by a [`Molecule`](super::molecule::Molecule).
//!
//! Tetrahedral centers keep the neighbor order in which they were written,
//! so their handedness can be checked against any conformer with a signed
//! volume. A hydrogen that is still implicit is referenced as
//! [`NeighborRef::ImplicitH`] until hydrogen completion replaces it with the
//! new atom index.

use crate::geometry::{self, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chirality {
    /// `@`: looking from the first neighbor, the rest run anticlockwise.
    CounterClockwise,
    /// `@@`: looking from the first neighbor, the rest run clockwise.
    Clockwise,
}

impl Chirality {
    /// Sign of the signed volume spanned by neighbors 2-4 around the center.
    pub fn volume_sign(self) -> f64 {
        match self {
            Chirality::CounterClockwise => -1.0,
            Chirality::Clockwise => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NeighborRef {
    Atom(usize),
    ImplicitH,
}

impl NeighborRef {
    pub fn atom(self) -> Option<usize> {
        match self {
            NeighborRef::Atom(idx) => Some(idx),
            NeighborRef::ImplicitH => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StereoCenter {
    pub center: usize,
    pub neighbors: Vec<NeighborRef>,
    pub chirality: Chirality,
}

impl StereoCenter {
    /// Four resolved neighbor indices, or `None` while a reference is still
    /// implicit or the center has fewer than four substituents.
    pub fn resolved_neighbors(&self) -> Option<[usize; 4]> {
        if self.neighbors.len() != 4 {
            return None;
        }
        let mut out = [0usize; 4];
        for (slot, r) in out.iter_mut().zip(&self.neighbors) {
            *slot = r.atom()?;
        }
        Some(out)
    }

    /// Checks the written handedness against coordinates.
    pub fn matches(&self, positions: &[Vec3]) -> Option<bool> {
        let [_, b, c, d] = self.resolved_neighbors()?;
        let v = geometry::signed_volume(
            positions[self.center],
            positions[b],
            positions[c],
            positions[d],
        );
        Some(v * self.chirality.volume_sign() > 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DoubleBondConfig {
    Cis,
    Trans,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoubleBondStereo {
    /// Double bond atoms.
    pub begin: usize,
    pub end: usize,
    /// Substituent on `begin` and on `end` that the configuration refers to.
    pub begin_ref: usize,
    pub end_ref: usize,
    pub config: DoubleBondConfig,
}

impl DoubleBondStereo {
    pub fn matches(&self, positions: &[Vec3]) -> bool {
        let phi = geometry::dihedral(
            positions[self.begin_ref],
            positions[self.begin],
            positions[self.end],
            positions[self.end_ref],
        );
        match self.config {
            DoubleBondConfig::Cis => phi.abs() < std::f64::consts::FRAC_PI_2,
            DoubleBondConfig::Trans => phi.abs() > std::f64::consts::FRAC_PI_2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // First neighbor along +z; the other three below the center, laid out
    // anticlockwise when viewed from +z.
    fn anticlockwise_tetrahedron() -> Vec<Vec3> {
        let h = 1.0 / 3.0;
        let s = (8.0f64 / 9.0).sqrt();
        let ang = |deg: f64| deg.to_radians();
        vec![
            [0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0],
            [s * ang(0.0).cos(), s * ang(0.0).sin(), -h],
            [s * ang(120.0).cos(), s * ang(120.0).sin(), -h],
            [s * ang(240.0).cos(), s * ang(240.0).sin(), -h],
        ]
    }

    fn center(chirality: Chirality) -> StereoCenter {
        StereoCenter {
            center: 0,
            neighbors: (1..=4).map(NeighborRef::Atom).collect(),
            chirality,
        }
    }

    #[test]
    fn anticlockwise_layout_matches_at_sign() {
        let pos = anticlockwise_tetrahedron();
        assert_eq!(center(Chirality::CounterClockwise).matches(&pos), Some(true));
        assert_eq!(center(Chirality::Clockwise).matches(&pos), Some(false));
    }

    #[test]
    fn unresolved_center_is_not_checked() {
        let mut c = center(Chirality::Clockwise);
        c.neighbors[1] = NeighborRef::ImplicitH;
        assert_eq!(c.resolved_neighbors(), None);
        assert_eq!(c.matches(&anticlockwise_tetrahedron()), None);
    }

    #[test]
    fn double_bond_config_from_dihedral() {
        let pos = vec![
            [0.0, 0.0, 0.0],
            [1.3, 0.0, 0.0],
            [-0.7, 1.0, 0.0],
            [2.0, 1.0, 0.0],
            [2.0, -1.0, 0.0],
        ];
        let cis = DoubleBondStereo {
            begin: 0,
            end: 1,
            begin_ref: 2,
            end_ref: 3,
            config: DoubleBondConfig::Cis,
        };
        let trans = DoubleBondStereo {
            end_ref: 4,
            config: DoubleBondConfig::Trans,
            ..cis.clone()
        };
        assert!(cis.matches(&pos));
        assert!(trans.matches(&pos));
    }
}
