//! Interatomic distance bounds for distance geometry.
//!
//! Bonded (1-2), geminal (1-3) and vicinal (1-4) pairs get bounds from
//! ideal internal coordinates; every other pair only gets a van der Waals
//! floor. [`BoundsMatrix::smooth`] then tightens the matrix with the
//! triangle inequality.

use super::error::EmbedError;
use crate::geometry;
use crate::model::molecule::Molecule;
use crate::model::stereo::DoubleBondConfig;
use crate::model::topology::{Topology, UNREACHABLE};
use crate::model::types::{BondOrder, Element, Hybridization};
use crate::uff::{self, AtomParams, UffError};
use nalgebra::DMatrix;
use std::collections::HashMap;
use std::f64::consts::PI;
use tracing::debug;

const BOND_TOLERANCE: f64 = 0.01;
const ANGLE_TOLERANCE: f64 = 0.04;
const PLANAR_TOLERANCE: f64 = 0.06;
const VDW_SCALE: f64 = 0.7;
const MAX_UPPER: f64 = 1000.0;
/// Upper bound above the van der Waals floor for atoms in different
/// fragments, so disconnected pieces are sampled near each other.
const FRAGMENT_SPAN: f64 = 10.0;
const SMOOTHING_TOLERANCE: f64 = 1e-6;

/// Symmetric lower/upper distance bounds in Å.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundsMatrix {
    lower: DMatrix<f64>,
    upper: DMatrix<f64>,
}

impl BoundsMatrix {
    pub fn new(n: usize) -> Self {
        let mut upper = DMatrix::from_element(n, n, MAX_UPPER);
        upper.fill_diagonal(0.0);
        Self {
            lower: DMatrix::zeros(n, n),
            upper,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lower.nrows()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn lower(&self, i: usize, j: usize) -> f64 {
        self.lower[(i, j)]
    }

    #[inline]
    pub fn upper(&self, i: usize, j: usize) -> f64 {
        self.upper[(i, j)]
    }

    pub fn set(&mut self, i: usize, j: usize, lower: f64, upper: f64) {
        self.lower[(i, j)] = lower;
        self.lower[(j, i)] = lower;
        self.upper[(i, j)] = upper;
        self.upper[(j, i)] = upper;
    }

    /// Floyd–Warshall triangle smoothing.
    pub fn smooth(&mut self) -> Result<(), EmbedError> {
        let n = self.len();
        for k in 0..n {
            for i in 0..n {
                if i == k {
                    continue;
                }
                let u_ik = self.upper[(i, k)];
                let l_ik = self.lower[(i, k)];
                for j in (i + 1)..n {
                    if j == k {
                        continue;
                    }
                    let u_kj = self.upper[(k, j)];
                    let l_kj = self.lower[(k, j)];
                    let upper = self.upper[(i, j)].min(u_ik + u_kj);
                    let lower = self.lower[(i, j)].max(l_ik - u_kj).max(l_kj - u_ik);
                    if lower > upper + SMOOTHING_TOLERANCE {
                        return Err(EmbedError::inconsistent(i, j, lower, upper));
                    }
                    self.set(i, j, lower.min(upper), upper);
                }
            }
        }
        Ok(())
    }
}

/// Builds and smooths the bounds matrix for `mol`.
///
/// If the van der Waals floors make the matrix inconsistent, it is rebuilt
/// without them before giving up.
pub fn build(mol: &Molecule, topo: &Topology) -> Result<BoundsMatrix, EmbedError> {
    let geom = IdealGeometry::new(mol, topo)?;
    let mut bounds = geom.bounds(true);
    match bounds.smooth() {
        Ok(()) => Ok(bounds),
        Err(err) => {
            debug!(%err, "bounds inconsistent with van der Waals floors, retrying without");
            let mut bounds = geom.bounds(false);
            bounds.smooth()?;
            Ok(bounds)
        }
    }
}

/// Ideal bond lengths and angles for one molecule.
struct IdealGeometry<'a> {
    mol: &'a Molecule,
    topo: &'a Topology,
    params: Vec<&'static AtomParams>,
    bond_lengths: HashMap<(usize, usize), f64>,
}

impl<'a> IdealGeometry<'a> {
    fn new(mol: &'a Molecule, topo: &'a Topology) -> Result<Self, UffError> {
        let types = uff::assign_types(mol, topo)?;
        let table = uff::default_parameters()?;
        let params = types
            .iter()
            .enumerate()
            .map(|(idx, label)| {
                table
                    .get(label)
                    .ok_or_else(|| UffError::missing_parameter(idx, label))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let bond_lengths = mol
            .bonds
            .iter()
            .map(|b| {
                let r = uff::rest_bond_length(params[b.i], params[b.j], b.effective_order());
                (key(b.i, b.j), r)
            })
            .collect();
        Ok(Self {
            mol,
            topo,
            params,
            bond_lengths,
        })
    }

    fn bond_length(&self, i: usize, j: usize) -> f64 {
        self.bond_lengths.get(&key(i, j)).copied().unwrap_or(0.0)
    }

    fn bounds(&self, with_vdw: bool) -> BoundsMatrix {
        let n = self.mol.atom_count();
        let mut bounds = BoundsMatrix::new(n);

        for (&(i, j), &r) in &self.bond_lengths {
            bounds.set(i, j, r - BOND_TOLERANCE, r + BOND_TOLERANCE);
        }

        let mut fixed = vec![false; n * n];
        for angle in &self.topo.angles {
            let (i, k) = (angle.i, angle.k);
            if self.topo.path_length(i, k) != 2 || fixed[i * n + k] {
                continue;
            }
            let d = geometry::law_of_cosines(
                self.bond_length(i, angle.j),
                self.bond_length(angle.j, k),
                self.ideal_angle(i, angle.j, k),
            );
            bounds.set(i, k, d - ANGLE_TOLERANCE, d + ANGLE_TOLERANCE);
            fixed[i * n + k] = true;
            fixed[k * n + i] = true;
        }

        for t in &self.topo.torsions {
            let (i, l) = (t.i, t.l);
            if self.topo.path_length(i, l) != 3 || fixed[i * n + l] {
                continue;
            }
            let (lower, upper) = self.torsion_bounds(t.i, t.j, t.k, t.l);
            bounds.set(i, l, lower, upper);
            fixed[i * n + l] = true;
            fixed[l * n + i] = true;
        }

        for i in 0..n {
            for j in (i + 1)..n {
                let path = self.topo.path_length(i, j);
                if path < 4 {
                    continue;
                }
                let floor = if with_vdw {
                    VDW_SCALE * (vdw_radius(self.mol.atoms[i].element) + vdw_radius(self.mol.atoms[j].element))
                } else {
                    0.0
                };
                let ceiling = if path == UNREACHABLE {
                    floor + FRAGMENT_SPAN
                } else {
                    MAX_UPPER
                };
                bounds.set(i, j, floor, ceiling);
            }
        }
        bounds
    }

    /// Ideal `i-j-k` angle in radians.
    fn ideal_angle(&self, i: usize, j: usize, k: usize) -> f64 {
        let hyb = self.topo.hybridization[j];
        if let Some(angle) = self.ring_angle(i, j, k) {
            return angle;
        }
        match hyb {
            Hybridization::SP => PI,
            Hybridization::SP2 => self.exocyclic_trigonal_angle(i, j, k),
            _ => self.params[j].theta0.to_radians(),
        }
    }

    /// Interior angle when `i-j-k` lies in a ring that fixes it.
    fn ring_angle(&self, i: usize, j: usize, k: usize) -> Option<f64> {
        let size = self.topo.smallest_ring_with_path(&[i, j, k])?;
        let degrees = match (self.topo.hybridization[j], size) {
            (_, 3) => 60.0,
            (_, 4) => 90.0,
            (Hybridization::SP2, s) if s <= 8 => (s as f64 - 2.0) * 180.0 / s as f64,
            (_, 5) => 104.0,
            _ => return None,
        };
        Some(f64::to_radians(degrees))
    }

    /// Trigonal angle that shares the plane with any ring angles at `j`.
    fn exocyclic_trigonal_angle(&self, i: usize, j: usize, k: usize) -> f64 {
        let full = 2.0 * PI;
        let neighbors = &self.topo.neighbors[j];
        if neighbors.len() != 3 {
            return full / 3.0;
        }
        let Some(&m) = neighbors.iter().find(|&&m| m != i && m != k) else {
            return full / 3.0;
        };
        match (self.ring_angle(i, j, m), self.ring_angle(k, j, m)) {
            (Some(a), Some(b)) => full - a - b,
            (Some(a), None) | (None, Some(a)) => (full - a) / 2.0,
            (None, None) => full / 3.0,
        }
    }

    fn torsion_bounds(&self, i: usize, j: usize, k: usize, l: usize) -> (f64, f64) {
        let r_ij = self.bond_length(i, j);
        let r_jk = self.bond_length(j, k);
        let r_kl = self.bond_length(k, l);
        let a = self.ideal_angle(i, j, k);
        let b = self.ideal_angle(j, k, l);
        let cis = geometry::chain_14_distance(r_ij, r_jk, r_kl, a, b, 0.0);
        let trans = geometry::chain_14_distance(r_ij, r_jk, r_kl, a, b, PI);
        match self.planar_config(i, j, k, l) {
            Some(DoubleBondConfig::Cis) => (cis - PLANAR_TOLERANCE, cis + PLANAR_TOLERANCE),
            Some(DoubleBondConfig::Trans) => (trans - PLANAR_TOLERANCE, trans + PLANAR_TOLERANCE),
            None => (cis.min(trans), cis.max(trans)),
        }
    }

    /// Cis/trans arrangement of `i` and `l` across a planar `j-k` bond, if known.
    fn planar_config(&self, i: usize, j: usize, k: usize, l: usize) -> Option<DoubleBondConfig> {
        let bond = self.mol.bond_between(j, k)?;
        let double = bond.order == BondOrder::Double && !bond.is_aromatic;
        if double {
            if let Some(config) = stereo_config(self.mol, i, j, k, l) {
                return Some(config);
            }
        }
        let planar = bond.is_aromatic || (double && self.topo.smallest_ring_with_bond(j, k).is_some());
        if !planar {
            return None;
        }
        if self.topo.smallest_ring_with_path(&[i, j, k, l]).is_some() {
            Some(DoubleBondConfig::Cis)
        } else if self.topo.smallest_ring_with_path(&[i, j, k]).is_some()
            || self.topo.smallest_ring_with_path(&[j, k, l]).is_some()
        {
            Some(DoubleBondConfig::Trans)
        } else {
            Some(DoubleBondConfig::Cis)
        }
    }
}

fn stereo_config(mol: &Molecule, i: usize, j: usize, k: usize, l: usize) -> Option<DoubleBondConfig> {
    mol.double_bond_stereo.iter().find_map(|s| {
        let (a, d) = if (s.begin, s.end) == (j, k) {
            (i, l)
        } else if (s.begin, s.end) == (k, j) {
            (l, i)
        } else {
            return None;
        };
        let flips = usize::from(a != s.begin_ref) + usize::from(d != s.end_ref);
        Some(match (s.config, flips % 2) {
            (config, 0) => config,
            (DoubleBondConfig::Cis, _) => DoubleBondConfig::Trans,
            (DoubleBondConfig::Trans, _) => DoubleBondConfig::Cis,
        })
    })
}

#[inline]
fn key(a: usize, b: usize) -> (usize, usize) {
    if a < b { (a, b) } else { (b, a) }
}

/// Bondi van der Waals radius in Å.
fn vdw_radius(element: Element) -> f64 {
    match element {
        Element::H => 1.2,
        Element::C => 1.7,
        Element::N => 1.55,
        Element::O => 1.52,
        Element::F => 1.47,
        Element::P | Element::S => 1.8,
        Element::Cl => 1.75,
        Element::Br => 1.85,
        Element::I => 1.98,
        Element::B => 1.92,
        Element::Si => 2.1,
        _ => 2.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hydrogens::add_hydrogens;
    use crate::smiles;

    fn bounds_for(smiles: &str) -> (Molecule, BoundsMatrix) {
        let mut mol = smiles::parse(smiles).unwrap();
        add_hydrogens(&mut mol);
        let topo = Topology::perceive(&mol);
        let bounds = build(&mol, &topo).unwrap();
        (mol, bounds)
    }

    fn assert_within(bounds: &BoundsMatrix, i: usize, j: usize, d: f64) {
        assert!(
            bounds.lower(i, j) <= d && d <= bounds.upper(i, j),
            "{i}-{j}: {d} not in [{}, {}]",
            bounds.lower(i, j),
            bounds.upper(i, j)
        );
    }

    #[test]
    fn ethane_bonds_and_geminal_pairs() {
        let (_, b) = bounds_for("CC");
        assert_within(&b, 0, 1, 1.514);
        assert!(b.upper(0, 1) - b.lower(0, 1) <= 2.0 * BOND_TOLERANCE + 1e-12);
        // H on C0 to C1 across a tetrahedral angle.
        assert_within(&b, 2, 1, 2.16);
        assert!(b.upper(2, 1) - b.lower(2, 1) < 0.1);
        // H-C-C-H spans gauche to anti.
        assert!(b.lower(2, 5) < 2.5 && b.upper(2, 5) > 3.0);
    }

    #[test]
    fn aromatic_ring_pairs_are_planar() {
        let (_, b) = bounds_for("c1ccccc1");
        // Para carbons.
        assert_within(&b, 0, 3, 2.76);
        assert!(b.upper(0, 3) - b.lower(0, 3) < 0.2);
        // Ring H to the meta carbon is trans across the ring bond.
        assert!(b.lower(6, 2) > 3.2);
    }

    #[test]
    fn double_bond_stereo_sets_cis_or_trans() {
        let (_, trans) = bounds_for("F/C=C/F");
        let (_, cis) = bounds_for("F/C=C\\F");
        assert!(trans.lower(0, 3) > 3.3, "{}", trans.lower(0, 3));
        assert!(cis.upper(0, 3) < 3.0, "{}", cis.upper(0, 3));
    }

    #[test]
    fn smoothing_tightens_upper_bounds() {
        let mut b = BoundsMatrix::new(3);
        b.set(0, 1, 1.0, 1.5);
        b.set(1, 2, 1.0, 1.5);
        b.smooth().unwrap();
        assert!((b.upper(0, 2) - 3.0).abs() < 1e-12);
        assert_eq!(b.upper(2, 0), b.upper(0, 2));
    }

    #[test]
    fn smoothing_detects_contradictions() {
        let mut b = BoundsMatrix::new(3);
        b.set(0, 1, 1.0, 1.0);
        b.set(1, 2, 1.0, 1.0);
        b.set(0, 2, 3.0, 4.0);
        assert!(matches!(
            b.smooth(),
            Err(EmbedError::InconsistentBounds { .. })
        ));
    }

    #[test]
    fn fragments_stay_close() {
        let (_, b) = bounds_for("C.C");
        assert!(b.upper(0, 1) < 20.0);
        assert!(b.lower(0, 1) > 2.0);
    }

    #[test]
    fn untyped_atoms_surface_as_uff_errors() {
        let mol = smiles::parse("[Fe]").unwrap();
        let topo = Topology::perceive(&mol);
        assert!(matches!(build(&mol, &topo), Err(EmbedError::Uff(_))));
    }
}
