//! Second-stage refinement: torsion preferences and trigonal planarity on
//! top of the distance bounds.

use super::bounds::BoundsMatrix;
use super::config::EmbedParameters;
use super::dg::{ChiralViolation, DistanceViolation};
use crate::geometry::{self, Vec3};
use crate::model::molecule::Molecule;
use crate::model::topology::Topology;
use crate::model::types::{BondOrder, Hybridization};
use crate::optimize::Objective;
use crate::uff::terms::{Torsion, add_scaled, point};
use std::collections::HashMap;

/// Weight on bonded and geminal pairs and on planar-constrained vicinal pairs.
const HOLD_WEIGHT: f64 = 100.0;
const LOOSE_WEIGHT: f64 = 1.0;
/// Bounds narrower than this are treated as fixed distances.
const TIGHT_SPAN: f64 = 0.2;
const STAGGERED_BARRIER: f64 = 2.0;
const CONJUGATED_BARRIER: f64 = 4.0;
const PLANARITY_WEIGHT: f64 = 10.0;

/// Keeps a trigonal center and its three neighbors coplanar.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PlanarCenter {
    center: usize,
    neighbors: [usize; 3],
}

impl PlanarCenter {
    fn arms(&self, x: &[f64]) -> [Vec3; 3] {
        let o = point(x, self.center);
        self.neighbors.map(|n| geometry::sub(point(x, n), o))
    }

    fn energy(&self, x: &[f64]) -> f64 {
        let [u, v, w] = self.arms(x);
        let vol = geometry::dot(u, geometry::cross(v, w));
        PLANARITY_WEIGHT * vol * vol
    }

    fn accumulate(&self, x: &[f64], grad: &mut [f64]) -> f64 {
        let [u, v, w] = self.arms(x);
        let vol = geometry::dot(u, geometry::cross(v, w));
        let de_dv = 2.0 * PLANARITY_WEIGHT * vol;
        let g = [geometry::cross(v, w), geometry::cross(w, u), geometry::cross(u, v)];
        let mut go = [0.0; 3];
        for (&n, gn) in self.neighbors.iter().zip(g) {
            add_scaled(grad, n, gn, de_dv);
            go = geometry::sub(go, gn);
        }
        add_scaled(grad, self.center, go, de_dv);
        PLANARITY_WEIGHT * vol * vol
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Refinement {
    distances: Vec<DistanceViolation>,
    torsions: Vec<Torsion>,
    planar: Vec<PlanarCenter>,
    chiral: Vec<ChiralViolation>,
}

impl Refinement {
    /// `None` when neither torsion preferences nor planarity are requested.
    pub fn new(
        mol: &Molecule,
        topo: &Topology,
        bounds: &BoundsMatrix,
        params: &EmbedParameters,
    ) -> Option<Self> {
        if !params.use_exp_torsion_angle_prefs && !params.use_basic_knowledge {
            return None;
        }

        let n = mol.atom_count();
        let mut distances = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                let (lower, upper) = (bounds.lower(i, j), bounds.upper(i, j));
                let held = topo.path_length(i, j) <= 2 || upper - lower < TIGHT_SPAN;
                let weight = if held { HOLD_WEIGHT } else { LOOSE_WEIGHT };
                distances.push(DistanceViolation::new(i, j, lower, upper, weight));
            }
        }

        let torsions = if params.use_exp_torsion_angle_prefs {
            torsion_preferences(mol, topo)
        } else {
            Vec::new()
        };

        let planar = if params.use_basic_knowledge {
            topo.inversions
                .iter()
                .filter(|inv| topo.hybridization[inv.center] == Hybridization::SP2)
                .map(|inv| PlanarCenter {
                    center: inv.center,
                    neighbors: inv.neighbors,
                })
                .collect()
        } else {
            Vec::new()
        };

        let chiral = if params.enforce_chirality {
            ChiralViolation::for_molecule(mol)
        } else {
            Vec::new()
        };

        Some(Self {
            distances,
            torsions,
            planar,
            chiral,
        })
    }
}

/// Staggered sp3–sp3 and planar sp2–sp2 preferences for acyclic single bonds.
fn torsion_preferences(mol: &Molecule, topo: &Topology) -> Vec<Torsion> {
    let rotatable = |j: usize, k: usize| {
        mol.bond_between(j, k).is_some_and(|b| {
            b.order == BondOrder::Single
                && !b.is_aromatic
                && topo.smallest_ring_with_bond(j, k).is_none()
        })
    };

    let mut per_bond: HashMap<(usize, usize), usize> = HashMap::new();
    for t in &topo.torsions {
        *per_bond.entry((t.j.min(t.k), t.j.max(t.k))).or_default() += 1;
    }

    topo.torsions
        .iter()
        .filter(|t| rotatable(t.j, t.k))
        .filter_map(|t| {
            let (barrier, periodicity, phase) =
                match (topo.hybridization[t.j], topo.hybridization[t.k]) {
                    (Hybridization::SP3, Hybridization::SP3) => (STAGGERED_BARRIER, 3.0, -1.0),
                    (Hybridization::SP2, Hybridization::SP2) => (CONJUGATED_BARRIER, 2.0, 1.0),
                    _ => return None,
                };
            let count = per_bond
                .get(&(t.j.min(t.k), t.j.max(t.k)))
                .copied()
                .unwrap_or(1)
                .max(1);
            Some(Torsion {
                i: t.i,
                j: t.j,
                k: t.k,
                l: t.l,
                barrier: barrier / count as f64,
                periodicity,
                phase,
            })
        })
        .collect()
}

impl Objective for Refinement {
    fn value(&self, x: &[f64]) -> f64 {
        self.distances.iter().map(|t| t.energy(x)).sum::<f64>()
            + self.torsions.iter().map(|t| t.energy(x)).sum::<f64>()
            + self.planar.iter().map(|t| t.energy(x)).sum::<f64>()
            + self.chiral.iter().map(|t| t.energy(x)).sum::<f64>()
    }

    fn value_and_gradient(&self, x: &[f64], grad: &mut [f64]) -> f64 {
        let mut e = 0.0;
        for t in &self.distances {
            e += t.accumulate(x, grad);
        }
        for t in &self.torsions {
            e += t.accumulate(x, grad);
        }
        for t in &self.planar {
            e += t.accumulate(x, grad);
        }
        for t in &self.chiral {
            e += t.accumulate(x, grad);
        }
        e
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::bounds;
    use crate::hydrogens::add_hydrogens;
    use crate::optimize::tests::numeric_gradient;
    use crate::smiles;

    fn refinement(smiles: &str, params: &EmbedParameters) -> (usize, Option<Refinement>) {
        let mut mol = smiles::parse(smiles).unwrap();
        add_hydrogens(&mut mol);
        let topo = Topology::perceive(&mol);
        let b = bounds::build(&mol, &topo).unwrap();
        (mol.atom_count(), Refinement::new(&mol, &topo, &b, params))
    }

    #[test]
    fn disabled_without_knowledge_terms() {
        let (_, r) = refinement("CCO", &EmbedParameters::plain_dg());
        assert!(r.is_none());
    }

    #[test]
    fn selects_torsion_and_planarity_terms() {
        let (_, r) = refinement("CC(=O)Oc1ccccc1C(=O)O", &EmbedParameters::etkdg());
        let r = r.unwrap();
        // Ring bonds carry no torsion preference.
        assert!(r.torsions.iter().all(|t| !(4..10).contains(&t.j) || !(4..10).contains(&t.k)));
        assert!(!r.torsions.is_empty());
        // Two carbonyl carbons and six ring carbons.
        assert_eq!(r.planar.len(), 8);
    }

    #[test]
    fn gradient_matches_finite_differences() {
        let (n, r) = refinement("CC=CC(C)O", &EmbedParameters::etkdg());
        let r = r.unwrap();
        let x: Vec<f64> = (0..3 * n)
            .map(|k| {
                let t = k as f64;
                0.9 * (0.37 * t).sin() + 0.05 * t
            })
            .collect();
        let mut grad = vec![0.0; x.len()];
        r.value_and_gradient(&x, &mut grad);
        let num = numeric_gradient(&r, &x);
        for (k, (a, b)) in grad.iter().zip(&num).enumerate() {
            assert!((a - b).abs() < 1e-3 * (1.0 + b.abs()), "{k}: {a} vs {b}");
        }
    }
}
