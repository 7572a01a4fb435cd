use super::config::UffConfig;
use super::error::UffError;
use super::params::{self, AtomParams};
use super::terms::{AngleBend, AngleForm, BondStretch, Inversion, Torsion, VanDerWaals};
use super::typer;
use crate::geometry::{self, Vec3};
use crate::model::molecule::Molecule;
use crate::model::topology::{Topology, UNREACHABLE};
use crate::model::types::{BondOrder, Element, Hybridization};
use crate::optimize::Objective;
use std::collections::HashMap;
use tracing::debug;

/// Bond order used for the C–N bond of an amide.
const AMIDE_BOND_ORDER: f64 = 1.41;

/// Natural out-of-plane angles (degrees) for pyramidal group 15 centers.
const PNICTOGEN_INVERSION_ANGLE: [(Element, f64); 3] = [
    (Element::P, 84.4339),
    (Element::As, 86.9735),
    (Element::Sb, 87.7047),
];

/// A UFF energy expression for one molecule.
///
/// Terms are fixed at construction; the van der Waals pair list is chosen
/// from the coordinates passed to [`UffForceField::new`].
#[derive(Debug, Clone)]
pub struct UffForceField {
    atom_types: Vec<&'static str>,
    bonds: Vec<BondStretch>,
    angles: Vec<AngleBend>,
    torsions: Vec<Torsion>,
    inversions: Vec<Inversion>,
    vdw: Vec<VanDerWaals>,
}

impl UffForceField {
    pub fn new(mol: &Molecule, positions: &[Vec3], config: &UffConfig) -> Result<Self, UffError> {
        let topo = Topology::perceive(mol);
        let atom_types = typer::assign_types(mol, &topo)?;
        let table = params::default_parameters()?;
        let atom_params: Vec<&AtomParams> = atom_types
            .iter()
            .enumerate()
            .map(|(idx, label)| {
                table
                    .get(label)
                    .ok_or_else(|| UffError::missing_parameter(idx, label))
            })
            .collect::<Result<_, _>>()?;

        let mut ff = Self {
            atom_types,
            bonds: Vec::new(),
            angles: Vec::new(),
            torsions: Vec::new(),
            inversions: Vec::new(),
            vdw: Vec::new(),
        };

        let mut rest_lengths = HashMap::with_capacity(mol.bond_count());
        for bond in &mol.bonds {
            let (a, b) = (atom_params[bond.i], atom_params[bond.j]);
            let order = ff.bond_order(mol, bond.i, bond.j);
            let r0 = params::rest_bond_length(a, b, order);
            rest_lengths.insert(pair_key(bond.i, bond.j), r0);
            ff.bonds.push(BondStretch {
                i: bond.i,
                j: bond.j,
                r0,
                k: params::bond_force_constant(a, b, r0),
            });
        }
        let rest = |a: usize, b: usize| rest_lengths.get(&pair_key(a, b)).copied().unwrap_or(0.0);

        for angle in &topo.angles {
            let theta0 = atom_params[angle.j].theta0.to_radians();
            let force = params::angle_force_constant(
                atom_params[angle.i],
                atom_params[angle.k],
                rest(angle.i, angle.j),
                rest(angle.j, angle.k),
                theta0,
            );
            ff.angles.push(AngleBend {
                i: angle.i,
                j: angle.j,
                k: angle.k,
                force,
                form: AngleForm::for_natural_angle(theta0),
            });
        }

        let mut per_bond: HashMap<(usize, usize), usize> = HashMap::new();
        for t in &topo.torsions {
            *per_bond.entry(pair_key(t.j, t.k)).or_default() += 1;
        }
        for t in &topo.torsions {
            let order = ff.bond_order(mol, t.j, t.k);
            let Some((barrier, periodicity, phase)) =
                torsion_profile(mol, &topo, &atom_params, t.i, t.j, t.k, t.l, order)
            else {
                continue;
            };
            let count = per_bond.get(&pair_key(t.j, t.k)).copied().unwrap_or(1).max(1);
            ff.torsions.push(Torsion {
                i: t.i,
                j: t.j,
                k: t.k,
                l: t.l,
                barrier: barrier / count as f64,
                periodicity,
                phase,
            });
        }

        for inv in &topo.inversions {
            let Some((force, c0, c1, c2)) = ff.inversion_profile(mol, inv.center, inv.neighbors)
            else {
                continue;
            };
            let [a, b, c] = inv.neighbors;
            for (j, k, l) in [(a, b, c), (b, c, a), (c, a, b)] {
                ff.inversions.push(Inversion {
                    center: inv.center,
                    j,
                    k,
                    l,
                    force: force / 3.0,
                    c0,
                    c1,
                    c2,
                });
            }
        }

        for i in 0..mol.atom_count() {
            for j in (i + 1)..mol.atom_count() {
                let path = topo.path_length(i, j);
                if path < 3 || (path == UNREACHABLE && config.ignore_interfragment) {
                    continue;
                }
                let (x_ij, d_ij) = params::vdw_pair(atom_params[i], atom_params[j]);
                if geometry::distance(positions[i], positions[j]) > config.vdw_threshold * x_ij {
                    continue;
                }
                ff.vdw.push(VanDerWaals { i, j, x_ij, d_ij });
            }
        }

        debug!(
            bonds = ff.bonds.len(),
            angles = ff.angles.len(),
            torsions = ff.torsions.len(),
            inversions = ff.inversions.len(),
            vdw = ff.vdw.len(),
            "built UFF terms"
        );
        Ok(ff)
    }

    pub fn atom_types(&self) -> &[&'static str] {
        &self.atom_types
    }

    pub fn atom_count(&self) -> usize {
        self.atom_types.len()
    }

    /// Total energy in kcal/mol.
    pub fn energy(&self, positions: &[Vec3]) -> f64 {
        self.value(&flatten(positions))
    }

    /// Gradient of the energy with respect to each atom position.
    pub fn gradient(&self, positions: &[Vec3]) -> Vec<Vec3> {
        let x = flatten(positions);
        let mut grad = vec![0.0; x.len()];
        self.value_and_gradient(&x, &mut grad);
        grad.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect()
    }

    fn bond_order(&self, mol: &Molecule, i: usize, j: usize) -> f64 {
        let Some(bond) = mol.bond_between(i, j) else {
            return 1.0;
        };
        if bond.order == BondOrder::Single && !bond.is_aromatic && self.is_amide_bond(mol, i, j) {
            return AMIDE_BOND_ORDER;
        }
        bond.effective_order()
    }

    /// Single bond between a trigonal amide carbon (C=O) and a trigonal nitrogen.
    fn is_amide_bond(&self, mol: &Molecule, i: usize, j: usize) -> bool {
        let (c, n) = match (mol.atoms[i].element, mol.atoms[j].element) {
            (Element::C, Element::N) => (i, j),
            (Element::N, Element::C) => (j, i),
            _ => return false,
        };
        let trigonal = |idx: usize, labels: [&str; 2]| labels.contains(&self.atom_types[idx]);
        trigonal(c, ["C_2", "C_R"])
            && trigonal(n, ["N_2", "N_R"])
            && mol.neighbors(c).any(|o| {
                mol.atoms[o].element == Element::O
                    && mol
                        .bond_between(c, o)
                        .is_some_and(|b| b.order == BondOrder::Double)
            })
    }

    /// Force constant and Fourier coefficients for an inversion center.
    fn inversion_profile(
        &self,
        mol: &Molecule,
        center: usize,
        neighbors: [usize; 3],
    ) -> Option<(f64, f64, f64, f64)> {
        match self.atom_types[center] {
            "C_2" | "C_R" => {
                let carbonyl = neighbors.iter().any(|&n| self.atom_types[n] == "O_2");
                let force = if carbonyl { 50.0 } else { 6.0 };
                Some((force, 1.0, -1.0, 0.0))
            }
            "N_2" | "N_R" => Some((6.0, 1.0, -1.0, 0.0)),
            _ => {
                let element = mol.atoms[center].element;
                let (_, w0) = PNICTOGEN_INVERSION_ANGLE
                    .iter()
                    .find(|(e, _)| *e == element)?;
                let w0 = w0.to_radians();
                let c2 = 1.0;
                let c1 = -4.0 * w0.cos();
                let c0 = -(c1 * w0.cos() + c2 * (2.0 * w0).cos());
                Some((22.0 / (c0 + c1 + c2), c0, c1, c2))
            }
        }
    }
}

impl Objective for UffForceField {
    fn value(&self, x: &[f64]) -> f64 {
        self.bonds.iter().map(|t| t.energy(x)).sum::<f64>()
            + self.angles.iter().map(|t| t.energy(x)).sum::<f64>()
            + self.torsions.iter().map(|t| t.energy(x)).sum::<f64>()
            + self.inversions.iter().map(|t| t.energy(x)).sum::<f64>()
            + self.vdw.iter().map(|t| t.energy(x)).sum::<f64>()
    }

    fn value_and_gradient(&self, x: &[f64], grad: &mut [f64]) -> f64 {
        let mut energy = 0.0;
        for t in &self.bonds {
            energy += t.accumulate(x, grad);
        }
        for t in &self.angles {
            energy += t.accumulate(x, grad);
        }
        for t in &self.torsions {
            energy += t.accumulate(x, grad);
        }
        for t in &self.inversions {
            energy += t.accumulate(x, grad);
        }
        for t in &self.vdw {
            energy += t.accumulate(x, grad);
        }
        energy
    }
}

#[inline]
fn pair_key(a: usize, b: usize) -> (usize, usize) {
    if a < b { (a, b) } else { (b, a) }
}

fn flatten(positions: &[Vec3]) -> Vec<f64> {
    positions.iter().flat_map(|p| p.iter().copied()).collect()
}

fn is_chalcogen(e: Element) -> bool {
    matches!(e, Element::O | Element::S | Element::Se | Element::Te)
}

/// Barrier, periodicity and `cos(nφ0)` for the torsion `i-j-k-l`, or `None`
/// when the central bond carries no torsional term.
#[allow(clippy::too_many_arguments)]
fn torsion_profile(
    mol: &Molecule,
    topo: &Topology,
    params: &[&AtomParams],
    i: usize,
    j: usize,
    k: usize,
    l: usize,
    order: f64,
) -> Option<(f64, f64, f64)> {
    use Hybridization::{SP2, SP3};
    let (hj, hk) = (topo.hybridization[j], topo.hybridization[k]);
    let (ej, ek) = (mol.atoms[j].element, mol.atoms[k].element);
    let conjugated = |a: &AtomParams, b: &AtomParams| {
        5.0 * (a.uj * b.uj).sqrt() * (1.0 + 4.18 * order.ln())
    };

    match (hj, hk) {
        (SP3, SP3) => {
            if is_chalcogen(ej) && is_chalcogen(ek) {
                let v = |e: Element| if e == Element::O { 2.0_f64 } else { 6.8 };
                Some(((v(ej) * v(ek)).sqrt(), 2.0, -1.0))
            } else {
                Some(((params[j].vi * params[k].vi).sqrt(), 3.0, -1.0))
            }
        }
        (SP2, SP2) => Some((conjugated(params[j], params[k]), 2.0, 1.0)),
        (SP2, SP3) | (SP3, SP2) => {
            let (sp2, sp3, outer) = if hj == SP2 { (j, k, i) } else { (k, j, l) };
            let e2 = mol.atoms[sp2].element;
            let e3 = mol.atoms[sp3].element;
            if is_chalcogen(e3) && !is_chalcogen(e2) {
                Some((conjugated(params[sp2], params[sp3]), 2.0, -1.0))
            } else if topo.hybridization[outer] == SP2 {
                Some((2.0, 3.0, -1.0))
            } else {
                Some((1.0, 6.0, 1.0))
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hydrogens::add_hydrogens;
    use crate::optimize::tests::numeric_gradient;
    use crate::smiles;

    /// Deterministic, roughly molecule-sized scatter.
    fn scattered(n: usize) -> Vec<Vec3> {
        (0..n)
            .map(|k| {
                let t = k as f64;
                [
                    1.3 * (0.7 * t).cos() + 0.1 * t,
                    1.3 * (0.7 * t).sin(),
                    0.35 * t + 0.2 * (1.3 * t).sin(),
                ]
            })
            .collect()
    }

    fn field(smiles: &str) -> (Molecule, Vec<Vec3>, UffForceField) {
        let mut mol = smiles::parse(smiles).unwrap();
        add_hydrogens(&mut mol);
        let pos = scattered(mol.atom_count());
        let ff = UffForceField::new(&mol, &pos, &UffConfig::default()).unwrap();
        (mol, pos, ff)
    }

    #[test]
    fn term_counts_for_ethane() {
        let (_, _, ff) = field("CC");
        assert_eq!(ff.bonds.len(), 7);
        assert_eq!(ff.angles.len(), 12);
        assert_eq!(ff.torsions.len(), 9);
        assert!(ff.inversions.is_empty());
        // H-C-C-H are the only 1-4 pairs.
        assert_eq!(ff.vdw.len(), 9);
        let total: f64 = ff.torsions.iter().map(|t| t.barrier).sum();
        let vi = params::default_parameters().unwrap().get("C_3").unwrap().vi;
        assert!((total - vi).abs() < 1e-9);
    }

    #[test]
    fn planar_centers_get_three_inversion_terms() {
        let (_, _, ff) = field("C=C");
        assert_eq!(ff.inversions.len(), 6);
        assert!(ff.inversions.iter().all(|t| (t.force - 2.0).abs() < 1e-12));
        let (_, _, acid) = field("CC(=O)O");
        assert!(acid.inversions.iter().any(|t| (t.force - 50.0 / 3.0).abs() < 1e-12));
    }

    #[test]
    fn amide_bond_is_partially_double() {
        let (mol, _, ff) = field("CC(=O)NC");
        assert!(ff.is_amide_bond(&mol, 1, 3));
        assert!((ff.bond_order(&mol, 1, 3) - AMIDE_BOND_ORDER).abs() < 1e-12);
        assert!(!ff.is_amide_bond(&mol, 3, 4));
    }

    #[test]
    fn analytic_gradient_matches_numeric() {
        for smiles in ["CC(=O)Oc1ccccc1C(=O)O", "CP(C)C", "C=CC=O", "COC"] {
            let (_, pos, ff) = field(smiles);
            let x = flatten(&pos);
            let mut grad = vec![0.0; x.len()];
            let e = ff.value_and_gradient(&x, &mut grad);
            assert!((e - ff.value(&x)).abs() < 1e-8 * e.abs().max(1.0));
            let num = numeric_gradient(&ff, &x);
            for (k, (a, b)) in grad.iter().zip(&num).enumerate() {
                assert!(
                    (a - b).abs() < 1e-3 * (1.0 + b.abs()),
                    "{smiles} component {k}: {a} vs {b}"
                );
            }
        }
    }

    #[test]
    fn interfragment_pairs_follow_config() {
        let mut mol = smiles::parse("C.C").unwrap();
        add_hydrogens(&mut mol);
        let pos = scattered(mol.atom_count());
        let skip = UffForceField::new(&mol, &pos, &UffConfig::default()).unwrap();
        assert!(skip.vdw.is_empty());
        let keep = UffForceField::new(
            &mol,
            &pos,
            &UffConfig {
                ignore_interfragment: false,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(keep.vdw.len(), 25);
    }

    #[test]
    fn atom_types_are_exposed() {
        let (_, pos, ff) = field("O");
        assert_eq!(ff.atom_types(), &["O_3", "H_", "H_"]);
        assert_eq!(ff.atom_count(), 3);
        assert_eq!(ff.gradient(&pos).len(), 3);
    }
}
