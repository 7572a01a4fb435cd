//! Conversion between implicit hydrogen counts and explicit hydrogen atoms.

use crate::geometry::{self, Vec3};
use crate::model::atom::Atom;
use crate::model::molecule::Molecule;
use crate::model::stereo::NeighborRef;
use crate::model::types::{BondOrder, Element};
use std::collections::HashSet;
use tracing::debug;

/// Distance at which hydrogens are dropped onto an existing conformer.
const PLACEMENT_DISTANCE: f64 = 1.0;

/// Turns every implicit hydrogen into an explicit atom.
///
/// New hydrogens are appended after the existing atoms in parent order and
/// joined to their parent by a single bond. Stereo centers that referred to
/// an implicit hydrogen are rewritten to the new atom. When the molecule
/// already carries conformers, each hydrogen is placed
/// [`PLACEMENT_DISTANCE`] from its parent, away from the parent's other
/// neighbors.
///
/// Returns the number of hydrogens added.
pub fn add_hydrogens(mol: &mut Molecule) -> usize {
    let parents = mol.atom_count();
    let mut added = 0;

    for parent in 0..parents {
        let count = mol.atoms[parent].implicit_hydrogens;
        if count == 0 {
            continue;
        }
        mol.atoms[parent].implicit_hydrogens = 0;

        for k in 0..count {
            let h = mol.add_atom(Atom::new(Element::H));
            mol.push_bond(parent, h, BondOrder::Single);
            place_on_conformers(mol, parent, h);
            if k == 0 {
                resolve_implicit_reference(mol, parent, h);
            }
            added += 1;
        }
    }

    debug!(added, atoms = mol.atom_count(), "added explicit hydrogens");
    added
}

fn resolve_implicit_reference(mol: &mut Molecule, center: usize, h: usize) {
    for stereo in mol.stereo_centers.iter_mut().filter(|s| s.center == center) {
        for slot in stereo.neighbors.iter_mut() {
            if *slot == NeighborRef::ImplicitH {
                *slot = NeighborRef::Atom(h);
            }
        }
    }
}

fn place_on_conformers(mol: &mut Molecule, parent: usize, h: usize) {
    if mol.num_conformers() == 0 {
        return;
    }
    let others: Vec<usize> = mol.neighbors(parent).filter(|&n| n != h).collect();
    let ids: Vec<usize> = mol.conformers().iter().map(|c| c.id()).collect();

    for id in ids {
        let Some(conf) = mol.conformer_mut(id) else {
            continue;
        };
        let positions = conf.positions_mut();
        let origin = positions[parent];
        let around: Vec<Vec3> = others.iter().map(|&n| positions[n]).collect();
        let dir = placement_direction(origin, &around);
        positions[h] = geometry::add(origin, geometry::scale(dir, PLACEMENT_DISTANCE));
    }
}

fn placement_direction(origin: Vec3, neighbors: &[Vec3]) -> Vec3 {
    if !neighbors.is_empty() {
        let away = geometry::sub(origin, geometry::centroid(neighbors));
        if geometry::norm(away) > 1e-6 {
            return geometry::normalize(away);
        }
        // Balanced neighbors: go perpendicular to the first bond.
        let bond = geometry::sub(neighbors[0], origin);
        for axis in [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]] {
            let perp = geometry::cross(bond, axis);
            if geometry::norm(perp) > 1e-6 {
                return geometry::normalize(perp);
            }
        }
    }
    [1.0, 0.0, 0.0]
}

/// Copy of `mol` with ordinary explicit hydrogens folded back into their
/// parents' implicit counts.
///
/// Hydrogens are kept when they carry an isotope or charge, are not bonded
/// to exactly one heavy atom, or anchor a double-bond configuration. A
/// hydrogen on a tetrahedral center becomes an implicit reference. Conformer
/// coordinates of the kept atoms are carried over; conformer ids are
/// renumbered from zero.
pub fn remove_hydrogens(mol: &Molecule) -> Molecule {
    let anchored: HashSet<usize> = mol
        .double_bond_stereo
        .iter()
        .flat_map(|s| [s.begin_ref, s.end_ref])
        .collect();

    let removable: Vec<bool> = (0..mol.atom_count())
        .map(|idx| {
            let atom = &mol.atoms[idx];
            if !atom.is_hydrogen()
                || atom.isotope != 0
                || atom.formal_charge != 0
                || anchored.contains(&idx)
            {
                return false;
            }
            let mut nbrs = mol.neighbors(idx);
            match (nbrs.next(), nbrs.next()) {
                (Some(parent), None) => !mol.atoms[parent].is_hydrogen(),
                _ => false,
            }
        })
        .collect();

    let mut out = Molecule::new();
    out.name = mol.name.clone();
    let mut map = vec![None; mol.atom_count()];
    for (idx, atom) in mol.atoms.iter().enumerate() {
        if !removable[idx] {
            map[idx] = Some(out.add_atom(atom.clone()));
        }
    }

    for bond in &mol.bonds {
        match (map[bond.i], map[bond.j]) {
            (Some(i), Some(j)) => {
                let _ = out.add_bond(i, j, bond.order);
                if let Some(b) = out.bonds.last_mut() {
                    b.is_aromatic = bond.is_aromatic;
                }
            }
            (Some(parent), None) | (None, Some(parent)) => {
                let count = &mut out.atoms[parent].implicit_hydrogens;
                *count = count.saturating_add(1);
            }
            (None, None) => {}
        }
    }

    for stereo in &mol.stereo_centers {
        let Some(center) = map[stereo.center] else {
            continue;
        };
        let mut mapped = stereo.clone();
        mapped.center = center;
        for slot in mapped.neighbors.iter_mut() {
            if let NeighborRef::Atom(old) = *slot {
                *slot = match map[old] {
                    Some(new) => NeighborRef::Atom(new),
                    None => NeighborRef::ImplicitH,
                };
            }
        }
        out.stereo_centers.push(mapped);
    }

    for stereo in &mol.double_bond_stereo {
        if let (Some(begin), Some(end), Some(begin_ref), Some(end_ref)) = (
            map[stereo.begin],
            map[stereo.end],
            map[stereo.begin_ref],
            map[stereo.end_ref],
        ) {
            let mut mapped = stereo.clone();
            mapped.begin = begin;
            mapped.end = end;
            mapped.begin_ref = begin_ref;
            mapped.end_ref = end_ref;
            out.double_bond_stereo.push(mapped);
        }
    }

    for conf in mol.conformers() {
        let positions: Vec<Vec3> = conf
            .positions()
            .iter()
            .enumerate()
            .filter(|(idx, _)| map[*idx].is_some())
            .map(|(_, p)| *p)
            .collect();
        let _ = out.add_conformer(positions);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::stereo::Chirality;
    use crate::smiles;

    #[test]
    fn aspirin_gains_eight_hydrogens() {
        let mut mol = smiles::parse("CC(=O)Oc1ccccc1C(=O)O").unwrap();
        let added = add_hydrogens(&mut mol);
        assert_eq!(added, 8);
        assert_eq!(mol.atom_count(), 21);
        assert_eq!(mol.heavy_atom_count(), 13);
        assert_eq!(mol.hydrogen_count(), 8);
        assert!(mol.atoms.iter().all(|a| a.implicit_hydrogens == 0));
        // Hydrogens follow heavy atoms, methyl hydrogens first.
        assert!(mol.atoms[13..].iter().all(Atom::is_hydrogen));
        assert_eq!(mol.neighbors(13).collect::<Vec<_>>(), vec![0]);
        assert_eq!(mol.bond_count(), 13 + 8);
        assert!((13..21).all(|h| mol.degree(h) == 1));
        assert_eq!(mol.formula(), "C9H8O4");
    }

    #[test]
    fn implicit_stereo_reference_is_resolved() {
        let mut mol = smiles::parse("N[C@@H](C)C(=O)O").unwrap();
        add_hydrogens(&mut mol);
        let center = &mol.stereo_centers[0];
        let resolved = center.resolved_neighbors().unwrap();
        assert!(mol.atoms[resolved[1]].is_hydrogen());
        assert_eq!(mol.neighbors(resolved[1]).collect::<Vec<_>>(), vec![1]);
        assert_eq!(center.chirality, Chirality::Clockwise);
    }

    #[test]
    fn hydrogens_are_placed_on_existing_conformers() {
        let mut mol = smiles::parse("CO").unwrap();
        mol.add_conformer(vec![[0.0, 0.0, 0.0], [1.4, 0.0, 0.0]]).unwrap();
        add_hydrogens(&mut mol);
        let conf = &mol.conformers()[0];
        for h in 2..mol.atom_count() {
            let parent = mol.neighbors(h).next().unwrap();
            let d = geometry::distance(conf.position(h), conf.position(parent));
            assert!((d - PLACEMENT_DISTANCE).abs() < 1e-9);
        }
        // The first methyl hydrogen points away from oxygen.
        assert!(conf.position(2)[0] < 0.0);
    }

    #[test]
    fn remove_restores_implicit_counts() {
        let mut mol = smiles::parse("N[C@@H](C)C(=O)O").unwrap();
        let heavy = mol.clone();
        add_hydrogens(&mut mol);
        let stripped = remove_hydrogens(&mol);
        assert_eq!(stripped.atom_count(), heavy.atom_count());
        let counts: Vec<u8> = stripped.atoms.iter().map(|a| a.implicit_hydrogens).collect();
        let expected: Vec<u8> = heavy.atoms.iter().map(|a| a.implicit_hydrogens).collect();
        assert_eq!(counts, expected);
        assert_eq!(stripped.stereo_centers, heavy.stereo_centers);
    }

    #[test]
    fn special_hydrogens_are_kept() {
        let mol = smiles::parse("[2H]C([H])[H]").unwrap();
        let stripped = remove_hydrogens(&mol);
        assert_eq!(stripped.atom_count(), 2);
        // One implicit hydrogen from the valence model plus the two bracket ones.
        assert_eq!(stripped.atoms[1].implicit_hydrogens, 3);
        assert_eq!(stripped.atoms[0].isotope, 2);
    }
}
