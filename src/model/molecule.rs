use super::atom::Atom;
use super::conformer::Conformer;
use super::stereo::{DoubleBondStereo, StereoCenter};
use super::types::{BondOrder, Element};
use crate::geometry::Vec3;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("bond references atom {index} but the molecule has {atom_count} atoms")]
    AtomOutOfRange { index: usize, atom_count: usize },

    #[error("an atom cannot bond to itself (atom {0})")]
    SelfBond(usize),

    #[error("atoms {0} and {1} are already bonded")]
    DuplicateBond(usize, usize),

    #[error("conformer has {got} positions but the molecule has {expected} atoms")]
    ConformerSize { expected: usize, got: usize },

    #[error("no conformer with id {0}")]
    NoSuchConformer(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bond {
    pub i: usize,
    pub j: usize,
    /// Kekulé order; aromatic bonds carry `Single` or `Double` here.
    pub order: BondOrder,
    pub is_aromatic: bool,
}

impl Bond {
    pub fn new(idx1: usize, idx2: usize, order: BondOrder) -> Self {
        let (i, j) = if idx1 <= idx2 {
            (idx1, idx2)
        } else {
            (idx2, idx1)
        };
        Self {
            i,
            j,
            order,
            is_aromatic: order == BondOrder::Aromatic,
        }
    }

    #[inline]
    pub fn contains(&self, atom: usize) -> bool {
        self.i == atom || self.j == atom
    }

    /// The partner of `atom` in this bond.
    #[inline]
    pub fn other(&self, atom: usize) -> usize {
        if self.i == atom { self.j } else { self.i }
    }

    /// Order used by force-field terms: 1.5 for aromatic bonds.
    pub fn effective_order(&self) -> f64 {
        if self.is_aromatic {
            1.5
        } else {
            self.order.value()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Molecule {
    pub name: String,
    pub atoms: Vec<Atom>,
    pub bonds: Vec<Bond>,
    pub stereo_centers: Vec<StereoCenter>,
    pub double_bond_stereo: Vec<DoubleBondStereo>,
    conformers: Vec<Conformer>,
    next_conformer_id: usize,
}

impl Molecule {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    #[inline]
    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    pub fn heavy_atom_count(&self) -> usize {
        self.atoms.iter().filter(|a| !a.is_hydrogen()).count()
    }

    pub fn add_atom(&mut self, atom: Atom) -> usize {
        self.atoms.push(atom);
        for conf in &mut self.conformers {
            conf.push([0.0; 3]);
        }
        self.atoms.len() - 1
    }

    pub fn add_bond(&mut self, i: usize, j: usize, order: BondOrder) -> Result<usize, ModelError> {
        let n = self.atoms.len();
        for index in [i, j] {
            if index >= n {
                return Err(ModelError::AtomOutOfRange {
                    index,
                    atom_count: n,
                });
            }
        }
        if i == j {
            return Err(ModelError::SelfBond(i));
        }
        if self.bond_between(i, j).is_some() {
            return Err(ModelError::DuplicateBond(i.min(j), i.max(j)));
        }
        self.bonds.push(Bond::new(i, j, order));
        Ok(self.bonds.len() - 1)
    }

    /// Appends a bond whose endpoints are known to exist, differ, and be
    /// unbonded, such as a parent and its freshly added hydrogen.
    pub(crate) fn push_bond(&mut self, i: usize, j: usize, order: BondOrder) -> usize {
        debug_assert!(i != j && i.max(j) < self.atoms.len());
        debug_assert!(self.bond_between(i, j).is_none());
        self.bonds.push(Bond::new(i, j, order));
        self.bonds.len() - 1
    }

    pub fn bond_between(&self, i: usize, j: usize) -> Option<&Bond> {
        let (a, b) = (i.min(j), i.max(j));
        self.bonds.iter().find(|bond| bond.i == a && bond.j == b)
    }

    pub fn neighbors(&self, atom: usize) -> impl Iterator<Item = usize> + '_ {
        self.bonds
            .iter()
            .filter(move |b| b.contains(atom))
            .map(move |b| b.other(atom))
    }

    /// Neighbor lists for every atom, in bond order.
    pub fn adjacency(&self) -> Vec<Vec<usize>> {
        let mut adj = vec![Vec::new(); self.atoms.len()];
        for bond in &self.bonds {
            adj[bond.i].push(bond.j);
            adj[bond.j].push(bond.i);
        }
        adj
    }

    #[inline]
    pub fn degree(&self, atom: usize) -> usize {
        self.neighbors(atom).count()
    }

    /// Sum of Kekulé bond orders to explicit neighbors.
    pub fn explicit_valence(&self, atom: usize) -> u32 {
        self.bonds
            .iter()
            .filter(|b| b.contains(atom))
            .map(|b| u32::from(b.order.valence_contribution()))
            .sum()
    }

    /// Implicit plus explicit hydrogens attached to `atom`.
    pub fn total_hydrogens(&self, atom: usize) -> u32 {
        let explicit = self
            .neighbors(atom)
            .filter(|&n| self.atoms[n].is_hydrogen())
            .count() as u32;
        u32::from(self.atoms[atom].implicit_hydrogens) + explicit
    }

    /// Total number of hydrogens, implicit or explicit.
    pub fn hydrogen_count(&self) -> usize {
        let explicit = self.atoms.iter().filter(|a| a.is_hydrogen()).count();
        let implicit: usize = self
            .atoms
            .iter()
            .map(|a| usize::from(a.implicit_hydrogens))
            .sum();
        explicit + implicit
    }

    pub fn net_charge(&self) -> i32 {
        self.atoms.iter().map(|a| i32::from(a.formal_charge)).sum()
    }

    /// Molecular formula in Hill order, counting implicit hydrogens.
    pub fn formula(&self) -> String {
        let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
        let mut carbon = 0usize;
        let mut hydrogen = 0usize;
        for atom in &self.atoms {
            hydrogen += usize::from(atom.implicit_hydrogens);
            match atom.element {
                Element::C => carbon += 1,
                Element::H => hydrogen += 1,
                e => *counts.entry(e.symbol()).or_insert(0) += 1,
            }
        }

        let mut out = String::new();
        let mut push = |symbol: &str, count: usize| {
            if count == 0 {
                return;
            }
            out.push_str(symbol);
            if count > 1 {
                out.push_str(&count.to_string());
            }
        };
        if carbon > 0 {
            push("C", carbon);
            push("H", hydrogen);
            for (symbol, count) in &counts {
                push(symbol, *count);
            }
        } else {
            counts.insert("H", hydrogen);
            for (symbol, count) in &counts {
                push(symbol, *count);
            }
        }
        out
    }

    pub fn molecular_weight(&self) -> f64 {
        self.atoms
            .iter()
            .map(|a| {
                a.element.atomic_mass()
                    + f64::from(a.implicit_hydrogens) * Element::H.atomic_mass()
            })
            .sum()
    }

    /// Connected-component label for every atom; labels start at 0.
    pub fn fragments(&self) -> Vec<usize> {
        let adj = self.adjacency();
        let mut label = vec![usize::MAX; self.atoms.len()];
        let mut next = 0;
        for start in 0..self.atoms.len() {
            if label[start] != usize::MAX {
                continue;
            }
            let mut stack = vec![start];
            label[start] = next;
            while let Some(a) = stack.pop() {
                for &n in &adj[a] {
                    if label[n] == usize::MAX {
                        label[n] = next;
                        stack.push(n);
                    }
                }
            }
            next += 1;
        }
        label
    }

    #[inline]
    pub fn num_conformers(&self) -> usize {
        self.conformers.len()
    }

    pub fn conformers(&self) -> &[Conformer] {
        &self.conformers
    }

    pub fn conformer(&self, id: usize) -> Option<&Conformer> {
        self.conformers.iter().find(|c| c.id() == id)
    }

    pub fn conformer_mut(&mut self, id: usize) -> Option<&mut Conformer> {
        self.conformers.iter_mut().find(|c| c.id() == id)
    }

    /// Attaches a coordinate set and returns its id.
    pub fn add_conformer(&mut self, positions: Vec<Vec3>) -> Result<usize, ModelError> {
        if positions.len() != self.atoms.len() {
            return Err(ModelError::ConformerSize {
                expected: self.atoms.len(),
                got: positions.len(),
            });
        }
        let id = self.next_conformer_id;
        self.next_conformer_id += 1;
        self.conformers.push(Conformer::new(id, positions));
        Ok(id)
    }

    pub fn remove_conformer(&mut self, id: usize) -> Result<Conformer, ModelError> {
        let idx = self
            .conformers
            .iter()
            .position(|c| c.id() == id)
            .ok_or(ModelError::NoSuchConformer(id))?;
        Ok(self.conformers.remove(idx))
    }

    pub fn clear_conformers(&mut self) {
        self.conformers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ethanol_heavy() -> Molecule {
        let mut mol = Molecule::new();
        let c1 = mol.add_atom(Atom::new(Element::C).with_implicit_hydrogens(3));
        let c2 = mol.add_atom(Atom::new(Element::C).with_implicit_hydrogens(2));
        let o = mol.add_atom(Atom::new(Element::O).with_implicit_hydrogens(1));
        mol.add_bond(c1, c2, BondOrder::Single).unwrap();
        mol.add_bond(c2, o, BondOrder::Single).unwrap();
        mol
    }

    #[test]
    fn bond_indices_are_normalized() {
        let b = Bond::new(5, 2, BondOrder::Double);
        assert_eq!((b.i, b.j), (2, 5));
        assert_eq!(b.other(2), 5);
        assert!(!b.is_aromatic);
        assert!(Bond::new(0, 1, BondOrder::Aromatic).is_aromatic);
    }

    #[test]
    fn push_bond_appends_normalized_bond() {
        let mut mol = ethanol_heavy();
        let h = mol.add_atom(Atom::new(Element::H));
        assert_eq!(mol.push_bond(h, 2, BondOrder::Single), 2);
        let bond = mol.bond_between(2, h).unwrap();
        assert_eq!((bond.i, bond.j), (2, h));
    }

    #[test]
    fn rejects_invalid_bonds() {
        let mut mol = ethanol_heavy();
        assert_eq!(
            mol.add_bond(0, 9, BondOrder::Single),
            Err(ModelError::AtomOutOfRange {
                index: 9,
                atom_count: 3
            })
        );
        assert_eq!(mol.add_bond(1, 1, BondOrder::Single), Err(ModelError::SelfBond(1)));
        assert_eq!(
            mol.add_bond(1, 0, BondOrder::Single),
            Err(ModelError::DuplicateBond(0, 1))
        );
    }

    #[test]
    fn formula_weight_and_valence() {
        let mol = ethanol_heavy();
        assert_eq!(mol.formula(), "C2H6O");
        assert!((mol.molecular_weight() - 46.069).abs() < 0.01);
        assert_eq!(mol.explicit_valence(1), 2);
        assert_eq!(mol.total_hydrogens(0), 3);
        assert_eq!(mol.hydrogen_count(), 6);
        assert_eq!(mol.heavy_atom_count(), 3);
    }

    #[test]
    fn conformer_size_is_checked() {
        let mut mol = ethanol_heavy();
        assert_eq!(
            mol.add_conformer(vec![[0.0; 3]; 2]),
            Err(ModelError::ConformerSize {
                expected: 3,
                got: 2
            })
        );
        let id = mol.add_conformer(vec![[0.0; 3]; 3]).unwrap();
        assert_eq!(mol.num_conformers(), 1);
        let second = mol.add_conformer(vec![[1.0; 3]; 3]).unwrap();
        assert_ne!(id, second);
        mol.remove_conformer(id).unwrap();
        assert!(mol.conformer(id).is_none());
        assert_eq!(mol.conformer(second).unwrap().position(2), [1.0; 3]);
    }

    #[test]
    fn adding_atoms_grows_existing_conformers() {
        let mut mol = ethanol_heavy();
        let id = mol.add_conformer(vec![[0.0; 3]; 3]).unwrap();
        mol.add_atom(Atom::new(Element::H));
        assert_eq!(mol.conformer(id).unwrap().len(), 4);
    }

    #[test]
    fn fragments_label_disconnected_parts() {
        let mut mol = ethanol_heavy();
        mol.add_atom(Atom::new(Element::Na).with_charge(1));
        let labels = mol.fragments();
        assert_eq!(labels, vec![0, 0, 0, 1]);
        assert_eq!(mol.net_charge(), 1);
    }
}
