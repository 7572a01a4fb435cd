//! Graph perception shared by the embedder and the force field.
//!
//! [`Topology`] caches neighbor lists, hybridization, smallest ring sizes,
//! topological distances, and the enumerated internal coordinates (angles,
//! torsions, inversion centers) of a [`Molecule`].

use super::molecule::Molecule;
use super::types::{BondOrder, Element, Hybridization};
use std::collections::{HashSet, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Angle {
    pub i: usize,
    /// Vertex atom.
    pub j: usize,
    pub k: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Torsion {
    pub i: usize,
    pub j: usize,
    pub k: usize,
    pub l: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Inversion {
    pub center: usize,
    pub neighbors: [usize; 3],
}

#[derive(Debug, Clone)]
pub struct Topology {
    pub neighbors: Vec<Vec<usize>>,
    pub hybridization: Vec<Hybridization>,
    /// Rings as atom cycles, smallest ring through each bond, deduplicated.
    pub rings: Vec<Vec<usize>>,
    pub angles: Vec<Angle>,
    pub torsions: Vec<Torsion>,
    pub inversions: Vec<Inversion>,
    distances: Vec<Vec<u32>>,
}

pub const UNREACHABLE: u32 = u32::MAX;

impl Topology {
    pub fn perceive(mol: &Molecule) -> Self {
        let neighbors = mol.adjacency();
        let distances = topological_distances(&neighbors);
        let rings = find_rings(mol, &neighbors);
        let hybridization = perceive_hybridization(mol, &neighbors);
        let angles = enumerate_angles(&neighbors);
        let torsions = enumerate_torsions(mol, &neighbors);
        let inversions = neighbors
            .iter()
            .enumerate()
            .filter(|(_, n)| n.len() == 3)
            .map(|(center, n)| Inversion {
                center,
                neighbors: [n[0], n[1], n[2]],
            })
            .collect();

        Self {
            neighbors,
            hybridization,
            rings,
            angles,
            torsions,
            inversions,
            distances,
        }
    }

    #[inline]
    pub fn atom_count(&self) -> usize {
        self.neighbors.len()
    }

    /// Number of bonds on the shortest path between two atoms.
    #[inline]
    pub fn path_length(&self, i: usize, j: usize) -> u32 {
        self.distances[i][j]
    }

    pub fn smallest_ring_with_atom(&self, atom: usize) -> Option<usize> {
        self.rings
            .iter()
            .filter(|r| r.contains(&atom))
            .map(Vec::len)
            .min()
    }

    pub fn smallest_ring_with_bond(&self, i: usize, j: usize) -> Option<usize> {
        self.rings
            .iter()
            .filter(|r| ring_has_edge(r, i, j))
            .map(Vec::len)
            .min()
    }

    /// Smallest ring that contains every atom in `atoms` as a contiguous path.
    pub fn smallest_ring_with_path(&self, atoms: &[usize]) -> Option<usize> {
        self.rings
            .iter()
            .filter(|r| atoms.windows(2).all(|w| ring_has_edge(r, w[0], w[1])))
            .map(Vec::len)
            .min()
    }

    #[inline]
    pub fn is_in_ring(&self, atom: usize) -> bool {
        self.smallest_ring_with_atom(atom).is_some()
    }
}

fn ring_has_edge(ring: &[usize], a: usize, b: usize) -> bool {
    let n = ring.len();
    (0..n).any(|k| {
        let (x, y) = (ring[k], ring[(k + 1) % n]);
        (x == a && y == b) || (x == b && y == a)
    })
}

fn topological_distances(neighbors: &[Vec<usize>]) -> Vec<Vec<u32>> {
    let n = neighbors.len();
    let mut dist = vec![vec![UNREACHABLE; n]; n];
    for (start, row) in dist.iter_mut().enumerate() {
        row[start] = 0;
        let mut queue = VecDeque::from([start]);
        while let Some(a) = queue.pop_front() {
            for &b in &neighbors[a] {
                if row[b] == UNREACHABLE {
                    row[b] = row[a] + 1;
                    queue.push_back(b);
                }
            }
        }
    }
    dist
}

/// Smallest cycle through each bond: shortest path between its ends with
/// the bond itself removed.
fn find_rings(mol: &Molecule, neighbors: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let mut seen: HashSet<Vec<usize>> = HashSet::new();
    let mut rings = Vec::new();

    for bond in &mol.bonds {
        let Some(path) = shortest_path_without_edge(neighbors, bond.i, bond.j) else {
            continue;
        };
        let mut key = path.clone();
        key.sort_unstable();
        if seen.insert(key) {
            rings.push(path);
        }
    }
    rings.sort_by_key(Vec::len);
    rings
}

fn shortest_path_without_edge(neighbors: &[Vec<usize>], from: usize, to: usize) -> Option<Vec<usize>> {
    let mut prev = vec![usize::MAX; neighbors.len()];
    prev[from] = from;
    let mut queue = VecDeque::from([from]);
    while let Some(a) = queue.pop_front() {
        for &b in &neighbors[a] {
            if a == from && b == to {
                continue;
            }
            if prev[b] != usize::MAX {
                continue;
            }
            prev[b] = a;
            if b == to {
                let mut path = vec![to];
                let mut cur = to;
                while cur != from {
                    cur = prev[cur];
                    path.push(cur);
                }
                path.reverse();
                return Some(path);
            }
            queue.push_back(b);
        }
    }
    None
}

fn perceive_hybridization(mol: &Molecule, neighbors: &[Vec<usize>]) -> Vec<Hybridization> {
    let n = mol.atom_count();
    let mut pi_bonds = vec![0u32; n];
    let mut triple = vec![false; n];
    let mut aromatic = vec![false; n];
    for bond in &mol.bonds {
        let extra = u32::from(bond.order.valence_contribution()) - 1;
        for a in [bond.i, bond.j] {
            pi_bonds[a] += extra;
            if bond.order == BondOrder::Triple {
                triple[a] = true;
            }
            if bond.is_aromatic {
                aromatic[a] = true;
            }
        }
    }

    let mut hyb: Vec<Hybridization> = (0..n)
        .map(|a| {
            let atom = &mol.atoms[a];
            let degree = neighbors[a].len() + usize::from(atom.implicit_hydrogens);
            let is_aromatic = aromatic[a] || atom.is_aromatic;
            // Sulfones, sulfoxides and phosphoryls keep a tetrahedral frame.
            let hypervalent = atom.element.period() >= 3 && degree >= 3 && !is_aromatic;
            match atom.element {
                Element::H => Hybridization::S,
                _ if is_metal(atom.element) => Hybridization::Unspecified,
                _ if degree == 0 => Hybridization::Unspecified,
                _ if triple[a] => Hybridization::SP,
                _ if hypervalent && pi_bonds[a] > 0 => Hybridization::SP3,
                _ if pi_bonds[a] >= 2 => Hybridization::SP,
                _ if pi_bonds[a] == 1 || is_aromatic => Hybridization::SP2,
                Element::B if degree <= 3 => Hybridization::SP2,
                _ => Hybridization::SP3,
            }
        })
        .collect();

    // Lone-pair donors next to a π system are conjugated and planar.
    let base = hyb.clone();
    for a in 0..n {
        let atom = &mol.atoms[a];
        if hyb[a] != Hybridization::SP3 || atom.formal_charge > 0 {
            continue;
        }
        let degree = neighbors[a].len() + usize::from(atom.implicit_hydrogens);
        let donor = match atom.element {
            Element::N => degree == 3,
            Element::O => degree == 2,
            _ => false,
        };
        if donor
            && neighbors[a]
                .iter()
                .any(|&nb| base[nb] == Hybridization::SP2)
        {
            hyb[a] = Hybridization::SP2;
        }
    }
    hyb
}

fn is_metal(e: Element) -> bool {
    !matches!(
        e,
        Element::H
            | Element::He
            | Element::B
            | Element::C
            | Element::N
            | Element::O
            | Element::F
            | Element::Ne
            | Element::Si
            | Element::P
            | Element::S
            | Element::Cl
            | Element::Ar
            | Element::Ge
            | Element::As
            | Element::Se
            | Element::Br
            | Element::Kr
            | Element::Sb
            | Element::Te
            | Element::I
            | Element::Xe
            | Element::At
            | Element::Rn
    )
}

fn enumerate_angles(neighbors: &[Vec<usize>]) -> Vec<Angle> {
    let mut out = Vec::new();
    for (j, nb) in neighbors.iter().enumerate() {
        for a in 0..nb.len() {
            for b in (a + 1)..nb.len() {
                out.push(Angle {
                    i: nb[a],
                    j,
                    k: nb[b],
                });
            }
        }
    }
    out
}

fn enumerate_torsions(mol: &Molecule, neighbors: &[Vec<usize>]) -> Vec<Torsion> {
    let mut out = Vec::new();
    for bond in &mol.bonds {
        let (j, k) = (bond.i, bond.j);
        for &i in &neighbors[j] {
            if i == k {
                continue;
            }
            for &l in &neighbors[k] {
                if l == j || l == i {
                    continue;
                }
                out.push(Torsion { i, j, k, l });
            }
        }
    }
    out
}
