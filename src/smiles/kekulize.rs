use super::error::SmilesError;
use crate::model::molecule::Molecule;
use crate::model::types::BondOrder;
use std::collections::VecDeque;

/// Upper bound on search steps before giving up on a matching.
const SEARCH_BUDGET: usize = 200_000;

/// Replaces every aromatic bond with an explicit single or double order.
///
/// Aromatic atoms that still need a π bond are paired along aromatic bonds
/// (a perfect matching); matched bonds become double, the rest single. The
/// aromatic flags on atoms and bonds are kept.
pub(super) fn kekulize(mol: &mut Molecule) -> Result<(), SmilesError> {
    demote_acyclic_aromatic_bonds(mol);

    let n = mol.atom_count();
    let needs_pi: Vec<bool> = (0..n).map(|a| needs_pi_bond(mol, a)).collect();

    let mut partners: Vec<Vec<usize>> = vec![Vec::new(); n];
    for bond in mol.bonds.iter().filter(|b| b.order == BondOrder::Aromatic) {
        if needs_pi[bond.i] && needs_pi[bond.j] {
            partners[bond.i].push(bond.j);
            partners[bond.j].push(bond.i);
        }
    }

    let candidates: Vec<usize> = (0..n).filter(|&a| needs_pi[a]).collect();
    let mut mate: Vec<Option<usize>> = vec![None; n];
    let mut budget = SEARCH_BUDGET;

    if !match_all(&candidates, &partners, &mut mate, &mut budget) {
        let atom = candidates
            .iter()
            .copied()
            .find(|&a| partners[a].is_empty())
            .or_else(|| candidates.first().copied())
            .unwrap_or(0);
        return Err(SmilesError::Kekulize { atom });
    }

    for bond in mol.bonds.iter_mut() {
        if bond.order == BondOrder::Aromatic {
            bond.order = if mate[bond.i] == Some(bond.j) {
                BondOrder::Double
            } else {
                BondOrder::Single
            };
            bond.is_aromatic = true;
        }
    }
    Ok(())
}

/// Implicit aromatic bonds between rings (`c1ccccc1c1ccccc1`) are plain
/// single bonds.
fn demote_acyclic_aromatic_bonds(mol: &mut Molecule) {
    let adjacency = mol.adjacency();
    for bond in mol.bonds.iter_mut() {
        if bond.order == BondOrder::Aromatic && !edge_in_cycle(&adjacency, bond.i, bond.j) {
            bond.order = BondOrder::Single;
            bond.is_aromatic = false;
        }
    }
}

fn edge_in_cycle(adjacency: &[Vec<usize>], from: usize, to: usize) -> bool {
    let mut seen = vec![false; adjacency.len()];
    seen[from] = true;
    let mut queue = VecDeque::from([from]);
    while let Some(a) = queue.pop_front() {
        for &b in &adjacency[a] {
            if a == from && b == to {
                continue;
            }
            if b == to {
                return true;
            }
            if !seen[b] {
                seen[b] = true;
                queue.push_back(b);
            }
        }
    }
    false
}

/// An aromatic atom needs a π bond when its lowest reachable valence leaves
/// room beyond the σ bonds and fixed hydrogens it already has.
fn needs_pi_bond(mol: &Molecule, atom: usize) -> bool {
    let a = &mol.atoms[atom];
    if !a.is_aromatic {
        return false;
    }
    let fixed_h = if a.no_implicit {
        u32::from(a.implicit_hydrogens)
    } else {
        0
    };
    let used = mol.explicit_valence(atom) + fixed_h;
    a.element
        .charged_valences(a.formal_charge)
        .iter()
        .map(|&v| u32::from(v))
        .find(|&v| v >= used)
        .is_some_and(|v| v > used)
}

fn match_all(
    candidates: &[usize],
    partners: &[Vec<usize>],
    mate: &mut [Option<usize>],
    budget: &mut usize,
) -> bool {
    if *budget == 0 {
        return false;
    }
    *budget -= 1;

    // Most constrained unmatched atom first.
    let mut pick: Option<(usize, usize)> = None;
    for &a in candidates {
        if mate[a].is_some() {
            continue;
        }
        let free = partners[a].iter().filter(|&&b| mate[b].is_none()).count();
        if free == 0 {
            return false;
        }
        if pick.is_none_or(|(_, best)| free < best) {
            pick = Some((a, free));
        }
    }
    let Some((a, _)) = pick else {
        return true;
    };

    for &b in &partners[a] {
        if mate[b].is_some() {
            continue;
        }
        mate[a] = Some(b);
        mate[b] = Some(a);
        if match_all(candidates, partners, mate, budget) {
            return true;
        }
        mate[a] = None;
        mate[b] = None;
    }
    false
}
