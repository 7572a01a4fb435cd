//! SMILES line notation to molecular graph.
//!
//! [`parse`] accepts the organic subset, bracket atoms (isotope, tetrahedral
//! chirality, hydrogen count, charge, atom class), all bond symbols
//! including `/` and `\`, branches, ring closures with `%nn` labels, and
//! dot-disconnected fragments. The resulting [`Molecule`] has:
//!
//! - aromatic bonds kekulized, with aromatic flags kept on atoms and bonds;
//! - implicit hydrogen counts filled in from the valence model;
//! - `@`/`@@` centers and `/`/`\` double bonds recorded as stereo annotations.
//!
//! Text after the first whitespace is taken as the molecule name.

mod error;
mod kekulize;
mod parser;
mod valence;

pub use error::SmilesError;

use crate::model::molecule::Molecule;
use tracing::debug;

/// Parses a SMILES string into a hydrogen-suppressed molecular graph.
///
/// # Errors
///
/// Returns [`SmilesError`] for syntax errors, aromatic systems with no valid
/// Kekulé form, and atoms bonded beyond their allowed valence.
pub fn parse(smiles: &str) -> Result<Molecule, SmilesError> {
    let trimmed = smiles.trim();
    let (text, name) = match trimmed.split_once(char::is_whitespace) {
        Some((text, name)) => (text, name.trim()),
        None => (trimmed, ""),
    };

    let mut mol = parser::parse(text)?;
    kekulize::kekulize(&mut mol)?;
    valence::assign_hydrogens(&mut mol)?;
    mol.name = name.to_string();

    debug!(
        smiles = text,
        atoms = mol.atom_count(),
        bonds = mol.bond_count(),
        stereo_centers = mol.stereo_centers.len(),
        "parsed SMILES"
    );
    Ok(mol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::{BondOrder, Element};

    #[test]
    fn aspirin_graph() {
        let mol = parse("CC(=O)Oc1ccccc1C(=O)O").unwrap();
        assert_eq!(mol.atom_count(), 13);
        assert_eq!(mol.heavy_atom_count(), 13);
        assert_eq!(mol.hydrogen_count(), 8);
        assert_eq!(mol.formula(), "C9H8O4");
        let ring_doubles = mol
            .bonds
            .iter()
            .filter(|b| b.is_aromatic && b.order == BondOrder::Double)
            .count();
        assert_eq!(ring_doubles, 3);
    }

    #[test]
    fn name_follows_whitespace() {
        let mol = parse("  CCO ethanol  ").unwrap();
        assert_eq!(mol.name, "ethanol");
        assert_eq!(mol.atom_count(), 3);
    }

    #[test]
    fn charged_aromatic_ring() {
        let mol = parse("c1cc[n+](C)cc1").unwrap();
        assert_eq!(mol.atoms[3].element, Element::N);
        assert_eq!(mol.atoms[3].formal_charge, 1);
        assert_eq!(mol.net_charge(), 1);
    }

    #[test]
    fn malformed_input_is_rejected() {
        assert!(parse("not-a-smiles").is_err());
        assert!(parse("   ").is_err());
        assert!(parse("C1CC").is_err());
        assert!(matches!(
            parse("c1cccc1"),
            Err(SmilesError::Kekulize { .. })
        ));
    }
}
