use super::error::SmilesError;
use crate::model::molecule::Molecule;

/// Fills in implicit hydrogen counts and rejects over-bonded atoms.
///
/// Organic-subset atoms take the smallest allowed valence that covers their
/// bonds; bracket atoms keep the count they were written with. Elements the
/// valence model does not cover get no implicit hydrogens and no check.
pub(super) fn assign_hydrogens(mol: &mut Molecule) -> Result<(), SmilesError> {
    for idx in 0..mol.atom_count() {
        let explicit = mol.explicit_valence(idx);
        let atom = &mol.atoms[idx];
        let allowed = atom.element.charged_valences(atom.formal_charge);
        if allowed.is_empty() {
            continue;
        }
        let max = allowed.iter().copied().map(u32::from).max().unwrap_or(0);

        let hydrogens = if atom.no_implicit {
            u32::from(atom.implicit_hydrogens)
        } else {
            let target = allowed
                .iter()
                .copied()
                .map(u32::from)
                .find(|&v| v >= explicit)
                .ok_or(SmilesError::Valence {
                    atom: idx,
                    element: atom.element,
                    valence: explicit,
                    max,
                })?;
            target - explicit
        };

        let valence = explicit + hydrogens;
        if valence > max {
            return Err(SmilesError::Valence {
                atom: idx,
                element: atom.element,
                valence,
                max,
            });
        }

        if !atom.no_implicit {
            // target - explicit never exceeds the largest valence, which fits a u8.
            mol.atoms[idx].implicit_hydrogens = hydrogens as u8;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::Element;
    use crate::smiles::{kekulize, parser};

    fn hydrogens(smiles: &str) -> Result<Vec<u8>, SmilesError> {
        let mut mol = parser::parse(smiles)?;
        kekulize::kekulize(&mut mol)?;
        assign_hydrogens(&mut mol)?;
        Ok(mol.atoms.iter().map(|a| a.implicit_hydrogens).collect())
    }

    #[test]
    fn organic_atoms_fill_lowest_valence() {
        assert_eq!(hydrogens("CCO").unwrap(), vec![3, 2, 1]);
        assert_eq!(hydrogens("C=O").unwrap(), vec![2, 0]);
        assert_eq!(hydrogens("C#N").unwrap(), vec![1, 0]);
        assert_eq!(hydrogens("c1ccccc1").unwrap(), vec![1; 6]);
        assert_eq!(hydrogens("c1ccncc1").unwrap(), vec![1, 1, 1, 0, 1, 1]);
    }

    #[test]
    fn hypervalent_states_are_reachable() {
        // Sulfur in a sulfone sits at valence 6, phosphorus in a phosphate at 5.
        assert_eq!(hydrogens("CS(=O)(=O)C").unwrap(), vec![3, 0, 0, 0, 3]);
        assert_eq!(hydrogens("OP(=O)(O)O").unwrap(), vec![1, 0, 0, 1, 1]);
    }

    #[test]
    fn bracket_counts_are_kept() {
        assert_eq!(hydrogens("[CH2]C").unwrap(), vec![2, 3]);
        assert_eq!(hydrogens("C[NH3+]").unwrap(), vec![3, 3]);
        assert_eq!(hydrogens("[O-]C").unwrap(), vec![0, 3]);
    }

    #[test]
    fn over_bonded_atoms_are_rejected() {
        assert_eq!(
            hydrogens("C(C)(C)(C)(C)C"),
            Err(SmilesError::Valence {
                atom: 0,
                element: Element::C,
                valence: 5,
                max: 4,
            })
        );
        assert!(matches!(hydrogens("[CH5]"), Err(SmilesError::Valence { .. })));
        assert!(matches!(hydrogens("FF=C"), Err(SmilesError::Valence { .. })));
    }

    #[test]
    fn unmodelled_elements_are_left_alone() {
        assert_eq!(hydrogens("[Na+].[Cl-]").unwrap(), vec![0, 0]);
    }
}
