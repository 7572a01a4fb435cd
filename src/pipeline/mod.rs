//! End-to-end SMILES to 3D structure generation.
//!
//! [`forge`] runs parsing, hydrogen completion, embedding, and UFF
//! relaxation on one molecule. [`forge_to_file`] additionally writes the
//! relaxed conformer as a MOL file.

mod config;
mod error;

pub use config::ForgeConfig;
pub use error::Error;

use crate::embed;
use crate::hydrogens;
use crate::io;
use crate::model::molecule::Molecule;
use crate::smiles;
use crate::uff::{self, OptimizeOutcome};
use std::path::Path;
use tracing::{debug, info, warn};

/// A hydrogen-complete molecule with one relaxed conformer.
#[derive(Debug, Clone)]
pub struct ForgedMolecule {
    pub molecule: Molecule,
    /// Id of the embedded and optimized conformer.
    pub conf_id: usize,
    pub optimization: OptimizeOutcome,
}

/// Builds a relaxed 3D structure for `smiles`.
///
/// Failing to converge within `config.uff.max_iterations` only logs a
/// warning; the partially optimized coordinates are kept.
pub fn forge(smiles: &str, config: &ForgeConfig) -> Result<ForgedMolecule, Error> {
    let mut molecule = smiles::parse(smiles)?;
    let added = hydrogens::add_hydrogens(&mut molecule);
    debug!(added, atoms = molecule.atom_count(), "completed hydrogens");

    let conf_id = embed::embed_molecule(&mut molecule, &config.embed)?;
    debug!(conf_id, "embedded conformer");

    let optimization = uff::optimize_molecule(&mut molecule, conf_id, &config.uff)?;
    if !optimization.converged {
        warn!(
            iterations = optimization.iterations,
            energy = optimization.final_energy,
            "UFF optimization did not converge; keeping last coordinates"
        );
    }

    info!(
        formula = %molecule.formula(),
        atoms = molecule.atom_count(),
        energy = optimization.final_energy,
        "generated 3D structure"
    );
    Ok(ForgedMolecule {
        molecule,
        conf_id,
        optimization,
    })
}

/// Runs [`forge`] and writes the result to `path` as a MOL file.
///
/// Nothing is written unless every stage succeeds.
pub fn forge_to_file(
    smiles: &str,
    path: impl AsRef<Path>,
    config: &ForgeConfig,
) -> Result<ForgedMolecule, Error> {
    let forged = forge(smiles, config)?;
    io::write_mol_file(path.as_ref(), &forged.molecule, forged.conf_id)?;
    debug!(path = %path.as_ref().display(), "wrote MOL file");
    Ok(forged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry;
    use crate::io::mol;
    use std::io::Cursor;

    #[test]
    fn aspirin_gets_full_hydrogen_set() {
        let forged = forge("CC(=O)Oc1ccccc1C(=O)O", &ForgeConfig::seeded(42)).unwrap();
        assert_eq!(forged.molecule.atom_count(), 21);
        assert_eq!(forged.molecule.bond_count(), 21);
        assert_eq!(forged.molecule.num_conformers(), 1);
        assert_eq!(forged.molecule.formula(), "C9H8O4");
    }

    #[test]
    fn relaxation_does_not_raise_energy() {
        let forged = forge("CC(=O)Oc1ccccc1C(=O)O", &ForgeConfig::seeded(7)).unwrap();
        let outcome = forged.optimization;
        assert!(outcome.final_energy <= outcome.initial_energy + 1e-9);
        assert!(outcome.final_energy.is_finite());
    }

    #[test]
    fn relaxed_bonds_are_chemical() {
        let forged = forge("OCC(=O)N", &ForgeConfig::seeded(3)).unwrap();
        let mol = &forged.molecule;
        let positions = mol.conformer(forged.conf_id).unwrap().positions();
        for bond in &mol.bonds {
            let d = geometry::distance(positions[bond.i], positions[bond.j]);
            assert!((0.9..1.6).contains(&d), "bond {}-{} is {d:.3} Å", bond.i, bond.j);
        }
    }

    #[test]
    fn same_seed_same_structure() {
        let a = forge("CCO", &ForgeConfig::seeded(11)).unwrap();
        let b = forge("CCO", &ForgeConfig::seeded(11)).unwrap();
        assert_eq!(
            a.molecule.conformer(0).unwrap().positions(),
            b.molecule.conformer(0).unwrap().positions()
        );
    }

    #[test]
    fn malformed_smiles_is_a_parse_error() {
        assert!(matches!(
            forge("not-a-smiles", &ForgeConfig::default()),
            Err(Error::Smiles(_))
        ));
    }

    #[test]
    fn unsupported_element_fails_before_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("molecule.mol");
        let err = forge_to_file("[Fe]", &path, &ForgeConfig::seeded(1)).unwrap_err();
        assert!(matches!(err, Error::Embed(_) | Error::Optimize(_)));
        assert!(!path.exists());
    }

    #[test]
    fn file_holds_the_relaxed_conformer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("molecule.mol");
        let forged = forge_to_file("C1CC1", &path, &ForgeConfig::seeded(5)).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let read = mol::read(Cursor::new(text.as_bytes())).unwrap();
        assert_eq!(read.atom_count(), 9);
        let expected = forged.molecule.conformer(0).unwrap().positions();
        for (p, q) in expected.iter().zip(read.conformer(0).unwrap().positions()) {
            assert!(geometry::distance(*p, *q) < 1e-3);
        }
    }
}
