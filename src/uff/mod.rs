mod config;
mod error;
mod forcefield;
mod params;
pub(crate) mod terms;
mod typer;

pub use config::UffConfig;
pub use error::UffError;
pub use forcefield::UffForceField;
pub use params::{AtomParams, UffParams, default_parameters, load_parameters};
pub use typer::assign_types;

pub(crate) use params::{angle_force_constant, rest_bond_length};

use crate::model::molecule::Molecule;
use crate::model::topology::Topology;
use crate::optimize;
use tracing::debug;

/// Result of a UFF minimization. Energies are in kcal/mol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizeOutcome {
    pub converged: bool,
    pub iterations: usize,
    pub initial_energy: f64,
    pub final_energy: f64,
}

/// Minimizes the UFF energy of conformer `conf_id` in place.
pub fn optimize_molecule(
    mol: &mut Molecule,
    conf_id: usize,
    config: &UffConfig,
) -> Result<OptimizeOutcome, UffError> {
    let conformer = mol
        .conformer(conf_id)
        .ok_or(UffError::NoSuchConformer(conf_id))?;
    let ff = UffForceField::new(mol, conformer.positions(), config)?;
    let mut x = conformer.to_flat();

    let result = optimize::minimize(&ff, &mut x, &config.minimizer_settings());
    debug!(
        conf_id,
        iterations = result.iterations,
        converged = result.converged,
        initial = result.initial_value,
        energy = result.final_value,
        "UFF minimization finished"
    );

    mol.conformer_mut(conf_id)
        .ok_or(UffError::NoSuchConformer(conf_id))?
        .set_from_flat(&x);

    Ok(OptimizeOutcome {
        converged: result.converged,
        iterations: result.iterations,
        initial_energy: result.initial_value,
        final_energy: result.final_value,
    })
}

/// Whether every atom receives a UFF type with tabulated parameters.
pub fn has_all_params(mol: &Molecule) -> bool {
    let topo = Topology::perceive(mol);
    let (Ok(types), Ok(table)) = (assign_types(mol, &topo), default_parameters()) else {
        return false;
    };
    types.iter().all(|label| table.get(label).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry;
    use crate::hydrogens::add_hydrogens;
    use crate::smiles;

    fn zigzag(mol: &mut Molecule) -> usize {
        let positions = (0..mol.atom_count())
            .map(|k| {
                let t = k as f64;
                [1.2 * t, 0.6 * (t * 1.9).sin(), 0.5 * (t * 0.7).cos()]
            })
            .collect();
        mol.add_conformer(positions).unwrap()
    }

    #[test]
    fn minimization_lowers_energy_and_restores_bond_lengths() {
        let mut mol = smiles::parse("CCO").unwrap();
        add_hydrogens(&mut mol);
        let id = zigzag(&mut mol);
        let config = UffConfig {
            max_iterations: 2000,
            ..Default::default()
        };
        let out = optimize_molecule(&mut mol, id, &config).unwrap();
        assert!(out.final_energy < out.initial_energy);
        let conf = mol.conformer(id).unwrap();
        let cc = geometry::distance(conf.position(0), conf.position(1));
        let co = geometry::distance(conf.position(1), conf.position(2));
        assert!((cc - 1.51).abs() < 0.05, "C-C {cc}");
        assert!((co - 1.42).abs() < 0.06, "C-O {co}");
    }

    #[test]
    fn relaxed_torsions_leave_no_residual_force() {
        let mut mol = smiles::parse("CCCC").unwrap();
        add_hydrogens(&mut mol);
        let id = zigzag(&mut mol);
        let config = UffConfig {
            max_iterations: 2000,
            ..Default::default()
        };
        let out = optimize_molecule(&mut mol, id, &config).unwrap();
        assert!(out.converged);

        let positions = mol.conformer(id).unwrap().positions().to_vec();
        let ff = UffForceField::new(&mol, &positions, &config).unwrap();
        let max_force = ff
            .gradient(&positions)
            .iter()
            .flat_map(|g| g.iter())
            .fold(0.0_f64, |m, x| m.max(x.abs()));
        assert!(max_force < 0.5, "residual gradient {max_force}");
    }

    #[test]
    fn missing_conformer_is_an_error() {
        let mut mol = smiles::parse("C").unwrap();
        assert_eq!(
            optimize_molecule(&mut mol, 3, &UffConfig::default()),
            Err(UffError::NoSuchConformer(3))
        );
    }

    #[test]
    fn parameter_coverage() {
        let mut aspirin = smiles::parse("CC(=O)Oc1ccccc1C(=O)O").unwrap();
        add_hydrogens(&mut aspirin);
        assert!(has_all_params(&aspirin));
        let iron = smiles::parse("[Fe+2]").unwrap();
        assert!(!has_all_params(&iron));
    }
}
