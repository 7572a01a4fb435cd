//! ETKDG-style conformer generation.
//!
//! Each attempt samples distances within smoothed bounds, recovers
//! coordinates from the metric matrix, and minimizes a distance-geometry
//! error function. Accepted coordinates are then refined with torsion
//! preferences and planarity terms before the stereo checks.

mod align;
mod bounds;
mod checks;
mod config;
mod coords;
mod dg;
mod error;
mod etk;

pub use align::superposed_rmsd;
pub use bounds::BoundsMatrix;
pub use config::EmbedParameters;
pub use error::EmbedError;

use crate::geometry::Vec3;
use crate::model::molecule::Molecule;
use crate::model::topology::Topology;
use crate::optimize::{self, MinimizerSettings};
use dg::{ChiralViolation, DistanceGeometry};
use etk::Refinement;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Residual error per atom above which a minimized embedding is discarded.
const MAX_ERROR_PER_ATOM: f64 = 0.05;

/// Embeds one conformer and returns its id.
///
/// The molecule gains no conformer when this fails.
pub fn embed_molecule(mol: &mut Molecule, params: &EmbedParameters) -> Result<usize, EmbedError> {
    let mut rng = make_rng(params.random_seed);
    let positions = Embedder::new(mol, params)?.generate(&mut rng)?;
    Ok(mol.add_conformer(positions)?)
}

/// Embeds up to `count` conformers, dropping near-duplicates by heavy-atom
/// RMSD when `params.prune_rms_threshold` is positive.
///
/// Fails only if not even the first conformer can be embedded.
pub fn embed_multiple(
    mol: &mut Molecule,
    count: usize,
    params: &EmbedParameters,
) -> Result<Vec<usize>, EmbedError> {
    let mut rng = make_rng(params.random_seed);
    let kept = {
        let embedder = Embedder::new(mol, params)?;
        let mut kept: Vec<Vec<Vec3>> = Vec::new();
        for n in 0..count {
            let positions = match embedder.generate(&mut rng) {
                Ok(p) => p,
                Err(err) if !kept.is_empty() => {
                    debug!(conformer = n, %err, "stopping early");
                    break;
                }
                Err(err) => return Err(err),
            };
            let duplicate = params.prune_rms_threshold > 0.0
                && kept.iter().any(|k| {
                    align::heavy_atom_rmsd(mol, k, &positions) < params.prune_rms_threshold
                });
            if duplicate {
                debug!(conformer = n, "pruned duplicate conformer");
                continue;
            }
            kept.push(positions);
        }
        kept
    };

    kept.into_iter()
        .map(|p| mol.add_conformer(p).map_err(EmbedError::from))
        .collect()
}

fn make_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Everything an attempt needs, built once per molecule.
struct Embedder<'a> {
    mol: &'a Molecule,
    params: &'a EmbedParameters,
    bounds: BoundsMatrix,
    dg: DistanceGeometry,
    refinement: Option<Refinement>,
}

impl<'a> Embedder<'a> {
    fn new(mol: &'a Molecule, params: &'a EmbedParameters) -> Result<Self, EmbedError> {
        if mol.atom_count() == 0 {
            return Err(EmbedError::NoAtoms);
        }
        let topo = Topology::perceive(mol);
        let bounds = bounds::build(mol, &topo)?;
        let chiral = if params.enforce_chirality {
            ChiralViolation::for_molecule(mol)
        } else {
            Vec::new()
        };
        let dg = DistanceGeometry::new(&bounds, chiral);
        let refinement = Refinement::new(mol, &topo, &bounds, params);
        Ok(Self {
            mol,
            params,
            bounds,
            dg,
            refinement,
        })
    }

    fn settings(&self) -> MinimizerSettings {
        MinimizerSettings {
            max_iterations: self.params.optimizer_max_iterations,
            gradient_tolerance: self.params.error_tolerance,
            energy_tolerance: 1e-9,
            max_step: 1.0,
        }
    }

    fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<Vec3>, EmbedError> {
        let attempts = self.params.attempts_for(self.mol.atom_count());
        for attempt in 1..=attempts {
            if let Some(positions) = self.attempt(rng) {
                debug!(attempt, "embedding accepted");
                return Ok(positions);
            }
        }
        Err(EmbedError::Failed { attempts })
    }

    fn attempt<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Vec<Vec3>> {
        let n = self.mol.atom_count();
        let start = if self.params.use_random_coords {
            coords::random_coordinates(n, self.params.box_edge(), rng)
        } else {
            coords::metric_embedding(&self.bounds, rng)?
        };
        let mut x: Vec<f64> = start.iter().flat_map(|p| p.iter().copied()).collect();

        let settings = self.settings();
        let result = optimize::minimize(&self.dg, &mut x, &settings);
        if result.final_value / n as f64 > MAX_ERROR_PER_ATOM {
            return None;
        }
        if self.params.enforce_chirality && !checks::chirality_ok(self.mol, &unflatten(&x)) {
            return None;
        }

        if let Some(refinement) = &self.refinement {
            optimize::minimize(refinement, &mut x, &settings);
        }
        let positions = unflatten(&x);
        if self.params.enforce_chirality && !checks::chirality_ok(self.mol, &positions) {
            return None;
        }
        if self.params.enforce_double_bond_stereo && !checks::double_bonds_ok(self.mol, &positions) {
            return None;
        }
        Some(positions)
    }
}

fn unflatten(x: &[f64]) -> Vec<Vec3> {
    x.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect()
}
