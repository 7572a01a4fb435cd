//! A pure Rust pipeline that turns a SMILES string into a relaxed 3D structure.
//! It parses the line notation, completes hydrogens, embeds coordinates with
//! ETKDG-style distance geometry, and minimizes them with the Universal Force
//! Field before writing a V2000 MOL file.
//!
//! # Features
//!
//! - **SMILES parsing**: organic subset, bracket atoms, aromaticity with
//!   kekulization, ring closures, and tetrahedral/double-bond stereo
//! - **Hydrogen completion**: implicit hydrogens become explicit atoms
//! - **Conformer embedding**: distance bounds, metric-matrix embedding, and
//!   refinement with torsion preferences and planarity knowledge
//! - **UFF relaxation**: bond, angle, torsion, inversion, and van der Waals
//!   terms minimized with BFGS
//! - **CTfile output**: MOL blocks and multi-conformer SD files
//!
//! # Quick Start
//!
//! The main entry point is [`forge`], which takes a SMILES string and a
//! [`ForgeConfig`] and returns a [`ForgedMolecule`] holding one conformer:
//!
//! ```
//! use smiles_forge::{ForgeConfig, forge, io};
//!
//! let forged = forge("CCO", &ForgeConfig::seeded(42))?;
//!
//! // Two carbons, one oxygen, six hydrogens
//! assert_eq!(forged.molecule.atom_count(), 9);
//! assert_eq!(forged.molecule.num_conformers(), 1);
//!
//! let block = io::mol::to_mol_block(&forged.molecule, forged.conf_id)?;
//! assert!(block.ends_with("M  END\n"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Module Organization
//!
//! - [`smiles`]: SMILES to molecular graph
//! - [`hydrogens`]: explicit hydrogen completion and removal
//! - [`embed`]: distance-geometry conformer generation
//! - [`uff`]: Universal Force Field typing, energy, and minimization
//! - [`optimize`]: the BFGS minimizer shared by embedding and UFF
//! - [`io`]: MOL and SDF reading/writing
//! - [`pipeline`]: the end-to-end [`forge`] and [`forge_to_file`] functions
//! - [`model`]: atoms, bonds, stereo annotations, conformers, topology
//! - [`geometry`]: small vector helpers over `[f64; 3]`

pub mod embed;
pub mod geometry;
pub mod hydrogens;
pub mod io;
pub mod model;
pub mod optimize;
pub mod pipeline;
pub mod smiles;
pub mod uff;

pub use model::atom::Atom;
pub use model::conformer::Conformer;
pub use model::molecule::{Bond, ModelError, Molecule};
pub use model::stereo::{Chirality, DoubleBondStereo, StereoCenter};
pub use model::types::{BondOrder, Element, ParseBondOrderError, ParseElementError};

pub use embed::{EmbedError, EmbedParameters, embed_molecule, embed_multiple};
pub use smiles::SmilesError;
pub use uff::{OptimizeOutcome, UffConfig, UffError, optimize_molecule};

pub use pipeline::Error as PipelineError;
pub use pipeline::{ForgeConfig, ForgedMolecule, forge, forge_to_file};

/// The molecule the `sforge` binary builds (aspirin).
pub const DEFAULT_SMILES: &str = "CC(=O)Oc1ccccc1C(=O)O";

/// File the `sforge` binary writes, relative to the working directory.
pub const OUTPUT_FILE: &str = "molecule.mol";
