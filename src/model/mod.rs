//! Core data structures describing a molecule as it flows through the pipeline.
//!
//! - [`types`] – Periodic table elements, bond orders, and hybridization states.
//! - [`atom`] – Graph node with element, charge, and hydrogen bookkeeping.
//! - [`molecule`] – Atoms, bonds, stereo annotations, and attached conformers.
//! - [`conformer`] – One 3D coordinate set for every atom.
//! - [`stereo`] – Tetrahedral and double-bond stereo descriptors.
//! - [`topology`] – Perceived rings, hybridization, and internal coordinates.
//!
//! The graph ([`Molecule`](molecule::Molecule)) is kept separate from its
//! geometry ([`Conformer`](conformer::Conformer)) so embedding and
//! optimization only ever touch coordinates.

pub mod atom;
pub mod conformer;
pub mod molecule;
pub mod stereo;
pub mod topology;
pub mod types;
