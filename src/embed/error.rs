//! Error types for conformer embedding.

use crate::model::molecule::ModelError;
use crate::uff::UffError;
use thiserror::Error;

/// Errors that can occur while generating 3D coordinates.
///
/// On any of these the molecule is left without a new conformer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EmbedError {
    #[error("cannot embed a molecule with no atoms")]
    NoAtoms,

    /// Triangle smoothing produced a lower bound above the upper bound.
    #[error(
        "inconsistent distance bounds between atoms {i} and {j} (lower {lower:.3} > upper {upper:.3})"
    )]
    InconsistentBounds {
        i: usize,
        j: usize,
        lower: f64,
        upper: f64,
    },

    /// Every attempt was rejected.
    ///
    /// Attempts fail on a degenerate metric matrix, a residual bound
    /// violation after refinement, or a stereo check.
    #[error("failed to embed molecule after {attempts} attempts")]
    Failed { attempts: usize },

    /// Bond lengths are taken from UFF and an atom could not be typed.
    #[error("cannot derive distance bounds: {0}")]
    Uff(#[from] UffError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl EmbedError {
    /// Creates an [`InconsistentBounds`](EmbedError::InconsistentBounds) error
    /// with the atom pair ordered.
    pub fn inconsistent(i: usize, j: usize, lower: f64, upper: f64) -> Self {
        Self::InconsistentBounds {
            i: i.min(j),
            j: i.max(j),
            lower,
            upper,
        }
    }
}
