//! Error types for Universal Force Field setup and optimization.

use crate::model::types::Element;
use thiserror::Error;

/// Errors that can occur while building or minimizing a UFF energy.
///
/// Failing to converge is not an error; it is reported through
/// [`OptimizeOutcome::converged`](super::OptimizeOutcome::converged).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UffError {
    /// The parameter table could not be parsed.
    #[error("failed to parse UFF parameters: {0}")]
    ParameterParse(String),

    /// No UFF atom type covers this element in its bonding environment.
    #[error("no UFF atom type for atom {atom} ({element})")]
    UntypedAtom { atom: usize, element: Element },

    /// An atom type was assigned but the table has no entry for it.
    #[error("missing UFF parameters for atom type '{label}' (atom {atom})")]
    MissingParameter { atom: usize, label: String },

    #[error("molecule has no conformer with id {0}")]
    NoSuchConformer(usize),
}

impl From<toml::de::Error> for UffError {
    fn from(e: toml::de::Error) -> Self {
        UffError::ParameterParse(e.to_string())
    }
}

impl UffError {
    /// Creates a [`MissingParameter`](UffError::MissingParameter) error.
    pub fn missing_parameter(atom: usize, label: &str) -> Self {
        Self::MissingParameter {
            atom,
            label: label.to_string(),
        }
    }
}
