//! Error type for the SMILES to 3D pipeline.

use thiserror::Error;

/// Any failure that stops [`forge`](super::forge) or
/// [`forge_to_file`](super::forge_to_file).
///
/// Each variant names the stage that failed; the stage's own error is the
/// [`source`](std::error::Error::source).
#[derive(Debug, Error)]
pub enum Error {
    /// The input could not be parsed into a molecular graph.
    #[error("failed to parse SMILES")]
    Smiles(#[from] crate::smiles::SmilesError),

    /// No 3D coordinates satisfying the distance bounds were found.
    #[error("failed to embed 3D coordinates")]
    Embed(#[from] crate::embed::EmbedError),

    /// The force field could not be set up for this molecule.
    #[error("failed to optimize geometry")]
    Optimize(#[from] crate::uff::UffError),

    /// Serialization or file output failed.
    #[error("failed to write structure")]
    Io(#[from] crate::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::SmilesError;
    use std::error::Error as _;

    #[test]
    fn message_names_stage_and_source_carries_detail() {
        let err = Error::from(SmilesError::Empty);
        assert_eq!(err.to_string(), "failed to parse SMILES");
        assert_eq!(err.source().unwrap().to_string(), "SMILES string is empty");
    }
}
