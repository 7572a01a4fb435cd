use crate::model::types::Element;
use thiserror::Error;

/// Errors raised while turning a SMILES string into a molecular graph.
///
/// Positions are byte offsets into the SMILES text (after surrounding
/// whitespace is removed).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SmilesError {
    #[error("SMILES string is empty")]
    Empty,

    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("unexpected end of input at position {pos}: {expected}")]
    UnexpectedEnd { pos: usize, expected: &'static str },

    #[error("invalid bracket atom at position {pos}: {detail}")]
    BracketAtom { pos: usize, detail: String },

    #[error("unsupported SMILES feature at position {pos}: {feature}")]
    Unsupported { pos: usize, feature: &'static str },

    #[error("bond symbol at position {pos} is not followed by an atom")]
    DanglingBond { pos: usize },

    #[error("unmatched ')' at position {pos}")]
    UnmatchedBranchClose { pos: usize },

    #[error("branch opened at position {pos} is never closed")]
    UnclosedBranch { pos: usize },

    #[error("ring bond {label} opened at position {pos} is never closed")]
    UnclosedRing { label: u16, pos: usize },

    #[error("ring bond {label} at position {pos} would bond an atom to itself")]
    RingSelfBond { label: u16, pos: usize },

    #[error("ring bond {label} at position {pos} has conflicting bond symbols")]
    ConflictingRingBond { label: u16, pos: usize },

    #[error("atoms {i} and {j} are bonded more than once (position {pos})")]
    DuplicateBond { i: usize, j: usize, pos: usize },

    /// No alternating single/double assignment exists for an aromatic system.
    #[error("cannot kekulize aromatic system containing atom {atom}")]
    Kekulize { atom: usize },

    #[error("atom {atom} ({element}) has valence {valence}, above the allowed maximum of {max}")]
    Valence {
        atom: usize,
        element: Element,
        valence: u32,
        max: u32,
    },
}

impl SmilesError {
    /// Builds an [`UnexpectedChar`](SmilesError::UnexpectedChar) for the
    /// character starting at `pos`, or [`UnexpectedEnd`](SmilesError::UnexpectedEnd)
    /// when `pos` is past the input.
    pub(crate) fn unexpected(input: &str, pos: usize, expected: &'static str) -> Self {
        match input.get(pos..).and_then(|s| s.chars().next()) {
            Some(ch) => Self::UnexpectedChar { ch, pos },
            None => Self::UnexpectedEnd { pos, expected },
        }
    }

    pub(crate) fn bracket(pos: usize, detail: impl Into<String>) -> Self {
        Self::BracketAtom {
            pos,
            detail: detail.into(),
        }
    }
}
