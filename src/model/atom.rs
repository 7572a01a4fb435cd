use super::types::Element;

/// A node of the molecular graph.
///
/// Coordinates are not stored here; they live in the molecule's conformers so
/// that a single graph can carry several 3D geometries.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub element: Element,
    pub formal_charge: i8,
    /// Hydrogens implied by the valence model but not present as atoms.
    pub implicit_hydrogens: u8,
    /// Set for bracket atoms, whose hydrogen count is fixed as written.
    pub no_implicit: bool,
    pub is_aromatic: bool,
    /// Mass number, 0 for natural abundance.
    pub isotope: u16,
}

impl Atom {
    pub fn new(element: Element) -> Self {
        Self {
            element,
            formal_charge: 0,
            implicit_hydrogens: 0,
            no_implicit: false,
            is_aromatic: false,
            isotope: 0,
        }
    }

    pub fn with_charge(mut self, charge: i8) -> Self {
        self.formal_charge = charge;
        self
    }

    pub fn with_implicit_hydrogens(mut self, count: u8) -> Self {
        self.implicit_hydrogens = count;
        self
    }

    pub fn aromatic(mut self) -> Self {
        self.is_aromatic = true;
        self
    }

    #[inline]
    pub fn is_hydrogen(&self) -> bool {
        self.element == Element::H
    }
}
