use crate::geometry::Vec3;

/// One 3D coordinate assignment for every atom of a molecule, in Ångströms.
#[derive(Debug, Clone, PartialEq)]
pub struct Conformer {
    id: usize,
    positions: Vec<Vec3>,
}

impl Conformer {
    pub(crate) fn new(id: usize, positions: Vec<Vec3>) -> Self {
        Self { id, positions }
    }

    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Mutable access to coordinates. The slice length is fixed, so the
    /// atom count cannot drift from the owning molecule.
    #[inline]
    pub fn positions_mut(&mut self) -> &mut [Vec3] {
        &mut self.positions
    }

    #[inline]
    pub fn position(&self, atom: usize) -> Vec3 {
        self.positions[atom]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub(crate) fn push(&mut self, position: Vec3) {
        self.positions.push(position);
    }

    /// Flattened `[x0, y0, z0, x1, ...]` copy, the layout the minimizers work on.
    pub fn to_flat(&self) -> Vec<f64> {
        self.positions.iter().flat_map(|p| p.iter().copied()).collect()
    }

    /// Overwrites coordinates from a flat buffer produced by [`Conformer::to_flat`].
    pub fn set_from_flat(&mut self, flat: &[f64]) {
        for (p, chunk) in self.positions.iter_mut().zip(flat.chunks_exact(3)) {
            *p = [chunk[0], chunk[1], chunk[2]];
        }
    }
}
