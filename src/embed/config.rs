/// Settings for [`embed_molecule`](super::embed_molecule) and
/// [`embed_multiple`](super::embed_multiple).
///
/// The default is [`EmbedParameters::etkdg`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmbedParameters {
    /// Seed for the sampling RNG. `None` draws one from the OS, so repeated
    /// runs give different conformers.
    pub random_seed: Option<u64>,
    /// Attempts before giving up. `0` means ten per atom.
    pub max_attempts: usize,
    /// Heavy-atom RMSD (Å) below which a new conformer counts as a
    /// duplicate in [`embed_multiple`](super::embed_multiple). `<= 0` keeps
    /// every conformer.
    pub prune_rms_threshold: f64,
    /// Reject conformers whose tetrahedral centers have the wrong
    /// handedness or are flat.
    pub enforce_chirality: bool,
    /// Reject conformers with the wrong cis/trans arrangement.
    pub enforce_double_bond_stereo: bool,
    /// Bias rotatable bonds towards staggered or planar torsions.
    pub use_exp_torsion_angle_prefs: bool,
    /// Keep trigonal centers planar during refinement.
    pub use_basic_knowledge: bool,
    /// Start from random coordinates instead of a metric-matrix embedding.
    pub use_random_coords: bool,
    /// Edge of the starting box (Å) for random coordinates, before scaling.
    pub random_coord_box: f64,
    pub box_size_multiplier: f64,
    /// Iteration cap for each refinement minimization.
    pub optimizer_max_iterations: usize,
    /// Gradient tolerance for the refinement minimizations.
    pub error_tolerance: f64,
}

impl EmbedParameters {
    pub fn etkdg() -> Self {
        Self {
            random_seed: None,
            max_attempts: 0,
            prune_rms_threshold: -1.0,
            enforce_chirality: true,
            enforce_double_bond_stereo: true,
            use_exp_torsion_angle_prefs: true,
            use_basic_knowledge: true,
            use_random_coords: false,
            random_coord_box: 5.0,
            box_size_multiplier: 2.0,
            optimizer_max_iterations: 400,
            error_tolerance: 1e-3,
        }
    }

    /// Plain distance geometry without the torsion and planarity refinement.
    pub fn plain_dg() -> Self {
        Self {
            use_exp_torsion_angle_prefs: false,
            use_basic_knowledge: false,
            ..Self::etkdg()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub(crate) fn attempts_for(&self, atom_count: usize) -> usize {
        if self.max_attempts == 0 {
            (10 * atom_count).max(1)
        } else {
            self.max_attempts
        }
    }

    pub(crate) fn box_edge(&self) -> f64 {
        self.random_coord_box * self.box_size_multiplier
    }
}

impl Default for EmbedParameters {
    fn default() -> Self {
        Self::etkdg()
    }
}
