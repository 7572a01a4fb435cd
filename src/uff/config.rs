use crate::optimize::MinimizerSettings;

/// Settings for [`optimize_molecule`](super::optimize_molecule).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UffConfig {
    pub max_iterations: usize,
    /// Van der Waals pairs farther apart than this multiple of their
    /// equilibrium distance (at setup) are left out.
    pub vdw_threshold: f64,
    /// Skip non-bonded terms between disconnected fragments.
    pub ignore_interfragment: bool,
    /// Largest gradient component (kcal/mol/Å) accepted as converged.
    pub force_tolerance: f64,
    /// Relative energy change accepted as converged.
    pub energy_tolerance: f64,
}

impl Default for UffConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            vdw_threshold: 10.0,
            ignore_interfragment: true,
            force_tolerance: 1e-4,
            energy_tolerance: 1e-6,
        }
    }
}

impl UffConfig {
    pub(crate) fn minimizer_settings(&self) -> MinimizerSettings {
        MinimizerSettings {
            max_iterations: self.max_iterations,
            gradient_tolerance: self.force_tolerance,
            energy_tolerance: self.energy_tolerance,
            max_step: 0.3,
        }
    }
}
