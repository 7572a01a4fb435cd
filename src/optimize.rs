//! Quasi-Newton minimization shared by the distance-geometry embedder and
//! the force field.
//!
//! Coordinates are passed as a flat `[x0, y0, z0, x1, ...]` buffer. The
//! minimizer keeps a dense inverse-Hessian estimate, so it is meant for the
//! small molecules this crate builds rather than macromolecules.

use nalgebra::{DMatrix, DVector};

/// A differentiable scalar function over flat coordinates.
pub trait Objective {
    /// Value at `x`.
    fn value(&self, x: &[f64]) -> f64;

    /// Value at `x`, writing `∂f/∂x` into `grad` (same layout as `x`).
    ///
    /// `grad` is zeroed by the caller.
    fn value_and_gradient(&self, x: &[f64], grad: &mut [f64]) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimizerSettings {
    pub max_iterations: usize,
    /// Converged once every gradient component is below this.
    pub gradient_tolerance: f64,
    /// Converged once an accepted step changes the value by less than this
    /// fraction (with a floor of one unit on the denominator).
    pub energy_tolerance: f64,
    /// Largest displacement of any single coordinate per iteration.
    pub max_step: f64,
}

impl Default for MinimizerSettings {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            gradient_tolerance: 1e-4,
            energy_tolerance: 1e-6,
            max_step: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Minimization {
    pub converged: bool,
    pub iterations: usize,
    pub initial_value: f64,
    pub final_value: f64,
}

const ARMIJO_C1: f64 = 1e-4;
const MAX_BACKTRACKS: usize = 40;

/// Minimizes `objective` starting from `x`, leaving the best point in `x`.
pub fn minimize<O: Objective + ?Sized>(
    objective: &O,
    x: &mut [f64],
    settings: &MinimizerSettings,
) -> Minimization {
    let n = x.len();
    let mut grad = vec![0.0; n];
    let mut value = objective.value_and_gradient(x, &mut grad);
    let initial_value = value;

    let mut outcome = Minimization {
        converged: false,
        iterations: 0,
        initial_value,
        final_value: value,
    };
    if n == 0 || !value.is_finite() {
        outcome.converged = n == 0;
        return outcome;
    }

    let mut h_inv = DMatrix::<f64>::identity(n, n);
    let mut fresh_hessian = true;
    let mut trial = vec![0.0; n];
    let mut trial_grad = vec![0.0; n];

    for iter in 1..=settings.max_iterations {
        outcome.iterations = iter;
        if max_abs(&grad) < settings.gradient_tolerance {
            outcome.converged = true;
            break;
        }

        let g = DVector::from_column_slice(&grad);
        let mut dir = -(&h_inv * &g);
        let mut slope = dir.dot(&g);
        if slope >= 0.0 || !slope.is_finite() {
            h_inv.fill_with_identity();
            fresh_hessian = true;
            dir = -g.clone();
            slope = dir.dot(&g);
        }

        let longest = dir.amax();
        if longest > settings.max_step {
            dir *= settings.max_step / longest;
            slope *= settings.max_step / longest;
        }

        let mut alpha = 1.0;
        let mut accepted = false;
        for _ in 0..MAX_BACKTRACKS {
            for k in 0..n {
                trial[k] = x[k] + alpha * dir[k];
            }
            let v = objective.value(&trial);
            if v.is_finite() && v <= value + ARMIJO_C1 * alpha * slope {
                accepted = true;
                break;
            }
            alpha *= 0.5;
        }

        if !accepted {
            if fresh_hessian {
                break;
            }
            h_inv.fill_with_identity();
            fresh_hessian = true;
            continue;
        }

        trial_grad.iter_mut().for_each(|v| *v = 0.0);
        let new_value = objective.value_and_gradient(&trial, &mut trial_grad);

        let s = DVector::from_iterator(n, (0..n).map(|k| trial[k] - x[k]));
        let y = DVector::from_iterator(n, (0..n).map(|k| trial_grad[k] - grad[k]));

        x.copy_from_slice(&trial);
        grad.copy_from_slice(&trial_grad);
        let previous = value;
        value = new_value;

        let scale = previous.abs().max(value.abs()).max(1.0);
        if (previous - value).abs() / scale < settings.energy_tolerance {
            outcome.converged = true;
            break;
        }

        let sy = s.dot(&y);
        if sy > 1e-12 {
            if fresh_hessian {
                let yy = y.dot(&y);
                if yy > 0.0 {
                    h_inv.fill_with_identity();
                    h_inv *= sy / yy;
                }
                fresh_hessian = false;
            }
            let hy = &h_inv * &y;
            let yhy = y.dot(&hy);
            let a = (sy + yhy) / (sy * sy);
            h_inv += &s * s.transpose() * a;
            h_inv -= (&hy * s.transpose() + &s * hy.transpose()) / sy;
        }
    }

    outcome.final_value = value;
    outcome
}

fn max_abs(v: &[f64]) -> f64 {
    v.iter().fold(0.0, |m, x| m.max(x.abs()))
}
