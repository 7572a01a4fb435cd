//! Distance-geometry error function.
//!
//! Squared bound violations over every atom pair, plus a penalty on
//! tetrahedral centers whose signed volume has the wrong sign.

use super::bounds::BoundsMatrix;
use crate::geometry::{self, Vec3};
use crate::model::molecule::Molecule;
use crate::optimize::Objective;
use crate::uff::terms::{add_scaled, point};

/// Smallest signed volume (Å³) a chiral center is pushed towards.
const CHIRAL_MIN_VOLUME: f64 = 0.5;
const CHIRAL_WEIGHT: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct DistanceViolation {
    pub i: usize,
    pub j: usize,
    lower2: f64,
    upper2: f64,
    pub weight: f64,
}

impl DistanceViolation {
    pub fn new(i: usize, j: usize, lower: f64, upper: f64, weight: f64) -> Self {
        Self {
            i,
            j,
            lower2: lower * lower,
            upper2: upper * upper,
            weight,
        }
    }

    /// Energy and `dE/d(d²)`.
    fn eval(&self, d2: f64) -> (f64, f64) {
        if d2 > self.upper2 {
            let v = d2 / self.upper2 - 1.0;
            (self.weight * v * v, 2.0 * self.weight * v / self.upper2)
        } else if d2 < self.lower2 {
            let denom = self.lower2 + d2;
            let v = 2.0 * self.lower2 / denom - 1.0;
            let dv = -2.0 * self.lower2 / (denom * denom);
            (self.weight * v * v, 2.0 * self.weight * v * dv)
        } else {
            (0.0, 0.0)
        }
    }

    pub fn energy(&self, x: &[f64]) -> f64 {
        let delta = geometry::sub(point(x, self.i), point(x, self.j));
        self.eval(geometry::dot(delta, delta)).0
    }

    pub fn accumulate(&self, x: &[f64], grad: &mut [f64]) -> f64 {
        let delta = geometry::sub(point(x, self.i), point(x, self.j));
        let (e, de_dd2) = self.eval(geometry::dot(delta, delta));
        if de_dd2 != 0.0 {
            add_scaled(grad, self.i, delta, 2.0 * de_dd2);
            add_scaled(grad, self.j, delta, -2.0 * de_dd2);
        }
        e
    }
}

/// One-sided penalty keeping `sign · V(center; a, b, c)` above a floor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ChiralViolation {
    pub center: usize,
    pub a: usize,
    pub b: usize,
    pub c: usize,
    pub sign: f64,
}

impl ChiralViolation {
    /// Terms for every stereo center whose four neighbors are explicit atoms.
    pub fn for_molecule(mol: &Molecule) -> Vec<Self> {
        mol.stereo_centers
            .iter()
            .filter_map(|sc| {
                let [_, a, b, c] = sc.resolved_neighbors()?;
                Some(Self {
                    center: sc.center,
                    a,
                    b,
                    c,
                    sign: sc.chirality.volume_sign(),
                })
            })
            .collect()
    }

    fn arms(&self, x: &[f64]) -> (Vec3, Vec3, Vec3) {
        let o = point(x, self.center);
        (
            geometry::sub(point(x, self.a), o),
            geometry::sub(point(x, self.b), o),
            geometry::sub(point(x, self.c), o),
        )
    }

    pub fn energy(&self, x: &[f64]) -> f64 {
        let (u, v, w) = self.arms(x);
        let shortfall = CHIRAL_MIN_VOLUME - self.sign * geometry::dot(u, geometry::cross(v, w));
        if shortfall > 0.0 {
            CHIRAL_WEIGHT * shortfall * shortfall
        } else {
            0.0
        }
    }

    pub fn accumulate(&self, x: &[f64], grad: &mut [f64]) -> f64 {
        let (u, v, w) = self.arms(x);
        let shortfall = CHIRAL_MIN_VOLUME - self.sign * geometry::dot(u, geometry::cross(v, w));
        if shortfall <= 0.0 {
            return 0.0;
        }
        let de_dv = -2.0 * CHIRAL_WEIGHT * self.sign * shortfall;
        let ga = geometry::cross(v, w);
        let gb = geometry::cross(w, u);
        let gc = geometry::cross(u, v);
        let go = geometry::scale(geometry::add(geometry::add(ga, gb), gc), -1.0);
        add_scaled(grad, self.a, ga, de_dv);
        add_scaled(grad, self.b, gb, de_dv);
        add_scaled(grad, self.c, gc, de_dv);
        add_scaled(grad, self.center, go, de_dv);
        CHIRAL_WEIGHT * shortfall * shortfall
    }
}

/// The first-stage embedding objective.
#[derive(Debug, Clone)]
pub(crate) struct DistanceGeometry {
    distances: Vec<DistanceViolation>,
    chiral: Vec<ChiralViolation>,
}

impl DistanceGeometry {
    pub fn new(bounds: &BoundsMatrix, chiral: Vec<ChiralViolation>) -> Self {
        let n = bounds.len();
        let mut distances = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for i in 0..n {
            for j in (i + 1)..n {
                distances.push(DistanceViolation::new(
                    i,
                    j,
                    bounds.lower(i, j),
                    bounds.upper(i, j),
                    1.0,
                ));
            }
        }
        Self { distances, chiral }
    }
}

impl Objective for DistanceGeometry {
    fn value(&self, x: &[f64]) -> f64 {
        self.distances.iter().map(|t| t.energy(x)).sum::<f64>()
            + self.chiral.iter().map(|t| t.energy(x)).sum::<f64>()
    }

    fn value_and_gradient(&self, x: &[f64], grad: &mut [f64]) -> f64 {
        let mut e = 0.0;
        for t in &self.distances {
            e += t.accumulate(x, grad);
        }
        for t in &self.chiral {
            e += t.accumulate(x, grad);
        }
        e
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimize::tests::numeric_gradient;

    const FOUR: [f64; 12] = [
        0.1, 1.2, -0.3, 0.0, 0.0, 0.0, 1.4, 0.1, 0.2, 1.9, -0.4, 1.1,
    ];

    fn bounds_4() -> BoundsMatrix {
        let mut b = BoundsMatrix::new(4);
        b.set(0, 1, 1.4, 1.6);
        b.set(1, 2, 1.4, 1.6);
        b.set(2, 3, 1.0, 1.1);
        b.set(0, 2, 2.4, 2.6);
        b.set(0, 3, 3.5, 4.0);
        b.set(1, 3, 2.0, 2.2);
        b
    }

    #[test]
    fn gradient_matches_finite_differences() {
        let chiral = vec![
            ChiralViolation {
                center: 1,
                a: 0,
                b: 2,
                c: 3,
                sign: 1.0,
            },
            ChiralViolation {
                center: 2,
                a: 3,
                b: 1,
                c: 0,
                sign: -1.0,
            },
        ];
        let dg = DistanceGeometry::new(&bounds_4(), chiral);
        let mut grad = vec![0.0; 12];
        let e = dg.value_and_gradient(&FOUR, &mut grad);
        assert!(e > 0.0);
        assert!((e - dg.value(&FOUR)).abs() < 1e-12);
        let num = numeric_gradient(&dg, &FOUR);
        for (k, (a, b)) in grad.iter().zip(&num).enumerate() {
            assert!((a - b).abs() < 1e-5 * (1.0 + b.abs()), "{k}: {a} vs {b}");
        }
    }

    #[test]
    fn satisfied_bounds_cost_nothing() {
        let t = DistanceViolation::new(0, 1, 1.0, 2.0, 1.0);
        assert_eq!(t.energy(&[0.0, 0.0, 0.0, 1.5, 0.0, 0.0]), 0.0);
        assert!(t.energy(&[0.0, 0.0, 0.0, 2.5, 0.0, 0.0]) > 0.0);
        assert!(t.energy(&[0.0, 0.0, 0.0, 0.5, 0.0, 0.0]) > 0.0);
    }

    #[test]
    fn chiral_penalty_is_one_sided() {
        let right = [0.0, 0.0, 0.0, 1.5, 0.0, 0.0, 0.0, 1.5, 0.0, 0.0, 0.0, 1.5];
        let t = ChiralViolation {
            center: 0,
            a: 1,
            b: 2,
            c: 3,
            sign: 1.0,
        };
        assert_eq!(t.energy(&right), 0.0);
        let mirror = ChiralViolation { sign: -1.0, ..t };
        assert!(mirror.energy(&right) > 0.0);
    }
}
