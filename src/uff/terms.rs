//! UFF energy terms over flat coordinates.
//!
//! Every term offers `energy` and `accumulate`; the latter adds the term's
//! gradient into a shared buffer and returns its energy.

use crate::geometry::{self, Vec3};

#[inline]
pub(crate) fn point(x: &[f64], atom: usize) -> Vec3 {
    [x[3 * atom], x[3 * atom + 1], x[3 * atom + 2]]
}

#[inline]
pub(crate) fn add_scaled(grad: &mut [f64], atom: usize, v: Vec3, s: f64) {
    grad[3 * atom] += v[0] * s;
    grad[3 * atom + 1] += v[1] * s;
    grad[3 * atom + 2] += v[2] * s;
}

/// `E = ½ k (r - r0)²`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BondStretch {
    pub i: usize,
    pub j: usize,
    pub r0: f64,
    pub k: f64,
}

impl BondStretch {
    pub fn energy(&self, x: &[f64]) -> f64 {
        let d = geometry::distance(point(x, self.i), point(x, self.j)) - self.r0;
        0.5 * self.k * d * d
    }

    pub fn accumulate(&self, x: &[f64], grad: &mut [f64]) -> f64 {
        let delta = geometry::sub(point(x, self.i), point(x, self.j));
        let r = geometry::norm(delta);
        let d = r - self.r0;
        if r > 1e-8 {
            let de_dr = self.k * d;
            add_scaled(grad, self.i, delta, de_dr / r);
            add_scaled(grad, self.j, delta, -de_dr / r);
        }
        0.5 * self.k * d * d
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AngleForm {
    /// `E = K (C0 + C1 cos θ + C2 cos 2θ)`
    Fourier { c0: f64, c1: f64, c2: f64 },
    /// `E = K (1 + cos θ)`, minimum at 180°.
    Linear,
}

impl AngleForm {
    pub fn for_natural_angle(theta0: f64) -> Self {
        if theta0 > 179f64.to_radians() {
            return AngleForm::Linear;
        }
        let sin2 = theta0.sin().powi(2);
        let cos0 = theta0.cos();
        let c2 = 1.0 / (4.0 * sin2);
        let c1 = -4.0 * c2 * cos0;
        let c0 = c2 * (2.0 * cos0 * cos0 + 1.0);
        AngleForm::Fourier { c0, c1, c2 }
    }

    /// Energy per unit force constant and its derivative with respect to cos θ.
    fn eval(&self, cos: f64) -> (f64, f64) {
        match *self {
            AngleForm::Fourier { c0, c1, c2 } => {
                let cos2 = 2.0 * cos * cos - 1.0;
                (c0 + c1 * cos + c2 * cos2, c1 + 4.0 * c2 * cos)
            }
            AngleForm::Linear => (1.0 + cos, 1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleBend {
    pub i: usize,
    /// Vertex.
    pub j: usize,
    pub k: usize,
    pub force: f64,
    pub form: AngleForm,
}

impl AngleBend {
    pub fn energy(&self, x: &[f64]) -> f64 {
        let theta = geometry::angle(point(x, self.i), point(x, self.j), point(x, self.k));
        self.force * self.form.eval(theta.cos()).0
    }

    pub fn accumulate(&self, x: &[f64], grad: &mut [f64]) -> f64 {
        let (a, b, c) = (point(x, self.i), point(x, self.j), point(x, self.k));
        let Some((cos, [ga, gb, gc])) = geometry::cos_angle_gradient(a, b, c) else {
            return self.energy(x);
        };
        let (e, de_dcos) = self.form.eval(cos.clamp(-1.0, 1.0));
        let s = self.force * de_dcos;
        add_scaled(grad, self.i, ga, s);
        add_scaled(grad, self.j, gb, s);
        add_scaled(grad, self.k, gc, s);
        self.force * e
    }
}

/// `E = ½ V (1 - cos(nφ0) cos(nφ))`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Torsion {
    pub i: usize,
    pub j: usize,
    pub k: usize,
    pub l: usize,
    pub barrier: f64,
    pub periodicity: f64,
    /// `cos(n φ0)`, always ±1 for the UFF torsion cases.
    pub phase: f64,
}

impl Torsion {
    fn phi(&self, x: &[f64]) -> f64 {
        geometry::dihedral(
            point(x, self.i),
            point(x, self.j),
            point(x, self.k),
            point(x, self.l),
        )
    }

    pub fn energy(&self, x: &[f64]) -> f64 {
        let phi = self.phi(x);
        0.5 * self.barrier * (1.0 - self.phase * (self.periodicity * phi).cos())
    }

    pub fn accumulate(&self, x: &[f64], grad: &mut [f64]) -> f64 {
        let phi = self.phi(x);
        let n = self.periodicity;
        let energy = 0.5 * self.barrier * (1.0 - self.phase * (n * phi).cos());
        let de_dphi = 0.5 * self.barrier * self.phase * n * (n * phi).sin();
        if let Some(g) = geometry::dihedral_gradient(
            point(x, self.i),
            point(x, self.j),
            point(x, self.k),
            point(x, self.l),
        ) {
            for (atom, gv) in [self.i, self.j, self.k, self.l].into_iter().zip(g) {
                add_scaled(grad, atom, gv, de_dphi);
            }
        }
        energy
    }
}

/// Out-of-plane term at `center` for neighbor `l` leaving the
/// `center-j-k` plane: `E = K (C0 + C1 cos ω + C2 cos 2ω)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inversion {
    pub center: usize,
    pub j: usize,
    pub k: usize,
    pub l: usize,
    pub force: f64,
    pub c0: f64,
    pub c1: f64,
    pub c2: f64,
}

impl Inversion {
    /// Bond vectors from the center to `j`, `k`, `l`.
    fn arms(&self, x: &[f64]) -> (Vec3, Vec3, Vec3) {
        let o = point(x, self.center);
        (
            geometry::sub(point(x, self.j), o),
            geometry::sub(point(x, self.k), o),
            geometry::sub(point(x, self.l), o),
        )
    }

    /// Energy and `dE/ds` where `s = sin ω`.
    fn eval(&self, s: f64) -> (f64, f64) {
        let cos_w = (1.0 - s * s).max(0.0).sqrt();
        let e = self.c0 + self.c1 * cos_w + self.c2 * (1.0 - 2.0 * s * s);
        let de_ds = -self.c1 * s / cos_w.max(1e-8) - 4.0 * self.c2 * s;
        (self.force * e, self.force * de_ds)
    }

    pub fn energy(&self, x: &[f64]) -> f64 {
        let (a, b, c) = self.arms(x);
        let normal = geometry::cross(a, b);
        let denom = geometry::norm(normal) * geometry::norm(c);
        let s = if denom < 1e-12 {
            0.0
        } else {
            (geometry::dot(normal, c) / denom).clamp(-1.0, 1.0)
        };
        self.eval(s).0
    }

    pub fn accumulate(&self, x: &[f64], grad: &mut [f64]) -> f64 {
        let (a, b, c) = self.arms(x);
        let normal = geometry::cross(a, b);
        let ln = geometry::norm(normal);
        let lc = geometry::norm(c);
        if ln < 1e-8 || lc < 1e-8 {
            return self.energy(x);
        }
        let n_hat = geometry::scale(normal, 1.0 / ln);
        let c_hat = geometry::scale(c, 1.0 / lc);
        let s = geometry::dot(n_hat, c_hat).clamp(-1.0, 1.0);
        let (e, de_ds) = self.eval(s);

        let ds_dc = geometry::scale(geometry::sub(n_hat, geometry::scale(c_hat, s)), 1.0 / lc);
        let ds_dn = geometry::scale(geometry::sub(c_hat, geometry::scale(n_hat, s)), 1.0 / ln);
        let ds_da = geometry::cross(b, ds_dn);
        let ds_db = geometry::cross(ds_dn, a);
        let ds_do = geometry::scale(geometry::add(geometry::add(ds_da, ds_db), ds_dc), -1.0);

        add_scaled(grad, self.j, ds_da, de_ds);
        add_scaled(grad, self.k, ds_db, de_ds);
        add_scaled(grad, self.l, ds_dc, de_ds);
        add_scaled(grad, self.center, ds_do, de_ds);
        e
    }
}

/// Lennard-Jones 12-6: `E = D ((x/r)¹² - 2 (x/r)⁶)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VanDerWaals {
    pub i: usize,
    pub j: usize,
    pub x_ij: f64,
    pub d_ij: f64,
}

impl VanDerWaals {
    pub fn energy(&self, x: &[f64]) -> f64 {
        let r = geometry::distance(point(x, self.i), point(x, self.j)).max(1e-8);
        let q6 = (self.x_ij / r).powi(6);
        self.d_ij * (q6 * q6 - 2.0 * q6)
    }

    pub fn accumulate(&self, x: &[f64], grad: &mut [f64]) -> f64 {
        let delta = geometry::sub(point(x, self.i), point(x, self.j));
        let r = geometry::norm(delta).max(1e-8);
        let q6 = (self.x_ij / r).powi(6);
        let de_dr = 12.0 * self.d_ij / r * (q6 - q6 * q6);
        add_scaled(grad, self.i, delta, de_dr / r);
        add_scaled(grad, self.j, delta, -de_dr / r);
        self.d_ij * (q6 * q6 - 2.0 * q6)
    }
}
