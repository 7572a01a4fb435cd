//! Small vector helpers over `[f64; 3]`, the coordinate type used throughout
//! the crate.

pub type Vec3 = [f64; 3];

#[inline]
pub fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub fn add(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline]
pub fn scale(a: Vec3, s: f64) -> Vec3 {
    [a[0] * s, a[1] * s, a[2] * s]
}

#[inline]
pub fn dot(a: Vec3, b: Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub fn cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
pub fn norm(a: Vec3) -> f64 {
    dot(a, a).sqrt()
}

#[inline]
pub fn distance(a: Vec3, b: Vec3) -> f64 {
    norm(sub(a, b))
}

pub fn normalize(a: Vec3) -> Vec3 {
    let n = norm(a);
    if n < 1e-12 { [0.0; 3] } else { scale(a, 1.0 / n) }
}

/// Angle at `b` formed by `a-b-c`, in radians.
pub fn angle(a: Vec3, b: Vec3, c: Vec3) -> f64 {
    let u = sub(a, b);
    let v = sub(c, b);
    let cos = dot(u, v) / (norm(u) * norm(v)).max(1e-12);
    cos.clamp(-1.0, 1.0).acos()
}

/// Dihedral angle `a-b-c-d` in radians, in `(-π, π]`.
pub fn dihedral(a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> f64 {
    let b1 = sub(b, a);
    let b2 = sub(c, b);
    let b3 = sub(d, c);
    let n1 = cross(b1, b2);
    let n2 = cross(b2, b3);
    let x = dot(n1, n2);
    let y = dot(cross(n1, n2), normalize(b2));
    y.atan2(x)
}

/// Gradient of [`dihedral`] with respect to each of its four points, or
/// `None` when three consecutive points are collinear.
pub fn dihedral_gradient(a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> Option<[Vec3; 4]> {
    let b1 = sub(b, a);
    let b2 = sub(c, b);
    let b3 = sub(d, c);
    let m = cross(b1, b2);
    let n = cross(b2, b3);
    let mm = dot(m, m);
    let nn = dot(n, n);
    let len = norm(b2);
    if mm < 1e-12 || nn < 1e-12 || len < 1e-8 {
        return None;
    }
    let ga = scale(m, -len / mm);
    let gd = scale(n, len / nn);
    let p = -dot(b1, b2) / (len * len);
    let q = -dot(b3, b2) / (len * len);
    let gb = sub(scale(ga, p - 1.0), scale(gd, q));
    let gc = sub(scale(gd, q - 1.0), scale(ga, p));
    Some([ga, gb, gc, gd])
}

/// Cosine of the angle at `b` in `a-b-c` together with its gradient with
/// respect to `a`, `b`, and `c`. `None` for coincident points.
pub fn cos_angle_gradient(a: Vec3, b: Vec3, c: Vec3) -> Option<(f64, [Vec3; 3])> {
    let u = sub(a, b);
    let v = sub(c, b);
    let lu = norm(u);
    let lv = norm(v);
    if lu < 1e-8 || lv < 1e-8 {
        return None;
    }
    let cos = dot(u, v) / (lu * lv);
    let ga = sub(scale(v, 1.0 / (lu * lv)), scale(u, cos / (lu * lu)));
    let gc = sub(scale(u, 1.0 / (lu * lv)), scale(v, cos / (lv * lv)));
    let gb = scale(add(ga, gc), -1.0);
    Some((cos, [ga, gb, gc]))
}

/// Signed volume of the parallelepiped spanned by `a-center`, `b-center`, `c-center`.
pub fn signed_volume(center: Vec3, a: Vec3, b: Vec3, c: Vec3) -> f64 {
    let u = sub(a, center);
    let v = sub(b, center);
    let w = sub(c, center);
    dot(u, cross(v, w))
}

pub fn centroid(points: &[Vec3]) -> Vec3 {
    if points.is_empty() {
        return [0.0; 3];
    }
    let sum = points.iter().fold([0.0; 3], |acc, p| add(acc, *p));
    scale(sum, 1.0 / points.len() as f64)
}

/// Distance between the ends of a dihedral chain with bond lengths `r12`,
/// `r23`, `r34`, bend angles `theta123`, `theta234`, and torsion `phi`.
pub fn chain_14_distance(
    r12: f64,
    r23: f64,
    r34: f64,
    theta123: f64,
    theta234: f64,
    phi: f64,
) -> f64 {
    let p1 = [r12 * theta123.sin(), 0.0, r12 * theta123.cos()];
    let p4 = [
        r34 * theta234.sin() * phi.cos(),
        r34 * theta234.sin() * phi.sin(),
        r23 - r34 * theta234.cos(),
    ];
    distance(p1, p4)
}

/// Distance between the ends of a bend with sides `r1`, `r2` and angle `theta`.
#[inline]
pub fn law_of_cosines(r1: f64, r2: f64, theta: f64) -> f64 {
    (r1 * r1 + r2 * r2 - 2.0 * r1 * r2 * theta.cos()).max(0.0).sqrt()
}
