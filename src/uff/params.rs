use super::error::UffError;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;

const DEFAULT_PARAMS_TOML: &str = include_str!("../../resources/uff.params.toml");

static DEFAULT_PARAMS: OnceLock<Result<UffParams, UffError>> = OnceLock::new();

/// Bond-order correction coefficient (λ).
const BOND_ORDER_LAMBDA: f64 = 0.1332;
/// Twice the electrostatic constant G, in kcal·Å/mol.
const FORCE_CONSTANT_G2: f64 = 664.12;

#[derive(Debug, Clone, Deserialize)]
pub struct UffParams {
    #[serde(default)]
    pub atoms: HashMap<String, AtomParams>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct AtomParams {
    pub r1: f64,
    pub theta0: f64,
    pub x1: f64,
    #[serde(rename = "D1")]
    pub d1: f64,
    pub zeta: f64,
    #[serde(rename = "Z1")]
    pub z1: f64,
    #[serde(rename = "Vi")]
    pub vi: f64,
    #[serde(rename = "Uj")]
    pub uj: f64,
    #[serde(rename = "Xi")]
    pub xi: f64,
}

impl UffParams {
    pub fn get(&self, label: &str) -> Option<&AtomParams> {
        self.atoms.get(label)
    }
}

/// Parses a custom table, or returns a copy of the built-in one.
pub fn load_parameters(custom_toml: Option<&str>) -> Result<UffParams, UffError> {
    match custom_toml {
        Some(toml) => Ok(toml::from_str(toml)?),
        None => default_parameters().cloned(),
    }
}

pub fn default_parameters() -> Result<&'static UffParams, UffError> {
    DEFAULT_PARAMS
        .get_or_init(|| toml::from_str(DEFAULT_PARAMS_TOML).map_err(UffError::from))
        .as_ref()
        .map_err(Clone::clone)
}

/// Natural bond length with bond-order and electronegativity corrections.
pub fn rest_bond_length(a: &AtomParams, b: &AtomParams, order: f64) -> f64 {
    let (ri, rj) = (a.r1, b.r1);
    let r_bo = -BOND_ORDER_LAMBDA * (ri + rj) * order.ln();
    let chi = (a.xi.sqrt() - b.xi.sqrt()).powi(2);
    let r_en = ri * rj * chi / (a.xi * ri + b.xi * rj);
    ri + rj + r_bo - r_en
}

/// Harmonic stretch constant (kcal/mol/Å²) for a bond of length `r0`.
pub fn bond_force_constant(a: &AtomParams, b: &AtomParams, r0: f64) -> f64 {
    FORCE_CONSTANT_G2 * a.z1 * b.z1 / r0.powi(3)
}

/// Bend constant for the angle `i-j-k` with natural angle `theta0` (radians)
/// at `j`, given the two natural bond lengths.
pub fn angle_force_constant(
    end_i: &AtomParams,
    end_k: &AtomParams,
    r_ij: f64,
    r_jk: f64,
    theta0: f64,
) -> f64 {
    let cos0 = theta0.cos();
    let r_ik = (r_ij * r_ij + r_jk * r_jk - 2.0 * r_ij * r_jk * cos0).sqrt();
    let beta = FORCE_CONSTANT_G2 / (r_ij * r_jk);
    let prefactor = beta * end_i.z1 * end_k.z1 / r_ik.powi(5);
    let r_term = r_ij * r_jk;
    let inner = 3.0 * r_term * (1.0 - cos0 * cos0) - r_ik * r_ik * cos0;
    prefactor * r_term * inner
}

/// Van der Waals distance and well depth for a pair (geometric means).
pub fn vdw_pair(a: &AtomParams, b: &AtomParams) -> (f64, f64) {
    ((a.x1 * b.x1).sqrt(), (a.d1 * b.d1).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(label: &str) -> AtomParams {
        *default_parameters().unwrap().get(label).unwrap()
    }

    #[test]
    fn embedded_table_parses() {
        let table = default_parameters().unwrap();
        for label in ["H_", "C_3", "C_R", "N_R", "O_2", "S_3+6", "P_3+5", "Cl", "I_"] {
            assert!(table.get(label).is_some(), "{label}");
        }
        assert_eq!(params("C_3").theta0, 109.47);
    }

    #[test]
    fn custom_tables_are_parsed_and_errors_surface() {
        let custom = load_parameters(Some(
            "[atoms]\nX_ = { r1 = 1.0, theta0 = 90.0, x1 = 3.0, D1 = 0.1, zeta = 12.0, Z1 = 1.0, Vi = 0.0, Uj = 0.0, Xi = 5.0 }\n",
        ))
        .unwrap();
        assert_eq!(custom.atoms.len(), 1);
        assert!(matches!(
            load_parameters(Some("[atoms]\nX_ = 3")),
            Err(UffError::ParameterParse(_))
        ));
    }

    #[test]
    fn rest_lengths_are_chemically_sensible() {
        let c3 = params("C_3");
        let h = params("H_");
        let cr = params("C_R");
        let o2 = params("O_2");
        let ch = rest_bond_length(&c3, &h, 1.0);
        let cc = rest_bond_length(&c3, &c3, 1.0);
        let aromatic = rest_bond_length(&cr, &cr, 1.5);
        let carbonyl = rest_bond_length(&params("C_2"), &o2, 2.0);
        assert!((ch - 1.11).abs() < 0.03, "C-H {ch}");
        assert!((cc - 1.514).abs() < 0.01, "C-C {cc}");
        assert!((aromatic - 1.38).abs() < 0.03, "C:C {aromatic}");
        assert!(carbonyl < 1.25 && carbonyl > 1.15, "C=O {carbonyl}");
    }

    #[test]
    fn force_constants_are_positive() {
        let c3 = params("C_3");
        let h = params("H_");
        let r0 = rest_bond_length(&c3, &h, 1.0);
        assert!(bond_force_constant(&c3, &h, r0) > 500.0);
        let k = angle_force_constant(&h, &h, r0, r0, 109.47f64.to_radians());
        assert!(k > 0.0);
    }
}
