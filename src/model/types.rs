use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid or unsupported element symbol: '{0}'")]
pub struct ParseElementError(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid bond order string: '{0}'")]
pub struct ParseBondOrderError(String);

macro_rules! periodic_table {
    ($($variant:ident = $z:literal, $mass:literal;)+) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u8)]
        pub enum Element {
            $($variant = $z,)+
        }

        impl Element {
            const ALL: &'static [Element] = &[$(Element::$variant,)+];

            pub fn atomic_mass(&self) -> f64 {
                match self {
                    $(Element::$variant => $mass,)+
                }
            }

            pub fn symbol(&self) -> &'static str {
                match self {
                    $(Element::$variant => stringify!($variant),)+
                }
            }
        }

        impl FromStr for Element {
            type Err = ParseElementError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $(stringify!($variant) => Ok(Element::$variant),)+
                    _ => Err(ParseElementError(s.to_string())),
                }
            }
        }
    };
}

periodic_table! {
    H = 1, 1.008; He = 2, 4.0026; Li = 3, 6.94; Be = 4, 9.0122; B = 5, 10.81;
    C = 6, 12.011; N = 7, 14.007; O = 8, 15.999; F = 9, 18.998; Ne = 10, 20.18;
    Na = 11, 22.99; Mg = 12, 24.305; Al = 13, 26.982; Si = 14, 28.085; P = 15, 30.974;
    S = 16, 32.06; Cl = 17, 35.45; Ar = 18, 39.948; K = 19, 39.098; Ca = 20, 40.078;
    Sc = 21, 44.956; Ti = 22, 47.867; V = 23, 50.942; Cr = 24, 51.996; Mn = 25, 54.938;
    Fe = 26, 55.845; Co = 27, 58.933; Ni = 28, 58.693; Cu = 29, 63.546; Zn = 30, 65.38;
    Ga = 31, 69.723; Ge = 32, 72.63; As = 33, 74.922; Se = 34, 78.971; Br = 35, 79.904;
    Kr = 36, 83.798; Rb = 37, 85.468; Sr = 38, 87.62; Y = 39, 88.906; Zr = 40, 91.224;
    Nb = 41, 92.906; Mo = 42, 95.96; Tc = 43, 98.0; Ru = 44, 101.07; Rh = 45, 102.91;
    Pd = 46, 106.42; Ag = 47, 107.87; Cd = 48, 112.41; In = 49, 114.82; Sn = 50, 118.71;
    Sb = 51, 121.76; Te = 52, 127.6; I = 53, 126.9; Xe = 54, 131.29; Cs = 55, 132.91;
    Ba = 56, 137.33; La = 57, 138.91; Ce = 58, 140.12; Pr = 59, 140.91; Nd = 60, 144.24;
    Pm = 61, 145.0; Sm = 62, 150.36; Eu = 63, 151.96; Gd = 64, 157.25; Tb = 65, 158.93;
    Dy = 66, 162.5; Ho = 67, 164.93; Er = 68, 167.26; Tm = 69, 168.93; Yb = 70, 173.05;
    Lu = 71, 174.97; Hf = 72, 178.49; Ta = 73, 180.95; W = 74, 183.84; Re = 75, 186.21;
    Os = 76, 190.23; Ir = 77, 192.22; Pt = 78, 195.08; Au = 79, 196.97; Hg = 80, 200.59;
    Tl = 81, 204.38; Pb = 82, 207.2; Bi = 83, 208.98; Po = 84, 209.0; At = 85, 210.0;
    Rn = 86, 222.0; Fr = 87, 223.0; Ra = 88, 226.0; Ac = 89, 227.0; Th = 90, 232.04;
    Pa = 91, 231.04; U = 92, 238.03; Np = 93, 237.0; Pu = 94, 244.0; Am = 95, 243.0;
    Cm = 96, 247.0; Bk = 97, 247.0; Cf = 98, 251.0; Es = 99, 252.0; Fm = 100, 257.0;
    Md = 101, 258.0; No = 102, 259.0; Lr = 103, 262.0; Rf = 104, 267.0; Db = 105, 270.0;
    Sg = 106, 271.0; Bh = 107, 270.0; Hs = 108, 277.0; Mt = 109, 276.0; Ds = 110, 281.0;
    Rg = 111, 280.0; Cn = 112, 285.0; Nh = 113, 284.0; Fl = 114, 289.0; Mc = 115, 288.0;
    Lv = 116, 293.0; Ts = 117, 294.0; Og = 118, 294.0;
}

impl Element {
    #[inline]
    pub fn atomic_number(&self) -> u8 {
        *self as u8
    }

    pub fn from_atomic_number(z: u8) -> Option<Element> {
        if z == 0 {
            return None;
        }
        Self::ALL.get(usize::from(z) - 1).copied()
    }

    /// Elements that may be written without brackets in SMILES.
    pub fn is_organic_subset(&self) -> bool {
        matches!(
            self,
            Element::B
                | Element::C
                | Element::N
                | Element::O
                | Element::P
                | Element::S
                | Element::F
                | Element::Cl
                | Element::Br
                | Element::I
        )
    }

    /// Allowed valence states of the neutral element, smallest first.
    ///
    /// An empty slice means the valence model places no restriction on the element.
    pub fn allowed_valences(&self) -> &'static [u8] {
        match self {
            Element::H => &[1],
            Element::B => &[3],
            Element::C | Element::Si | Element::Ge => &[4],
            Element::N => &[3],
            Element::O => &[2],
            Element::F | Element::Cl | Element::Br => &[1],
            Element::P | Element::As => &[3, 5],
            Element::S | Element::Se | Element::Te => &[2, 4, 6],
            Element::I => &[1, 3, 5],
            _ => &[],
        }
    }

    /// Allowed valences for an atom carrying `charge`, taken from its
    /// isoelectronic neutral element (N+ behaves like C, O- like F).
    pub fn charged_valences(&self, charge: i8) -> &'static [u8] {
        if charge == 0 {
            return self.allowed_valences();
        }
        let z = i16::from(self.atomic_number()) - i16::from(charge);
        u8::try_from(z)
            .ok()
            .and_then(Element::from_atomic_number)
            .map(|e| e.allowed_valences())
            .unwrap_or(&[])
    }

    /// Periodic table row, 1-based.
    pub fn period(&self) -> u8 {
        match self.atomic_number() {
            1..=2 => 1,
            3..=10 => 2,
            11..=18 => 3,
            19..=36 => 4,
            37..=54 => 5,
            55..=86 => 6,
            _ => 7,
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    pub fn value(&self) -> f64 {
        match self {
            BondOrder::Single => 1.0,
            BondOrder::Double => 2.0,
            BondOrder::Triple => 3.0,
            BondOrder::Aromatic => 1.5,
        }
    }

    /// Integer valence contribution; aromatic bonds count as one.
    pub fn valence_contribution(&self) -> u8 {
        match self {
            BondOrder::Single | BondOrder::Aromatic => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
        }
    }
}

impl fmt::Display for BondOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BondOrder::Single => write!(f, "Single"),
            BondOrder::Double => write!(f, "Double"),
            BondOrder::Triple => write!(f, "Triple"),
            BondOrder::Aromatic => write!(f, "Aromatic"),
        }
    }
}

impl FromStr for BondOrder {
    type Err = ParseBondOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" | "1" => Ok(BondOrder::Single),
            "double" | "2" => Ok(BondOrder::Double),
            "triple" | "3" => Ok(BondOrder::Triple),
            "aromatic" | "ar" | "4" => Ok(BondOrder::Aromatic),
            _ => Err(ParseBondOrderError(s.to_string())),
        }
    }
}

/// Orbital hybridization as perceived from the bond graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Hybridization {
    #[default]
    Unspecified,
    S,
    SP,
    SP2,
    SP3,
}

impl fmt::Display for Hybridization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Hybridization::Unspecified => "unspecified",
            Hybridization::S => "s",
            Hybridization::SP => "sp",
            Hybridization::SP2 => "sp2",
            Hybridization::SP3 => "sp3",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    #[test]
    fn element_from_str_valid() {
        assert_eq!(Element::from_str("H").unwrap(), Element::H);
        assert_eq!(Element::from_str("Cl").unwrap(), Element::Cl);
        assert_eq!(Element::from_str("Og").unwrap(), Element::Og);
    }

    #[test]
    fn element_from_str_invalid_case() {
        let err = Element::from_str("cl").unwrap_err();
        assert_eq!(err.to_string(), "invalid or unsupported element symbol: 'cl'");
    }

    #[test]
    fn atomic_number_roundtrips_through_table() {
        for z in 1..=118u8 {
            let e = Element::from_atomic_number(z).unwrap();
            assert_eq!(e.atomic_number(), z);
        }
        assert_eq!(Element::from_atomic_number(0), None);
        assert_eq!(Element::from_atomic_number(119), None);
    }

    #[test]
    fn atomic_mass_values() {
        assert!(approx_eq(Element::H.atomic_mass(), 1.008, 1e-6));
        assert!(approx_eq(Element::C.atomic_mass(), 12.011, 1e-6));
        assert!(approx_eq(Element::O.atomic_mass(), 15.999, 1e-6));
    }

    #[test]
    fn charged_valences_follow_isoelectronic_element() {
        assert_eq!(Element::N.charged_valences(1), &[4]);
        assert_eq!(Element::O.charged_valences(-1), &[1]);
        assert_eq!(Element::C.charged_valences(-1), &[3]);
        assert_eq!(Element::S.charged_valences(0), &[2, 4, 6]);
        assert!(Element::Na.charged_valences(1).is_empty());
    }

    #[test]
    fn organic_subset_membership() {
        assert!(Element::C.is_organic_subset());
        assert!(Element::Br.is_organic_subset());
        assert!(!Element::Se.is_organic_subset());
        assert!(!Element::H.is_organic_subset());
    }

    #[test]
    fn bondorder_from_str_variants() {
        assert_eq!(BondOrder::from_str("single").unwrap(), BondOrder::Single);
        assert_eq!(BondOrder::from_str("2").unwrap(), BondOrder::Double);
        assert_eq!(BondOrder::from_str("Triple").unwrap(), BondOrder::Triple);
        assert_eq!(BondOrder::from_str("AR").unwrap(), BondOrder::Aromatic);
        assert!(BondOrder::from_str("quad").is_err());
    }

    #[test]
    fn bondorder_value_and_valence() {
        assert!(approx_eq(BondOrder::Aromatic.value(), 1.5, 1e-12));
        assert_eq!(BondOrder::Aromatic.valence_contribution(), 1);
        assert_eq!(BondOrder::Triple.valence_contribution(), 3);
        assert_eq!(BondOrder::Double.to_string(), "Double");
    }
}
