use super::error::UffError;
use crate::model::molecule::Molecule;
use crate::model::topology::Topology;
use crate::model::types::{Element, Hybridization};

/// Assigns a UFF atom type label to every atom.
pub fn assign_types(mol: &Molecule, topo: &Topology) -> Result<Vec<&'static str>, UffError> {
    (0..mol.atom_count())
        .map(|idx| {
            atom_type(mol, topo, idx).ok_or(UffError::UntypedAtom {
                atom: idx,
                element: mol.atoms[idx].element,
            })
        })
        .collect()
}

fn atom_type(mol: &Molecule, topo: &Topology, idx: usize) -> Option<&'static str> {
    let atom = &mol.atoms[idx];
    let hyb = topo.hybridization[idx];
    let aromatic = atom.is_aromatic;
    let valence = mol.explicit_valence(idx) + u32::from(atom.implicit_hydrogens);

    let label = match atom.element {
        Element::H => "H_",
        Element::He => "He4+4",
        Element::Ne => "Ne4+4",
        Element::Ar => "Ar4+4",
        Element::Li => "Li",
        Element::Na => "Na",
        Element::K => "K_",
        Element::Be => "Be3+2",
        Element::Mg => "Mg3+2",
        Element::Ca => "Ca6+2",
        Element::Zn => "Zn3+2",
        Element::Al => "Al3",
        Element::F => "F_",
        Element::Cl => "Cl",
        Element::Br => "Br",
        Element::I => "I_",
        Element::B => match hyb {
            Hybridization::SP | Hybridization::SP2 => "B_2",
            _ => "B_3",
        },
        Element::C => match hyb {
            Hybridization::SP => "C_1",
            Hybridization::SP2 if aromatic => "C_R",
            Hybridization::SP2 => "C_2",
            _ => "C_3",
        },
        Element::N => match hyb {
            Hybridization::SP => "N_1",
            Hybridization::SP2 if aromatic => "N_R",
            Hybridization::SP2 => "N_2",
            _ => "N_3",
        },
        Element::O => match hyb {
            Hybridization::SP => "O_1",
            Hybridization::SP2 if aromatic => "O_R",
            Hybridization::SP2 => "O_2",
            _ => "O_3",
        },
        Element::Si => "Si3",
        Element::Ge => "Ge3",
        Element::Sn => "Sn3",
        Element::P => {
            if valence <= 3 {
                "P_3+3"
            } else {
                "P_3+5"
            }
        }
        Element::S => match (aromatic, hyb) {
            (true, _) => "S_R",
            (false, Hybridization::SP2) if topo.neighbors[idx].len() == 1 => "S_2",
            _ if valence <= 2 => "S_3+2",
            _ if valence <= 4 => "S_3+4",
            _ => "S_3+6",
        },
        Element::As => "As3+3",
        Element::Sb => "Sb3+3",
        Element::Se => "Se3+2",
        Element::Te => "Te3+2",
        _ => return None,
    };
    Some(label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hydrogens::add_hydrogens;
    use crate::smiles;

    fn types_of(smiles: &str) -> Vec<&'static str> {
        let mut mol = smiles::parse(smiles).unwrap();
        add_hydrogens(&mut mol);
        let topo = Topology::perceive(&mol);
        assign_types(&mol, &topo).unwrap()
    }

    #[test]
    fn aspirin_heavy_atom_types() {
        let types = types_of("CC(=O)Oc1ccccc1C(=O)O");
        assert_eq!(
            &types[..13],
            &[
                "C_3", "C_2", "O_2", "O_2", "C_R", "C_R", "C_R", "C_R", "C_R", "C_R", "C_2",
                "O_2", "O_2"
            ]
        );
        assert!(types[13..].iter().all(|t| *t == "H_"));
    }

    #[test]
    fn hybridization_drives_suffix() {
        assert_eq!(types_of("CC#N")[..3], ["C_3", "C_1", "N_1"]);
        assert_eq!(types_of("CN")[..2], ["C_3", "N_3"]);
        assert_eq!(types_of("c1ccncc1")[3], "N_R");
        assert_eq!(types_of("CO")[1], "O_3");
    }

    #[test]
    fn sulfur_and_phosphorus_follow_valence() {
        assert_eq!(types_of("CSC")[1], "S_3+2");
        assert_eq!(types_of("CS(=O)C")[1], "S_3+4");
        assert_eq!(types_of("CS(=O)(=O)C")[1], "S_3+6");
        assert_eq!(types_of("c1ccsc1")[3], "S_R");
        assert_eq!(types_of("C=S")[1], "S_2");
        assert_eq!(types_of("CP(C)C")[1], "P_3+3");
        assert_eq!(types_of("OP(=O)(O)O")[1], "P_3+5");
    }

    #[test]
    fn unsupported_elements_are_reported() {
        let mut mol = smiles::parse("[Fe]").unwrap();
        add_hydrogens(&mut mol);
        let topo = Topology::perceive(&mol);
        assert_eq!(
            assign_types(&mol, &topo),
            Err(UffError::UntypedAtom {
                atom: 0,
                element: Element::Fe
            })
        );
    }
}
