use crate::io::{error::Error, util};
use crate::model::molecule::Molecule;
use std::io::Write;

const PROGRAM: &str = "SFORGE";
/// Property lines hold at most eight entries.
const ENTRIES_PER_PROPERTY_LINE: usize = 8;

/// Writes conformer `conf_id` of `mol` as a V2000 MOL block ending in `M  END`.
pub fn write<W: Write>(mut writer: W, mol: &Molecule, conf_id: usize) -> Result<(), Error> {
    let conformer = mol
        .conformer(conf_id)
        .ok_or(Error::NoSuchConformer(conf_id))?;
    let chiral_flag = u8::from(!mol.stereo_centers.is_empty());

    writeln!(writer, "{}", mol.name)?;
    writeln!(writer, "  {PROGRAM:<8}{:10}3D", "")?;
    writeln!(writer)?;
    writeln!(
        writer,
        "{:>3}{:>3}  0  0{:>3}  0  0  0  0  0999 V2000",
        mol.atom_count(),
        mol.bond_count(),
        chiral_flag
    )?;

    for (atom, pos) in mol.atoms.iter().zip(conformer.positions()) {
        writeln!(
            writer,
            "{:>10.4}{:>10.4}{:>10.4} {:<3} 0{:>3}  0  0  0  0  0  0  0  0  0  0",
            pos[0],
            pos[1],
            pos[2],
            atom.element.symbol(),
            util::charge_to_ctfile(atom.formal_charge)
        )?;
    }

    for bond in &mol.bonds {
        writeln!(
            writer,
            "{:>3}{:>3}{:>3}  0  0  0  0",
            bond.i + 1,
            bond.j + 1,
            util::bond_order_to_ctfile(bond.order)
        )?;
    }

    let charged: Vec<(usize, i32)> = mol
        .atoms
        .iter()
        .enumerate()
        .filter(|(_, a)| a.formal_charge != 0)
        .map(|(i, a)| (i + 1, i32::from(a.formal_charge)))
        .collect();
    write_property(&mut writer, "CHG", &charged)?;

    let isotopes: Vec<(usize, i32)> = mol
        .atoms
        .iter()
        .enumerate()
        .filter(|(_, a)| a.isotope != 0)
        .map(|(i, a)| (i + 1, i32::from(a.isotope)))
        .collect();
    write_property(&mut writer, "ISO", &isotopes)?;

    writeln!(writer, "M  END")?;
    Ok(())
}

/// Renders the block produced by [`write`] into a string.
pub fn to_mol_block(mol: &Molecule, conf_id: usize) -> Result<String, Error> {
    let mut buf = Vec::new();
    write(&mut buf, mol, conf_id)?;
    String::from_utf8(buf).map_err(|e| Error::Io {
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
    })
}

fn write_property<W: Write>(writer: &mut W, tag: &str, entries: &[(usize, i32)]) -> Result<(), Error> {
    for chunk in entries.chunks(ENTRIES_PER_PROPERTY_LINE) {
        write!(writer, "M  {tag}{:>3}", chunk.len())?;
        for (atom, value) in chunk {
            write!(writer, " {atom:>3} {value:>3}")?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hydrogens::add_hydrogens;
    use crate::smiles;

    fn with_conformer(smiles: &str) -> Molecule {
        let mut mol = smiles::parse(smiles).unwrap();
        add_hydrogens(&mut mol);
        let positions = (0..mol.atom_count())
            .map(|k| [k as f64 * 1.25, -0.5, 0.125])
            .collect();
        mol.add_conformer(positions).unwrap();
        mol
    }

    #[test]
    fn header_counts_and_atom_lines() {
        let mut mol = with_conformer("CC(=O)Oc1ccccc1C(=O)O");
        mol.name = "aspirin".to_string();
        let block = to_mol_block(&mol, 0).unwrap();
        let lines: Vec<&str> = block.lines().collect();

        assert_eq!(lines[0], "aspirin");
        assert_eq!(lines[1], "  SFORGE            3D");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], " 21 21  0  0  0  0  0  0  0  0999 V2000");
        assert_eq!(
            lines[4],
            "    0.0000   -0.5000    0.1250 C   0  0  0  0  0  0  0  0  0  0  0  0"
        );
        assert!(lines[25].starts_with("  1  2  1"));
        assert_eq!(lines.len(), 4 + 21 + 21 + 1);
        assert_eq!(*lines.last().unwrap(), "M  END");
    }

    #[test]
    fn kekule_orders_are_written() {
        let block = to_mol_block(&with_conformer("c1ccccc1"), 0).unwrap();
        let bond_orders: Vec<&str> = block
            .lines()
            .skip(4 + 12)
            .take(12)
            .map(|l| &l[6..9])
            .collect();
        assert_eq!(bond_orders.iter().filter(|o| o.trim() == "2").count(), 3);
        assert!(bond_orders.iter().all(|o| o.trim() != "4"));
    }

    #[test]
    fn fixed_columns_hold_counts_atoms_and_multiple_bonds() {
        let mol = with_conformer("O=CC#N");
        let block = to_mol_block(&mol, 0).unwrap();
        let lines: Vec<&str> = block.lines().collect();
        let field = |line: &str, range: std::ops::Range<usize>| line[range].trim().to_string();

        assert_eq!(field(lines[3], 0..3), "5");
        assert_eq!(field(lines[3], 3..6), "4");

        let positions = mol.conformer(0).unwrap().positions();
        for (k, line) in lines[4..9].iter().enumerate() {
            for (axis, range) in [0..10, 10..20, 20..30].into_iter().enumerate() {
                let value: f64 = field(line, range).parse().unwrap();
                assert!((value - positions[k][axis]).abs() < 1e-4);
            }
            assert_eq!(field(line, 31..34), mol.atoms[k].element.symbol());
        }

        let bonds: Vec<(usize, usize, u8)> = lines[9..13]
            .iter()
            .map(|l| {
                (
                    field(l, 0..3).parse().unwrap(),
                    field(l, 3..6).parse().unwrap(),
                    field(l, 6..9).parse().unwrap(),
                )
            })
            .collect();
        assert!(bonds.contains(&(1, 2, 2)));
        assert!(bonds.contains(&(3, 4, 3)));
        assert_eq!(bonds.iter().filter(|b| b.2 == 1).count(), 2);
    }

    #[test]
    fn charges_and_isotopes_become_properties() {
        let block = to_mol_block(&with_conformer("[13CH3][N+](C)(C)C.[Cl-]"), 0).unwrap();
        assert!(block.contains("M  CHG  2   2   1   6  -1\n"));
        assert!(block.contains("M  ISO  1   1  13\n"));
        // Atom block charge code for N+.
        let n_line = block.lines().nth(5).unwrap();
        assert_eq!(&n_line[36..39], "  3");
    }

    #[test]
    fn chiral_flag_follows_stereo_centers() {
        let block = to_mol_block(&with_conformer("N[C@@H](C)C(=O)O"), 0).unwrap();
        assert_eq!(&block.lines().nth(3).unwrap()[12..15], "  1");
    }

    #[test]
    fn unknown_conformer_is_rejected() {
        let mol = smiles::parse("C").unwrap();
        assert!(matches!(to_mol_block(&mol, 2), Err(Error::NoSuchConformer(2))));
    }
}
