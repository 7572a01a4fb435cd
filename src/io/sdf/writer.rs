use crate::io::{error::Error, mol};
use crate::model::molecule::Molecule;
use std::io::Write;

/// Writes every conformer of `mol` as a separate SD record.
pub fn write<W: Write>(mut writer: W, mol: &Molecule) -> Result<(), Error> {
    for conf_id in 0..mol.num_conformers() {
        mol::write(&mut writer, mol, conf_id)?;
        writeln!(writer, "$$$$")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hydrogens::add_hydrogens;
    use crate::smiles;
    use std::io::Cursor;

    #[test]
    fn writes_one_record_per_conformer() {
        let mut mol = smiles::parse("C#N").unwrap();
        add_hydrogens(&mut mol);
        mol.add_conformer(vec![[0.0, 0.0, 0.0], [1.16, 0.0, 0.0], [-1.07, 0.0, 0.0]])
            .unwrap();
        mol.add_conformer(vec![[0.0, 0.0, 0.0], [0.0, 1.16, 0.0], [0.0, -1.07, 0.0]])
            .unwrap();

        let mut buf = Vec::new();
        write(&mut buf, &mol).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert_eq!(text.matches("$$$$\n").count(), 2);
        assert_eq!(text.matches("M  END\n").count(), 2);

        let first = mol::read(Cursor::new(text.as_bytes())).unwrap();
        assert_eq!(first.atom_count(), 3);
        assert!((first.conformer(0).unwrap().position(1)[0] - 1.16).abs() < 1e-4);
    }

    #[test]
    fn no_conformers_writes_nothing() {
        let mol = smiles::parse("O").unwrap();
        let mut buf = Vec::new();
        write(&mut buf, &mol).unwrap();
        assert!(buf.is_empty());
    }
}
