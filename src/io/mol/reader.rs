use crate::io::{Format, error::Error, util};
use crate::model::atom::Atom;
use crate::model::molecule::Molecule;
use crate::model::types::{BondOrder, Element};
use std::io::BufRead;

/// Reads the first V2000 record of a MOL or SDF stream.
///
/// Atoms are taken as fully specified (no implicit hydrogens), and the
/// coordinates become conformer 0.
pub fn read<R: BufRead>(reader: R) -> Result<Molecule, Error> {
    let lines = collect_first_block(reader)?;
    if lines.len() < 4 {
        return Err(Error::parse(
            Format::Mol,
            lines.len().max(1),
            "MOL block must contain a three-line header and a counts line",
        ));
    }

    let (counts_line_no, counts_line) = (lines[3].0, &lines[3].1);
    if counts_line.contains("V3000") {
        return Err(Error::parse(Format::Mol, counts_line_no, "V3000 is not supported"));
    }
    let (atom_count, bond_count) = parse_counts(counts_line, counts_line_no)?;

    let atom_start = 4;
    let bond_start = atom_start + atom_count;
    if lines.len() < bond_start + bond_count {
        return Err(Error::parse(
            Format::Mol,
            lines.last().map_or(counts_line_no, |(ln, _)| *ln),
            "block ended before atoms/bonds were fully specified",
        ));
    }

    let mut mol = Molecule::new();
    mol.name = lines[0].1.trim().to_string();

    let mut positions = Vec::with_capacity(atom_count);
    for (ln, raw) in &lines[atom_start..bond_start] {
        let (atom, pos) = parse_atom(raw, *ln)?;
        mol.add_atom(atom);
        positions.push(pos);
    }

    for (ln, raw) in &lines[bond_start..bond_start + bond_count] {
        let (i, j, order) = parse_bond(raw, *ln, atom_count)?;
        mol.add_bond(i, j, order)?;
    }

    for (ln, raw) in &lines[bond_start + bond_count..] {
        if raw.starts_with("M  END") {
            break;
        }
        apply_property(&mut mol, raw, *ln)?;
    }

    mol.add_conformer(positions)?;
    Ok(mol)
}

fn collect_first_block<R: BufRead>(reader: R) -> Result<Vec<(usize, String)>, Error> {
    let mut lines = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let content = line?;
        if content.trim() == "$$$$" && !lines.is_empty() {
            break;
        }
        lines.push((i + 1, content));
    }
    Ok(lines)
}

fn parse_counts(line: &str, line_no: usize) -> Result<(usize, usize), Error> {
    let field = |range: std::ops::Range<usize>, what: &str| {
        line.get(range)
            .and_then(|s| s.trim().parse::<usize>().ok())
            .ok_or_else(|| Error::parse(Format::Mol, line_no, format!("invalid {what} count")))
    };
    Ok((field(0..3, "atom")?, field(3..6, "bond")?))
}

fn parse_atom(raw: &str, ln: usize) -> Result<(Atom, [f64; 3]), Error> {
    let padded = format!("{raw:<69}");
    let coord = |range: std::ops::Range<usize>, axis: char| {
        padded
            .get(range)
            .and_then(|s| s.trim().parse::<f64>().ok())
            .ok_or_else(|| Error::parse(Format::Mol, ln, format!("invalid {axis} coordinate in atom line")))
    };
    let pos = [coord(0..10, 'x')?, coord(10..20, 'y')?, coord(20..30, 'z')?];

    let symbol = padded.get(31..34).unwrap_or("").trim();
    let element: Element = symbol
        .parse()
        .map_err(|_| Error::parse(Format::Mol, ln, format!("unknown element symbol '{symbol}'")))?;
    let charge_code = padded
        .get(36..39)
        .and_then(|s| s.trim().parse::<i32>().ok())
        .unwrap_or(0);

    let mut atom = Atom::new(element).with_charge(util::charge_from_ctfile(charge_code));
    atom.no_implicit = true;
    Ok((atom, pos))
}

fn parse_bond(raw: &str, ln: usize, atom_count: usize) -> Result<(usize, usize, BondOrder), Error> {
    let field = |range: std::ops::Range<usize>, what: &str| {
        raw.get(range)
            .and_then(|s| s.trim().parse::<i32>().ok())
            .ok_or_else(|| Error::parse(Format::Mol, ln, format!("invalid {what} in bond line")))
    };
    let a1 = field(0..3, "first atom index")?;
    let a2 = field(3..6, "second atom index")?;
    let code = field(6..9, "bond order")?;

    let order = util::bond_order_from_ctfile(code)
        .ok_or_else(|| Error::parse(Format::Mol, ln, "unsupported bond order in bond line"))?;
    let in_range = |a: i32| a >= 1 && (a as usize) <= atom_count;
    if !in_range(a1) || !in_range(a2) {
        return Err(Error::parse(
            Format::Mol,
            ln,
            "bond references atom outside declared range",
        ));
    }
    Ok((a1 as usize - 1, a2 as usize - 1, order))
}

/// Applies `M  CHG` and `M  ISO` lines; other properties are ignored.
fn apply_property(mol: &mut Molecule, raw: &str, ln: usize) -> Result<(), Error> {
    let tag = raw.get(3..6).unwrap_or("");
    if tag != "CHG" && tag != "ISO" {
        return Ok(());
    }
    let values: Vec<i32> = raw[6..]
        .split_whitespace()
        .map(|t| t.parse::<i32>())
        .collect::<Result<_, _>>()
        .map_err(|_| Error::parse(Format::Mol, ln, format!("invalid M  {tag} line")))?;
    let Some((&count, pairs)) = values.split_first() else {
        return Err(Error::parse(Format::Mol, ln, format!("empty M  {tag} line")));
    };
    if count < 0 || pairs.len() != 2 * count as usize {
        return Err(Error::parse(Format::Mol, ln, format!("M  {tag} entry count mismatch")));
    }

    if tag == "CHG" {
        // A CHG line supersedes every atom-block charge.
        for atom in &mut mol.atoms {
            atom.formal_charge = 0;
        }
    }
    for pair in pairs.chunks_exact(2) {
        let idx = usize::try_from(pair[0] - 1)
            .ok()
            .filter(|&i| i < mol.atom_count())
            .ok_or_else(|| Error::parse(Format::Mol, ln, "property references unknown atom"))?;
        match tag {
            "CHG" => {
                mol.atoms[idx].formal_charge = i8::try_from(pair[1])
                    .map_err(|_| Error::parse(Format::Mol, ln, "charge out of range"))?;
            }
            _ => {
                mol.atoms[idx].isotope = u16::try_from(pair[1])
                    .map_err(|_| Error::parse(Format::Mol, ln, "isotope out of range"))?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::mol::writer::to_mol_block;
    use crate::smiles;
    use std::io::Cursor;

    #[test]
    fn reads_back_written_block() {
        let mut mol = smiles::parse("[13CH3]C(=O)[O-]").unwrap();
        crate::hydrogens::add_hydrogens(&mut mol);
        let positions = (0..mol.atom_count())
            .map(|k| [0.5 * k as f64, 1.0 - k as f64, 0.25])
            .collect();
        mol.add_conformer(positions).unwrap();
        mol.name = "acetate".into();

        let block = to_mol_block(&mol, 0).unwrap();
        let parsed = read(Cursor::new(block)).unwrap();

        assert_eq!(parsed.name, "acetate");
        assert_eq!(parsed.atom_count(), mol.atom_count());
        assert_eq!(parsed.bond_count(), mol.bond_count());
        assert_eq!(parsed.atoms[3].formal_charge, -1);
        assert_eq!(parsed.atoms[0].isotope, 13);
        assert_eq!(parsed.bond_between(1, 2).unwrap().order, BondOrder::Double);
        let a = mol.conformer(0).unwrap().positions();
        let b = parsed.conformer(0).unwrap().positions();
        for (p, q) in a.iter().zip(b) {
            for k in 0..3 {
                assert!((p[k] - q[k]).abs() < 1e-4);
            }
        }
        assert_eq!(parsed.formula(), mol.formula());
    }

    #[test]
    fn truncated_blocks_report_a_line() {
        let text = "name\n  SFORGE            3D\n\n  2  1  0  0  0  0  0  0  0  0999 V2000\n    0.0000    0.0000    0.0000 C   0  0\n";
        match read(Cursor::new(text)) {
            Err(Error::Parse { line, .. }) => assert_eq!(line, 5),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_elements_are_rejected() {
        let text = "\n\n\n  1  0  0  0  0  0  0  0  0  0999 V2000\n    0.0000    0.0000    0.0000 Qq  0  0\nM  END\n";
        assert!(matches!(read(Cursor::new(text)), Err(Error::Parse { line: 5, .. })));
    }

    #[test]
    fn v3000_is_rejected() {
        let text = "\n\n\n  0  0  0     0  0            999 V3000\n";
        assert!(matches!(read(Cursor::new(text)), Err(Error::Parse { line: 4, .. })));
    }
}
