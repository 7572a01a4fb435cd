use super::error::SmilesError;
use crate::model::atom::Atom;
use crate::model::molecule::{ModelError, Molecule};
use crate::model::stereo::{
    Chirality, DoubleBondConfig, DoubleBondStereo, NeighborRef, StereoCenter,
};
use crate::model::types::{BondOrder, Element};
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BondSymbol {
    Single,
    Double,
    Triple,
    Aromatic,
    Up,
    Down,
}

impl BondSymbol {
    fn from_byte(b: u8) -> Option<Self> {
        match b {
            b'-' => Some(Self::Single),
            b'=' => Some(Self::Double),
            b'#' => Some(Self::Triple),
            b':' => Some(Self::Aromatic),
            b'/' => Some(Self::Up),
            b'\\' => Some(Self::Down),
            _ => None,
        }
    }

    fn order(self) -> BondOrder {
        match self {
            Self::Single | Self::Up | Self::Down => BondOrder::Single,
            Self::Double => BondOrder::Double,
            Self::Triple => BondOrder::Triple,
            Self::Aromatic => BondOrder::Aromatic,
        }
    }

    fn direction(self) -> Option<Direction> {
        match self {
            Self::Up => Some(Direction::Up),
            Self::Down => Some(Direction::Down),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
}

impl Direction {
    fn flipped(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }
}

/// Neighbor as it appears around an atom in written order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NeighborSlot {
    Atom(usize),
    ImplicitH,
    /// Ring bond whose partner has not been read yet.
    PendingRing(u16),
}

#[derive(Debug, Clone, Copy)]
struct RingOpening {
    atom: usize,
    bond: Option<BondSymbol>,
    pos: usize,
}

/// A `/` or `\` bond, read left to right from `from`.
#[derive(Debug, Clone, Copy)]
struct DirectedBond {
    from: usize,
    to: usize,
    dir: Direction,
}

impl DirectedBond {
    /// Direction seen when walking from `atom` to the other end.
    fn seen_from(&self, atom: usize) -> Direction {
        if self.from == atom {
            self.dir
        } else {
            self.dir.flipped()
        }
    }

    fn other(&self, atom: usize) -> Option<usize> {
        if self.from == atom {
            Some(self.to)
        } else if self.to == atom {
            Some(self.from)
        } else {
            None
        }
    }
}

/// Reads the SMILES grammar into a molecular graph with stereo annotations.
///
/// Aromatic bonds are left as [`BondOrder::Aromatic`] and hydrogen counts of
/// organic-subset atoms are left at zero; both are settled afterwards.
pub(super) fn parse(smiles: &str) -> Result<Molecule, SmilesError> {
    Parser::new(smiles).run()
}

struct Parser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    mol: Molecule,
    prev: Option<usize>,
    pending_bond: Option<(BondSymbol, usize)>,
    branches: Vec<(usize, usize)>,
    rings: BTreeMap<u16, RingOpening>,
    neighbor_order: Vec<Vec<NeighborSlot>>,
    chirality: Vec<Option<Chirality>>,
    directed: Vec<DirectedBond>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            mol: Molecule::new(),
            prev: None,
            pending_bond: None,
            branches: Vec::new(),
            rings: BTreeMap::new(),
            neighbor_order: Vec::new(),
            chirality: Vec::new(),
            directed: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Molecule, SmilesError> {
        if self.bytes.is_empty() {
            return Err(SmilesError::Empty);
        }

        while let Some(&b) = self.bytes.get(self.pos) {
            let start = self.pos;
            match b {
                b'(' => {
                    let Some(prev) = self.prev else {
                        return Err(SmilesError::unexpected(self.input, start, "an atom"));
                    };
                    if self.pending_bond.is_some() {
                        return Err(SmilesError::unexpected(self.input, start, "an atom"));
                    }
                    self.branches.push((prev, start));
                    self.pos += 1;
                }
                b')' => {
                    self.reject_pending_bond()?;
                    let (atom, _) = self
                        .branches
                        .pop()
                        .ok_or(SmilesError::UnmatchedBranchClose { pos: start })?;
                    self.prev = Some(atom);
                    self.pos += 1;
                }
                b'.' => {
                    self.reject_pending_bond()?;
                    self.prev = None;
                    self.pos += 1;
                }
                b'0'..=b'9' | b'%' => self.ring_bond()?,
                b'[' => self.bracket_atom()?,
                b'*' => {
                    return Err(SmilesError::Unsupported {
                        pos: start,
                        feature: "wildcard atom '*'",
                    });
                }
                _ => {
                    if let Some(symbol) = BondSymbol::from_byte(b) {
                        if self.prev.is_none() || self.pending_bond.is_some() {
                            return Err(SmilesError::unexpected(self.input, start, "an atom"));
                        }
                        self.pending_bond = Some((symbol, start));
                        self.pos += 1;
                    } else {
                        self.organic_atom()?;
                    }
                }
            }
        }

        self.finish()
    }

    fn reject_pending_bond(&self) -> Result<(), SmilesError> {
        match self.pending_bond {
            Some((_, pos)) => Err(SmilesError::DanglingBond { pos }),
            None => Ok(()),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Reads a run of digits inside the bracket atom opened at `bracket`.
    fn read_number(&mut self, bracket: usize, what: &str) -> Result<Option<u32>, SmilesError> {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        if start == self.pos {
            return Ok(None);
        }
        let digits = &self.input[start..self.pos];
        digits
            .parse()
            .map(Some)
            .map_err(|_| SmilesError::bracket(bracket, format!("{what} {digits} is out of range")))
    }

    fn organic_atom(&mut self) -> Result<(), SmilesError> {
        let start = self.pos;
        let next = self.bytes.get(start + 1).copied();
        let (element, aromatic, len) = match (self.bytes[start], next) {
            (b'C', Some(b'l')) => (Element::Cl, false, 2),
            (b'B', Some(b'r')) => (Element::Br, false, 2),
            (b'B', _) => (Element::B, false, 1),
            (b'C', _) => (Element::C, false, 1),
            (b'N', _) => (Element::N, false, 1),
            (b'O', _) => (Element::O, false, 1),
            (b'P', _) => (Element::P, false, 1),
            (b'S', _) => (Element::S, false, 1),
            (b'F', _) => (Element::F, false, 1),
            (b'I', _) => (Element::I, false, 1),
            (b'b', _) => (Element::B, true, 1),
            (b'c', _) => (Element::C, true, 1),
            (b'n', _) => (Element::N, true, 1),
            (b'o', _) => (Element::O, true, 1),
            (b'p', _) => (Element::P, true, 1),
            (b's', _) => (Element::S, true, 1),
            _ => return Err(SmilesError::unexpected(self.input, start, "an atom")),
        };
        self.pos += len;

        let mut atom = Atom::new(element);
        atom.is_aromatic = aromatic;
        self.push_atom(atom, None, start)
    }

    fn bracket_atom(&mut self) -> Result<(), SmilesError> {
        let start = self.pos;
        self.pos += 1;

        let isotope = match self.read_number(start, "isotope")? {
            Some(n) => u16::try_from(n)
                .map_err(|_| SmilesError::bracket(start, format!("isotope {n} is out of range")))?,
            None => 0,
        };

        let (element, aromatic) = self.bracket_symbol(start)?;

        let chirality = if self.eat(b'@') {
            let c = if self.eat(b'@') {
                Chirality::Clockwise
            } else {
                Chirality::CounterClockwise
            };
            if self
                .peek()
                .is_some_and(|b| b.is_ascii_uppercase() && b != b'H')
            {
                return Err(SmilesError::Unsupported {
                    pos: self.pos,
                    feature: "non-tetrahedral chirality class",
                });
            }
            Some(c)
        } else {
            None
        };

        let hydrogens = if self.eat(b'H') {
            match self.read_number(start, "hydrogen count")? {
                Some(n) => u8::try_from(n).map_err(|_| {
                    SmilesError::bracket(start, format!("hydrogen count {n} is out of range"))
                })?,
                None => 1,
            }
        } else {
            0
        };

        let charge = self.read_charge(start)?;

        if self.eat(b':') && self.read_number(start, "atom class")?.is_none() {
            return Err(SmilesError::bracket(start, "atom class must be a number"));
        }

        if !self.eat(b']') {
            return Err(match self.peek() {
                Some(_) => SmilesError::bracket(start, "expected ']'"),
                None => SmilesError::UnexpectedEnd {
                    pos: self.pos,
                    expected: "']'",
                },
            });
        }

        let mut atom = Atom::new(element)
            .with_charge(charge)
            .with_implicit_hydrogens(hydrogens);
        atom.no_implicit = true;
        atom.is_aromatic = aromatic;
        atom.isotope = isotope;

        let idx = self.mol.atom_count();
        self.push_atom(atom, chirality, start)?;
        if hydrogens == 1 {
            self.neighbor_order[idx].push(NeighborSlot::ImplicitH);
        }
        Ok(())
    }

    fn bracket_symbol(&mut self, start: usize) -> Result<(Element, bool), SmilesError> {
        let rest = &self.bytes[self.pos..];

        for (text, element) in [
            (&b"se"[..], Element::Se),
            (&b"as"[..], Element::As),
            (&b"te"[..], Element::Te),
        ] {
            if rest.starts_with(text) {
                self.pos += 2;
                return Ok((element, true));
            }
        }

        let aromatic = match rest.first() {
            Some(b'b') => Some(Element::B),
            Some(b'c') => Some(Element::C),
            Some(b'n') => Some(Element::N),
            Some(b'o') => Some(Element::O),
            Some(b'p') => Some(Element::P),
            Some(b's') => Some(Element::S),
            _ => None,
        };
        if let Some(element) = aromatic {
            self.pos += 1;
            return Ok((element, true));
        }

        match rest {
            [first, second, ..] if first.is_ascii_uppercase() && second.is_ascii_lowercase() => {
                let two = &self.input[self.pos..self.pos + 2];
                if let Ok(element) = Element::from_str(two) {
                    self.pos += 2;
                    return Ok((element, false));
                }
            }
            [] => {
                return Err(SmilesError::UnexpectedEnd {
                    pos: self.pos,
                    expected: "an element symbol",
                });
            }
            _ => {}
        }

        if rest[0].is_ascii_uppercase() {
            let one = &self.input[self.pos..self.pos + 1];
            if let Ok(element) = Element::from_str(one) {
                self.pos += 1;
                return Ok((element, false));
            }
        }

        Err(SmilesError::bracket(start, "unknown element symbol"))
    }

    fn read_charge(&mut self, start: usize) -> Result<i8, SmilesError> {
        let sign: i32 = match self.peek() {
            Some(b'+') => 1,
            Some(b'-') => -1,
            _ => return Ok(0),
        };
        let symbol = self.bytes[self.pos];
        self.pos += 1;

        let magnitude = if let Some(n) = self.read_number(start, "formal charge")? {
            i32::try_from(n).map_err(|_| {
                SmilesError::bracket(start, format!("formal charge {n} is out of range"))
            })?
        } else {
            let mut count = 1;
            while self.eat(symbol) {
                count += 1;
            }
            count
        };

        i8::try_from(sign * magnitude)
            .map_err(|_| SmilesError::bracket(start, "formal charge is out of range"))
    }

    fn ring_bond(&mut self) -> Result<(), SmilesError> {
        let start = self.pos;
        let label = if self.eat(b'%') {
            let digits = self.bytes.get(self.pos..self.pos + 2);
            match digits {
                Some([a, b]) if a.is_ascii_digit() && b.is_ascii_digit() => {
                    self.pos += 2;
                    u16::from(a - b'0') * 10 + u16::from(b - b'0')
                }
                _ => {
                    return Err(SmilesError::unexpected(
                        self.input,
                        self.pos,
                        "two ring-bond digits",
                    ));
                }
            }
        } else {
            let d = self.bytes[self.pos] - b'0';
            self.pos += 1;
            u16::from(d)
        };

        let Some(atom) = self.prev else {
            return Err(SmilesError::unexpected(self.input, start, "an atom"));
        };
        let symbol = self.pending_bond.take().map(|(s, _)| s);

        let Some(open) = self.rings.remove(&label) else {
            self.rings.insert(
                label,
                RingOpening {
                    atom,
                    bond: symbol,
                    pos: start,
                },
            );
            self.neighbor_order[atom].push(NeighborSlot::PendingRing(label));
            return Ok(());
        };

        if open.atom == atom {
            return Err(SmilesError::RingSelfBond { label, pos: start });
        }

        match (open.bond, symbol) {
            (Some(a), Some(b)) if a.order() != b.order() => {
                return Err(SmilesError::ConflictingRingBond { label, pos: start });
            }
            (Some(a), _) => self.bond(open.atom, atom, Some(a), start)?,
            (None, b) => self.bond(atom, open.atom, b, start)?,
        }

        if let Some(slot) = self.neighbor_order[open.atom]
            .iter_mut()
            .rev()
            .find(|s| **s == NeighborSlot::PendingRing(label))
        {
            *slot = NeighborSlot::Atom(atom);
        }
        self.neighbor_order[atom].push(NeighborSlot::Atom(open.atom));
        Ok(())
    }

    fn push_atom(
        &mut self,
        atom: Atom,
        chirality: Option<Chirality>,
        start: usize,
    ) -> Result<(), SmilesError> {
        let idx = self.mol.add_atom(atom);
        self.neighbor_order.push(Vec::new());
        self.chirality.push(chirality);

        if let Some(prev) = self.prev {
            let symbol = self.pending_bond.take().map(|(s, _)| s);
            self.bond(prev, idx, symbol, start)?;
            self.neighbor_order[prev].push(NeighborSlot::Atom(idx));
            self.neighbor_order[idx].push(NeighborSlot::Atom(prev));
        }
        self.prev = Some(idx);
        Ok(())
    }

    /// Adds the bond `from`-`to`; a direction symbol is read from `from`.
    fn bond(
        &mut self,
        from: usize,
        to: usize,
        symbol: Option<BondSymbol>,
        pos: usize,
    ) -> Result<(), SmilesError> {
        let order = match symbol {
            Some(s) => s.order(),
            None if self.mol.atoms[from].is_aromatic && self.mol.atoms[to].is_aromatic => {
                BondOrder::Aromatic
            }
            None => BondOrder::Single,
        };

        self.mol.add_bond(from, to, order).map_err(|e| match e {
            ModelError::DuplicateBond(i, j) => SmilesError::DuplicateBond { i, j, pos },
            _ => SmilesError::unexpected(self.input, pos, "a bond"),
        })?;

        if let Some(dir) = symbol.and_then(BondSymbol::direction) {
            self.directed.push(DirectedBond { from, to, dir });
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Molecule, SmilesError> {
        self.reject_pending_bond()?;
        if let Some(&(_, pos)) = self.branches.first() {
            return Err(SmilesError::UnclosedBranch { pos });
        }
        if let Some((&label, open)) = self.rings.iter().min_by_key(|(_, o)| o.pos) {
            return Err(SmilesError::UnclosedRing {
                label,
                pos: open.pos,
            });
        }

        self.collect_stereo_centers();
        self.collect_double_bond_stereo();
        Ok(self.mol)
    }

    fn collect_stereo_centers(&mut self) {
        for (center, chirality) in self.chirality.iter().enumerate() {
            let Some(chirality) = *chirality else {
                continue;
            };
            let neighbors: Vec<NeighborRef> = self.neighbor_order[center]
                .iter()
                .filter_map(|slot| match *slot {
                    NeighborSlot::Atom(idx) => Some(NeighborRef::Atom(idx)),
                    NeighborSlot::ImplicitH => Some(NeighborRef::ImplicitH),
                    NeighborSlot::PendingRing(_) => None,
                })
                .collect();
            if neighbors.len() != 4 {
                debug!(
                    center,
                    neighbors = neighbors.len(),
                    "ignoring chirality on atom without four substituents"
                );
                continue;
            }
            self.mol.stereo_centers.push(StereoCenter {
                center,
                neighbors,
                chirality,
            });
        }
    }

    fn collect_double_bond_stereo(&mut self) {
        let doubles: Vec<(usize, usize)> = self
            .mol
            .bonds
            .iter()
            .filter(|b| b.order == BondOrder::Double)
            .map(|b| (b.i, b.j))
            .collect();

        for (a, b) in doubles {
            let Some((a_ref, a_dir)) = self.directed_neighbor(a, b) else {
                continue;
            };
            let Some((b_ref, b_dir)) = self.directed_neighbor(b, a) else {
                continue;
            };
            let config = if a_dir == b_dir {
                DoubleBondConfig::Cis
            } else {
                DoubleBondConfig::Trans
            };
            self.mol.double_bond_stereo.push(DoubleBondStereo {
                begin: a,
                end: b,
                begin_ref: a_ref,
                end_ref: b_ref,
                config,
            });
        }
    }

    /// First `/` or `\` substituent of `atom` other than `partner`, with the
    /// direction seen walking outward from `atom`.
    fn directed_neighbor(&self, atom: usize, partner: usize) -> Option<(usize, Direction)> {
        self.directed.iter().find_map(|d| {
            let other = d.other(atom)?;
            (other != partner).then(|| (other, d.seen_from(atom)))
        })
    }
}
