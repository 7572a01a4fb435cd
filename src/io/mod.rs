use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub mod error;
pub mod mol;
pub mod sdf;
pub mod util;

pub use error::Error;

use crate::model::molecule::Molecule;

/// Text formats that can be parsed, named in [`Error::Parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Mol,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Mol => write!(f, "MOL"),
        }
    }
}

/// Writes conformer `conf_id` of `mol` as a MOL file at `path`, replacing
/// any existing file.
pub fn write_mol_file(path: impl AsRef<Path>, mol: &Molecule, conf_id: usize) -> Result<(), Error> {
    let block = mol::to_mol_block(mol, conf_id)?;
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(block.as_bytes())?;
    writer.flush()?;
    Ok(())
}
