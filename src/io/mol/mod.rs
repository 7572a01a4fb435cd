//! MDL MOL (CTfile V2000) blocks.

mod reader;
mod writer;

pub use reader::read;
pub use writer::{to_mol_block, write};
