//! Multi-record SD files: one MOL block per conformer, each closed by `$$$$`.

mod writer;

pub use writer::write;
