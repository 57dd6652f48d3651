//! Provides input/output functionality for macromolecular structure files.
//!
//! Structures are held as [`pdbtbx::PDB`] values and moved between formats
//! through the [`traits::StructureReader`] and [`traits::StructureWriter`]
//! interfaces. mmCIF is supported for reading ([`cif`]); PDB is supported for
//! writing and, for verification, reading ([`pdb`]).

pub mod cif;
pub mod pdb;
pub mod traits;

use pdbtbx::PDBError;

/// Joins the messages of a failed `pdbtbx` read or write into one line.
pub(crate) fn describe_errors(errors: &[PDBError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
