//! # Core Module
//!
//! The file formats a structure is read from and written to. The structure
//! itself is a [`pdbtbx::PDB`] (Model → Chain → Residue → Atom).
//!
//! - **File I/O** ([`io`]) - mmCIF reading with confidence metadata, and PDB output

pub mod io;
