//! # cif2pdb
//!
//! Converts predicted macromolecular structures from mmCIF to PDB format,
//! carrying the per-atom plDDT confidence of the prediction in the PDB
//! B-factor column.
//!
//! The library has two layers:
//!
//! - **[`core`]: The Foundation.** The mmCIF reader and the PDB writer. Both
//!   work on `pdbtbx` structures.
//!
//! - **[`workflows`]: The Public API.** The confidence remapping step and the
//!   end-to-end conversion pipeline built on top of `core`.

pub mod core;
pub mod workflows;
