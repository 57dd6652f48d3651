//! # Workflows Module
//!
//! High-level entry points that tie the structure model and the file formats
//! together into complete conversions.
//!
//! - **Confidence Remapping** ([`confidence`]) - Moves plDDT values into the
//!   B-factor of every atom, with a default for atoms that have none.
//! - **Conversion Pipeline** ([`convert`]) - Reads mmCIF, remaps confidence,
//!   and writes PDB, either between streams or between files.
//! - **Configuration** ([`config`]) - The validated settings of a conversion.

pub mod confidence;
pub mod config;
pub mod convert;
pub mod error;
