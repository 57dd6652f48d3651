use super::describe_errors;
use crate::core::io::traits::{StructureReader, StructureWriter};
use pdbtbx::{Format, PDB, ReadOptions, StrictnessLevel};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to parse PDB structure: {0}")]
    Parse(String),
    #[error("Value for {field} does not fit the PDB format: '{value}'")]
    FieldOverflow { field: &'static str, value: String },
    #[error("Failed to write PDB structure: {0}")]
    Write(String),
}

pub struct PdbFile;

fn overflow(field: &'static str, value: &str) -> PdbError {
    PdbError::FieldOverflow {
        field,
        value: value.to_string(),
    }
}

/// Rejects identifiers wider than their fixed PDB columns, which would
/// otherwise shift every following column of the record.
fn check_writable(pdb: &PDB) -> Result<(), PdbError> {
    for model in pdb.models() {
        for chain in model.chains() {
            if chain.id().chars().count() > 1 {
                return Err(overflow("chain id", chain.id()));
            }
            for residue in chain.residues() {
                if let Some(name) = residue.name().filter(|name| name.chars().count() > 3) {
                    return Err(overflow("residue name", name));
                }
                for atom in residue.atoms() {
                    if atom.name().chars().count() > 4 {
                        return Err(overflow("atom name", atom.name()));
                    }
                }
            }
        }
    }
    Ok(())
}

impl StructureReader for PdbFile {
    type Metadata = ();
    type Error = PdbError;

    fn read_from(reader: &mut impl BufRead) -> Result<(PDB, Self::Metadata), Self::Error> {
        let (pdb, warnings) = ReadOptions::new()
            .set_format(Format::Pdb)
            .set_level(StrictnessLevel::Loose)
            .read_raw(BufReader::new(reader))
            .map_err(|errors| PdbError::Parse(describe_errors(&errors)))?;
        for warning in &warnings {
            debug!("PDB parse warning: {}", warning);
        }
        Ok((pdb, ()))
    }
}

impl StructureWriter for PdbFile {
    type Error = PdbError;

    fn write_to(pdb: &PDB, writer: &mut impl Write) -> Result<(), Self::Error> {
        check_writable(pdb)?;
        let mut buffer = Vec::new();
        pdbtbx::save_pdb_raw(pdb, BufWriter::new(&mut buffer), StrictnessLevel::Loose);
        writer.write_all(&buffer)?;
        Ok(())
    }

    fn write_to_path<P: AsRef<Path>>(pdb: &PDB, path: P) -> Result<(), Self::Error> {
        check_writable(pdb)?;
        let path = path.as_ref();
        let name = path.to_str().ok_or_else(|| {
            PdbError::Write(format!("output path is not valid UTF-8: {}", path.display()))
        })?;
        pdbtbx::save_pdb(pdb, name, StrictnessLevel::Loose)
            .map_err(|errors| PdbError::Write(describe_errors(&errors)))
    }
}
