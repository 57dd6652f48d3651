use pdbtbx::PDB;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for parsing a structure file format.
///
/// Implementors hand back the parsed structure together with whatever
/// format-specific data `pdbtbx` does not carry.
pub trait StructureReader {
    /// The type of metadata associated with the file format.
    type Metadata;

    /// The error type for read operations.
    type Error: Error + From<io::Error>;

    /// Reads a structure from a buffered reader.
    ///
    /// # Arguments
    ///
    /// * `reader` - The buffered reader to read from.
    ///
    /// # Return
    ///
    /// Returns the parsed structure and associated metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or I/O operations encounter issues.
    fn read_from(reader: &mut impl BufRead) -> Result<(PDB, Self::Metadata), Self::Error>;

    /// Reads a structure from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<(PDB, Self::Metadata), Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }
}

/// Defines the interface for serializing a structure into a file format.
pub trait StructureWriter {
    /// The error type for write operations.
    type Error: Error + From<io::Error>;

    /// Writes a structure to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if a value does not fit the format or writing fails.
    fn write_to(pdb: &PDB, writer: &mut impl Write) -> Result<(), Self::Error>;

    /// Writes a structure to a file path, creating or truncating the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(pdb: &PDB, path: P) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(pdb, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
