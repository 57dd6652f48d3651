use super::confidence::{RemapOptions, RemapReport, remap_to_b_factor};
use super::config::ConvertConfig;
use super::error::WorkflowError;
use crate::core::io::cif::{CifFile, CifMetadata};
use crate::core::io::pdb::PdbFile;
use crate::core::io::traits::{StructureReader, StructureWriter};
use pdbtbx::PDB;
use std::io::{BufRead, Write};
use tracing::{info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionSummary {
    pub models: usize,
    pub chains: usize,
    pub residues: usize,
    pub atoms: usize,
    pub remap: RemapReport,
}

impl ConversionSummary {
    fn new(pdb: &PDB, remap: RemapReport) -> Self {
        Self {
            models: pdb.model_count(),
            chains: pdb.models().map(|model| model.chain_count()).sum(),
            residues: pdb.models().map(|model| model.residue_count()).sum(),
            atoms: pdb.models().map(|model| model.atom_count()).sum(),
            remap,
        }
    }
}

fn remap(pdb: &mut PDB, metadata: &CifMetadata, options: &RemapOptions) -> ConversionSummary {
    info!(
        "Read {} model(s) from data block '{}'.",
        pdb.model_count(),
        metadata.block_name
    );
    let report = remap_to_b_factor(pdb, metadata, options);
    ConversionSummary::new(pdb, report)
}

/// Converts an mmCIF stream into a PDB stream, moving plDDT into the B-factor column.
pub fn convert(
    input: &mut impl BufRead,
    output: &mut impl Write,
    options: &RemapOptions,
) -> Result<ConversionSummary, WorkflowError> {
    let (mut pdb, metadata) = CifFile::read_from(input)?;
    let summary = remap(&mut pdb, &metadata, options);
    PdbFile::write_to(&pdb, output)?;
    Ok(summary)
}

/// Converts the mmCIF file at `config.input_path` into a PDB file at `config.output_path`.
///
/// The output file is only created once the input has been parsed successfully.
#[instrument(skip_all, name = "convert_workflow", fields(input = %config.input_path.display()))]
pub fn run(config: &ConvertConfig) -> Result<ConversionSummary, WorkflowError> {
    info!("Reading mmCIF structure.");
    let (mut pdb, metadata) = CifFile::read_from_path(&config.input_path)?;
    let summary = remap(&mut pdb, &metadata, &config.remap);

    info!(output = %config.output_path.display(), "Writing PDB structure.");
    PdbFile::write_to_path(&pdb, &config.output_path)?;

    info!(
        models = summary.models,
        chains = summary.chains,
        atoms = summary.atoms,
        "Conversion complete."
    );
    Ok(summary)
}
