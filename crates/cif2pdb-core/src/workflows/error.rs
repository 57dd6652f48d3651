use super::config::ConfigError;
use crate::core::io::cif::CifError;
use crate::core::io::pdb::PdbError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Failed to read mmCIF input: {source}")]
    Cif {
        #[from]
        source: CifError,
    },

    #[error("Failed to write PDB output: {source}")]
    Pdb {
        #[from]
        source: PdbError,
    },

    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },
}
