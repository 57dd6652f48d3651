//! Reading macromolecular structures from mmCIF (PDBx/mmCIF, ModelCIF) files.
//!
//! The structure hierarchy itself is parsed by `pdbtbx`. The confidence data
//! it does not expose (the raw `B_iso_or_equiv` text, label identifiers and
//! the ModelCIF `_ma_qa_metric_local` table) is read separately: [`lexer`]
//! splits the text into CIF tokens and [`document`] groups them into data
//! blocks and category tables.

pub mod document;
mod lexer;
pub mod reader;

use std::io;
use thiserror::Error;

pub use document::{CifBlock, CifDocument, CifTable, CifValue};
pub use reader::{AtomSiteConfidence, CifFile, CifMetadata};

#[derive(Debug, Error)]
pub enum CifError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Syntax error on line {line}: {kind}")]
    Syntax {
        line: usize,
        kind: CifSyntaxErrorKind,
    },
    #[error("Failed to parse mmCIF structure: {0}")]
    Structure(String),
    #[error("Missing required record: {0}")]
    MissingRecord(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CifSyntaxErrorKind {
    #[error("Unterminated quoted value")]
    UnterminatedQuote,
    #[error("Unterminated semicolon text field")]
    UnterminatedTextField,
    #[error("Unterminated save frame '{0}'")]
    UnterminatedSaveFrame(String),
    #[error("Value without a preceding tag")]
    ValueWithoutTag,
    #[error("Tag '{0}' has no value")]
    MissingValue(String),
    #[error("Tag '{0}' appears before any data block")]
    OutsideDataBlock(String),
    #[error("Loop has no tags")]
    EmptyLoop,
    #[error("Loop mixes categories '{expected}' and '{found}'")]
    MixedLoopCategories { expected: String, found: String },
    #[error("Loop with {tags} tags has {values} values, not a multiple of the tag count")]
    LoopValueCount { tags: usize, values: usize },
    #[error("Category '{0}' is defined more than once")]
    DuplicateCategory(String),
    #[error("Item '{0}' is defined more than once")]
    DuplicateItem(String),
    #[error("Unsupported CIF construct '{0}'")]
    Unsupported(String),
}
