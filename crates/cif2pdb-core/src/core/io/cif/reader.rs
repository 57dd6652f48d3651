use super::CifError;
use super::document::{self, CifBlock, CifValue};
use crate::core::io::describe_errors;
use crate::core::io::traits::StructureReader;
use pdbtbx::{Format, PDB, ReadOptions, StrictnessLevel};
use std::collections::{HashMap, HashSet};
use std::io::{BufRead, BufReader};
use std::str::FromStr;
use tracing::{debug, warn};

const PLDDT_METRIC_TYPE: &str = "pLDDT";

/// Model number of a row, or `None` when the file does not number its models.
type ModelKey = Option<usize>;

/// The confidence-related `_atom_site` values of one atom.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AtomSiteConfidence {
    /// `B_iso_or_equiv`, or `None` when it is absent, `?`, `.`, non-numeric or non-finite.
    pub b_iso: Option<f64>,
    pub label_asym_id: Option<String>,
    pub label_seq_id: Option<isize>,
}

/// Data from an mmCIF file that `pdbtbx` does not carry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CifMetadata {
    /// The name of the data block the structure was read from.
    pub block_name: String,
    /// Per-atom values keyed by `(pdbx_PDB_model_num, id)`.
    pub atom_sites: HashMap<(ModelKey, usize), AtomSiteConfidence>,
    /// Per-residue local confidence from `_ma_qa_metric_local`,
    /// keyed by `(model_id, label_asym_id, label_seq_id)`.
    pub local_confidence: HashMap<(ModelKey, String, isize), f64>,
}

impl CifMetadata {
    /// Looks up an atom by model number and serial.
    ///
    /// Rows without a model number match every model.
    pub fn atom_site(&self, model: usize, serial: usize) -> Option<&AtomSiteConfidence> {
        self.atom_sites
            .get(&(Some(model), serial))
            .or_else(|| self.atom_sites.get(&(None, serial)))
    }

    /// Looks up the plDDT of a residue in a given model.
    ///
    /// Rows without a `model_id` match every model.
    pub fn residue_confidence(
        &self,
        model: usize,
        label_asym_id: &str,
        label_seq_id: isize,
    ) -> Option<f64> {
        let key = |model: ModelKey| (model, label_asym_id.to_string(), label_seq_id);
        self.local_confidence
            .get(&key(Some(model)))
            .or_else(|| self.local_confidence.get(&key(None)))
            .copied()
    }
}

pub struct CifFile;

fn text_at(row: &[CifValue], column: Option<usize>) -> Option<&str> {
    column.and_then(|c| row.get(c)).and_then(CifValue::as_str)
}

/// Parses a value leniently: anything absent or unreadable is `None`.
fn parse_at<T: FromStr>(row: &[CifValue], column: Option<usize>) -> Option<T> {
    text_at(row, column)?.parse().ok()
}

fn read_atom_sites(block: &CifBlock) -> HashMap<(ModelKey, usize), AtomSiteConfidence> {
    let mut sites = HashMap::new();
    let Some(table) = block.table("atom_site") else {
        return sites;
    };
    let Some(id) = table.item_index("id") else {
        warn!("_atom_site has no id item; per-atom confidence cannot be matched to atoms.");
        return sites;
    };
    let model = table.item_index("pdbx_pdb_model_num");
    let b_iso = table.item_index("b_iso_or_equiv");
    let label_asym = table.item_index("label_asym_id");
    let label_seq = table.item_index("label_seq_id");

    for row in table.rows() {
        let Some(serial) = parse_at::<usize>(row, Some(id)) else {
            continue;
        };
        let site = AtomSiteConfidence {
            b_iso: parse_at::<f64>(row, b_iso).filter(|v| v.is_finite()),
            label_asym_id: text_at(row, label_asym).map(str::to_string),
            label_seq_id: parse_at(row, label_seq),
        };
        if sites.insert((parse_at(row, model), serial), site).is_some() {
            warn!("Duplicate _atom_site id {}; keeping the last row.", serial);
        }
    }
    sites
}

/// Collects per-residue pLDDT values from the ModelCIF quality-assessment tables.
fn read_local_confidence(block: &CifBlock) -> HashMap<(ModelKey, String, isize), f64> {
    let mut confidence = HashMap::new();
    let Some(local) = block.table("ma_qa_metric_local") else {
        return confidence;
    };
    let (Some(asym), Some(seq), Some(value)) = (
        local.item_index("label_asym_id"),
        local.item_index("label_seq_id"),
        local.item_index("metric_value"),
    ) else {
        warn!("_ma_qa_metric_local lacks label_asym_id, label_seq_id, or metric_value; ignoring it.");
        return confidence;
    };
    let metric_id = local.item_index("metric_id");
    let model_id = local.item_index("model_id");

    let plddt_metric_ids: Option<HashSet<&str>> = block.table("ma_qa_metric").and_then(|metrics| {
        let id = metrics.item_index("id")?;
        let kind = metrics.item_index("type")?;
        Some(
            metrics
                .rows()
                .filter(|row| {
                    text_at(row, Some(kind))
                        .is_some_and(|t| t.eq_ignore_ascii_case(PLDDT_METRIC_TYPE))
                })
                .filter_map(|row| text_at(row, Some(id)))
                .collect(),
        )
    });

    for row in local.rows() {
        if let (Some(ids), Some(metric_column)) = (&plddt_metric_ids, metric_id) {
            if !text_at(row, Some(metric_column)).is_some_and(|m| ids.contains(m)) {
                continue;
            }
        }
        let asym_id = text_at(row, Some(asym));
        let seq_id = parse_at::<isize>(row, Some(seq));
        let metric = parse_at::<f64>(row, Some(value));
        if let (Some(asym_id), Some(seq_id), Some(metric)) = (asym_id, seq_id, metric) {
            confidence.insert((parse_at(row, model_id), asym_id.to_string(), seq_id), metric);
        }
    }

    debug!(
        "Read {} per-residue confidence values from _ma_qa_metric_local.",
        confidence.len()
    );
    confidence
}

fn read_metadata(block: &CifBlock) -> CifMetadata {
    CifMetadata {
        block_name: block.name().to_string(),
        atom_sites: read_atom_sites(block),
        local_confidence: read_local_confidence(block),
    }
}

impl StructureReader for CifFile {
    type Metadata = CifMetadata;
    type Error = CifError;

    fn read_from(reader: &mut impl BufRead) -> Result<(PDB, Self::Metadata), Self::Error> {
        let mut input = String::new();
        reader.read_to_string(&mut input)?;

        // pdbtbx reads the first data block, so the metadata comes from the same one.
        let document = document::parse(&input)?;
        let block = document
            .blocks()
            .first()
            .filter(|block| block.table("atom_site").is_some())
            .ok_or_else(|| CifError::MissingRecord("_atom_site category".into()))?;
        let metadata = read_metadata(block);

        let (pdb, warnings) = ReadOptions::new()
            .set_format(Format::Mmcif)
            .set_level(StrictnessLevel::Loose)
            .read_raw(BufReader::new(input.as_bytes()))
            .map_err(|errors| CifError::Structure(describe_errors(&errors)))?;
        for warning in &warnings {
            debug!("mmCIF parse warning: {}", warning);
        }

        let atoms: usize = pdb.models().map(|model| model.atom_count()).sum();
        if atoms == 0 {
            return Err(CifError::MissingRecord("_atom_site rows".into()));
        }
        debug!(
            "Parsed data block '{}': {} model(s), {} atom(s).",
            metadata.block_name,
            pdb.model_count(),
            atoms
        );
        Ok((pdb, metadata))
    }
}
