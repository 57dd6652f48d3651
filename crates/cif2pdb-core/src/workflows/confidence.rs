use crate::core::io::cif::CifMetadata;
use pdbtbx::PDB;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

/// Where the confidence value of an atom is taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfidenceSource {
    /// The atom's own `B_iso_or_equiv`, where structure predictors store plDDT.
    #[default]
    AtomSite,
    /// The per-residue `_ma_qa_metric_local` plDDT of the atom's residue.
    QaMetricLocal,
}

impl ConfidenceSource {
    fn as_str(self) -> &'static str {
        match self {
            ConfidenceSource::AtomSite => "atom-site",
            ConfidenceSource::QaMetricLocal => "qa-metric-local",
        }
    }
}

impl fmt::Display for ConfidenceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid confidence source: '{0}' (expected 'atom-site' or 'qa-metric-local')")]
pub struct ParseConfidenceSourceError(String);

impl FromStr for ConfidenceSource {
    type Err = ParseConfidenceSourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "atom-site" => Ok(ConfidenceSource::AtomSite),
            "qa-metric-local" => Ok(ConfidenceSource::QaMetricLocal),
            _ => Err(ParseConfidenceSourceError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemapOptions {
    pub source: ConfidenceSource,
    /// B-factor written for atoms without a confidence value.
    pub default_confidence: f64,
}

impl Default for RemapOptions {
    fn default() -> Self {
        Self {
            source: ConfidenceSource::AtomSite,
            default_confidence: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RemapReport {
    pub atoms: usize,
    pub assigned: usize,
    pub defaulted: usize,
}

fn confidence_of(
    metadata: &CifMetadata,
    model: usize,
    serial: usize,
    source: ConfidenceSource,
) -> Option<f64> {
    let site = metadata.atom_site(model, serial)?;
    let value = match source {
        ConfidenceSource::AtomSite => site.b_iso,
        ConfidenceSource::QaMetricLocal => site
            .label_asym_id
            .as_deref()
            .zip(site.label_seq_id)
            .and_then(|(asym_id, seq_id)| metadata.residue_confidence(model, asym_id, seq_id)),
    };
    value.filter(|v| v.is_finite())
}

/// Writes each atom's confidence into its B-factor.
///
/// Atoms are matched to their `_atom_site` row by model number and serial.
/// Every atom ends up with its confidence value when one is available from
/// `options.source`, otherwise with `options.default_confidence`.
pub fn remap_to_b_factor(
    pdb: &mut PDB,
    metadata: &CifMetadata,
    options: &RemapOptions,
) -> RemapReport {
    if options.source == ConfidenceSource::QaMetricLocal && metadata.local_confidence.is_empty() {
        warn!(
            "No per-residue plDDT values found in _ma_qa_metric_local; every atom will get the default B-factor of {:.2}.",
            options.default_confidence
        );
    }

    let mut report = RemapReport::default();
    for model in pdb.models_mut() {
        let model_number = model.serial_number();
        for atom in model.atoms_mut() {
            report.atoms += 1;
            let confidence =
                confidence_of(metadata, model_number, atom.serial_number(), options.source);
            let value = match confidence {
                Some(value) => {
                    report.assigned += 1;
                    value
                }
                None => {
                    report.defaulted += 1;
                    trace!(
                        "Atom '{}' (serial {}, model {}) has no confidence value; using the default.",
                        atom.name(),
                        atom.serial_number(),
                        model_number
                    );
                    options.default_confidence
                }
            };
            // Both sources and the validated default are finite.
            let _ = atom.set_b_factor(value);
        }
    }

    info!(
        atoms = report.atoms,
        assigned = report.assigned,
        source = %options.source,
        "Mapped plDDT confidence to B-factor."
    );
    if report.defaulted > 0 {
        debug!(
            "{} atom(s) had no confidence value and received the default B-factor {:.2}.",
            report.defaulted, options.default_confidence
        );
    }
    report
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::cif::CifFile;
    use crate::core::io::traits::StructureReader;
    use std::io::Cursor;

    const ATOM_SITE_HEADER: &str = "\
loop_
_atom_site.group_PDB
_atom_site.id
_atom_site.type_symbol
_atom_site.label_atom_id
_atom_site.label_alt_id
_atom_site.label_comp_id
_atom_site.label_asym_id
_atom_site.label_entity_id
_atom_site.label_seq_id
_atom_site.pdbx_PDB_ins_code
_atom_site.Cartn_x
_atom_site.Cartn_y
_atom_site.Cartn_z
_atom_site.occupancy
_atom_site.B_iso_or_equiv
_atom_site.pdbx_formal_charge
_atom_site.auth_seq_id
_atom_site.auth_asym_id
_atom_site.pdbx_PDB_model_num
";

    const ATOMS: &str = "\
ATOM   1 N N  . MET A 1 1 ? 0.000 0.000 0.000 1.00 91.25 ? 1 A 1
ATOM   2 C CA . MET A 1 1 ? 1.000 0.000 0.000 1.00 ?     ? 1 A 1
ATOM   3 C CA . GLY A 1 2 ? 2.000 0.000 0.000 1.00 ?     ? 2 A 1
HETATM 4 O O  . HOH B 2 . ? 3.000 0.000 0.000 1.00 .     ? 9 B 1
#
loop_
_ma_qa_metric_local.label_asym_id
_ma_qa_metric_local.label_seq_id
_ma_qa_metric_local.metric_value
A 1 70.5
#
";

    const TWO_MODELS: &str = "\
ATOM 1 N N . MET A 1 1 ? 0.000 0.000 0.000 1.00 55.00 ? 1 A 1
ATOM 2 N N . MET A 1 1 ? 0.500 0.000 0.000 1.00 56.00 ? 1 A 2
#
loop_
_ma_qa_metric_local.ordinal_id
_ma_qa_metric_local.model_id
_ma_qa_metric_local.label_asym_id
_ma_qa_metric_local.label_seq_id
_ma_qa_metric_local.metric_value
1 1 A 1 90.0
2 2 A 1 20.0
#
";

    fn load(rows: &str) -> (PDB, CifMetadata) {
        let input = format!("data_remap\n{}{}", ATOM_SITE_HEADER, rows);
        CifFile::read_from(&mut Cursor::new(input)).unwrap()
    }

    fn b_factors(pdb: &PDB) -> Vec<f64> {
        pdb.models()
            .flat_map(|model| model.atoms())
            .map(|atom| atom.b_factor())
            .collect()
    }

    fn first_atom_per_model(pdb: &PDB) -> Vec<(usize, f64)> {
        pdb.models()
            .filter_map(|model| {
                let atom = model.atoms().next()?;
                Some((model.serial_number(), atom.b_factor()))
            })
            .collect()
    }

    #[test]
    fn atom_site_confidence_is_kept_and_missing_values_default_to_zero() {
        let (mut pdb, metadata) = load(ATOMS);
        let report = remap_to_b_factor(&mut pdb, &metadata, &RemapOptions::default());

        assert_eq!(b_factors(&pdb), vec![91.25, 0.0, 0.0, 0.0]);
        assert_eq!(
            report,
            RemapReport {
                atoms: 4,
                assigned: 1,
                defaulted: 3
            }
        );
    }

    #[test]
    fn configured_default_is_used_for_missing_values() {
        let (mut pdb, metadata) = load(ATOMS);
        let options = RemapOptions {
            default_confidence: 50.0,
            ..RemapOptions::default()
        };
        remap_to_b_factor(&mut pdb, &metadata, &options);
        assert_eq!(b_factors(&pdb), vec![91.25, 50.0, 50.0, 50.0]);
    }

    #[test]
    fn qa_metric_local_source_uses_residue_confidence() {
        let (mut pdb, metadata) = load(ATOMS);
        let options = RemapOptions {
            source: ConfidenceSource::QaMetricLocal,
            default_confidence: 0.0,
        };
        let report = remap_to_b_factor(&mut pdb, &metadata, &options);

        assert_eq!(b_factors(&pdb), vec![70.5, 70.5, 0.0, 0.0]);
        assert_eq!(report.assigned, 2);
        assert_eq!(report.defaulted, 2);
    }

    #[test]
    fn qa_metric_local_without_table_defaults_everything() {
        let (mut pdb, _) = load(ATOMS);
        let options = RemapOptions {
            source: ConfidenceSource::QaMetricLocal,
            default_confidence: 1.0,
        };
        let report = remap_to_b_factor(&mut pdb, &CifMetadata::default(), &options);
        assert_eq!(report.defaulted, 4);
        assert!(b_factors(&pdb).iter().all(|b| *b == 1.0));
    }

    #[test]
    fn residue_confidence_follows_the_model_of_each_atom() {
        let (mut pdb, metadata) = load(TWO_MODELS);
        let options = RemapOptions {
            source: ConfidenceSource::QaMetricLocal,
            default_confidence: 0.0,
        };
        let report = remap_to_b_factor(&mut pdb, &metadata, &options);

        assert_eq!(first_atom_per_model(&pdb), vec![(1, 90.0), (2, 20.0)]);
        assert_eq!(report.assigned, 2);
    }

    #[test]
    fn atom_site_confidence_follows_the_model_of_each_atom() {
        let (mut pdb, metadata) = load(TWO_MODELS);
        remap_to_b_factor(&mut pdb, &metadata, &RemapOptions::default());
        assert_eq!(first_atom_per_model(&pdb), vec![(1, 55.0), (2, 56.0)]);
    }

    #[test]
    fn confidence_source_parses_and_displays() {
        assert_eq!(
            "atom-site".parse::<ConfidenceSource>(),
            Ok(ConfidenceSource::AtomSite)
        );
        assert_eq!(
            "QA_METRIC_LOCAL".parse::<ConfidenceSource>(),
            Ok(ConfidenceSource::QaMetricLocal)
        );
        assert!("bfactor".parse::<ConfidenceSource>().is_err());
        assert_eq!(ConfidenceSource::QaMetricLocal.to_string(), "qa-metric-local");
        assert_eq!(ConfidenceSource::default(), ConfidenceSource::AtomSite);
    }
}
