use crate::cli::ConvertArgs;
use crate::config::PartialConvertConfig;
use crate::error::Result;
use cif2pdb::workflows::{self, convert::ConversionSummary};
use tracing::{debug, info, warn};

pub fn run(args: &ConvertArgs) -> Result<ConversionSummary> {
    let partial_config = match &args.config {
        Some(path) => PartialConvertConfig::from_file(path)?,
        None => PartialConvertConfig::default(),
    };
    debug!("Merging configuration from file and CLI arguments...");
    let config = partial_config.merge_with_cli(args)?;

    info!(
        "Converting {:?} to {:?} (confidence source: {}).",
        &config.input_path, &config.output_path, config.remap.source
    );
    let summary = workflows::convert::run(&config)?;

    if summary.remap.assigned == 0 {
        warn!(
            "No atom carried a confidence value; every B-factor was set to {:.2}.",
            config.remap.default_confidence
        );
    }

    println!(
        "Converted {} to {} with pLDDT mapped to B-factor.",
        config.input_path.display(),
        config.output_path.display()
    );
    Ok(summary)
}
