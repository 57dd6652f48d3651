mod cli;
mod commands;
mod config;
mod error;
mod logging;

use crate::cli::Cli;
use crate::error::{CliError, Result};
use clap::Parser;
use tracing::{debug, error, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.clone())?;

    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default().into_hooks();
    eyre_hook.install().map_err(|e| CliError::Other(e.into()))?;
    std::panic::set_hook(Box::new(move |pi| {
        error!("{}", panic_hook.panic_report(pi));
    }));

    debug!("cif2pdb v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    match commands::convert::run(&cli.convert) {
        Ok(summary) => {
            info!(
                "✅ Wrote {} atom(s) in {} model(s).",
                summary.atoms, summary.models
            );
            Ok(())
        }
        Err(e) => {
            error!("❌ Conversion failed: {}", e);
            Err(e)
        }
    }
}
