use crate::error::{CliError, Result};
use std::fs::File;
use std::path::PathBuf;
use tracing::Subscriber;
use tracing_subscriber::{Layer, filter::LevelFilter, fmt, prelude::*, registry::LookupSpan};

/// Console level for the `-v`/`-q` flags.
///
/// The conversion report is logged at INFO, so it shows without any flag;
/// `-q` keeps errors only.
fn console_level(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbosity {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// The log file always keeps the DEBUG details (defaulted atom counts,
/// parse warnings) even when the console is quieter.
fn file_level(console: LevelFilter) -> LevelFilter {
    console.max(LevelFilter::DEBUG)
}

fn file_layer<S>(file: File, level: LevelFilter) -> impl Layer<S>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_target(true)
        .with_filter(level)
}

pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<PathBuf>) -> Result<()> {
    let console = console_level(verbosity, quiet);
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .compact()
        .with_filter(console);

    let file_output = match log_file {
        Some(path) => Some(file_layer(
            File::create(&path).map_err(CliError::Io)?,
            file_level(console),
        )),
        None => None,
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_output)
        .try_init()
        .map_err(|e| CliError::Other(anyhow::anyhow!("Failed to install logger: {}", e)))
}
