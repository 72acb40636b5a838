//! Cpk report binary
//!
//! Loads a TOML config, runs the report and writes it as JSON into the
//! configured output directory.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use cpk_core::{Config, OutputFormat, Reporter, Runner};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Pretty,
    Console,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => OutputFormat::Json,
            Format::Pretty => OutputFormat::JsonPretty,
            Format::Console => OutputFormat::Console,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "cpk")]
#[command(version, about = "Process capability reports from hardware test logs")]
struct Args {
    /// TOML configuration file
    config: PathBuf,

    /// Report format
    #[arg(short, long, value_enum, default_value = "pretty")]
    format: Format,

    /// Print the report to stdout instead of writing it to the output directory
    #[arg(long)]
    stdout: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_file(&args.config)?;
    tracing::info!(
        config = %args.config.display(),
        groups = config.groups.len(),
        "Loaded configuration"
    );

    let report = Runner::run(&config).context("Report run failed")?;
    let reporter = Reporter::new(args.format.into());

    if args.stdout {
        reporter.report(&report)?;
        return Ok(());
    }

    // The file is always JSON; console only changes what is echoed.
    let file_format = match args.format {
        Format::Json => OutputFormat::Json,
        Format::Pretty | Format::Console => OutputFormat::JsonPretty,
    };
    let path = Reporter::new(file_format).write_to_dir(&report, config.report.output_dir())?;
    tracing::info!(path = %path.display(), "Report written");

    Reporter::new(OutputFormat::Console).report(&report)?;
    Ok(())
}
