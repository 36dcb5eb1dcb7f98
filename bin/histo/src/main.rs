//! Summarizes a stream of `coordinate [value [value]]` observations into an adaptive histogram, and prints its bins.

#![deny(warnings)]
#![deny(missing_docs)]

use std::{
    fs::File,
    io::{self, BufRead, BufReader, Write as _},
};

use anyhow::Context as _;
use clap::Parser as _;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
use self::config::Cli;

mod histogram;
use self::histogram::{ConfiguredHistogram, ReportRow};

mod input;

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(cli.log_level().into())
                .from_env_lossy(),
        )
        .with_writer(io::stderr)
        .with_ansi(true)
        .with_target(true)
        .init();

    if let Err(e) = run(cli) {
        error!("{:?}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.load_configuration()?;
    info!(
        bins = config.bins,
        policy = config.policy.as_str(),
        range = ?config.range,
        "Loaded histogram configuration."
    );

    let histogram = ConfiguredHistogram::from_configuration(&config)?;

    let reader: Box<dyn BufRead> = match &cli.input {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("Failed to open input file '{}'.", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(io::stdin().lock()),
    };

    let mut rejected = 0usize;
    let observations = input::for_each_observation(reader, |observation| {
        if let Err(e) = histogram.insert(observation.coord, &observation.values) {
            warn!(error = %e, "Skipping observation.");
            rejected += 1;
        }
        Ok(())
    })?;

    debug!(observations, rejected, bins = histogram.num_bins(), "Finished reading input.");

    print_report(&histogram.report()).context("Failed to write report.")
}

fn print_report(rows: &[ReportRow]) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "# min\tcenter\tmax\tvalue")?;
    for row in rows {
        writeln!(out, "{}\t{}\t{}\t{}", row.min, row.center, row.max, row.value)?;
    }
    out.flush()
}
