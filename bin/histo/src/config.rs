use std::path::PathBuf;

use anyhow::Context as _;
use clap::{ArgAction, Parser};
use figment::{
    providers::{Env, Format as _, Serialized, Yaml},
    Figment,
};
use flexihist::config::{HistogramConfiguration, PolicyKind, RangeConfiguration};
use tracing::level_filters::LevelFilter;

const ENV_PREFIX: &str = "HISTO_";

#[derive(Parser)]
#[command(about)]
pub struct Cli {
    /// Enable verbose output. (Specify twice for more verbosity.)
    #[arg(short = 'v', long, action = ArgAction::Count, default_value_t = 0)]
    verbose: u8,

    /// Path to a YAML configuration file.
    ///
    /// Settings from the file are overridden by `HISTO_`-prefixed environment variables (`HISTO_BINS`,
    /// `HISTO_POLICY`, `HISTO_RANGE__MIN`, ...), which are in turn overridden by command line arguments.
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Target number of bins.
    #[arg(short = 'b', long)]
    pub bins: Option<usize>,

    /// Bin policy.
    #[arg(short = 'p', long, value_parser = parse_policy)]
    pub policy: Option<PolicyKind>,

    /// Lower bound of the initial range. Must be given together with `--max`.
    #[arg(long, requires = "max", allow_negative_numbers = true)]
    pub min: Option<f64>,

    /// Upper bound of the initial range. Must be given together with `--min`.
    #[arg(long, requires = "min", allow_negative_numbers = true)]
    pub max: Option<f64>,

    /// Path to the input file. Reads from standard input when not given.
    ///
    /// Each line holds a coordinate, optionally followed by one or two values, separated by whitespace. Empty lines
    /// and lines starting with `#` are ignored.
    pub input: Option<PathBuf>,
}

impl Cli {
    /// Gets the configured log level based on the user-supplied verbosity level.
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::INFO,
            1 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }

    /// Loads the histogram configuration.
    ///
    /// # Errors
    ///
    /// If the configuration file cannot be read or parsed, or the resulting configuration is invalid, an error is
    /// returned.
    pub fn load_configuration(&self) -> anyhow::Result<HistogramConfiguration> {
        let mut figment = Figment::from(Serialized::defaults(HistogramConfiguration::with_defaults()));
        if let Some(path) = &self.config {
            anyhow::ensure!(path.exists(), "Configuration file '{}' does not exist.", path.display());
            figment = figment.merge(Yaml::file(path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        self.resolve(figment)
    }

    fn resolve(&self, figment: Figment) -> anyhow::Result<HistogramConfiguration> {
        let mut config: HistogramConfiguration = figment
            .extract()
            .context("Failed to load histogram configuration.")?;

        if let Some(bins) = self.bins {
            config.bins = bins;
        }
        if let Some(policy) = self.policy {
            config.policy = policy;
        }
        if let (Some(min), Some(max)) = (self.min, self.max) {
            config.range = Some(RangeConfiguration { min, max });
        }

        config.validate().context("Invalid histogram configuration.")?;
        Ok(config)
    }
}

fn parse_policy(value: &str) -> Result<PolicyKind, String> {
    PolicyKind::ALL
        .into_iter()
        .find(|kind| kind.as_str() == value)
        .ok_or_else(|| {
            let names = PolicyKind::ALL.map(|kind| kind.as_str());
            format!("unknown policy '{}' (expected one of: {})", value, names.join(", "))
        })
}
