use flexihist::config::{HistogramConfiguration, PolicyKind};
use flexihist::policy::{DoublePairSum, DoubleSum, IntPairSum, IntSum, LongSum, MeanVarianceAggregate};
use flexihist::{AdaptiveHistogram, BinEntry, ConfigurationError, HistogramError, ResamplePolicy};

/// A row of the histogram report.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportRow {
    /// Lower bound of the bin.
    pub min: f64,

    /// Center of the bin.
    pub center: f64,

    /// Upper bound of the bin.
    pub max: f64,

    /// Rendered value of the bin.
    pub value: String,
}

/// An adaptive histogram with one of the built-in policies, chosen at runtime.
pub enum ConfiguredHistogram {
    IntSum(AdaptiveHistogram<IntSum>),
    LongSum(AdaptiveHistogram<LongSum>),
    DoubleSum(AdaptiveHistogram<DoubleSum>),
    MeanVariance(AdaptiveHistogram<MeanVarianceAggregate>),
    IntPairSum(AdaptiveHistogram<IntPairSum>),
    DoublePairSum(AdaptiveHistogram<DoublePairSum>),
}

impl ConfiguredHistogram {
    /// Builds the histogram described by `config`.
    ///
    /// # Errors
    ///
    /// If the configuration is invalid, an error is returned.
    pub fn from_configuration(config: &HistogramConfiguration) -> Result<Self, ConfigurationError> {
        Ok(match config.policy {
            PolicyKind::IntSum => Self::IntSum(config.build_adaptive(IntSum)?),
            PolicyKind::LongSum => Self::LongSum(config.build_adaptive(LongSum)?),
            PolicyKind::DoubleSum => Self::DoubleSum(config.build_adaptive(DoubleSum)?),
            PolicyKind::MeanVariance => Self::MeanVariance(config.build_adaptive(MeanVarianceAggregate)?),
            PolicyKind::IntPairSum => Self::IntPairSum(config.build_adaptive(IntPairSum)?),
            PolicyKind::DoublePairSum => Self::DoublePairSum(config.build_adaptive(DoublePairSum)?),
        })
    }

    /// Inserts an observation.
    ///
    /// Missing values default to `1`. Integer policies truncate values, saturating at the bounds of their integer type.
    ///
    /// # Errors
    ///
    /// If `coord` is NaN or infinite, an error is returned.
    pub fn insert(&self, coord: f64, values: &[f64]) -> Result<(), HistogramError> {
        let first = values.first().copied().unwrap_or(1.0);
        let second = values.get(1).copied().unwrap_or(1.0);

        match self {
            Self::IntSum(histogram) => histogram.aggregate(coord, first as i32),
            Self::LongSum(histogram) => histogram.aggregate(coord, first as i64),
            Self::DoubleSum(histogram) => histogram.aggregate(coord, first),
            Self::MeanVariance(histogram) => histogram.aggregate(coord, first),
            Self::IntPairSum(histogram) => histogram.aggregate(coord, (first as i32, second as i32)),
            Self::DoublePairSum(histogram) => histogram.aggregate(coord, (first, second)),
        }
    }

    /// Returns the current number of bins.
    pub fn num_bins(&self) -> usize {
        match self {
            Self::IntSum(histogram) => histogram.num_bins(),
            Self::LongSum(histogram) => histogram.num_bins(),
            Self::DoubleSum(histogram) => histogram.num_bins(),
            Self::MeanVariance(histogram) => histogram.num_bins(),
            Self::IntPairSum(histogram) => histogram.num_bins(),
            Self::DoublePairSum(histogram) => histogram.num_bins(),
        }
    }

    /// Returns one report row per bin, from left to right.
    pub fn report(&self) -> Vec<ReportRow> {
        match self {
            Self::IntSum(histogram) => rows(histogram, |value| value.to_string()),
            Self::LongSum(histogram) => rows(histogram, |value| value.to_string()),
            Self::DoubleSum(histogram) => rows(histogram, |value| value.to_string()),
            Self::MeanVariance(histogram) => rows(histogram, |value| value.to_string()),
            Self::IntPairSum(histogram) => rows(histogram, |(a, b)| format!("{} {}", a, b)),
            Self::DoublePairSum(histogram) => rows(histogram, |(a, b)| format!("{} {}", a, b)),
        }
    }
}

fn rows<P, F>(histogram: &AdaptiveHistogram<P>, render: F) -> Vec<ReportRow>
where
    P: ResamplePolicy + Clone,
    F: Fn(&P::Bin) -> String,
{
    let mut rows = Vec::with_capacity(histogram.target_bins() * 2);
    histogram.for_each_bin(|bin: BinEntry<&P::Bin>| {
        rows.push(ReportRow {
            min: bin.min,
            center: bin.center,
            max: bin.max,
            value: render(bin.value),
        })
    });
    rows
}
