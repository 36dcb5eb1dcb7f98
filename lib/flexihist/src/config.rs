//! Histogram configuration.

use serde::{Deserialize, Serialize};
use snafu::ensure;

use crate::adaptive::AdaptiveHistogram;
use crate::aggregator::AggregatingHistogram;
use crate::binner::bin_width;
use crate::error::{ConfigurationError, InvalidRange, PolicyMismatch, ZeroBins};
use crate::policy::{AggregatePolicy, BinPolicy, ResamplePolicy};

const fn default_bins() -> usize {
    50
}

/// The bin policy to use.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Sums `i32` values. See [`IntSum`](crate::policy::IntSum).
    IntSum,

    /// Sums `i64` values. See [`LongSum`](crate::policy::LongSum).
    LongSum,

    /// Sums `f64` values. See [`DoubleSum`](crate::policy::DoubleSum).
    #[default]
    DoubleSum,

    /// Tracks the mean and variance of `f64` values. See [`MeanVarianceAggregate`](crate::policy::MeanVarianceAggregate).
    MeanVariance,

    /// Sums pairs of `i32` values. See [`IntPairSum`](crate::policy::IntPairSum).
    IntPairSum,

    /// Sums pairs of `f64` values. See [`DoublePairSum`](crate::policy::DoublePairSum).
    DoublePairSum,
}

impl PolicyKind {
    /// All policy kinds.
    pub const ALL: [PolicyKind; 6] = [
        Self::IntSum,
        Self::LongSum,
        Self::DoubleSum,
        Self::MeanVariance,
        Self::IntPairSum,
        Self::DoublePairSum,
    ];

    /// Returns the name of the policy, as used in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IntSum => "int_sum",
            Self::LongSum => "long_sum",
            Self::DoubleSum => "double_sum",
            Self::MeanVariance => "mean_variance",
            Self::IntPairSum => "int_pair_sum",
            Self::DoublePairSum => "double_pair_sum",
        }
    }

    /// Returns the number of values each observation carries.
    pub fn arity(&self) -> usize {
        match self {
            Self::IntPairSum | Self::DoublePairSum => 2,
            _ => 1,
        }
    }
}

/// An initial covering range.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct RangeConfiguration {
    /// Lower bound of the range.
    pub min: f64,

    /// Upper bound of the range.
    pub max: f64,
}

/// Histogram configuration.
///
/// ## Example
///
/// ```yaml
/// bins: 20
/// policy: mean_variance
/// range:
///   min: 0.0
///   max: 250.0
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct HistogramConfiguration {
    /// Number of bins.
    ///
    /// For adaptive histograms, this is the target number of bins: the actual number of bins stays between this value
    /// and twice this value.
    ///
    /// Defaults to 50.
    #[serde(default = "default_bins")]
    pub bins: usize,

    /// Bin policy.
    ///
    /// Defaults to `double_sum`.
    #[serde(default)]
    pub policy: PolicyKind,

    /// Initial covering range.
    ///
    /// When not set, adaptive histograms choose their range from the first samples they see.
    ///
    /// Defaults to unset.
    #[serde(default)]
    pub range: Option<RangeConfiguration>,
}

impl HistogramConfiguration {
    /// Creates a new `HistogramConfiguration` with default values.
    pub fn with_defaults() -> Self {
        Self {
            bins: default_bins(),
            policy: PolicyKind::default(),
            range: None,
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// If the number of bins is zero, or the range is not a finite interval wide enough to hold that many bins, an error
    /// is returned.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        ensure!(self.bins > 0, ZeroBins);
        if let Some(RangeConfiguration { min, max }) = self.range {
            ensure!(min.is_finite() && max.is_finite() && min < max, InvalidRange { min, max });
            ensure!(bin_width(min, max, self.bins) > 0.0, InvalidRange { min, max });
        }
        Ok(())
    }

    /// Ensures that `P` is the configured policy, when `P` is one of the built-in policies.
    fn check_policy<P: BinPolicy>(&self) -> Result<(), ConfigurationError> {
        if let Some(built) = P::KIND {
            ensure!(
                built == self.policy,
                PolicyMismatch {
                    configured: self.policy,
                    built
                }
            );
        }
        Ok(())
    }

    /// Builds an aggregating histogram with the given policy.
    ///
    /// Without a configured range, the histogram covers `[0, 1]`.
    ///
    /// # Errors
    ///
    /// If the configuration is invalid, or `policy` is a built-in policy other than the configured one, an error is
    /// returned.
    pub fn build_aggregating<P>(&self, policy: P) -> Result<AggregatingHistogram<P>, ConfigurationError>
    where
        P: AggregatePolicy,
    {
        self.validate()?;
        self.check_policy::<P>()?;

        let RangeConfiguration { min, max } = self.range.unwrap_or(RangeConfiguration { min: 0.0, max: 1.0 });
        Ok(AggregatingHistogram::new(self.bins, min, max, policy))
    }

    /// Builds an adaptive histogram with the given policy.
    ///
    /// With a configured range, the histogram starts out materialized over that range.
    ///
    /// # Errors
    ///
    /// If the configuration is invalid, or `policy` is a built-in policy other than the configured one, an error is
    /// returned.
    pub fn build_adaptive<P>(&self, policy: P) -> Result<AdaptiveHistogram<P>, ConfigurationError>
    where
        P: ResamplePolicy + Clone,
    {
        self.validate()?;
        self.check_policy::<P>()?;

        Ok(match self.range {
            Some(RangeConfiguration { min, max }) => AdaptiveHistogram::with_range(self.bins, min, max, policy),
            None => AdaptiveHistogram::new(self.bins, policy),
        })
    }
}

impl Default for HistogramConfiguration {
    fn default() -> Self {
        Self::with_defaults()
    }
}
