//! Bin policies.
//!
//! A bin policy decides what an empty bin looks like, how an observation is folded into a bin, and, for adaptive
//! histograms, how two adjacent bins are merged when the histogram halves its resolution.
//!
//! Policies are expected to be stateless strategy values: the histogram owns one and calls into it, but never expects
//! it to change.
//!
//! Built-in policies:
//!
//! - [`IntSum`], [`LongSum`], [`DoubleSum`]: running sums.
//! - [`MeanVarianceAggregate`]: running mean and variance of the observed values, via [`MeanVariance`].
//! - [`IntPairSum`], [`DoublePairSum`]: component-wise sums of pairs, useful for tracking two metrics per bin.

use crate::config::PolicyKind;

mod mean_variance;
pub use self::mean_variance::{MeanVariance, MeanVarianceAggregate};

mod pair;
pub use self::pair::{DoublePairSum, IntPairSum};

mod sum;
pub use self::sum::{DoubleSum, IntSum, LongSum};

/// Creates the values stored in bins.
pub trait BinPolicy {
    /// The value stored in each bin.
    type Bin: Clone;

    /// The configuration name of this policy, for built-in policies.
    ///
    /// Histograms built from a [`HistogramConfiguration`](crate::config::HistogramConfiguration) must use a policy
    /// matching its `policy` field, unless this is `None`.
    const KIND: Option<PolicyKind> = None;

    /// Creates the value of a new, empty bin.
    fn make(&self) -> Self::Bin;
}

/// Folds observations into bins.
pub trait AggregatePolicy: BinPolicy {
    /// The type of an observation.
    type Data;

    /// Combines an observation into an existing bin value, returning the new bin value.
    fn aggregate(&self, existing: Self::Bin, data: Self::Data) -> Self::Bin;
}

/// Merges bins and buffers observations, as required by adaptive histograms.
pub trait ResamplePolicy: AggregatePolicy {
    /// Merges two adjacent bins into one.
    ///
    /// For sum-like policies, the merged bin should carry the combined mass of both inputs, such that resampling does
    /// not change the total over all bins.
    fn downsample(&self, first: Self::Bin, second: Self::Bin) -> Self::Bin;

    /// Copies an observation so that it can be held until the histogram is materialized.
    fn clone_for_cache(&self, data: &Self::Data) -> Self::Data;
}
