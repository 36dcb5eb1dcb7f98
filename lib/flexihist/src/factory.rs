//! Convenience constructors for histograms using the built-in bin policies.
//!
//! Three families are provided:
//!
//! - `*_histogram(bins, min, max)` without a `sum` in the name: a [`Binner`], where writes overwrite bins.
//! - `*_sum_histogram(bins, min, max)` and friends: an [`AggregatingHistogram`] over a fixed initial range.
//! - `flexi_*_histogram(bins)`: an [`AdaptiveHistogram`] that picks its own range and keeps its bin count within
//!   `[bins, 2 * bins)`.

use crate::adaptive::AdaptiveHistogram;
use crate::aggregator::AggregatingHistogram;
use crate::binner::Binner;
use crate::policy::{DoublePairSum, DoubleSum, IntPairSum, IntSum, LongSum, MeanVarianceAggregate};

/// A histogram of `i32` values with overwrite semantics.
pub type IntHistogram = Binner<IntSum>;

/// A histogram of `i64` values with overwrite semantics.
pub type LongHistogram = Binner<LongSum>;

/// A histogram of `f64` values with overwrite semantics.
pub type DoubleHistogram = Binner<DoubleSum>;

/// A histogram summing `i32` values per bin.
pub type IntSumHistogram = AggregatingHistogram<IntSum>;

/// A histogram summing `i64` values per bin.
pub type LongSumHistogram = AggregatingHistogram<LongSum>;

/// A histogram summing `f64` values per bin.
pub type DoubleSumHistogram = AggregatingHistogram<DoubleSum>;

/// A histogram tracking the mean and variance of `f64` values per bin.
pub type MeanVarianceHistogram = AggregatingHistogram<MeanVarianceAggregate>;

/// A histogram summing pairs of `i32` values per bin.
pub type IntPairSumHistogram = AggregatingHistogram<IntPairSum>;

/// A histogram summing pairs of `f64` values per bin.
pub type DoublePairSumHistogram = AggregatingHistogram<DoublePairSum>;

/// An adaptive histogram summing `i32` values per bin.
pub type FlexiIntSumHistogram = AdaptiveHistogram<IntSum>;

/// An adaptive histogram summing `i64` values per bin.
pub type FlexiLongSumHistogram = AdaptiveHistogram<LongSum>;

/// An adaptive histogram summing `f64` values per bin.
pub type FlexiDoubleSumHistogram = AdaptiveHistogram<DoubleSum>;

/// An adaptive histogram tracking the mean and variance of `f64` values per bin.
pub type FlexiMeanVarianceHistogram = AdaptiveHistogram<MeanVarianceAggregate>;

/// An adaptive histogram summing pairs of `i32` values per bin.
pub type FlexiIntPairSumHistogram = AdaptiveHistogram<IntPairSum>;

/// An adaptive histogram summing pairs of `f64` values per bin.
pub type FlexiDoublePairSumHistogram = AdaptiveHistogram<DoublePairSum>;

/// Creates an [`IntHistogram`] with `bins` bins covering `[min, max]`.
pub fn int_histogram(bins: usize, min: f64, max: f64) -> IntHistogram {
    Binner::new(bins, min, max, IntSum)
}

/// Creates a [`LongHistogram`] with `bins` bins covering `[min, max]`.
pub fn long_histogram(bins: usize, min: f64, max: f64) -> LongHistogram {
    Binner::new(bins, min, max, LongSum)
}

/// Creates a [`DoubleHistogram`] with `bins` bins covering `[min, max]`.
pub fn double_histogram(bins: usize, min: f64, max: f64) -> DoubleHistogram {
    Binner::new(bins, min, max, DoubleSum)
}

/// Creates an [`IntSumHistogram`] with `bins` bins covering `[min, max]`.
pub fn int_sum_histogram(bins: usize, min: f64, max: f64) -> IntSumHistogram {
    AggregatingHistogram::new(bins, min, max, IntSum)
}

/// Creates a [`LongSumHistogram`] with `bins` bins covering `[min, max]`.
pub fn long_sum_histogram(bins: usize, min: f64, max: f64) -> LongSumHistogram {
    AggregatingHistogram::new(bins, min, max, LongSum)
}

/// Creates a [`DoubleSumHistogram`] with `bins` bins covering `[min, max]`.
pub fn double_sum_histogram(bins: usize, min: f64, max: f64) -> DoubleSumHistogram {
    AggregatingHistogram::new(bins, min, max, DoubleSum)
}

/// Creates a [`MeanVarianceHistogram`] with `bins` bins covering `[min, max]`.
pub fn mean_variance_histogram(bins: usize, min: f64, max: f64) -> MeanVarianceHistogram {
    AggregatingHistogram::new(bins, min, max, MeanVarianceAggregate)
}

/// Creates an [`IntPairSumHistogram`] with `bins` bins covering `[min, max]`.
pub fn int_pair_sum_histogram(bins: usize, min: f64, max: f64) -> IntPairSumHistogram {
    AggregatingHistogram::new(bins, min, max, IntPairSum)
}

/// Creates a [`DoublePairSumHistogram`] with `bins` bins covering `[min, max]`.
pub fn double_pair_sum_histogram(bins: usize, min: f64, max: f64) -> DoublePairSumHistogram {
    AggregatingHistogram::new(bins, min, max, DoublePairSum)
}

/// Creates a [`FlexiIntSumHistogram`] targeting `bins` bins.
pub fn flexi_int_sum_histogram(bins: usize) -> FlexiIntSumHistogram {
    AdaptiveHistogram::new(bins, IntSum)
}

/// Creates a [`FlexiLongSumHistogram`] targeting `bins` bins.
pub fn flexi_long_sum_histogram(bins: usize) -> FlexiLongSumHistogram {
    AdaptiveHistogram::new(bins, LongSum)
}

/// Creates a [`FlexiDoubleSumHistogram`] targeting `bins` bins.
pub fn flexi_double_sum_histogram(bins: usize) -> FlexiDoubleSumHistogram {
    AdaptiveHistogram::new(bins, DoubleSum)
}

/// Creates a [`FlexiMeanVarianceHistogram`] targeting `bins` bins.
pub fn flexi_mean_variance_histogram(bins: usize) -> FlexiMeanVarianceHistogram {
    AdaptiveHistogram::new(bins, MeanVarianceAggregate)
}

/// Creates a [`FlexiIntPairSumHistogram`] targeting `bins` bins.
pub fn flexi_int_pair_sum_histogram(bins: usize) -> FlexiIntPairSumHistogram {
    AdaptiveHistogram::new(bins, IntPairSum)
}

/// Creates a [`FlexiDoublePairSumHistogram`] targeting `bins` bins.
pub fn flexi_double_pair_sum_histogram(bins: usize) -> FlexiDoublePairSumHistogram {
    AdaptiveHistogram::new(bins, DoublePairSum)
}
