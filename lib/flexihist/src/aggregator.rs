use std::fmt;

use crate::binner::{BinEntry, Binner, Iter};
use crate::error::HistogramError;
use crate::policy::AggregatePolicy;

/// A histogram that folds observations into its bins.
///
/// Where a [`Binner`] overwrites a bin on every write, `AggregatingHistogram` combines each observation with the value
/// already in its bin, using [`AggregatePolicy::aggregate`]. Bins outside of the covered range start out as
/// [`make`](crate::BinPolicy::make) would create them, and the range grows to include them exactly as with a plain
/// `Binner`.
#[derive(Clone)]
pub struct AggregatingHistogram<P: AggregatePolicy> {
    binner: Binner<P>,
}

impl<P> fmt::Debug for AggregatingHistogram<P>
where
    P: AggregatePolicy + fmt::Debug,
    P::Bin: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AggregatingHistogram")
            .field("binner", &self.binner)
            .finish()
    }
}

impl<P: AggregatePolicy> AggregatingHistogram<P> {
    /// Creates a new `AggregatingHistogram` with `bins` equal-width bins covering `[min, max]`.
    ///
    /// # Panics
    ///
    /// Panics if `bins` is zero, if either bound is not finite, or if `min` is not less than `max`.
    pub fn new(bins: usize, min: f64, max: f64, policy: P) -> Self {
        Self::from_binner(Binner::new(bins, min, max, policy))
    }

    /// Creates a new `AggregatingHistogram` on top of an existing `Binner`.
    pub fn from_binner(binner: Binner<P>) -> Self {
        Self { binner }
    }

    /// Folds `data` into the bin that `coord` falls into, growing the range if necessary.
    ///
    /// # Errors
    ///
    /// If `coord` is NaN or infinite, an error is returned and the histogram is not modified.
    pub fn aggregate(&mut self, coord: f64, data: P::Data) -> Result<(), HistogramError> {
        let index = self.binner.bin_index(coord)?;
        self.binner.update(index, |policy, existing| policy.aggregate(existing, data));
        Ok(())
    }

    /// Folds every `(coordinate, data)` pair into the histogram, in order.
    ///
    /// # Errors
    ///
    /// If a coordinate is NaN or infinite, an error is returned. Pairs preceding the invalid one remain applied, and
    /// the remaining pairs are not consumed.
    pub fn aggregate_many<I>(&mut self, samples: I) -> Result<(), HistogramError>
    where
        I: IntoIterator<Item = (f64, P::Data)>,
    {
        for (coord, data) in samples {
            self.aggregate(coord, data)?;
        }
        Ok(())
    }

    /// Overwrites the value of the bin that `coord` falls into, growing the range if necessary.
    ///
    /// # Errors
    ///
    /// If `coord` is NaN or infinite, an error is returned and the histogram is not modified.
    pub fn replace(&mut self, coord: f64, value: P::Bin) -> Result<(), HistogramError> {
        self.binner.replace(coord, value)
    }

    /// Returns the value of the bin that `coord` falls into.
    ///
    /// If the coordinate is outside of the covered range, a new empty value is returned, and the range is left as-is.
    ///
    /// # Errors
    ///
    /// If `coord` is NaN or infinite, an error is returned.
    pub fn get(&self, coord: f64) -> Result<P::Bin, HistogramError> {
        self.binner.get(coord)
    }

    /// Returns the number of bins.
    pub fn num_bins(&self) -> usize {
        self.binner.num_bins()
    }

    /// Returns the width of each bin.
    pub fn bin_size(&self) -> f64 {
        self.binner.bin_size()
    }

    /// Returns the lower bound of the bin at the given storage index.
    pub fn bin_min(&self, index: usize) -> f64 {
        self.binner.bin_min(index)
    }

    /// Returns the center of the bin at the given storage index.
    pub fn bin_mean(&self, index: usize) -> f64 {
        self.binner.bin_mean(index)
    }

    /// Returns the upper bound of the bin at the given storage index.
    pub fn bin_max(&self, index: usize) -> f64 {
        self.binner.bin_max(index)
    }

    /// Returns the lower bound of the covered range.
    pub fn cover_minimum(&self) -> f64 {
        self.binner.cover_minimum()
    }

    /// Returns the upper bound of the covered range.
    pub fn cover_maximum(&self) -> f64 {
        self.binner.cover_maximum()
    }

    /// Returns the value of the bin at the given storage index.
    pub fn bin(&self, index: usize) -> Option<&P::Bin> {
        self.binner.bin(index)
    }

    /// Returns an iterator over all bins, from left to right.
    pub fn iter(&self) -> Iter<'_, P> {
        self.binner.iter()
    }

    /// Returns a reference to the underlying binner.
    pub fn binner(&self) -> &Binner<P> {
        &self.binner
    }

    /// Returns a mutable reference to the underlying binner.
    pub(crate) fn binner_mut(&mut self) -> &mut Binner<P> {
        &mut self.binner
    }

    /// Consumes the histogram, returning the underlying binner.
    pub fn into_binner(self) -> Binner<P> {
        self.binner
    }
}

impl<'a, P: AggregatePolicy> IntoIterator for &'a AggregatingHistogram<P> {
    type Item = BinEntry<&'a P::Bin>;
    type IntoIter = Iter<'a, P>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::ApproxEqRatio as _;

    use super::*;
    use crate::policy::{DoublePairSum, IntSum, MeanVarianceAggregate};

    fn values(histogram: &AggregatingHistogram<IntSum>) -> Vec<i32> {
        histogram.iter().map(|bin| *bin.value).collect()
    }

    #[test]
    fn aggregate_same_bin() {
        let mut histogram = AggregatingHistogram::new(5, 0.0, 10.0, IntSum);
        histogram.aggregate(2.5, 3).unwrap();
        histogram.aggregate(2.6, 4).unwrap();

        assert_eq!(histogram.get(2.5), Ok(7));
        assert_eq!(values(&histogram), vec![0, 7, 0, 0, 0]);
    }

    #[test]
    fn replace_overrides_aggregate() {
        let mut histogram = AggregatingHistogram::new(5, 0.0, 10.0, IntSum);
        histogram.aggregate(2.5, 3).unwrap();
        histogram.replace(2.5, 1).unwrap();
        histogram.aggregate(2.5, 1).unwrap();

        assert_eq!(histogram.get(2.5), Ok(2));
    }

    #[test]
    fn aggregate_grows_range() {
        let mut histogram = AggregatingHistogram::new(5, 0.0, 10.0, IntSum);
        histogram.aggregate(-1.0, 2).unwrap();
        histogram.aggregate(-1.5, 2).unwrap();
        histogram.aggregate(11.0, 1).unwrap();
        histogram.aggregate(10.5, 1).unwrap();

        assert_eq!(histogram.num_bins(), 7);
        assert_eq!(values(&histogram), vec![4, 0, 0, 0, 0, 0, 2]);
        assert_eq!(histogram.cover_minimum(), -2.0);
        assert_eq!(histogram.cover_maximum(), 12.0);
    }

    #[test]
    fn aggregate_boundary_clamp() {
        let mut histogram = AggregatingHistogram::new(5, 0.0, 10.0, IntSum);
        histogram.aggregate(10.0, 1).unwrap();
        histogram.aggregate(9.0, 1).unwrap();

        assert_eq!(histogram.num_bins(), 5);
        assert_eq!(histogram.get(10.0), Ok(2));
    }

    #[test]
    fn aggregate_invalid_coordinate() {
        let mut histogram = AggregatingHistogram::new(5, 0.0, 10.0, IntSum);
        assert!(histogram.aggregate(f64::NAN, 1).is_err());
        assert!(histogram.aggregate(f64::INFINITY, 1).is_err());
        assert_eq!(values(&histogram), vec![0; 5]);
        assert!(!histogram.binner().is_unbounded());
    }

    #[test]
    fn aggregate_many_stops_at_invalid() {
        let mut histogram = AggregatingHistogram::new(5, 0.0, 10.0, IntSum);
        let result = histogram.aggregate_many([(1.0, 1), (3.0, 1), (f64::NAN, 1), (5.0, 1)]);

        assert!(result.is_err());
        assert_eq!(values(&histogram), vec![1, 1, 0, 0, 0]);
    }

    #[test]
    fn mean_variance_bins() {
        let mut histogram = AggregatingHistogram::new(2, 0.0, 2.0, MeanVarianceAggregate);
        for (coord, value) in [(0.1, 1.0), (0.2, 3.0), (1.5, 10.0)] {
            histogram.aggregate(coord, value).unwrap();
        }

        let first = histogram.get(0.5).unwrap();
        assert_eq!(first.count(), 2.0);
        assert!(first.mean().approx_eq_ratio(&2.0, 0.00000001));
        assert!(first.naive_variance().approx_eq_ratio(&1.0, 0.00000001));

        let second = histogram.get(1.0).unwrap();
        assert_eq!(second.count(), 1.0);
        assert_eq!(second.mean(), 10.0);

        // Reading outside the range yields an empty accumulator.
        assert_eq!(histogram.get(100.0).unwrap().count(), 0.0);
    }

    #[test]
    fn pair_sums() {
        let mut histogram = AggregatingHistogram::new(4, 0.0, 4.0, DoublePairSum);
        histogram.aggregate(0.5, (1.0, 2.0)).unwrap();
        histogram.aggregate(0.7, (0.5, -1.0)).unwrap();

        assert_eq!(histogram.get(0.0), Ok((1.5, 1.0)));
        assert_eq!(histogram.get(3.0), Ok((0.0, 0.0)));
    }

    #[test]
    fn into_binner_keeps_bins() {
        let mut histogram = AggregatingHistogram::new(5, 0.0, 10.0, IntSum);
        histogram.aggregate(4.0, 5).unwrap();

        let binner = histogram.into_binner();
        assert_eq!(binner.get(4.0), Ok(5));
    }
}
