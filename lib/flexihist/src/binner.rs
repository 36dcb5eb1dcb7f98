use std::collections::{vec_deque, VecDeque};

use snafu::ensure;
use tracing::trace;

use crate::error::{HistogramError, InvalidCoordinate};
use crate::policy::{BinPolicy, ResamplePolicy};

/// A single bin, as seen during enumeration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BinEntry<V> {
    /// Storage index of the bin.
    pub index: usize,

    /// Lower bound of the bin, inclusive.
    pub min: f64,

    /// Center of the bin.
    pub center: f64,

    /// Upper bound of the bin, exclusive.
    pub max: f64,

    /// Value held by the bin.
    pub value: V,
}

/// Equal-width bins over a growable coordinate range.
///
/// A `Binner` maps coordinates to bins and stores one value per bin. Writing to a coordinate outside of the currently
/// allocated range grows the bin array, in either direction, by exactly as many bins as are needed to reach the
/// coordinate: bins created to fill the gap are initialized with [`BinPolicy::make`].
///
/// ## Indexing
///
/// Bins are addressed by their storage index, `0` being the leftmost bin. When the range grows to the left, existing
/// bins shift to higher storage indices, which is tracked by an offset: the bin at storage index `offset` always starts
/// at the original left edge, `base`, so bin `i` covers `[base + (i - offset) * binsize, base + (i - offset + 1) *
/// binsize)`.
///
/// ## Covering bound
///
/// A coordinate equal to the upper bound given at construction maps to the last bin instead of growing the range, so
/// that a range of `[0, 10]` with five bins holds `10.0` in its fifth bin. Once the range has grown, the exact upper
/// bound is no longer tracked: the clamp stops applying and the covering maximum is derived from the last bin.
#[derive(Clone, Debug)]
pub struct Binner<P: BinPolicy> {
    policy: P,

    /// The bin values, stored contiguously from the leftmost bin.
    bins: VecDeque<P::Bin>,

    /// The storage index of the bin starting at `base`.
    offset: usize,

    /// Left edge of the bin at storage index `offset`.
    base: f64,

    /// Width of every bin.
    binsize: f64,

    /// Coordinate mapped to the last bin, or `f64::INFINITY` once unbounded.
    max: f64,
}

impl<P: BinPolicy> Binner<P> {
    /// Creates a new `Binner` with `bins` equal-width bins covering `[min, max]`.
    ///
    /// # Panics
    ///
    /// Panics if `bins` is zero, if either bound is not finite, or if `min` is not less than `max`.
    pub fn new(bins: usize, min: f64, max: f64, policy: P) -> Self {
        assert!(bins >= 1, "bins must be at least 1");
        assert!(min.is_finite() && max.is_finite(), "range bounds must be finite");
        assert!(min < max, "range minimum must be less than range maximum");

        let binsize = bin_width(min, max, bins);
        assert!(binsize > 0.0, "range is too narrow for {} bins", bins);

        let bins = (0..bins).map(|_| policy.make()).collect();
        Self {
            policy,
            bins,
            offset: 0,
            base: min,
            binsize,
            max,
        }
    }

    /// Returns the storage index of the bin that `coord` falls into.
    ///
    /// The index may be negative, or beyond the last bin, when the coordinate is outside of the covered range.
    ///
    /// # Errors
    ///
    /// If `coord` is NaN or infinite, an error is returned.
    pub fn bin_index(&self, coord: f64) -> Result<i64, HistogramError> {
        ensure!(coord.is_finite(), InvalidCoordinate { coord });

        if coord == self.max {
            return Ok(self.bins.len() as i64 - 1);
        }

        // Float to integer casts saturate, so coordinates absurdly far away yield the extreme indices.
        let relative = ((coord - self.base) / self.binsize).floor() as i64;
        Ok(relative.saturating_add(self.offset as i64))
    }

    /// Returns the value of the bin that `coord` falls into.
    ///
    /// If the coordinate is outside of the covered range, a new empty value is returned, and the range is left as-is.
    ///
    /// # Errors
    ///
    /// If `coord` is NaN or infinite, an error is returned.
    pub fn get(&self, coord: f64) -> Result<P::Bin, HistogramError> {
        let index = self.bin_index(coord)?;
        Ok(match self.slot(index) {
            Some(bin) => bin.clone(),
            None => self.policy.make(),
        })
    }

    /// Overwrites the value of the bin that `coord` falls into, growing the range if necessary.
    ///
    /// # Errors
    ///
    /// If `coord` is NaN or infinite, an error is returned and the binner is not modified.
    pub fn replace(&mut self, coord: f64, value: P::Bin) -> Result<(), HistogramError> {
        let index = self.bin_index(coord)?;
        self.store(index, value);
        Ok(())
    }

    /// Returns a reference to the bin at the given storage index, if it is within range.
    fn slot(&self, index: i64) -> Option<&P::Bin> {
        usize::try_from(index).ok().and_then(|index| self.bins.get(index))
    }

    /// Replaces the bin at the given storage index with the result of `f`, growing the bin array if the index is out
    /// of range.
    ///
    /// `f` receives the current value of the bin, or a new empty value when the index is out of range.
    pub(crate) fn update<F>(&mut self, index: i64, f: F)
    where
        F: FnOnce(&P, P::Bin) -> P::Bin,
    {
        match usize::try_from(index).ok().filter(|index| *index < self.bins.len()) {
            Some(index) => {
                let slot = &mut self.bins[index];
                let existing = std::mem::replace(slot, self.policy.make());
                *slot = f(&self.policy, existing);
            }
            None => {
                let value = f(&self.policy, self.policy.make());
                self.store(index, value);
            }
        }
    }

    /// Stores `value` at the given storage index, growing the bin array if the index is out of range.
    fn store(&mut self, index: i64, value: P::Bin) {
        if index < 0 {
            let grow_by = usize::try_from(index.unsigned_abs()).unwrap_or(usize::MAX);
            trace!(grow_by, "Growing histogram range to the left.");

            self.bins.reserve(grow_by);
            for _ in 1..grow_by {
                self.bins.push_front(self.policy.make());
            }
            self.bins.push_front(value);

            self.offset += grow_by;
            self.max = f64::INFINITY;
        } else if index as u64 >= self.bins.len() as u64 {
            let index = usize::try_from(index).unwrap_or(usize::MAX);
            trace!(grow_by = index + 1 - self.bins.len(), "Growing histogram range to the right.");

            self.bins.reserve(index + 1 - self.bins.len());
            while self.bins.len() < index {
                self.bins.push_back(self.policy.make());
            }
            self.bins.push_back(value);

            self.max = f64::INFINITY;
        } else {
            self.bins[index as usize] = value;
        }
    }

    /// Returns the policy used to create bins.
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Returns the number of bins.
    pub fn num_bins(&self) -> usize {
        self.bins.len()
    }

    /// Returns the width of each bin.
    pub fn bin_size(&self) -> f64 {
        self.binsize
    }

    /// Returns the lower bound of the bin at the given storage index.
    pub fn bin_min(&self, index: usize) -> f64 {
        self.base + (index as f64 - self.offset as f64) * self.binsize
    }

    /// Returns the center of the bin at the given storage index.
    pub fn bin_mean(&self, index: usize) -> f64 {
        self.base + (index as f64 - self.offset as f64 + 0.5) * self.binsize
    }

    /// Returns the upper bound of the bin at the given storage index.
    pub fn bin_max(&self, index: usize) -> f64 {
        self.base + (index as f64 - self.offset as f64 + 1.0) * self.binsize
    }

    /// Returns the lower bound of the covered range.
    pub fn cover_minimum(&self) -> f64 {
        self.bin_min(0)
    }

    /// Returns the upper bound of the covered range.
    ///
    /// Until the range has grown, this is exactly the maximum given at construction. Afterwards, it is the upper bound
    /// of the last bin, which is subject to the rounding error of adding up bin widths.
    pub fn cover_maximum(&self) -> f64 {
        if self.is_unbounded() {
            self.bin_max(self.bins.len() - 1)
        } else {
            self.max
        }
    }

    /// Returns `true` if the range has grown since construction, and the covering bound is no longer exact.
    pub fn is_unbounded(&self) -> bool {
        self.max == f64::INFINITY
    }

    /// Returns the value of the bin at the given storage index.
    pub fn bin(&self, index: usize) -> Option<&P::Bin> {
        self.bins.get(index)
    }

    /// Returns the bin at the given storage index, along with its bounds.
    pub fn bin_entry(&self, index: usize) -> Option<BinEntry<&P::Bin>> {
        self.bins.get(index).map(|value| self.entry(index, value))
    }

    /// Returns an iterator over all bins, from left to right.
    pub fn iter(&self) -> Iter<'_, P> {
        Iter {
            binner: self,
            bins: self.bins.iter().enumerate(),
        }
    }

    fn entry<'a>(&self, index: usize, value: &'a P::Bin) -> BinEntry<&'a P::Bin> {
        BinEntry {
            index,
            min: self.bin_min(index),
            center: self.bin_mean(index),
            max: self.bin_max(index),
            value,
        }
    }
}

impl<P: ResamplePolicy> Binner<P> {
    /// Halves the resolution by merging adjacent bins pairwise.
    ///
    /// Bins are paired up from the left, so the new bin `i` is `downsample(bin[2i], bin[2i + 1])`. With an odd number
    /// of bins, the last bin is merged with an empty bin. The bin width doubles and the covered range keeps its lower
    /// bound.
    pub fn coarsen(&mut self) {
        let base = self.cover_minimum();

        let bins = std::mem::take(&mut self.bins);
        let mut coarsened = VecDeque::with_capacity(bins.len().div_ceil(2));
        let mut bins = bins.into_iter();
        while let Some(first) = bins.next() {
            let second = bins.next().unwrap_or_else(|| self.policy.make());
            coarsened.push_back(self.policy.downsample(first, second));
        }

        self.bins = coarsened;
        self.base = base;
        self.binsize *= 2.0;
        self.offset = 0;
    }
}

impl<'a, P: BinPolicy> IntoIterator for &'a Binner<P> {
    type Item = BinEntry<&'a P::Bin>;
    type IntoIter = Iter<'a, P>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the bins of a [`Binner`].
pub struct Iter<'a, P: BinPolicy> {
    binner: &'a Binner<P>,
    bins: std::iter::Enumerate<vec_deque::Iter<'a, P::Bin>>,
}

impl<'a, P: BinPolicy> Iterator for Iter<'a, P> {
    type Item = BinEntry<&'a P::Bin>;

    fn next(&mut self) -> Option<Self::Item> {
        self.bins.next().map(|(index, value)| self.binner.entry(index, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.bins.size_hint()
    }
}

impl<P: BinPolicy> ExactSizeIterator for Iter<'_, P> {}

/// Computes the width of each of `bins` bins covering `[min, max]`.
pub(crate) fn bin_width(min: f64, max: f64, bins: usize) -> f64 {
    let n = bins as f64;
    let width = (max - min) / n;
    if width.is_finite() {
        width
    } else {
        // The span itself overflowed.
        max / n - min / n
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::policy::IntSum;

    fn int_histogram() -> Binner<IntSum> {
        Binner::new(5, 0.0, 10.0, IntSum)
    }

    fn values(binner: &Binner<IntSum>) -> Vec<i32> {
        binner.iter().map(|bin| *bin.value).collect()
    }

    #[test]
    fn construction() {
        let binner = int_histogram();
        assert_eq!(binner.num_bins(), 5);
        assert_eq!(binner.bin_size(), 2.0);
        assert_eq!(binner.cover_minimum(), 0.0);
        assert_eq!(binner.cover_maximum(), 10.0);
        assert!(!binner.is_unbounded());
        assert_eq!(values(&binner), vec![0; 5]);
    }

    #[test]
    fn bin_index() {
        let binner = int_histogram();
        assert_eq!(binner.bin_index(0.0), Ok(0));
        assert_eq!(binner.bin_index(1.99), Ok(0));
        assert_eq!(binner.bin_index(2.0), Ok(1));
        assert_eq!(binner.bin_index(9.99), Ok(4));
        assert_eq!(binner.bin_index(-0.5), Ok(-1));
        assert_eq!(binner.bin_index(-4.0), Ok(-2));
        assert_eq!(binner.bin_index(12.0), Ok(6));
    }

    #[test]
    fn bin_index_non_finite() {
        let binner = int_histogram();
        for coord in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                binner.bin_index(coord),
                Err(HistogramError::InvalidCoordinate { .. })
            ));
        }
    }

    #[test]
    fn overwrite() {
        let mut binner = int_histogram();
        binner.replace(2.5, 7).unwrap();
        assert_eq!(binner.get(2.5), Ok(7));

        binner.replace(2.5, 9).unwrap();
        assert_eq!(binner.get(2.5), Ok(9));
        assert_eq!(binner.get(3.9), Ok(9));
        assert_eq!(values(&binner), vec![0, 9, 0, 0, 0]);
    }

    #[test]
    fn boundary_clamp() {
        let mut binner = int_histogram();
        binner.replace(10.0, 3).unwrap();
        assert_eq!(binner.get(10.0), Ok(3));
        assert_eq!(binner.num_bins(), 5);
        assert_eq!(values(&binner), vec![0, 0, 0, 0, 3]);
    }

    #[test]
    fn get_outside_range_does_not_grow() {
        let binner = int_histogram();
        assert_eq!(binner.get(-100.0), Ok(0));
        assert_eq!(binner.get(1000.0), Ok(0));
        assert_eq!(binner.num_bins(), 5);
    }

    #[test]
    fn grow_right() {
        let mut binner = int_histogram();
        binner.replace(15.0, 4).unwrap();

        assert_eq!(binner.num_bins(), 8);
        assert_eq!(values(&binner), vec![0, 0, 0, 0, 0, 0, 0, 4]);
        assert!(binner.is_unbounded());
        assert_eq!(binner.cover_minimum(), 0.0);
        assert_eq!(binner.cover_maximum(), 16.0);
        assert_eq!(binner.get(15.0), Ok(4));

        // With the range unbounded, the old maximum no longer clamps to the last bin.
        assert_eq!(binner.bin_index(10.0), Ok(5));
    }

    #[test]
    fn grow_left() {
        let mut binner = int_histogram();
        binner.replace(1.0, 1).unwrap();
        binner.replace(-5.0, 2).unwrap();

        assert_eq!(binner.num_bins(), 8);
        assert_eq!(values(&binner), vec![2, 0, 0, 1, 0, 0, 0, 0]);
        assert_eq!(binner.cover_minimum(), -6.0);
        assert_eq!(binner.bin_min(3), 0.0);
        assert_eq!(binner.get(-5.0), Ok(2));
        assert_eq!(binner.get(1.0), Ok(1));
        assert_eq!(binner.bin_index(-5.0), Ok(0));
    }

    #[test]
    fn grow_left_adjacent() {
        let mut binner = int_histogram();
        binner.replace(-1.0, 6).unwrap();

        assert_eq!(binner.num_bins(), 6);
        assert_eq!(values(&binner), vec![6, 0, 0, 0, 0, 0]);
        assert_eq!(binner.cover_minimum(), -2.0);
    }

    #[test]
    fn invalid_coordinate_leaves_state() {
        let mut binner = int_histogram();
        binner.replace(2.0, 1).unwrap();

        assert_eq!(
            binner.replace(f64::NAN, 5).unwrap_err().to_string(),
            "Coordinate NaN is not finite and cannot be mapped to a bin."
        );
        assert!(binner.replace(f64::NEG_INFINITY, 5).is_err());
        assert!(binner.get(f64::INFINITY).is_err());

        assert_eq!(values(&binner), vec![0, 1, 0, 0, 0]);
        assert!(!binner.is_unbounded());
    }

    #[test]
    fn bin_bounds() {
        let mut binner = int_histogram();
        assert_eq!(binner.bin_min(1), 2.0);
        assert_eq!(binner.bin_mean(1), 3.0);
        assert_eq!(binner.bin_max(1), 4.0);

        binner.replace(-3.0, 1).unwrap();
        assert_eq!(binner.bin_min(0), -4.0);
        assert_eq!(binner.bin_mean(0), -3.0);
        assert_eq!(binner.bin_max(0), -2.0);
        assert_eq!(binner.bin_min(2), 0.0);
    }

    #[test]
    fn enumeration() {
        let mut binner = int_histogram();
        binner.replace(4.0, 2).unwrap();

        let entries = binner.iter().collect::<Vec<_>>();
        assert_eq!(entries.len(), 5);
        assert_eq!(
            entries[2],
            BinEntry {
                index: 2,
                min: 4.0,
                center: 5.0,
                max: 6.0,
                value: &2,
            }
        );
        assert_eq!(binner.bin_entry(2), Some(entries[2]));
        assert_eq!(binner.bin_entry(5), None);

        // Enumeration is restartable.
        assert_eq!((&binner).into_iter().count(), 5);
        assert_eq!(binner.iter().len(), 5);
    }

    #[test]
    fn coarsen_even() {
        let mut binner = Binner::new(4, 0.0, 8.0, IntSum);
        for (coord, value) in [(0.5, 1), (2.5, 2), (4.5, 3), (6.5, 4)] {
            binner.replace(coord, value).unwrap();
        }

        binner.coarsen();
        assert_eq!(values(&binner), vec![3, 7]);
        assert_eq!(binner.bin_size(), 4.0);
        assert_eq!(binner.cover_minimum(), 0.0);
        assert_eq!(binner.cover_maximum(), 8.0);
    }

    #[test]
    fn coarsen_odd_after_left_growth() {
        let mut binner = Binner::new(4, 0.0, 8.0, IntSum);
        binner.replace(1.0, 1).unwrap();
        binner.replace(-1.0, 5).unwrap();
        binner.replace(7.0, 2).unwrap();
        assert_eq!(values(&binner), vec![5, 1, 0, 0, 2]);

        binner.coarsen();
        assert_eq!(values(&binner), vec![6, 0, 2]);
        assert_eq!(binner.bin_size(), 4.0);
        assert_eq!(binner.cover_minimum(), -2.0);
        assert_eq!(binner.cover_maximum(), 10.0);
        assert_eq!(binner.get(-1.0), Ok(6));
        assert_eq!(binner.get(7.0), Ok(2));
    }

    proptest! {
        #[test]
        fn property_test_replace_covers_coordinate(quarters in prop::collection::vec(-4000i32..4000, 1..50)) {
            // Quarter steps and a bin width of two keep every bound exactly representable.
            let mut binner = int_histogram();
            for quarter in quarters {
                let coord = f64::from(quarter) / 4.0;
                binner.replace(coord, 1).unwrap();
                prop_assert!(binner.cover_minimum() <= coord);
                prop_assert!(coord <= binner.cover_maximum());
                prop_assert_eq!(binner.get(coord), Ok(1));
            }
        }

        #[test]
        fn property_test_get_never_grows(coords in prop::collection::vec(-1.0e9f64..1.0e9, 1..50)) {
            let binner = int_histogram();
            for coord in coords {
                let _ = binner.get(coord).unwrap();
                prop_assert_eq!(binner.num_bins(), 5);
                prop_assert!(!binner.is_unbounded());
            }
        }
    }
}
