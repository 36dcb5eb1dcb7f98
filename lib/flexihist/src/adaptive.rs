use std::sync::{Mutex, MutexGuard};

use snafu::ensure;
use tracing::debug;

use crate::aggregator::AggregatingHistogram;
use crate::binner::BinEntry;
use crate::error::{HistogramError, InvalidCoordinate};
use crate::policy::ResamplePolicy;
use crate::scale::LinearScale;

/// Lifecycle state of an adaptive histogram.
///
/// Samples are buffered in `cache` until the histogram is materialized, at which point `cache` is drained and replayed
/// into `histogram`. Once `histogram` is present, `cache` stays empty for good.
struct State<P: ResamplePolicy> {
    cache: Vec<(f64, P::Data)>,
    histogram: Option<AggregatingHistogram<P>>,
}

impl<P: ResamplePolicy + Clone> State<P> {
    fn materialize(&mut self, target_bins: usize, policy: &P) -> &mut AggregatingHistogram<P> {
        let cache = &mut self.cache;
        self.histogram
            .get_or_insert_with(|| replay(std::mem::take(cache), target_bins, policy))
    }

    fn into_histogram(self, target_bins: usize, policy: &P) -> AggregatingHistogram<P> {
        match self.histogram {
            Some(histogram) => histogram,
            None => replay(self.cache, target_bins, policy),
        }
    }
}

/// A histogram that picks its own range, and keeps its number of bins bounded.
///
/// An `AdaptiveHistogram` is created with a target number of bins, `n`, but without a range. Samples are buffered until
/// either `2n` samples have been seen or the histogram is read from, at which point the histogram is "materialized":
/// the range of the buffered coordinates is rounded outward to human-friendly bounds (see [`LinearScale`]), divided into
/// `n` bins, and all buffered samples are replayed into it. If no samples were buffered, the histogram materializes
/// over `[0, 1)`.
///
/// After materialization, samples outside of the range grow it exactly like an [`AggregatingHistogram`] does. Whenever
/// the histogram reaches `2n` bins, adjacent bins are merged pairwise with [`ResamplePolicy::downsample`], halving the
/// number of bins and doubling their width, so that the number of bins always stays within `[n, 2n)`.
///
/// ## Concurrency
///
/// Every operation, including reads, takes `&self` and runs under a per-instance mutex, since any of them may trigger
/// materialization. An `AdaptiveHistogram` can therefore be shared between threads, as long as its policy, bins, and
/// data can be.
pub struct AdaptiveHistogram<P: ResamplePolicy> {
    target_bins: usize,
    policy: P,
    state: Mutex<State<P>>,
}

impl<P: ResamplePolicy + Clone> AdaptiveHistogram<P> {
    /// Creates a new `AdaptiveHistogram` targeting `target_bins` bins.
    ///
    /// # Panics
    ///
    /// Panics if `target_bins` is zero.
    pub fn new(target_bins: usize, policy: P) -> Self {
        assert!(target_bins >= 1, "target_bins must be at least 1");

        Self {
            target_bins,
            policy,
            state: Mutex::new(State {
                cache: Vec::with_capacity(2 * target_bins),
                histogram: None,
            }),
        }
    }

    /// Creates a new `AdaptiveHistogram` targeting `target_bins` bins, materialized over `[min, max]` from the start.
    ///
    /// # Panics
    ///
    /// Panics if `target_bins` is zero, if either bound is not finite, or if `min` is not less than `max`.
    pub fn with_range(target_bins: usize, min: f64, max: f64, policy: P) -> Self {
        assert!(target_bins >= 1, "target_bins must be at least 1");

        let histogram = AggregatingHistogram::new(target_bins, min, max, policy.clone());
        Self {
            target_bins,
            policy,
            state: Mutex::new(State {
                cache: Vec::new(),
                histogram: Some(histogram),
            }),
        }
    }

    /// Returns the target number of bins.
    pub fn target_bins(&self) -> usize {
        self.target_bins
    }

    /// Returns the policy used for the bins of this histogram.
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Returns `true` if the histogram has been materialized.
    pub fn is_materialized(&self) -> bool {
        self.lock().histogram.is_some()
    }

    /// Materializes the histogram, if it has not been materialized yet.
    pub fn materialize(&self) {
        let mut state = self.lock();
        let _ = state.materialize(self.target_bins, &self.policy);
    }

    /// Folds `data` into the bin that `coord` falls into.
    ///
    /// # Errors
    ///
    /// If `coord` is NaN or infinite, an error is returned and the histogram is not modified.
    pub fn aggregate(&self, coord: f64, data: P::Data) -> Result<(), HistogramError> {
        ensure!(coord.is_finite(), InvalidCoordinate { coord });

        let mut state = self.lock();
        self.insert(&mut state, coord, data)
    }

    /// Folds every `(coordinate, data)` pair into the histogram, in order, holding the lock for the whole batch.
    ///
    /// # Errors
    ///
    /// If a coordinate is NaN or infinite, an error is returned. Pairs preceding the invalid one remain applied, and
    /// the remaining pairs are not consumed.
    pub fn aggregate_many<I>(&self, samples: I) -> Result<(), HistogramError>
    where
        I: IntoIterator<Item = (f64, P::Data)>,
    {
        let mut state = self.lock();
        for (coord, data) in samples {
            ensure!(coord.is_finite(), InvalidCoordinate { coord });
            self.insert(&mut state, coord, data)?;
        }
        Ok(())
    }

    /// Returns the value of the bin that `coord` falls into.
    ///
    /// If the coordinate is outside of the covered range, a new empty value is returned, and the range is left as-is.
    ///
    /// # Errors
    ///
    /// If `coord` is NaN or infinite, an error is returned and the histogram is not modified.
    pub fn get(&self, coord: f64) -> Result<P::Bin, HistogramError> {
        ensure!(coord.is_finite(), InvalidCoordinate { coord });

        self.read(|histogram| histogram.get(coord))
    }

    /// Returns the number of bins.
    pub fn num_bins(&self) -> usize {
        self.read(|histogram| histogram.num_bins())
    }

    /// Returns the width of each bin.
    pub fn bin_size(&self) -> f64 {
        self.read(|histogram| histogram.bin_size())
    }

    /// Returns the lower bound of the bin at the given storage index.
    pub fn bin_min(&self, index: usize) -> f64 {
        self.read(|histogram| histogram.bin_min(index))
    }

    /// Returns the center of the bin at the given storage index.
    pub fn bin_mean(&self, index: usize) -> f64 {
        self.read(|histogram| histogram.bin_mean(index))
    }

    /// Returns the upper bound of the bin at the given storage index.
    pub fn bin_max(&self, index: usize) -> f64 {
        self.read(|histogram| histogram.bin_max(index))
    }

    /// Returns the lower bound of the covered range.
    pub fn cover_minimum(&self) -> f64 {
        self.read(|histogram| histogram.cover_minimum())
    }

    /// Returns the upper bound of the covered range.
    pub fn cover_maximum(&self) -> f64 {
        self.read(|histogram| histogram.cover_maximum())
    }

    /// Returns a snapshot of all bins, from left to right.
    pub fn bins(&self) -> Vec<BinEntry<P::Bin>> {
        self.read(|histogram| {
            histogram
                .iter()
                .map(|bin| BinEntry {
                    index: bin.index,
                    min: bin.min,
                    center: bin.center,
                    max: bin.max,
                    value: bin.value.clone(),
                })
                .collect()
        })
    }

    /// Calls `f` on every bin, from left to right, without copying bin values.
    ///
    /// The histogram is locked for the duration of the call, so `f` must not call back into this histogram.
    pub fn for_each_bin<F>(&self, f: F)
    where
        F: FnMut(BinEntry<&P::Bin>),
    {
        self.read(|histogram| histogram.iter().for_each(f))
    }

    /// Runs `f` against the materialized histogram.
    ///
    /// The histogram is locked for the duration of the call, so `f` must not call back into this histogram.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&AggregatingHistogram<P>) -> R,
    {
        let mut state = self.lock();
        f(state.materialize(self.target_bins, &self.policy))
    }

    /// Consumes this histogram, returning the materialized histogram.
    pub fn into_materialized(self) -> AggregatingHistogram<P> {
        let state = self.state.into_inner().unwrap();
        state.into_histogram(self.target_bins, &self.policy)
    }

    fn lock(&self) -> MutexGuard<'_, State<P>> {
        self.state.lock().unwrap()
    }

    fn insert(&self, state: &mut State<P>, coord: f64, data: P::Data) -> Result<(), HistogramError> {
        match state.histogram.as_mut() {
            Some(histogram) => {
                make_room(histogram, coord, self.target_bins)?;
                histogram.aggregate(coord, data)?;
            }
            None => {
                state.cache.push((coord, self.policy.clone_for_cache(&data)));
                if state.cache.len() >= 2 * self.target_bins {
                    let _ = state.materialize(self.target_bins, &self.policy);
                }
            }
        }

        Ok(())
    }
}

/// Builds a histogram over the range of the cached samples, and replays them into it.
fn replay<P>(cache: Vec<(f64, P::Data)>, target_bins: usize, policy: &P) -> AggregatingHistogram<P>
where
    P: ResamplePolicy + Clone,
{
    let samples = cache.len();
    let (min, max) = if cache.is_empty() {
        (0.0, 1.0)
    } else {
        let (lo, hi) = cache
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (coord, _)| {
                (lo.min(*coord), hi.max(*coord))
            });
        let scale = LinearScale::new(lo, hi);
        (scale.min(), scale.max())
    };

    let mut histogram = AggregatingHistogram::new(target_bins, min, max, policy.clone());
    for (coord, data) in cache {
        if let Err(e) = histogram.aggregate(coord, data) {
            unreachable!("cached coordinates are validated on insertion: {}", e);
        }
    }
    resample(&mut histogram, target_bins);

    debug!(
        samples,
        bins = histogram.num_bins(),
        min = histogram.cover_minimum(),
        max = histogram.cover_maximum(),
        "Materialized adaptive histogram."
    );

    histogram
}

/// Merges bins pairwise until there are fewer than twice the target number of bins.
fn resample<P: ResamplePolicy>(histogram: &mut AggregatingHistogram<P>, target_bins: usize) {
    let limit = 2 * target_bins;
    if histogram.num_bins() < limit {
        return;
    }

    let bins_before = histogram.num_bins();
    while histogram.num_bins() >= limit {
        histogram.binner_mut().coarsen();
    }

    debug!(
        bins_before,
        bins_after = histogram.num_bins(),
        bin_size = histogram.bin_size(),
        "Resampled adaptive histogram."
    );
}

/// Merges bins pairwise until growing the range to include `coord` leaves fewer than twice the target number of bins.
///
/// Growing first would allocate one bin per step of the current bin width, however far away `coord` is.
fn make_room<P: ResamplePolicy>(
    histogram: &mut AggregatingHistogram<P>, coord: f64, target_bins: usize,
) -> Result<(), HistogramError> {
    let limit = 2 * target_bins as u128;
    let bins_before = histogram.num_bins();

    let mut merges = 0usize;
    while grown_bins(histogram.num_bins(), histogram.binner().bin_index(coord)?) >= limit {
        histogram.binner_mut().coarsen();
        merges += 1;
    }

    if merges > 0 {
        debug!(
            coord,
            bins_before,
            bins_after = histogram.num_bins(),
            merges,
            bin_size = histogram.bin_size(),
            "Resampled adaptive histogram ahead of growth."
        );
    }
    Ok(())
}

/// Returns the number of bins after growing a histogram of `num_bins` bins to include storage index `index`.
fn grown_bins(num_bins: usize, index: i64) -> u128 {
    let num_bins = num_bins as i128;
    let index = i128::from(index);
    let grown = if index < 0 { num_bins - index } else { num_bins.max(index + 1) };
    grown as u128
}
