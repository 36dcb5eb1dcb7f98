use std::fmt;

use super::{AggregatePolicy, BinPolicy, PolicyKind, ResamplePolicy};

/// Streaming mean and variance.
///
/// Observations are accumulated with Welford's update, which stays numerically stable for long streams, and two
/// accumulators can be merged exactly (Chan et al.), which is what lets adaptive histograms merge bins without losing
/// the moments of either side.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeanVariance {
    /// Total weight of all observations.
    n: f64,

    /// Weighted mean of all observations.
    mean: f64,

    /// Weighted sum of squared deviations from the mean.
    m2: f64,
}

impl MeanVariance {
    /// Creates an empty `MeanVariance`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a single observation.
    pub fn put(&mut self, value: f64) {
        self.put_weighted(value, 1.0);
    }

    /// Adds an observation with the given weight.
    ///
    /// Weights of zero or less are ignored.
    pub fn put_weighted(&mut self, value: f64, weight: f64) {
        if weight <= 0.0 {
            return;
        }

        let n = self.n + weight;
        let delta = value - self.mean;
        let r = delta * weight / n;
        self.mean += r;
        self.m2 += self.n * delta * r;
        self.n = n;
    }

    /// Merges the observations of `other` into this accumulator.
    pub fn merge(&mut self, other: &MeanVariance) {
        if other.n <= 0.0 {
            return;
        }
        if self.n <= 0.0 {
            *self = *other;
            return;
        }

        let n = self.n + other.n;
        let delta = other.mean - self.mean;
        self.mean += delta * other.n / n;
        self.m2 += other.m2 + delta * delta * self.n * other.n / n;
        self.n = n;
    }

    /// Returns the total weight of all observations.
    ///
    /// With unweighted observations, this is simply the number of observations.
    pub fn count(&self) -> f64 {
        self.n
    }

    /// Returns the weighted sum of all observations.
    pub fn sum(&self) -> f64 {
        self.mean * self.n
    }

    /// Returns the mean, or `NaN` if no observations were added.
    pub fn mean(&self) -> f64 {
        if self.n > 0.0 {
            self.mean
        } else {
            f64::NAN
        }
    }

    /// Returns the population variance, or `NaN` if no observations were added.
    pub fn naive_variance(&self) -> f64 {
        if self.n > 0.0 {
            self.m2 / self.n
        } else {
            f64::NAN
        }
    }

    /// Returns the unbiased sample variance, or `NaN` unless more than one observation was added.
    pub fn sample_variance(&self) -> f64 {
        if self.n > 1.0 {
            self.m2 / (self.n - 1.0)
        } else {
            f64::NAN
        }
    }

    /// Returns the population standard deviation.
    pub fn naive_stddev(&self) -> f64 {
        self.naive_variance().sqrt()
    }

    /// Returns the sample standard deviation.
    pub fn sample_stddev(&self) -> f64 {
        self.sample_variance().sqrt()
    }
}

impl fmt::Display for MeanVariance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "n={} mean={} stddev={}",
            self.n,
            self.mean(),
            self.naive_stddev()
        )
    }
}

/// Accumulates the mean and variance of `f64` observations per bin.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MeanVarianceAggregate;

impl BinPolicy for MeanVarianceAggregate {
    type Bin = MeanVariance;

    const KIND: Option<PolicyKind> = Some(PolicyKind::MeanVariance);

    fn make(&self) -> MeanVariance {
        MeanVariance::new()
    }
}

impl AggregatePolicy for MeanVarianceAggregate {
    type Data = f64;

    fn aggregate(&self, mut existing: MeanVariance, data: f64) -> MeanVariance {
        existing.put(data);
        existing
    }
}

impl ResamplePolicy for MeanVarianceAggregate {
    fn downsample(&self, mut first: MeanVariance, second: MeanVariance) -> MeanVariance {
        first.merge(&second);
        first
    }

    fn clone_for_cache(&self, data: &f64) -> f64 {
        *data
    }
}
