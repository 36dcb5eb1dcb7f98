//! Streaming histograms over an unbounded coordinate axis.
//!
//! A histogram here summarizes a stream of `(coordinate, value)` observations into a bounded number of equal-width
//! bins. How values are combined within a bin is decided by a bin policy (see [`policy`]), so the same machinery
//! serves plain counts, sums, running mean/variance, or pair sums.
//!
//! Three layers are composed by delegation:
//!
//! - [`Binner`]: bin storage, coordinate to bin index mapping, and exact growth when a coordinate falls outside the
//!   allocated range. Writing to a bin overwrites it.
//! - [`AggregatingHistogram`]: wraps a `Binner` and folds new data into the existing bin value.
//! - [`AdaptiveHistogram`]: wraps an `AggregatingHistogram`, deferring the choice of range and bin width until enough
//!   samples have been seen, and merging adjacent bins pairwise to keep the bin count within `[n, 2n)`.
//!
//! # Example
//!
//! ```
//! use flexihist::factory::flexi_int_sum_histogram;
//!
//! let histogram = flexi_int_sum_histogram(4);
//! for i in 0..100 {
//!     histogram.aggregate(f64::from(i), 1).unwrap();
//! }
//!
//! let total: i32 = histogram.bins().iter().map(|bin| bin.value).sum();
//! assert_eq!(total, 100);
//! assert!(histogram.num_bins() >= 4 && histogram.num_bins() < 8);
//! ```
#![deny(warnings)]
#![deny(missing_docs)]

mod adaptive;
pub use self::adaptive::AdaptiveHistogram;

mod aggregator;
pub use self::aggregator::AggregatingHistogram;

mod binner;
pub use self::binner::{BinEntry, Binner, Iter};

pub mod config;

mod error;
pub use self::error::{ConfigurationError, HistogramError};

pub mod factory;

pub mod policy;
pub use self::policy::{AggregatePolicy, BinPolicy, ResamplePolicy};

mod scale;
pub use self::scale::LinearScale;
