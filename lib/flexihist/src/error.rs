use snafu::Snafu;

use crate::config::PolicyKind;

/// A histogram operation error.
#[derive(Clone, Copy, Debug, PartialEq, Snafu)]
#[snafu(context(suffix(false)), visibility(pub(crate)))]
pub enum HistogramError {
    /// The coordinate was NaN or infinite, and cannot be mapped to a bin.
    #[snafu(display("Coordinate {} is not finite and cannot be mapped to a bin.", coord))]
    InvalidCoordinate {
        /// The offending coordinate.
        coord: f64,
    },
}

/// A histogram configuration error.
#[derive(Clone, Copy, Debug, PartialEq, Snafu)]
#[snafu(context(suffix(false)), visibility(pub(crate)))]
pub enum ConfigurationError {
    /// The configured number of bins was zero.
    #[snafu(display("Number of bins must be greater than zero."))]
    ZeroBins,

    /// The configured range was empty, inverted, not finite, or too narrow to be split into the configured number of
    /// bins.
    #[snafu(display(
        "Range [{}, {}] is invalid: both bounds must be finite, and wide enough to split into non-empty bins.",
        min,
        max
    ))]
    InvalidRange {
        /// Configured lower bound.
        min: f64,

        /// Configured upper bound.
        max: f64,
    },

    /// The histogram was built with a different built-in policy than the configured one.
    #[snafu(display(
        "Configured policy '{}' does not match the '{}' policy the histogram is built with.",
        configured.as_str(),
        built.as_str()
    ))]
    PolicyMismatch {
        /// Configured policy.
        configured: PolicyKind,

        /// Policy the histogram was built with.
        built: PolicyKind,
    },
}
