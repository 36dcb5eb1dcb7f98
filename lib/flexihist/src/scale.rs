//! Rounding of observed data ranges to human-friendly bounds.

// Keeps `10^exp` comfortably within the range of finite doubles.
const MAX_EXPONENT: i32 = 300;

/// A linear scale covering a data range, with bounds rounded outward to a power-of-ten resolution.
///
/// The resolution is one order of magnitude below the magnitude of the range itself, so a range of `[3.2, 97.5]` is
/// rounded to `[3, 98]` at a resolution of `1`, and `[0.0123, 0.0456]` to `[0.012, 0.046]` at a resolution of `0.001`.
///
/// Degenerate ranges, where the minimum and maximum are equal, are widened so that the resulting scale always has a
/// strictly positive width:
///
/// - for a non-zero value `v`, the range is treated as spanning `|v|`, so `[5, 5]` becomes `[5, 5.1]`
/// - for zero, the range is treated as spanning `1`, so `[0, 0]` becomes `[0, 0.1]`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearScale {
    min: f64,
    max: f64,
    resolution: f64,
}

impl LinearScale {
    /// Creates a new `LinearScale` covering `[min, max]`.
    ///
    /// The bounds are swapped if given in the wrong order.
    ///
    /// # Panics
    ///
    /// Panics if either bound is not finite.
    pub fn new(min: f64, max: f64) -> Self {
        assert!(min.is_finite() && max.is_finite(), "scale bounds must be finite");
        let (min, max) = if min <= max { (min, max) } else { (max, min) };

        let mut span = max - min;
        if !span.is_finite() {
            // The range spans most of the representable doubles: rounding would not make it any friendlier.
            return Self {
                min,
                max,
                resolution: max / 2.0 - min / 2.0,
            };
        }
        if span <= 0.0 {
            span = if min != 0.0 { min.abs() } else { 1.0 };
        }

        let exponent = (span.log10().floor() as i32 - 1).clamp(-MAX_EXPONENT, MAX_EXPONENT);
        let resolution = from_units(1.0, exponent);

        let mut nice_min = from_units(to_units(min, exponent).floor(), exponent);
        let mut nice_max = from_units(to_units(max, exponent).ceil(), exponent);

        // Float error in the unit conversion can land a bound just inside the data range, and when the resolution is
        // below the precision of the bounds, stepping outward by it does nothing.
        if nice_min > min {
            nice_min = (nice_min - resolution).min(min);
        }
        if nice_max < max {
            nice_max = (nice_max + resolution).max(max);
        }
        if nice_max <= nice_min {
            nice_max = nice_min + resolution;
        }
        if nice_max <= nice_min {
            // The resolution vanished against the magnitude of the bounds.
            nice_max = nice_min + nice_min.abs().max(1.0);
        }

        Self {
            min: nice_min,
            max: nice_max,
            resolution,
        }
    }

    /// Returns the rounded lower bound.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Returns the rounded upper bound.
    ///
    /// This is always strictly greater than [`min`](Self::min).
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Returns the resolution the bounds were rounded to.
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Returns the width of the scale.
    pub fn width(&self) -> f64 {
        self.max - self.min
    }
}

// Dividing by a positive power of ten is more exact than multiplying by a negative one, so the two directions are
// handled separately.
fn to_units(value: f64, exponent: i32) -> f64 {
    if exponent >= 0 {
        value / 10f64.powi(exponent)
    } else {
        value * 10f64.powi(-exponent)
    }
}

fn from_units(units: f64, exponent: i32) -> f64 {
    if exponent >= 0 {
        units * 10f64.powi(exponent)
    } else {
        units / 10f64.powi(-exponent)
    }
}
