use super::{AggregatePolicy, BinPolicy, PolicyKind, ResamplePolicy};

macro_rules! sum_policy {
    ($(#[$meta:meta])* $name:ident, $kind:ident, $ty:ty, $add:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
        pub struct $name;

        impl BinPolicy for $name {
            type Bin = $ty;

            const KIND: Option<PolicyKind> = Some(PolicyKind::$kind);

            fn make(&self) -> $ty {
                <$ty>::default()
            }
        }

        impl AggregatePolicy for $name {
            type Data = $ty;

            fn aggregate(&self, existing: $ty, data: $ty) -> $ty {
                $add(existing, data)
            }
        }

        impl ResamplePolicy for $name {
            fn downsample(&self, first: $ty, second: $ty) -> $ty {
                $add(first, second)
            }

            fn clone_for_cache(&self, data: &$ty) -> $ty {
                *data
            }
        }
    };
}

sum_policy!(
    /// Sums `i32` observations per bin.
    ///
    /// Sums saturate at the bounds of `i32` rather than wrapping.
    IntSum,
    IntSum,
    i32,
    i32::saturating_add
);

sum_policy!(
    /// Sums `i64` observations per bin.
    ///
    /// Sums saturate at the bounds of `i64` rather than wrapping.
    LongSum,
    LongSum,
    i64,
    i64::saturating_add
);

sum_policy!(
    /// Sums `f64` observations per bin.
    DoubleSum,
    DoubleSum,
    f64,
    <f64 as std::ops::Add>::add
);
