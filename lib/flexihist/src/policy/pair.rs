use super::{AggregatePolicy, BinPolicy, PolicyKind, ResamplePolicy};

/// Sums pairs of `i32` observations component-wise.
///
/// Each component saturates independently.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct IntPairSum;

impl BinPolicy for IntPairSum {
    type Bin = (i32, i32);

    const KIND: Option<PolicyKind> = Some(PolicyKind::IntPairSum);

    fn make(&self) -> (i32, i32) {
        (0, 0)
    }
}

impl AggregatePolicy for IntPairSum {
    type Data = (i32, i32);

    fn aggregate(&self, existing: (i32, i32), data: (i32, i32)) -> (i32, i32) {
        (existing.0.saturating_add(data.0), existing.1.saturating_add(data.1))
    }
}

impl ResamplePolicy for IntPairSum {
    fn downsample(&self, first: (i32, i32), second: (i32, i32)) -> (i32, i32) {
        self.aggregate(first, second)
    }

    fn clone_for_cache(&self, data: &(i32, i32)) -> (i32, i32) {
        *data
    }
}

/// Sums pairs of `f64` observations component-wise.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DoublePairSum;

impl BinPolicy for DoublePairSum {
    type Bin = (f64, f64);

    const KIND: Option<PolicyKind> = Some(PolicyKind::DoublePairSum);

    fn make(&self) -> (f64, f64) {
        (0.0, 0.0)
    }
}

impl AggregatePolicy for DoublePairSum {
    type Data = (f64, f64);

    fn aggregate(&self, existing: (f64, f64), data: (f64, f64)) -> (f64, f64) {
        (existing.0 + data.0, existing.1 + data.1)
    }
}

impl ResamplePolicy for DoublePairSum {
    fn downsample(&self, first: (f64, f64), second: (f64, f64)) -> (f64, f64) {
        self.aggregate(first, second)
    }

    fn clone_for_cache(&self, data: &(f64, f64)) -> (f64, f64) {
        *data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_pair_components_are_independent() {
        let policy = IntPairSum;
        let bin = policy.aggregate(policy.make(), (1, 10));
        let bin = policy.aggregate(bin, (2, -3));
        assert_eq!(bin, (3, 7));

        assert_eq!(policy.aggregate((i32::MAX, 0), (1, 1)), (i32::MAX, 1));
    }

    #[test]
    fn double_pair_downsample() {
        let policy = DoublePairSum;
        assert_eq!(policy.downsample((1.0, 0.5), (2.0, 0.25)), (3.0, 0.75));
        assert_eq!(policy.downsample((1.0, 0.5), policy.make()), (1.0, 0.5));
    }
}
