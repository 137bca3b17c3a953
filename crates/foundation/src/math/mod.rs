pub mod easing;
pub mod mercator;

pub use easing::*;
pub use mercator::*;

/// `max(lo, min(v, hi))`: when the bounds conflict the lower bound wins.
///
/// Unlike `f64::clamp` this never panics on `lo > hi`.
#[inline]
pub fn clamp_low_wins(v: f64, lo: f64, hi: f64) -> f64 {
    lo.max(v.min(hi))
}

#[cfg(test)]
mod tests {
    use super::clamp_low_wins;

    #[test]
    fn clamps_inside_range() {
        assert_eq!(clamp_low_wins(5.0, 0.0, 10.0), 5.0);
        assert_eq!(clamp_low_wins(-1.0, 0.0, 10.0), 0.0);
        assert_eq!(clamp_low_wins(11.0, 0.0, 10.0), 10.0);
    }

    #[test]
    fn lower_bound_wins_on_conflict() {
        assert_eq!(clamp_low_wins(3.0, 8.0, 4.0), 8.0);
    }
}
