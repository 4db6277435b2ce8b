pub mod channels;
pub mod cohorts;
pub mod funnels;
pub mod stage_sets;
pub mod summary;

/// Round to one decimal place, halves away from zero (`6.25` -> `6.3`).
///
/// Every percentage the engine emits goes through here, so this is part of
/// the output format rather than a display concern.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `numerator / max(1, denominator) * 100`, rounded to one decimal.
///
/// A zero denominator divides by one instead of faulting, so a stage that
/// follows an empty stage reports `count * 100.0`.
pub fn guarded_pct(numerator: usize, denominator: usize) -> f64 {
    round_one_decimal(numerator as f64 / denominator.max(1) as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::{guarded_pct, round_one_decimal};

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_one_decimal(6.25), 6.3);
        assert_eq!(round_one_decimal(-6.25), -6.3);
        assert_eq!(round_one_decimal(66.666_666), 66.7);
        assert_eq!(round_one_decimal(33.333_333), 33.3);
    }

    #[test]
    fn guarded_pct_divides_by_one_on_zero() {
        assert_eq!(guarded_pct(2, 3), 66.7);
        assert_eq!(guarded_pct(1, 16), 6.3);
        assert_eq!(guarded_pct(4, 0), 400.0);
        assert_eq!(guarded_pct(0, 0), 0.0);
    }
}
