//! Dispersion statistics over integer sequences.
//!
//! Standard deviations here are population standard deviations (divisor `N`)
//! rounded to [`DECIMAL_PLACES`] places, half away from zero. An empty input has a
//! standard deviation of `0.0`.

use statrs::statistics::Statistics;

/// Decimal places kept in reported statistics.
pub const DECIMAL_PLACES: i32 = 3;

/// Population standard deviation of `values`, unrounded.
pub fn population_std_dev(values: &[i64]) -> f64 {
    std_dev_of(values.iter().map(|&v| v as f64).collect())
}

fn std_dev_of(data: Vec<f64>) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().population_std_dev()
}

/// Round `value` to `places` decimal places, half away from zero.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Population standard deviation of `values`, rounded for reporting.
pub fn rounded_std_dev(values: &[i64]) -> f64 {
    round_to(population_std_dev(values), DECIMAL_PLACES)
}

/// Population standard deviation of sequence sums, rounded for reporting.
pub fn rounded_std_dev_of_sums(sums: &[i128]) -> f64 {
    round_to(
        std_dev_of(sums.iter().map(|&v| v as f64).collect()),
        DECIMAL_PLACES,
    )
}

/// Sum of each sequence, in order. An empty sequence sums to 0.
///
/// Sums are widened to `i128` so that no sequence of `i64` values can overflow.
pub fn sequence_sums(sequences: &[Vec<i64>]) -> Vec<i128> {
    sequences
        .iter()
        .map(|seq| seq.iter().map(|&v| i128::from(v)).sum())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_std_dev_known_values() {
        assert_eq!(rounded_std_dev(&[1, 2, 3]), 0.816);
        assert_eq!(rounded_std_dev(&[4, 5, 6]), 0.816);
        assert_eq!(rounded_std_dev(&[6, 15]), 4.5);
        assert_eq!(rounded_std_dev(&[2, 4, 4, 4, 5, 5, 7, 9]), 2.0);
    }

    #[test]
    fn test_std_dev_degenerate_inputs() {
        assert_eq!(rounded_std_dev(&[]), 0.0);
        assert_eq!(rounded_std_dev(&[7]), 0.0);
        assert_eq!(rounded_std_dev(&[3, 3, 3, 3]), 0.0);
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(round_to(0.0625, 3), 0.063);
        assert_eq!(round_to(-0.0625, 3), -0.063);
        assert_eq!(round_to(4.5, 0), 5.0);
        assert_eq!(round_to(1.23449, 3), 1.234);
    }

    #[test]
    fn test_sequence_sums() {
        let sequences = vec![vec![1, 2, 3], vec![], vec![4, 5, 6]];
        assert_eq!(sequence_sums(&sequences), vec![6, 0, 15]);
        assert_eq!(rounded_std_dev_of_sums(&[6, 15]), 4.5);
        assert_eq!(rounded_std_dev_of_sums(&[]), 0.0);
    }

    #[test]
    fn test_sequence_sums_do_not_overflow() {
        let sequences = vec![vec![i64::MAX, 1], vec![i64::MIN, -1], vec![i64::MAX; 1000]];
        let sums = sequence_sums(&sequences);
        assert_eq!(sums[0], i128::from(i64::MAX) + 1);
        assert_eq!(sums[1], i128::from(i64::MIN) - 1);
        assert_eq!(sums[2], i128::from(i64::MAX) * 1000);
        assert!(rounded_std_dev_of_sums(&sums).is_finite());
    }

    #[test]
    fn test_recomputation_is_bit_identical() {
        let data: Vec<i64> = (0..1000).map(|i| (i * 7919 % 10) + 1).collect();
        let first = rounded_std_dev(&data);
        let second = rounded_std_dev(&data);
        assert_eq!(first.to_bits(), second.to_bits());
    }
}
