/// Quantile reported for every method.
pub const P95: f64 = 0.95;

/// p95 latency of a copied sample set, nearest-rank.
///
/// Sorts ascending and picks the element at 1-indexed rank
/// `ceil(0.95 × n)`. Returns `0.0` when there are no samples.
pub fn p95(mut samples: Vec<f64>) -> f64 {
    samples.sort_unstable_by(f64::total_cmp);
    nearest_rank(&samples, P95)
}

/// Nearest-rank order statistic over an ascending slice.
///
/// The rank is `ceil(quantile × n)` clamped to `[1, n]`. Ceiling, not
/// rounding, and no interpolation between neighbouring ranks.
pub fn nearest_rank(sorted: &[f64], quantile: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }

    let n = sorted.len();
    let rank = (quantile * n as f64).ceil() as usize;
    let rank = rank.clamp(1, n);
    sorted[rank - 1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_is_zero() {
        assert_eq!(p95(Vec::new()), 0.0);
    }

    #[test]
    fn five_samples_pick_the_last() {
        assert_eq!(p95(vec![30.0, 10.0, 50.0, 20.0, 40.0]), 50.0);
    }

    #[test]
    fn single_sample() {
        assert_eq!(p95(vec![7.5]), 7.5);
    }

    #[test]
    fn uses_ceiling_not_rounding() {
        // 0.95 * 13 = 12.35 → rank 13 (rounding would pick 12)
        let samples: Vec<f64> = (1..=13).map(f64::from).collect();
        assert_eq!(p95(samples), 13.0);

        // 0.95 * 100 = 95 → rank 95
        let samples: Vec<f64> = (1..=100).map(f64::from).collect();
        assert_eq!(p95(samples), 95.0);

        // 0.95 * 20 = 19 → rank 19
        let samples: Vec<f64> = (1..=20).map(f64::from).collect();
        assert_eq!(p95(samples), 19.0);
    }

    #[test]
    fn rank_is_clamped() {
        let sorted = [1.0, 2.0, 3.0];
        assert_eq!(nearest_rank(&sorted, 0.0), 1.0);
        assert_eq!(nearest_rank(&sorted, 1.5), 3.0);
    }
}
