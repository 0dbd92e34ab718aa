//! Percentile Computation
//!
//! Linear interpolation between nearest ranks, matching the convention the
//! external tooling's consumers expect from `numpy.percentile`.

/// Compute a single percentile from samples.
///
/// Sorts a copy of the input, so the result is independent of sample ordering.
/// Empty input yields 0.0.
pub fn compute_percentile(samples: &[f64], percentile: f64) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    // Interpolate between the two ranks straddling the requested point
    let position = (percentile / 100.0) * (sorted.len() - 1) as f64;
    let below = position.floor() as usize;
    let above = (below + 1).min(sorted.len() - 1);
    let weight = position - below as f64;

    sorted[below] * (1.0 - weight) + sorted[above] * weight
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_of_odd_count() {
        let samples = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((compute_percentile(&samples, 50.0) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_median_interpolates_even_count() {
        let samples = vec![1.0, 2.0, 3.0, 4.0];
        assert!((compute_percentile(&samples, 50.0) - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_order_independent() {
        let sorted = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let shuffled = vec![4.0, 1.0, 5.0, 3.0, 2.0];
        assert_eq!(
            compute_percentile(&sorted, 50.0),
            compute_percentile(&shuffled, 50.0)
        );
    }

    #[test]
    fn test_single_sample() {
        assert_eq!(compute_percentile(&[42.0], 50.0), 42.0);
    }

    #[test]
    fn test_empty_samples() {
        assert_eq!(compute_percentile(&[], 50.0), 0.0);
    }

    #[test]
    fn test_extremes() {
        let samples: Vec<f64> = (1..=100).map(|x| x as f64).collect();
        assert_eq!(compute_percentile(&samples, 0.0), 1.0);
        assert_eq!(compute_percentile(&samples, 100.0), 100.0);
    }
}
