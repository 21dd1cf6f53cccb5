/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Computes the population standard deviation given a pre-computed mean.
/// Returns 0.0 for empty input.
pub fn stddev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;

    variance.sqrt()
}

/// Σ(value × weight) / Σ(weight) over `(value, weight)` pairs.
/// Returns 0.0 when the weights sum to zero, including for empty input.
pub fn weighted_mean(pairs: impl IntoIterator<Item = (f64, f64)>) -> f64 {
    let (weighted_total, weight_sum) = pairs
        .into_iter()
        .fold((0.0, 0.0), |(total, sum), (value, weight)| {
            (total + value * weight, sum + weight)
        });

    if weight_sum == 0.0 {
        0.0
    } else {
        weighted_total / weight_sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_mean_and_stddev() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let avg = mean(&values);
        assert_eq!(avg, 5.0);
        assert_eq!(stddev(&values, avg), 2.0);
    }

    #[test]
    fn test_weighted_mean() {
        assert_eq!(weighted_mean([(10.0, 2.0), (16.0, 1.0)]), 12.0);
    }

    #[test]
    fn test_weighted_mean_zero_weights() {
        assert_eq!(weighted_mean([(18.0, 0.0), (12.0, 0.0)]), 0.0);
        assert_eq!(weighted_mean(std::iter::empty()), 0.0);
    }
}
