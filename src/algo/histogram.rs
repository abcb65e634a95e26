//! Weighted histogram binning.

/// Accumulate weighted samples into bins bounded by ascending edges.
///
/// Bin `i` spans `[edges[i], edges[i+1])`; the final bin also includes its
/// right edge, so the full edge range is covered with nothing lost at the
/// top. Samples outside the edge range are dropped. The returned vector has
/// `edges.len() - 1` entries holding the summed weights per bin.
///
/// # Panics
///
/// If `samples` and `weights` differ in length, or fewer than two edges are
/// given. Edges are assumed strictly ascending (checked in debug builds).
pub fn weighted_histogram(samples: &[f64], weights: &[f64], edges: &[f64]) -> Vec<f64> {
    assert_eq!(samples.len(), weights.len(), "every sample needs a weight");
    assert!(edges.len() >= 2, "histogram needs at least one bin");
    debug_assert!(edges.windows(2).all(|pair| pair[0] < pair[1]));

    let last = edges[edges.len() - 1];
    let mut binned = vec![0.0; edges.len() - 1];

    for (&x, &w) in samples.iter().zip(weights) {
        if x < edges[0] || x > last {
            continue;
        }
        let bin = if x == last {
            binned.len() - 1
        } else {
            edges.partition_point(|&edge| edge <= x) - 1
        };
        binned[bin] += w;
    }

    binned
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_weight_conservation() {
        let samples = vec![0.5, 1.5, 2.5, 3.5, 3.9];
        let weights = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let edges = vec![0.0, 1.0, 2.0, 3.0, 4.0];

        let binned = weighted_histogram(&samples, &weights, &edges);

        assert_eq!(binned, vec![1.0, 2.0, 3.0, 9.0]);
        let total: f64 = binned.iter().sum();
        assert_relative_eq!(total, 15.0);
    }

    #[test]
    fn test_out_of_range_dropped() {
        let samples = vec![-1.0, 0.5, 7.0];
        let weights = vec![10.0, 1.0, 10.0];
        let edges = vec![0.0, 1.0];

        let binned = weighted_histogram(&samples, &weights, &edges);

        assert_eq!(binned, vec![1.0]);
    }

    #[test]
    fn test_boundary_sample_goes_right() {
        // A sample sitting exactly on an interior edge belongs to the bin
        // on its right.
        let samples = vec![1.0];
        let weights = vec![1.0];
        let edges = vec![0.0, 1.0, 2.0];

        let binned = weighted_histogram(&samples, &weights, &edges);

        assert_eq!(binned, vec![0.0, 1.0]);
    }

    #[test]
    fn test_last_edge_inclusive() {
        let samples = vec![2.0];
        let weights = vec![3.0];
        let edges = vec![0.0, 1.0, 2.0];

        let binned = weighted_histogram(&samples, &weights, &edges);

        assert_eq!(binned, vec![0.0, 3.0]);
    }

    #[test]
    fn test_first_edge_inclusive() {
        let samples = vec![0.0];
        let weights = vec![2.0];
        let edges = vec![0.0, 1.0];

        let binned = weighted_histogram(&samples, &weights, &edges);

        assert_eq!(binned, vec![2.0]);
    }
}
