/// Upper bounds used for stage duration buckets, in seconds. An implicit `+Inf` bucket follows.
pub const DEFAULT_BUCKETS: [f64; 14] = [
    0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5, 10.0,
];

/// Distribution of observed durations for one stage.
///
/// Bucket counts are stored per bucket, not cumulatively. The last bucket has an upper bound of
/// [f64::INFINITY] and catches everything above the largest finite bound.
#[derive(Debug, Clone, PartialEq)]
pub struct DurationHistogram {
    buckets: Vec<(f64, u64)>,
    count: u64,
    sum: f64,
}

impl Default for DurationHistogram {
    fn default() -> Self {
        Self::with_bounds(&DEFAULT_BUCKETS)
    }
}

impl DurationHistogram {
    /// Create a histogram with the given finite, ascending upper bounds.
    pub fn with_bounds(bounds: &[f64]) -> Self {
        let buckets = bounds
            .iter()
            .copied()
            .chain(std::iter::once(f64::INFINITY))
            .map(|bound| (bound, 0))
            .collect();

        Self {
            buckets,
            count: 0,
            sum: 0.0,
        }
    }

    pub fn observe(&mut self, value: f64) {
        if let Some((_, bucket)) = self.buckets.iter_mut().find(|(bound, _)| value <= *bound) {
            *bucket += 1;
        }
        self.count += 1;
        self.sum += value;
    }

    /// Number of observations.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Sum of all observed values.
    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// `(upper_bound, count)` pairs, ending with the `+Inf` bucket.
    pub fn buckets(&self) -> &[(f64, u64)] {
        &self.buckets
    }
}
