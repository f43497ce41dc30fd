//! Per-band summary statistics over a coverage.

use serde::{Deserialize, Serialize};

use crate::raster::GeophysicalView;

/// Keys of a serialized [`LayerStatistics`], in output order.
pub const STAT_KEYS: [&str; 4] = ["min", "max", "mean", "stddev"];

/// Distribution summary of one raster layer, one entry per band.
///
/// A band with no valid samples reports `min = +inf`, `max = -inf` and NaN
/// for `mean` and `stddev`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerStatistics {
    pub min: Vec<f64>,
    pub max: Vec<f64>,
    pub mean: Vec<f64>,
    pub stddev: Vec<f64>,
}

impl LayerStatistics {
    pub fn num_bands(&self) -> usize {
        self.min.len()
    }

    /// Values for one of [`STAT_KEYS`].
    pub fn get(&self, key: &str) -> Option<&[f64]> {
        match key {
            "min" => Some(&self.min),
            "max" => Some(&self.max),
            "mean" => Some(&self.mean),
            "stddev" => Some(&self.stddev),
            _ => None,
        }
    }
}

/// Running moments for a single band (Welford).
#[derive(Debug, Clone, Copy)]
struct BandAccumulator {
    count: u64,
    min: f64,
    max: f64,
    mean: f64,
    /// Sum of squared deviations from the running mean.
    m2: f64,
}

impl BandAccumulator {
    fn new() -> Self {
        Self {
            count: 0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            mean: 0.0,
            m2: 0.0,
        }
    }

    fn add(&mut self, value: f64) {
        self.count += 1;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    /// Running mean, kept inside `[min, max]`.
    fn mean(&self) -> f64 {
        if self.count == 0 {
            return f64::NAN;
        }
        self.mean.clamp(self.min, self.max)
    }

    /// Population standard deviation.
    fn stddev(&self) -> f64 {
        if self.count == 0 {
            return f64::NAN;
        }
        (self.m2 / self.count as f64).max(0.0).sqrt()
    }
}

/// Compute min, max, mean and population standard deviation per band.
///
/// Cells the view reports as missing are skipped.
pub fn compute(view: &GeophysicalView<'_>) -> LayerStatistics {
    let bands = view.num_bands();
    let mut stats = LayerStatistics {
        min: Vec::with_capacity(bands),
        max: Vec::with_capacity(bands),
        mean: Vec::with_capacity(bands),
        stddev: Vec::with_capacity(bands),
    };

    for band in 0..bands {
        let mut acc = BandAccumulator::new();
        view.band(band).flatten().for_each(|v| acc.add(v));

        tracing::trace!(band, samples = acc.count, "Band accumulated");

        stats.min.push(acc.min);
        stats.max.push(acc.max);
        stats.mean.push(acc.mean());
        stats.stddev.push(acc.stddev());
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{Coverage, SampleDimension, ViewType};
    use hazard_common::{BoundingBox, Crs, ReferencedEnvelope};

    fn coverage(bands: Vec<Vec<f64>>, dims: Vec<SampleDimension>, mask: Option<Vec<bool>>) -> Coverage {
        let cells = bands[0].len();
        Coverage::new(
            cells,
            1,
            bands,
            dims,
            mask,
            ViewType::Packed,
            ReferencedEnvelope::new(BoundingBox::new(0.0, 0.0, cells as f64, 1.0), Crs::wgs84()),
        )
        .unwrap()
    }

    #[test]
    fn test_constant_band() {
        let cov = coverage(vec![vec![5.0]], vec![], None);
        let stats = compute(&cov.geophysics());
        assert_eq!(stats.min, vec![5.0]);
        assert_eq!(stats.max, vec![5.0]);
        assert_eq!(stats.mean, vec![5.0]);
        assert_eq!(stats.stddev, vec![0.0]);
    }

    #[test]
    fn test_population_stddev() {
        let cov = coverage(vec![vec![0.0, 1.0, 2.0, 3.0]], vec![], None);
        let stats = compute(&cov.geophysics());
        assert_eq!(stats.min, vec![0.0]);
        assert_eq!(stats.max, vec![3.0]);
        assert_eq!(stats.mean, vec![1.5]);
        assert!((stats.stddev[0] - 1.25f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_stddev_never_negative_from_rounding() {
        let cov = coverage(vec![vec![0.1; 7]], vec![], None);
        let stats = compute(&cov.geophysics());
        assert!(stats.stddev[0] >= 0.0);
        assert!(stats.stddev[0] < 1e-6);
    }

    #[test]
    fn test_mean_stays_within_range() {
        let cov = coverage(
            vec![vec![0.1; 10], vec![0.1, 0.2, 0.3, 0.7, 0.3, 0.1, 0.9, 0.3, 0.3, 0.1]],
            vec![],
            None,
        );
        let stats = compute(&cov.geophysics());
        for band in 0..stats.num_bands() {
            assert!(stats.min[band] <= stats.mean[band], "band {}: {:?}", band, stats);
            assert!(stats.mean[band] <= stats.max[band], "band {}: {:?}", band, stats);
        }
        assert_eq!(stats.mean[0], 0.1);
    }

    #[test]
    fn test_stddev_with_large_common_offset() {
        let cov = coverage(vec![vec![1e8, 1e8 + 1.0, 1e8, 1e8 + 1.0]], vec![], None);
        let stats = compute(&cov.geophysics());
        assert!((stats.mean[0] - (1e8 + 0.5)).abs() < 1e-6);
        assert!((stats.stddev[0] - 0.5).abs() < 1e-9, "stddev {}", stats.stddev[0]);
    }

    #[test]
    fn test_masked_cells_excluded() {
        let dim = SampleDimension::new("b").with_no_data(-1.0);
        let cov = coverage(
            vec![vec![-1.0, 2.0, 4.0, 100.0, f64::NAN]],
            vec![dim],
            Some(vec![true, true, true, false, true]),
        );
        let stats = compute(&cov.geophysics());
        assert_eq!(stats.min, vec![2.0]);
        assert_eq!(stats.max, vec![4.0]);
        assert_eq!(stats.mean, vec![3.0]);
        assert_eq!(stats.stddev, vec![1.0]);
    }

    #[test]
    fn test_empty_band_sentinels() {
        let dim = SampleDimension::new("b").with_no_data(0.0);
        let cov = coverage(vec![vec![0.0, 0.0]], vec![dim], None);
        let stats = compute(&cov.geophysics());
        assert_eq!(stats.min, vec![f64::INFINITY]);
        assert_eq!(stats.max, vec![f64::NEG_INFINITY]);
        assert!(stats.mean[0].is_nan());
        assert!(stats.stddev[0].is_nan());
    }

    #[test]
    fn test_multi_band_lengths_match() {
        let cov = coverage(
            vec![vec![1.0, 3.0], vec![10.0, 10.0], vec![-2.0, 2.0]],
            vec![],
            None,
        );
        let stats = compute(&cov.geophysics());
        for key in STAT_KEYS {
            assert_eq!(stats.get(key).unwrap().len(), 3);
        }
        assert_eq!(stats.mean, vec![2.0, 10.0, 0.0]);
        assert_eq!(stats.stddev, vec![1.0, 0.0, 2.0]);
        assert!(stats.get("median").is_none());
    }

    #[test]
    fn test_serialized_keys() {
        let cov = coverage(vec![vec![1.0]], vec![], None);
        let value = serde_json::to_value(compute(&cov.geophysics())).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        let mut expected: Vec<_> = STAT_KEYS.iter().map(|k| k.to_string()).collect();
        expected.sort();
        let mut keys = keys;
        keys.sort();
        assert_eq!(keys, expected);
    }
}
