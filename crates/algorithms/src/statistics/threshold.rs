//! Global noise reference and per-tile outlier cutoff
//!
//! The reference is a percentile of all tile statistics, so that a handful
//! of badly affected tiles cannot inflate the noise floor the way a plain
//! mean would. A tile is an outlier when its own statistic exceeds
//! `reference * sigma`.

use noisetag_core::{Error, Result};
use serde::{Deserialize, Serialize};

use super::percentile::nan_percentile;
use super::tiles::StatisticGrid;

/// Noise reference and cutoff derived from a statistic grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    /// Percentile (0-100) of tile statistics used as the reference
    pub percentile: f64,
    /// Multiplier applied to the reference
    pub sigma: f64,
    /// Global noise reference
    pub reference: f64,
    /// Tiles with a statistic strictly above this are outliers
    pub cutoff: f64,
}

impl Threshold {
    /// Compute the threshold for `grid`
    ///
    /// # Errors
    /// - [`Error::Configuration`] for a percentile outside 0-100 or `sigma <= 0`
    /// - [`Error::EmptyStatistics`] when every tile statistic is NaN
    pub fn compute(grid: &StatisticGrid, percentile: f64, sigma: f64) -> Result<Self> {
        if !(0.0..=100.0).contains(&percentile) {
            return Err(Error::config(
                "global_stat_percentile",
                percentile,
                "must be between 0 and 100",
            ));
        }
        if !(sigma > 0.0) || !sigma.is_finite() {
            return Err(Error::config("sigma", sigma, "must be a positive number"));
        }

        let reference = nan_percentile(grid.values().iter().copied(), percentile)
            .ok_or(Error::EmptyStatistics)?;

        Ok(Self {
            percentile,
            sigma,
            reference,
            cutoff: reference * sigma,
        })
    }

    /// Whether a tile statistic is an outlier
    pub fn exceeds(&self, value: f64) -> bool {
        value > self.cutoff
    }

    /// Severity of a tile statistic relative to the reference
    pub fn severity(&self, value: f64) -> f64 {
        value / self.reference
    }

    /// Outlier tiles of `grid` as `(row, col)`, in row-major order
    pub fn outliers(&self, grid: &StatisticGrid) -> Vec<(usize, usize)> {
        grid.values()
            .indexed_iter()
            .filter(|(_, v)| self.exceeds(**v))
            .map(|(idx, _)| idx)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics::tiles::{tile_statistics, TileParams};
    use noisetag_core::Raster;

    /// 4x4 tiles of size 2; tile statistic equals `amp[row][col]`
    fn grid_with(amp: [[f64; 4]; 4]) -> StatisticGrid {
        let mut image = Raster::new(8, 8);
        for row in 0..8 {
            for col in 0..8 {
                let sign = if (row + col) % 2 == 0 { 1.0 } else { -1.0 };
                image.set(row, col, sign * amp[row / 2][col / 2]).unwrap();
            }
        }
        tile_statistics(&image, TileParams { tile_size: 2 }).unwrap()
    }

    #[test]
    fn test_reference_and_cutoff() {
        let mut amp = [[1.0; 4]; 4];
        amp[0][3] = 5.0;
        amp[2][1] = 2.5;
        let grid = grid_with(amp);

        let t = Threshold::compute(&grid, 50.0, 2.0).unwrap();
        assert!((t.reference - 1.0).abs() < 1e-12);
        assert!((t.cutoff - 2.0).abs() < 1e-12);
        assert_eq!(t.outliers(&grid), vec![(0, 3), (2, 1)]);
        assert!((t.severity(5.0) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_cutoff_is_strict() {
        let mut amp = [[1.0; 4]; 4];
        amp[1][1] = 2.0;
        let grid = grid_with(amp);

        let t = Threshold::compute(&grid, 50.0, 2.0).unwrap();
        assert!(t.outliers(&grid).is_empty());
    }

    #[test]
    fn test_invalid_parameters() {
        let grid = grid_with([[1.0; 4]; 4]);
        assert!(matches!(
            Threshold::compute(&grid, 101.0, 2.0),
            Err(Error::Configuration { .. })
        ));
        assert!(matches!(
            Threshold::compute(&grid, 50.0, 0.0),
            Err(Error::Configuration { .. })
        ));
        assert!(matches!(
            Threshold::compute(&grid, 50.0, f64::NAN),
            Err(Error::Configuration { .. })
        ));
    }

    #[test]
    fn test_all_blank_grid() {
        let image = Raster::filled(4, 4, f64::NAN);
        let grid = tile_statistics(&image, TileParams { tile_size: 2 }).unwrap();
        assert!(matches!(
            Threshold::compute(&grid, 50.0, 2.0),
            Err(Error::EmptyStatistics)
        ));
    }
}
