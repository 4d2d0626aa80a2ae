//! Tile statistic grid
//!
//! Partitions a square image into `tile_size × tile_size` tiles (the last
//! tile along each axis is clipped to the image extent) and computes the
//! population standard deviation of the valid pixels inside each tile.

use crate::maybe_rayon::*;
use ndarray::Array2;
use noisetag_core::raster::Raster;
use noisetag_core::{Algorithm, Error, Result};
use std::ops::Range;

use super::moments::Moments;

/// Parameters for tile statistics
#[derive(Debug, Clone)]
pub struct TileParams {
    /// Tile side length in pixels
    pub tile_size: usize,
}

impl Default for TileParams {
    fn default() -> Self {
        Self { tile_size: 80 }
    }
}

/// Per-tile dispersion statistics over a square image.
///
/// Immutable once built. Tile `(row, col)` covers image rows
/// `lower_bounds[row]..upper_bounds[row]` and columns
/// `lower_bounds[col]..upper_bounds[col]`; the same bounds serve both axes
/// because the image is square.
#[derive(Debug, Clone)]
pub struct StatisticGrid {
    tile_size: usize,
    lower_bounds: Vec<usize>,
    upper_bounds: Vec<usize>,
    values: Array2<f64>,
}

impl StatisticGrid {
    /// Tile side length in pixels
    pub fn tile_size(&self) -> usize {
        self.tile_size
    }

    /// Inclusive lower pixel bound of each tile along an axis
    pub fn lower_bounds(&self) -> &[usize] {
        &self.lower_bounds
    }

    /// Exclusive upper pixel bound of each tile along an axis
    pub fn upper_bounds(&self) -> &[usize] {
        &self.upper_bounds
    }

    /// Per-tile statistic, indexed `(row, col)`; NaN for fully blanked tiles
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Number of tiles along each axis
    pub fn tiles_per_axis(&self) -> usize {
        self.lower_bounds.len()
    }

    /// Statistic of tile `(row, col)`
    pub fn value(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get((row, col)).copied()
    }

    /// Pixel ranges `(rows, cols)` covered by tile `(row, col)`
    pub fn tile_span(&self, row: usize, col: usize) -> (Range<usize>, Range<usize>) {
        (
            self.lower_bounds[row]..self.upper_bounds[row],
            self.lower_bounds[col]..self.upper_bounds[col],
        )
    }

    /// Pixel area of tile `(row, col)`
    pub fn tile_area(&self, row: usize, col: usize) -> usize {
        let (rows, cols) = self.tile_span(row, col);
        rows.len() * cols.len()
    }

    /// Nominal area of an unclipped tile
    pub fn full_tile_area(&self) -> f64 {
        (self.tile_size * self.tile_size) as f64
    }
}

/// Tile boundaries along one axis of length `extent`.
///
/// Lower bounds step by `tile_size` from 0; upper bounds are clipped to `extent`.
pub fn tile_bounds(extent: usize, tile_size: usize) -> (Vec<usize>, Vec<usize>) {
    let lower: Vec<usize> = (0..extent).step_by(tile_size.max(1)).collect();
    let upper = lower.iter().map(|&l| (l + tile_size).min(extent)).collect();
    (lower, upper)
}

/// Tile statistics algorithm
#[derive(Debug, Clone, Default)]
pub struct TileStatistics;

impl Algorithm for TileStatistics {
    type Input = Raster<f64>;
    type Output = StatisticGrid;
    type Params = TileParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "TileStatistics"
    }

    fn description(&self) -> &'static str {
        "Standard deviation of valid pixels over a grid of square tiles"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        tile_statistics(&input, params)
    }
}

/// Compute the tile statistic grid of a square image
///
/// # Errors
/// - [`Error::Configuration`] if `tile_size` is 0
/// - [`Error::Shape`] if the image is not square
pub fn tile_statistics(image: &Raster<f64>, params: TileParams) -> Result<StatisticGrid> {
    if params.tile_size == 0 {
        return Err(Error::config("tile_size", 0, "must be > 0"));
    }
    let extent = image.square_size()?;

    let (lower_bounds, upper_bounds) = tile_bounds(extent, params.tile_size);
    let n = lower_bounds.len();

    let values: Vec<f64> = (0..n * n)
        .into_par_iter()
        .map(|idx| {
            let (row, col) = (idx / n, idx % n);
            let window = image.window(
                lower_bounds[row]..upper_bounds[row],
                lower_bounds[col]..upper_bounds[col],
            );
            let valid = window.iter().copied().filter(|&v| !image.is_nodata(v));
            Moments::from_values(valid).std_dev()
        })
        .collect();

    let values = Array2::from_shape_vec((n, n), values).map_err(|e| Error::Other(e.to_string()))?;

    Ok(StatisticGrid {
        tile_size: params.tile_size,
        lower_bounds,
        upper_bounds,
        values,
    })
}
