//! Main Raster type

use crate::error::{Error, Result};
use crate::frame::AffineFrame;
use crate::raster::RasterElement;
use ndarray::{s, Array2, ArrayView2};
use std::ops::Range;

/// A 2D image slice with an attached coordinate frame.
///
/// `Raster<T>` stores pixel values in row-major order: row index is the image
/// `y` axis, column index the image `x` axis.
///
/// # Example
///
/// ```ignore
/// use noisetag_core::Raster;
///
/// let mut raster: Raster<f64> = Raster::new(160, 160);
/// raster.set(10, 20, 0.5)?;
/// let value = raster.get(10, 20)?;
/// ```
#[derive(Debug, Clone)]
pub struct Raster<T: RasterElement> {
    /// Pixel data stored as (row, col)
    data: Array2<T>,
    /// Pixel to sky transform
    frame: AffineFrame,
    /// No-data value (NaN is always treated as no-data)
    nodata: Option<T>,
}

impl<T: RasterElement> Raster<T> {
    /// Create a new raster filled with zeros
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::from_array(Array2::zeros((rows, cols)))
    }

    /// Create a new raster filled with a specific value
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self::from_array(Array2::from_elem((rows, cols), value))
    }

    /// Create a raster from row-major data
    pub fn from_vec(data: Vec<T>, rows: usize, cols: usize) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }

        let array = Array2::from_shape_vec((rows, cols), data)
            .map_err(|e| Error::Other(e.to_string()))?;

        Ok(Self::from_array(array))
    }

    /// Create a raster from an ndarray.
    ///
    /// The frame is the pixel identity, referenced on the image centre.
    pub fn from_array(data: Array2<T>) -> Self {
        let frame = AffineFrame::identity().recentred(data.ncols(), data.nrows());
        Self {
            data,
            frame,
            nodata: None,
        }
    }

    // Dimensions

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Total number of pixels
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the raster is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Side length of a square raster, or [`Error::Shape`] otherwise
    pub fn square_size(&self) -> Result<usize> {
        let (rows, cols) = self.shape();
        if rows != cols {
            return Err(Error::Shape { rows, cols });
        }
        Ok(rows)
    }

    // Data access

    /// Get value at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        self.data
            .get((row, col))
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            })
    }

    /// Set value at (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        if row >= self.rows() || col >= self.cols() {
            return Err(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            });
        }
        self.data[(row, col)] = value;
        Ok(())
    }

    /// View of the rectangular window `rows × cols`, clipped to the raster extent
    pub fn window(&self, rows: Range<usize>, cols: Range<usize>) -> ArrayView2<'_, T> {
        let r0 = rows.start.min(self.rows());
        let r1 = rows.end.clamp(r0, self.rows());
        let c0 = cols.start.min(self.cols());
        let c1 = cols.end.clamp(c0, self.cols());
        self.data.slice(s![r0..r1, c0..c1])
    }

    // Metadata

    /// Get the coordinate frame
    pub fn frame(&self) -> &AffineFrame {
        &self.frame
    }

    /// Set the coordinate frame
    pub fn set_frame(&mut self, frame: AffineFrame) {
        self.frame = frame;
    }

    /// Get the no-data value
    pub fn nodata(&self) -> Option<T> {
        self.nodata
    }

    /// Set the no-data value
    pub fn set_nodata(&mut self, nodata: Option<T>) {
        self.nodata = nodata;
    }

    /// Check if a value is no-data
    pub fn is_nodata(&self, value: T) -> bool {
        value.is_nodata(self.nodata)
    }

    // Statistics

    /// Basic statistics over valid pixels (min, max, mean, counts)
    pub fn statistics(&self) -> RasterStatistics<T> {
        let mut min: Option<T> = None;
        let mut max: Option<T> = None;
        let mut sum: f64 = 0.0;
        let mut count: usize = 0;

        for &value in self.data.iter() {
            if self.is_nodata(value) {
                continue;
            }

            min = Some(min.map_or(value, |m| m.min(value)));
            max = Some(max.map_or(value, |m| m.max(value)));

            if let Some(v) = value.to_f64() {
                sum += v;
                count += 1;
            }
        }

        let mean = if count > 0 {
            Some(sum / count as f64)
        } else {
            None
        };

        RasterStatistics {
            min,
            max,
            mean,
            valid_count: count,
            nodata_count: self.len() - count,
        }
    }
}

/// Basic statistics for a raster
#[derive(Debug, Clone)]
pub struct RasterStatistics<T> {
    pub min: Option<T>,
    pub max: Option<T>,
    pub mean: Option<f64>,
    pub valid_count: usize,
    pub nodata_count: usize,
}
