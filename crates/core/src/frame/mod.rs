//! Pixel ↔ sky coordinate frames
//!
//! Pixel coordinates throughout noisetag are continuous and 0-based: pixel
//! `(col, row)` covers `[col, col + 1) × [row, row + 1)`, so its centre sits at
//! `(col + 0.5, row + 0.5)`. World coordinates are `(ra, dec)` in degrees.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A transform between pixel and world (sky) coordinates.
///
/// The tagging core never interprets the frame; it is carried on regions for
/// consumers that need sky positions (catalog tagging) and consulted once to
/// place the phase-centre exclusion zone.
pub trait CoordinateFrame: fmt::Debug + Send + Sync {
    /// Convert a pixel position `(x, y)` to world `(ra, dec)` in degrees
    fn pixel_to_world(&self, x: f64, y: f64) -> (f64, f64);

    /// Convert world `(ra, dec)` in degrees to a pixel position `(x, y)`.
    ///
    /// Returns NaN coordinates when the transform is not invertible.
    fn world_to_pixel(&self, ra: f64, dec: f64) -> (f64, f64);

    /// Pixel position of the frame's reference point (the phase tracking centre)
    fn reference_pixel(&self) -> (f64, f64);
}

/// Linear frame in the FITS `CRPIX`/`CRVAL`/`CD` convention.
///
/// ```text
/// p  = (x + 0.5 - crpix1, y + 0.5 - crpix2)     // FITS pixels are 1-based centres
/// ra  = crval1 + cd11 * p.0 + cd12 * p.1
/// dec = crval2 + cd21 * p.0 + cd22 * p.1
/// ```
///
/// This is the tangent-plane approximation of a SIN projection and is only
/// accurate near the reference point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineFrame {
    /// Reference pixel, 1-based FITS convention (CRPIX1, CRPIX2)
    pub crpix: (f64, f64),
    /// World coordinate at the reference pixel in degrees (CRVAL1, CRVAL2)
    pub crval: (f64, f64),
    /// Linear transform matrix `[[cd11, cd12], [cd21, cd22]]` in degrees per pixel
    pub cd: [[f64; 2]; 2],
}

impl AffineFrame {
    /// Create a frame with no rotation from per-axis increments (CDELT1, CDELT2)
    pub fn new(crpix: (f64, f64), crval: (f64, f64), cdelt: (f64, f64)) -> Self {
        Self {
            crpix,
            crval,
            cd: [[cdelt.0, 0.0], [0.0, cdelt.1]],
        }
    }

    /// Identity frame: world coordinates equal pixel coordinates
    pub fn identity() -> Self {
        Self::new((0.5, 0.5), (0.0, 0.0), (1.0, 1.0))
    }

    /// The same transform re-anchored on the centre of a `cols × rows` image.
    ///
    /// Every pixel keeps its world position; only the reference point moves,
    /// so `reference_pixel` becomes `(cols / 2, rows / 2)`. Maps whose header
    /// ties the frame to a corner use this to put the reference on the
    /// tracking centre.
    pub fn recentred(&self, cols: usize, rows: usize) -> Self {
        let (cx, cy) = (cols as f64 / 2.0, rows as f64 / 2.0);
        Self {
            crpix: (cx + 0.5, cy + 0.5),
            crval: self.pixel_to_world(cx, cy),
            cd: self.cd,
        }
    }

    /// Pixel scale along the first axis in degrees (assumes no rotation)
    pub fn cell_size(&self) -> f64 {
        self.cd[0][0].abs()
    }

    fn determinant(&self) -> f64 {
        self.cd[0][0] * self.cd[1][1] - self.cd[0][1] * self.cd[1][0]
    }
}

impl CoordinateFrame for AffineFrame {
    fn pixel_to_world(&self, x: f64, y: f64) -> (f64, f64) {
        let px = x + 0.5 - self.crpix.0;
        let py = y + 0.5 - self.crpix.1;
        (
            self.crval.0 + self.cd[0][0] * px + self.cd[0][1] * py,
            self.crval.1 + self.cd[1][0] * px + self.cd[1][1] * py,
        )
    }

    fn world_to_pixel(&self, ra: f64, dec: f64) -> (f64, f64) {
        let det = self.determinant();
        if det.abs() < 1e-15 {
            return (f64::NAN, f64::NAN);
        }

        let dra = ra - self.crval.0;
        let ddec = dec - self.crval.1;
        let px = (self.cd[1][1] * dra - self.cd[0][1] * ddec) / det;
        let py = (-self.cd[1][0] * dra + self.cd[0][0] * ddec) / det;

        (px + self.crpix.0 - 0.5, py + self.crpix.1 - 0.5)
    }

    fn reference_pixel(&self) -> (f64, f64) {
        (self.crpix.0 - 0.5, self.crpix.1 - 0.5)
    }
}

impl Default for AffineFrame {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Display for AffineFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CRPIX=({:.2}, {:.2}) CRVAL=({:.6}, {:.6})",
            self.crpix.0, self.crpix.1, self.crval.0, self.crval.1
        )
    }
}
