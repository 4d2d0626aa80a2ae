//! # noisetag core
//!
//! Core types, traits and I/O for the noisetag high-noise region tagger.
//!
//! This crate provides:
//! - `Raster<T>`: a 2D image slice with an attached coordinate frame
//! - `CoordinateFrame` / `AffineFrame`: pixel ↔ sky transforms
//! - `Error`: the error taxonomy shared by every stage
//! - I/O for noise maps (TIFF) and DS9 region overlays

pub mod error;
pub mod frame;
pub mod io;
pub mod raster;

pub use error::{Error, Result};
pub use frame::{AffineFrame, CoordinateFrame};
pub use raster::{Raster, RasterElement};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::frame::{AffineFrame, CoordinateFrame};
    pub use crate::raster::{Raster, RasterElement};
    pub use crate::Algorithm;
}

/// Core trait for the tagging stages.
///
/// Algorithms are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(
        &self,
        input: Self::Input,
        params: Self::Params,
    ) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(
        &self,
        input: Self::Input,
    ) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
