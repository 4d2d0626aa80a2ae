//! Error types for noisetag

use thiserror::Error;

/// Main error type for noisetag operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image must be square, got {rows}x{cols}")]
    Shape { rows: usize, cols: usize },

    #[error("Missing required coordinate axis: {0}")]
    MissingAxis(String),

    #[error("Convex hull needs at least 3 non-collinear points, got {points} usable")]
    DegenerateGeometry { points: usize },

    #[error("Invalid configuration: {name} = {value} ({reason})")]
    Configuration {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("No finite tile statistics to derive a noise reference from")]
    EmptyStatistics,

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for a [`Error::Configuration`] failure
    pub fn config(name: &'static str, value: impl ToString, reason: impl Into<String>) -> Self {
        Error::Configuration {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for noisetag operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_message() {
        let err = Error::config("tile_size", 0, "must be > 0");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: tile_size = 0 (must be > 0)"
        );
    }

    #[test]
    fn test_shape_message() {
        let err = Error::Shape { rows: 10, cols: 12 };
        assert_eq!(err.to_string(), "Image must be square, got 10x12");
    }
}
