//! Statistical building blocks for noise-map tagging
//!
//! - **tiles**: per-tile dispersion statistic grid
//! - **percentile**: NaN-aware percentile
//! - **moments**: NaN-aware standard deviation, skewness and flux balance
//! - **threshold**: global noise reference and outlier cutoff

pub mod moments;
pub mod percentile;
pub mod threshold;
pub mod tiles;

pub use moments::{flux_ratio, Moments};
pub use percentile::nan_percentile;
pub use threshold::Threshold;
pub use tiles::{tile_bounds, tile_statistics, StatisticGrid, TileParams, TileStatistics};
