//! # noisetag algorithms
//!
//! Detection of high-noise regions in radio-interferometric noise maps.
//!
//! ## Modules
//!
//! - **statistics**: per-tile standard deviation, NaN-aware percentile,
//!   skewness, flux ratio and the outlier threshold
//! - **geometry**: convex regions, separating-axis adjacency, fixed-point merging
//! - **filters**: exclusion zones and the region filter pipeline
//! - **tagger**: the end-to-end pipeline and its configuration
//! - **catalog**: tagging sky sources that fall inside tagged regions

pub mod catalog;
pub mod filters;
pub mod geometry;
pub(crate) mod maybe_rayon;
pub mod observer;
pub mod statistics;
pub mod tagger;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::catalog::{tag_markers, tag_sources, SkySource};
    pub use crate::filters::{DiscardCounts, ExclusionZone, FilterPipeline, RegionFilter};
    pub use crate::geometry::{
        is_adjacent, merge_regions, merge_regions_observed, ConvexRegion, Facing, MergeOutcome,
        MergeParams, DEFAULT_TOLERANCE,
    };
    pub use crate::observer::{LogObserver, NoopObserver, PipelineObserver};
    pub use crate::statistics::{
        flux_ratio, nan_percentile, tile_statistics, Moments, StatisticGrid, Threshold,
        TileParams, TileStatistics,
    };
    pub use crate::tagger::{candidate_regions, tag_regions, NoiseTagger, TagResult, TaggerConfig};
    pub use noisetag_core::prelude::*;
}
