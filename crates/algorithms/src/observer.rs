//! Pipeline checkpoints
//!
//! The tagging pipeline reports progress through a [`PipelineObserver`]
//! passed in by the caller. Every method has a no-op default, so an observer
//! only implements the checkpoints it cares about.

use tracing::{debug, info};

use crate::filters::RegionFilter;
use crate::geometry::ConvexRegion;
use crate::statistics::{StatisticGrid, Threshold};

/// Receives pipeline checkpoints
pub trait PipelineObserver {
    /// The tile statistic grid has been built
    fn grid_built(&mut self, _grid: &StatisticGrid) {}

    /// The global reference and cutoff are known
    fn threshold_computed(&mut self, _threshold: &Threshold) {}

    /// One candidate region per outlier tile has been created
    fn candidates_found(&mut self, _count: usize) {}

    /// `filter` discarded `region`; `metric` is the value it was judged on
    fn region_discarded(&mut self, _filter: &RegionFilter, _region: &ConvexRegion, _metric: f64) {}

    /// `filter` ran over `before` regions and kept `after` of them
    fn filter_applied(&mut self, _filter: &RegionFilter, _before: usize, _after: usize) {}

    /// `members` were replaced by `merged`
    fn regions_merged(&mut self, _members: &[&ConvexRegion], _merged: &ConvexRegion) {}

    /// A merge round finished, taking the set from `before` to `after` regions
    fn merge_round(&mut self, _round: usize, _before: usize, _after: usize) {}

    /// All stages are done; `regions` survived
    fn finished(&mut self, _regions: &[ConvexRegion]) {}
}

/// Observer that ignores every checkpoint
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// Observer that forwards checkpoints to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl PipelineObserver for LogObserver {
    fn grid_built(&mut self, grid: &StatisticGrid) {
        let n = grid.tiles_per_axis();
        info!("Tile statistics: {} x {} tiles of {} px", n, n, grid.tile_size());
    }

    fn threshold_computed(&mut self, threshold: &Threshold) {
        info!(
            "Global reference ({}th percentile): {:.6}, cutoff at {}x: {:.6}",
            threshold.percentile, threshold.reference, threshold.sigma, threshold.cutoff
        );
    }

    fn candidates_found(&mut self, count: usize) {
        info!("{} tiles above cutoff", count);
    }

    fn region_discarded(&mut self, filter: &RegionFilter, region: &ConvexRegion, metric: f64) {
        info!("Discarded {} ({}: {:.3})", region, filter.name(), metric);
    }

    fn filter_applied(&mut self, filter: &RegionFilter, before: usize, after: usize) {
        info!("Filter {}: kept {} of {} regions", filter.name(), after, before);
    }

    fn regions_merged(&mut self, members: &[&ConvexRegion], merged: &ConvexRegion) {
        debug!("Merged {} regions into '{}'", members.len(), merged.label());
    }

    fn merge_round(&mut self, round: usize, before: usize, after: usize) {
        debug!("Merge round {}: {} -> {} regions", round, before, after);
    }

    fn finished(&mut self, regions: &[ConvexRegion]) {
        info!("{} regions survived", regions.len());
    }
}
