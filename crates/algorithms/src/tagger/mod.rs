//! End-to-end high-noise region tagging
//!
//! ```text
//! noise map → tile statistics → threshold → one region per outlier tile
//!           → exclusion zones → merge (fixed point, area cutoff)
//!           → skewness / flux rules → surviving regions
//! ```

mod config;

pub use config::TaggerConfig;

use noisetag_core::{Algorithm, CoordinateFrame, Error, Raster, Result};
use std::sync::Arc;

use crate::filters::DiscardCounts;
use crate::geometry::{merge_regions_observed, ConvexRegion};
use crate::observer::{LogObserver, PipelineObserver};
use crate::statistics::{tile_statistics, StatisticGrid, Threshold};

/// Everything a tagging run produced
#[derive(Debug, Clone)]
pub struct TagResult {
    /// Surviving regions, ordered by `(min y, min x, label)`
    pub regions: Vec<ConvexRegion>,
    pub threshold: Threshold,
    pub grid: StatisticGrid,
    /// Outlier tiles before any filtering
    pub candidates: usize,
    pub discarded: DiscardCounts,
    pub merge_rounds: usize,
}

/// One box region per outlier tile, labelled `reg[col,row]`.
///
/// Severity is the tile statistic relative to the global reference.
pub fn candidate_regions(
    grid: &StatisticGrid,
    threshold: &Threshold,
    frame: Option<Arc<dyn CoordinateFrame>>,
) -> Result<Vec<ConvexRegion>> {
    threshold
        .outliers(grid)
        .into_iter()
        .map(|(row, col)| {
            let (rows, cols) = grid.tile_span(row, col);
            let value = grid.value(row, col).unwrap_or(f64::NAN);
            let region = ConvexRegion::bounding_box(
                cols.start as f64,
                cols.end as f64,
                rows.start as f64,
                rows.end as f64,
                threshold.severity(value),
                format!("reg[{col},{row}]"),
            )?;
            Ok(match &frame {
                Some(frame) => region.with_frame(Arc::clone(frame)),
                None => region,
            })
        })
        .collect()
}

/// Find the high-noise regions of `image`
///
/// # Errors
/// - [`Error::Configuration`] for invalid settings, before any computation
/// - [`Error::Shape`] if the image is not square
/// - [`Error::EmptyStatistics`] if every tile is blank
pub fn tag_regions(
    image: &Raster<f64>,
    config: &TaggerConfig,
    observer: &mut dyn PipelineObserver,
) -> Result<TagResult> {
    config.validate()?;

    let grid = tile_statistics(image, config.tile_params())?;
    observer.grid_built(&grid);

    let threshold = Threshold::compute(&grid, config.global_stat_percentile, config.sigma)?;
    observer.threshold_computed(&threshold);

    let frame: Arc<dyn CoordinateFrame> = Arc::new(*image.frame());
    let candidates = candidate_regions(&grid, &threshold, Some(Arc::clone(&frame)))?;
    let candidate_count = candidates.len();
    observer.candidates_found(candidate_count);

    let mut discarded = DiscardCounts::default();
    let regions = config
        .exclusion_pipeline(frame.as_ref())
        .apply(candidates, image, observer, &mut discarded);

    let merged = merge_regions_observed(regions, &config.merge_params(), observer)?;
    discarded.min_area += merged.discarded;

    let regions = config
        .shape_pipeline()
        .apply(merged.regions, image, observer, &mut discarded);
    observer.finished(&regions);

    Ok(TagResult {
        regions,
        threshold,
        grid,
        candidates: candidate_count,
        discarded,
        merge_rounds: merged.rounds,
    })
}

/// High-noise region tagger as an [`Algorithm`], logging through `tracing`
#[derive(Debug, Clone, Default)]
pub struct NoiseTagger;

impl Algorithm for NoiseTagger {
    type Input = Raster<f64>;
    type Output = TagResult;
    type Params = TaggerConfig;
    type Error = Error;

    fn name(&self) -> &'static str {
        "NoiseTagger"
    }

    fn description(&self) -> &'static str {
        "Tag merged regions of tiles whose noise exceeds a percentile-based cutoff"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        tag_regions(&input, &params, &mut LogObserver)
    }
}
