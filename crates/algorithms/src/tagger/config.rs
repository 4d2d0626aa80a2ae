//! Tagger configuration

use noisetag_core::{CoordinateFrame, Error, Result};
use serde::{Deserialize, Serialize};

use crate::filters::{ExclusionZone, FilterPipeline, RegionFilter};
use crate::geometry::{MergeParams, DEFAULT_TOLERANCE};
use crate::statistics::TileParams;

/// Settings for one tagging run.
///
/// Treated as an immutable value: the derived phase-centre zone is added to
/// a copy of `exclusion_zones`, never to the configured list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaggerConfig {
    /// Tile side length in pixels
    pub tile_size: usize,
    /// Tiles whose statistic exceeds `sigma` times the reference are outliers
    pub sigma: f64,
    /// Percentile (0-100) of tile statistics used as the reference
    pub global_stat_percentile: f64,
    /// Merged regions smaller than this many full tiles are dropped
    pub min_blocks_in_region: usize,
    /// Radius in pixels of the zone around the phase centre; 0 disables it
    pub min_distance_from_centre: f64,
    pub exclusion_zones: Vec<ExclusionZone>,
    pub max_right_skewness: Option<f64>,
    pub max_abs_skewness: Option<f64>,
    pub max_positive_to_negative_flux: Option<f64>,
    /// Contact tolerance for adjacency, in pixels
    pub adjacency_tolerance: f64,
}

impl Default for TaggerConfig {
    fn default() -> Self {
        Self {
            tile_size: 80,
            sigma: 2.3,
            global_stat_percentile: 30.0,
            min_blocks_in_region: 3,
            min_distance_from_centre: 0.0,
            exclusion_zones: Vec::new(),
            max_right_skewness: None,
            max_abs_skewness: None,
            max_positive_to_negative_flux: None,
            adjacency_tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl TaggerConfig {
    /// Reject settings no run could use
    pub fn validate(&self) -> Result<()> {
        if self.tile_size == 0 {
            return Err(Error::config("tile_size", self.tile_size, "must be > 0"));
        }
        if !(self.sigma > 0.0) || !self.sigma.is_finite() {
            return Err(Error::config("sigma", self.sigma, "must be a positive number"));
        }
        if !(0.0..=100.0).contains(&self.global_stat_percentile) {
            return Err(Error::config(
                "global_stat_percentile",
                self.global_stat_percentile,
                "must be between 0 and 100",
            ));
        }
        if self.min_blocks_in_region == 0 {
            return Err(Error::config("min_blocks_in_region", 0, "must be >= 1"));
        }
        non_negative("min_distance_from_centre", self.min_distance_from_centre)?;
        non_negative("adjacency_tolerance", self.adjacency_tolerance)?;
        for zone in &self.exclusion_zones {
            if !zone.cx.is_finite() || !zone.cy.is_finite() {
                return Err(Error::config("exclusion_zone", zone, "centre must be finite"));
            }
            non_negative("exclusion_zone radius", zone.radius)?;
        }
        for (name, limit) in [
            ("max_right_skewness", self.max_right_skewness),
            ("max_abs_skewness", self.max_abs_skewness),
            ("max_positive_to_negative_flux", self.max_positive_to_negative_flux),
        ] {
            if let Some(limit) = limit {
                non_negative(name, limit)?;
            }
        }
        Ok(())
    }

    /// Minimum area of a surviving region, in square pixels
    pub fn min_area(&self) -> f64 {
        (self.min_blocks_in_region * self.tile_size * self.tile_size) as f64
    }

    pub fn tile_params(&self) -> TileParams {
        TileParams {
            tile_size: self.tile_size,
        }
    }

    pub fn merge_params(&self) -> MergeParams {
        MergeParams {
            tolerance: self.adjacency_tolerance,
            min_area: self.min_area(),
        }
    }

    /// Configured zones plus the phase-centre zone, when enabled
    pub fn effective_zones(&self, frame: &dyn CoordinateFrame) -> Vec<ExclusionZone> {
        let mut zones = self.exclusion_zones.clone();
        if self.min_distance_from_centre > 0.0 {
            let (cx, cy) = frame.reference_pixel();
            zones.push(ExclusionZone::new(cx, cy, self.min_distance_from_centre));
        }
        zones
    }

    /// Rules applied to candidate tiles before merging
    pub fn exclusion_pipeline(&self, frame: &dyn CoordinateFrame) -> FilterPipeline {
        FilterPipeline::new(
            self.effective_zones(frame)
                .into_iter()
                .map(RegionFilter::Exclusion)
                .collect(),
        )
    }

    /// Shape and flux rules applied to merged regions
    pub fn shape_pipeline(&self) -> FilterPipeline {
        let mut pipeline = FilterPipeline::default();
        if let Some(max) = self.max_right_skewness {
            pipeline.push(RegionFilter::RightSkew { max });
        }
        if let Some(max) = self.max_abs_skewness {
            pipeline.push(RegionFilter::AbsSkew { max });
        }
        if let Some(max) = self.max_positive_to_negative_flux {
            pipeline.push(RegionFilter::FluxRatio { max });
        }
        pipeline
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::config(name, value, "must be finite and >= 0"))
    }
}
