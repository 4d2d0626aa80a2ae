//! Discard predicates over single regions

use noisetag_core::Raster;
use serde::{Deserialize, Serialize};

use super::zone::ExclusionZone;
use crate::geometry::ConvexRegion;
use crate::statistics::{flux_ratio, Moments};

/// One culling rule.
///
/// Each variant judges a region on its own: a metric is measured from the
/// region (and, for the shape and flux rules, the image pixels it encloses)
/// and compared against a limit. A NaN metric never discards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegionFilter {
    /// Discard when the centroid lies inside the zone
    Exclusion(ExclusionZone),
    /// Discard when the area is below `min_area`
    MinArea { min_area: f64 },
    /// Discard when the enclosed pixels have skewness above `max`
    RightSkew { max: f64 },
    /// Discard when the enclosed pixels have absolute skewness above `max`
    AbsSkew { max: f64 },
    /// Discard when positive flux exceeds `max` times the negative flux
    FluxRatio { max: f64 },
}

/// Outcome of judging one region
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub discard: bool,
    pub metric: f64,
}

impl RegionFilter {
    /// Short name used in reports
    pub fn name(&self) -> &'static str {
        match self {
            RegionFilter::Exclusion(_) => "exclusion zone",
            RegionFilter::MinArea { .. } => "minimum area",
            RegionFilter::RightSkew { .. } => "right skewness",
            RegionFilter::AbsSkew { .. } => "absolute skewness",
            RegionFilter::FluxRatio { .. } => "positive to negative flux",
        }
    }

    /// Whether the rule reads the pixels a region encloses
    pub fn needs_pixels(&self) -> bool {
        matches!(
            self,
            RegionFilter::RightSkew { .. }
                | RegionFilter::AbsSkew { .. }
                | RegionFilter::FluxRatio { .. }
        )
    }

    /// Value the rule is judged on
    pub fn measure(&self, region: &ConvexRegion, image: &Raster<f64>) -> f64 {
        match self {
            RegionFilter::Exclusion(zone) => zone.distance(region.centroid()),
            RegionFilter::MinArea { .. } => region.area(),
            RegionFilter::RightSkew { .. } => {
                Moments::from_values(region.enclosed_values(image)).skewness()
            }
            RegionFilter::AbsSkew { .. } => {
                Moments::from_values(region.enclosed_values(image)).skewness().abs()
            }
            RegionFilter::FluxRatio { .. } => flux_ratio(region.enclosed_values(image)),
        }
    }

    /// Judge `region`
    pub fn decide(&self, region: &ConvexRegion, image: &Raster<f64>) -> Decision {
        let metric = self.measure(region, image);
        let discard = match self {
            RegionFilter::Exclusion(zone) => zone.contains(region.centroid()),
            RegionFilter::MinArea { min_area } => metric < *min_area,
            RegionFilter::RightSkew { max }
            | RegionFilter::AbsSkew { max }
            | RegionFilter::FluxRatio { max } => metric > *max,
        };
        Decision { discard, metric }
    }
}
