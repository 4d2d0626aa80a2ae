//! Tagging catalog sources that fall inside high-noise regions

use noisetag_core::io::Ds9Circle;
use noisetag_core::CoordinateFrame;
use serde::{Deserialize, Serialize};

use crate::geometry::ConvexRegion;

/// A sky-model source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkySource {
    pub name: String,
    /// Right ascension in degrees
    pub ra: f64,
    /// Declination in degrees
    pub dec: f64,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl SkySource {
    pub fn new(name: impl Into<String>, ra: f64, dec: f64) -> Self {
        Self {
            name: name.into(),
            ra,
            dec,
            tags: Vec::new(),
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Tag every source lying inside any of `regions` with `tag`.
///
/// Sky positions are projected through each region's own frame, or through
/// `fallback` for regions without one. A source is tagged at most once.
/// Returns the number of sources that received the tag.
pub fn tag_sources(
    sources: &mut [SkySource],
    regions: &[ConvexRegion],
    fallback: &dyn CoordinateFrame,
    tag: &str,
) -> usize {
    let mut tagged = 0;
    for source in sources.iter_mut() {
        let inside = regions.iter().any(|region| {
            let frame: &dyn CoordinateFrame = match region.frame() {
                Some(own) => &**own,
                None => fallback,
            };
            region.contains_world(source.ra, source.dec, frame)
        });
        if inside && !source.has_tag(tag) {
            source.tags.push(tag.to_string());
            tagged += 1;
        }
    }
    tagged
}

/// DS9 markers for the sources carrying `tag`, projected through `frame`.
///
/// Sources whose position does not project to a finite pixel are skipped.
pub fn tag_markers(
    sources: &[SkySource],
    frame: &dyn CoordinateFrame,
    tag: &str,
    radius: f64,
) -> Vec<Ds9Circle> {
    sources
        .iter()
        .filter(|s| s.has_tag(tag))
        .filter_map(|s| {
            let (x, y) = frame.world_to_pixel(s.ra, s.dec);
            (x.is_finite() && y.is_finite()).then(|| Ds9Circle {
                x,
                y,
                radius,
                label: s.name.clone(),
            })
        })
        .collect()
}
