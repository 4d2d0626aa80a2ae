//! Circular exclusion zones

use geo::Coord;
use noisetag_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A circle in pixel coordinates inside which regions are discarded
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExclusionZone {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
}

impl ExclusionZone {
    pub fn new(cx: f64, cy: f64, radius: f64) -> Self {
        Self { cx, cy, radius }
    }

    /// Distance from the zone centre to `p`
    pub fn distance(&self, p: Coord<f64>) -> f64 {
        (p.x - self.cx).hypot(p.y - self.cy)
    }

    /// Whether `p` lies strictly inside the zone
    pub fn contains(&self, p: Coord<f64>) -> bool {
        let dx = p.x - self.cx;
        let dy = p.y - self.cy;
        dx * dx + dy * dy < self.radius * self.radius
    }
}

impl FromStr for ExclusionZone {
    type Err = Error;

    /// Parse `"cx,cy,radius"`: integer pixel centre, float radius
    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::config("exclusion_zone", s, reason);

        let fields: Vec<&str> = s.split(',').map(str::trim).collect();
        let [cx, cy, radius] = fields.as_slice() else {
            return Err(invalid("expected three comma-separated values cx,cy,radius"));
        };

        let cx: i64 = cx.parse().map_err(|_| invalid("centre x must be an integer"))?;
        let cy: i64 = cy.parse().map_err(|_| invalid("centre y must be an integer"))?;
        let radius: f64 = radius
            .parse()
            .map_err(|_| invalid("radius must be a number"))?;
        if !radius.is_finite() || radius < 0.0 {
            return Err(invalid("radius must be finite and >= 0"));
        }

        Ok(Self::new(cx as f64, cy as f64, radius))
    }
}

impl fmt::Display for ExclusionZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.cx, self.cy, self.radius)
    }
}
