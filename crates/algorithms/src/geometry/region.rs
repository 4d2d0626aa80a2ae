//! Convex polygonal regions
//!
//! A [`ConvexRegion`] is the convex hull of a point set with a severity score
//! and label attached. Vertices are always stored in canonical order:
//! clockwise in the sense of the [geometry module](super) (negative shoelace
//! area), starting at the vertex with the smallest `x` (then smallest `y`),
//! with no repeated or collinear vertices. Regions are never mutated; merging
//! builds a new one.

use geo::{ConvexHull, Coord, MultiPoint, Point};
use noisetag_core::io::RegionOutline;
use noisetag_core::{CoordinateFrame, Error, Raster, Result};
use std::fmt;
use std::sync::Arc;

/// Coordinates closer than this are the same vertex
const VERTEX_EPS: f64 = 1e-9;
/// Sine of the turning angle below which a vertex is collinear
const COLLINEAR_EPS: f64 = 1e-12;
/// Angular tolerance of the winding containment test, in degrees
const WINDING_TOLERANCE_DEG: f64 = 1e-6;

/// Which side of each edge a boundary normal points to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    /// Left normals `(-dy, dx)`; outward for clockwise winding
    Outward,
    /// Right normals `(dy, -dx)`; inward for clockwise winding
    Inward,
}

/// A convex region over pixel coordinates
#[derive(Debug, Clone)]
pub struct ConvexRegion {
    vertices: Vec<Coord<f64>>,
    severity: f64,
    label: String,
    frame: Option<Arc<dyn CoordinateFrame>>,
}

impl ConvexRegion {
    /// Build the convex hull of `points`.
    ///
    /// # Errors
    /// [`Error::DegenerateGeometry`] when fewer than 3 non-collinear finite
    /// points remain.
    pub fn from_points<I>(points: I, severity: f64, label: impl Into<String>) -> Result<Self>
    where
        I: IntoIterator<Item = Coord<f64>>,
    {
        let points: Vec<Point<f64>> = points
            .into_iter()
            .filter(|c| c.x.is_finite() && c.y.is_finite())
            .map(Point::from)
            .collect();
        if points.len() < 3 {
            return Err(Error::DegenerateGeometry {
                points: points.len(),
            });
        }

        let hull = MultiPoint::new(points).convex_hull();
        let (exterior, _) = hull.into_inner();
        let vertices = canonical_ring(exterior.into_inner())?;

        Ok(Self {
            vertices,
            severity,
            label: label.into(),
            frame: None,
        })
    }

    /// Axis-aligned box `[xl, xu] × [yl, yu]` built from its four corners
    pub fn bounding_box(
        xl: f64,
        xu: f64,
        yl: f64,
        yu: f64,
        severity: f64,
        label: impl Into<String>,
    ) -> Result<Self> {
        Self::from_points(
            [
                Coord { x: xl, y: yl },
                Coord { x: xl, y: yu },
                Coord { x: xu, y: yu },
                Coord { x: xu, y: yl },
            ],
            severity,
            label,
        )
    }

    /// Hull over every vertex of `members`.
    ///
    /// Severity is the mean of the member severities, labels are joined with
    /// `&`, and the frame is taken from the first member.
    pub fn merge<'a, I>(members: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a ConvexRegion>,
    {
        let members: Vec<&ConvexRegion> = members.into_iter().collect();
        let Some(first) = members.first() else {
            return Err(Error::DegenerateGeometry { points: 0 });
        };

        let severity =
            members.iter().map(|r| r.severity).sum::<f64>() / members.len() as f64;
        let label = members
            .iter()
            .map(|r| r.label.as_str())
            .collect::<Vec<_>>()
            .join("&");
        let points = members.iter().flat_map(|r| r.vertices.iter().copied());

        let merged = Self::from_points(points, severity, label)?;
        Ok(match &first.frame {
            Some(frame) => merged.with_frame(Arc::clone(frame)),
            None => merged,
        })
    }

    /// Attach a coordinate frame
    pub fn with_frame(mut self, frame: Arc<dyn CoordinateFrame>) -> Self {
        self.frame = Some(frame);
        self
    }

    // Accessors

    /// Hull vertices in canonical clockwise order
    pub fn vertices(&self) -> &[Coord<f64>] {
        &self.vertices
    }

    /// Severity score
    pub fn severity(&self) -> f64 {
        self.severity
    }

    /// Region label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Coordinate frame, if one is attached
    pub fn frame(&self) -> Option<&Arc<dyn CoordinateFrame>> {
        self.frame.as_ref()
    }

    // Geometry

    /// Shoelace signed area; negative because winding is clockwise
    pub fn signed_area(&self) -> f64 {
        self.edges()
            .map(|(a, b)| a.x * b.y - b.x * a.y)
            .sum::<f64>()
            / 2.0
    }

    /// Polygon area
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Mean of the hull vertices.
    ///
    /// This is the vertex centroid, not the area barycentre; the two agree
    /// for boxes and differ for irregular merged hulls.
    pub fn centroid(&self) -> Coord<f64> {
        let n = self.vertices.len() as f64;
        let sum = self
            .vertices
            .iter()
            .fold(Coord { x: 0.0, y: 0.0 }, |acc, v| acc + *v);
        Coord {
            x: sum.x / n,
            y: sum.y / n,
        }
    }

    /// Axis-aligned extent `(min, max)`
    pub fn extent(&self) -> (Coord<f64>, Coord<f64>) {
        self.vertices.iter().fold(
            (
                Coord { x: f64::INFINITY, y: f64::INFINITY },
                Coord { x: f64::NEG_INFINITY, y: f64::NEG_INFINITY },
            ),
            |(lo, hi), v| {
                (
                    Coord { x: lo.x.min(v.x), y: lo.y.min(v.y) },
                    Coord { x: hi.x.max(v.x), y: hi.y.max(v.y) },
                )
            },
        )
    }

    /// One normal per edge, proportional to the edge length
    pub fn normals(&self, facing: Facing) -> Vec<Coord<f64>> {
        self.edges()
            .map(|(a, b)| {
                let e = b - a;
                match facing {
                    Facing::Outward => Coord { x: -e.y, y: e.x },
                    Facing::Inward => Coord { x: e.y, y: -e.x },
                }
            })
            .collect()
    }

    /// Interval `[min, max]` of the vertices projected onto `axis`
    pub fn project(&self, axis: Coord<f64>) -> (f64, f64) {
        self.vertices
            .iter()
            .map(|v| v.x * axis.x + v.y * axis.y)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p), hi.max(p))
            })
    }

    /// Winding-angle containment of a pixel position.
    ///
    /// Sums the signed angles subtended by each edge as seen from `p`; the
    /// point is inside when the total is a full turn. Points on the boundary
    /// are outside.
    pub fn contains_pixel(&self, p: Coord<f64>) -> bool {
        let total: f64 = self
            .edges()
            .map(|(a, b)| {
                let v1 = a - p;
                let v2 = b - p;
                let cross = v1.x * v2.y - v1.y * v2.x;
                let dot = v1.x * v2.x + v1.y * v2.y;
                cross.atan2(dot)
            })
            .sum();
        (total.abs().to_degrees() - 360.0).abs() < WINDING_TOLERANCE_DEG
    }

    /// Containment of a sky position, projected into pixels through `frame`
    pub fn contains_world(&self, ra: f64, dec: f64, frame: &dyn CoordinateFrame) -> bool {
        let (x, y) = frame.world_to_pixel(ra, dec);
        if !x.is_finite() || !y.is_finite() {
            return false;
        }
        self.contains_pixel(Coord { x, y })
    }

    /// Half-plane test with the boundary counted as inside
    fn covers(&self, p: Coord<f64>) -> bool {
        self.edges().all(|(a, b)| {
            let e = b - a;
            let d = p - a;
            // interior lies to the right of each clockwise edge
            e.x * d.y - e.y * d.x <= VERTEX_EPS * (e.x.abs() + e.y.abs())
        })
    }

    /// Valid pixel values whose pixel centre lies within the region
    pub fn enclosed_values(&self, image: &Raster<f64>) -> Vec<f64> {
        let (lo, hi) = self.extent();
        let (rows, cols) = image.shape();
        let r0 = (lo.y - 0.5).ceil().max(0.0) as usize;
        let c0 = (lo.x - 0.5).ceil().max(0.0) as usize;
        let r1 = ((hi.y - 0.5).floor() + 1.0).clamp(0.0, rows as f64) as usize;
        let c1 = ((hi.x - 0.5).floor() + 1.0).clamp(0.0, cols as f64) as usize;

        let mut values = Vec::new();
        for row in r0..r1 {
            for col in c0..c1 {
                let centre = Coord {
                    x: col as f64 + 0.5,
                    y: row as f64 + 0.5,
                };
                if !self.covers(centre) {
                    continue;
                }
                if let Ok(v) = image.get(row, col)
                    && !image.is_nodata(v)
                {
                    values.push(v);
                }
            }
        }
        values
    }

    fn edges(&self) -> impl Iterator<Item = (Coord<f64>, Coord<f64>)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }
}

impl RegionOutline for ConvexRegion {
    fn outline(&self) -> Vec<(f64, f64)> {
        self.vertices.iter().map(|c| (c.x, c.y)).collect()
    }

    fn severity(&self) -> f64 {
        self.severity
    }
}

impl fmt::Display for ConvexRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}x within region ", self.severity)?;
        let corners = self
            .vertices
            .iter()
            .map(|c| format!("({},{})", c.x, c.y))
            .collect::<Vec<_>>()
            .join(",");
        f.write_str(&corners)
    }
}

/// Closed hull ring → canonical open clockwise vertex list
fn canonical_ring(mut ring: Vec<Coord<f64>>) -> Result<Vec<Coord<f64>>> {
    let near = |a: Coord<f64>, b: Coord<f64>| {
        (a.x - b.x).abs() <= VERTEX_EPS && (a.y - b.y).abs() <= VERTEX_EPS
    };

    ring.dedup_by(|b, a| near(*a, *b));
    while ring.len() > 1 && near(ring[0], ring[ring.len() - 1]) {
        ring.pop();
    }

    // drop collinear vertices until every turn is strict
    loop {
        let n = ring.len();
        if n < 3 {
            return Err(Error::DegenerateGeometry { points: n });
        }
        let collinear = (0..n).find(|&i| {
            let prev = ring[(i + n - 1) % n];
            let next = ring[(i + 1) % n];
            let u = ring[i] - prev;
            let w = next - ring[i];
            let cross = u.x * w.y - u.y * w.x;
            let scale = (u.x.hypot(u.y)) * (w.x.hypot(w.y));
            cross.abs() <= COLLINEAR_EPS * scale.max(f64::MIN_POSITIVE)
        });
        match collinear {
            Some(i) => {
                ring.remove(i);
            }
            None => break,
        }
    }

    let twice_area: f64 = (0..ring.len())
        .map(|i| {
            let a = ring[i];
            let b = ring[(i + 1) % ring.len()];
            a.x * b.y - b.x * a.y
        })
        .sum();
    if twice_area > 0.0 {
        ring.reverse();
    }

    let start = (0..ring.len())
        .min_by(|&i, &j| {
            ring[i]
                .x
                .total_cmp(&ring[j].x)
                .then(ring[i].y.total_cmp(&ring[j].y))
        })
        .unwrap_or(0);
    ring.rotate_left(start);

    Ok(ring)
}
