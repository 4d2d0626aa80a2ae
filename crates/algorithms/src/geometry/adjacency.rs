//! Separating-axis adjacency test for convex regions

use geo::Coord;

use super::region::{ConvexRegion, Facing};

/// Default contact tolerance in pixels
pub const DEFAULT_TOLERANCE: f64 = 1e-4;

/// Whether two convex regions touch or overlap.
///
/// Every outward edge normal of `a` and `b` is a candidate separating axis.
/// Axes are normalised so `tolerance` is a distance in pixels: the regions
/// are separated only when some axis shows a gap wider than `tolerance`
/// between their projection intervals. Shared edges and corners therefore
/// count as adjacent.
///
/// Symmetric in `a` and `b`.
pub fn is_adjacent(a: &ConvexRegion, b: &ConvexRegion, tolerance: f64) -> bool {
    let tolerance = tolerance.max(0.0);

    a.normals(Facing::Outward)
        .into_iter()
        .chain(b.normals(Facing::Outward))
        .filter_map(unit)
        .all(|axis| {
            let (a_min, a_max) = a.project(axis);
            let (b_min, b_max) = b.project(axis);
            a_max >= b_min - tolerance && b_max >= a_min - tolerance
        })
}

fn unit(v: Coord<f64>) -> Option<Coord<f64>> {
    let len = v.x.hypot(v.y);
    (len > 0.0 && len.is_finite()).then(|| Coord {
        x: v.x / len,
        y: v.y / len,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bx(xl: f64, xu: f64, yl: f64, yu: f64) -> ConvexRegion {
        ConvexRegion::bounding_box(xl, xu, yl, yu, 1.0, "b").unwrap()
    }

    fn tri(points: [(f64, f64); 3]) -> ConvexRegion {
        ConvexRegion::from_points(points.map(|(x, y)| Coord { x, y }), 1.0, "t").unwrap()
    }

    #[test]
    fn test_shared_edge_is_adjacent() {
        let a = bx(0.0, 10.0, 0.0, 10.0);
        let b = bx(10.0, 20.0, 0.0, 10.0);
        assert!(is_adjacent(&a, &b, 0.0));
        assert!(is_adjacent(&a, &b, DEFAULT_TOLERANCE));
    }

    #[test]
    fn test_shared_corner_is_adjacent() {
        let a = bx(0.0, 10.0, 0.0, 10.0);
        let b = bx(10.0, 20.0, 10.0, 20.0);
        assert!(is_adjacent(&a, &b, DEFAULT_TOLERANCE));
    }

    #[test]
    fn test_gap_is_not_adjacent() {
        let a = bx(0.0, 10.0, 0.0, 10.0);
        let b = bx(11.0, 21.0, 0.0, 10.0);
        assert!(!is_adjacent(&a, &b, DEFAULT_TOLERANCE));
    }

    #[test]
    fn test_gap_within_tolerance() {
        let a = bx(0.0, 10.0, 0.0, 10.0);
        let b = bx(10.00005, 20.0, 0.0, 10.0);
        assert!(is_adjacent(&a, &b, DEFAULT_TOLERANCE));
        assert!(!is_adjacent(&a, &b, 0.0));
    }

    #[test]
    fn test_overlap_and_containment() {
        let outer = bx(0.0, 10.0, 0.0, 10.0);
        assert!(is_adjacent(&outer, &bx(5.0, 15.0, 5.0, 15.0), 0.0));
        assert!(is_adjacent(&outer, &bx(2.0, 3.0, 2.0, 3.0), 0.0));
    }

    #[test]
    fn test_diagonal_separation() {
        // bounding boxes overlap, but the hypotenuse separates them
        let a = tri([(0.0, 0.0), (10.0, 0.0), (0.0, 10.0)]);
        let b = bx(6.0, 10.0, 6.0, 10.0);
        assert!(!is_adjacent(&a, &b, DEFAULT_TOLERANCE));
        assert!(!is_adjacent(&b, &a, DEFAULT_TOLERANCE));
    }

    #[test]
    fn test_symmetry() {
        let shapes = [
            bx(0.0, 10.0, 0.0, 10.0),
            bx(10.0, 20.0, 0.0, 10.0),
            bx(30.0, 40.0, 0.0, 10.0),
            tri([(0.0, 0.0), (10.0, 0.0), (0.0, 10.0)]),
            tri([(5.0, 5.0), (25.0, 5.0), (15.0, 30.0)]),
            bx(6.0, 10.0, 6.0, 10.0),
        ];
        for a in &shapes {
            for b in &shapes {
                assert_eq!(
                    is_adjacent(a, b, DEFAULT_TOLERANCE),
                    is_adjacent(b, a, DEFAULT_TOLERANCE)
                );
            }
        }
    }

    #[test]
    fn test_self_adjacent() {
        let a = tri([(1.0, 1.0), (4.0, 2.0), (2.0, 5.0)]);
        assert!(is_adjacent(&a, &a, 0.0));
    }
}
