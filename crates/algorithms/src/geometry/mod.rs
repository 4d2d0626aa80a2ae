//! Region geometry: convex hulls, adjacency and merging
//!
//! All coordinates are continuous pixel coordinates with `y` increasing with
//! the row index, i.e. downwards when the image is displayed.
//!
//! "Clockwise" always means negative shoelace area in this `(x, y)` plane,
//! which is clockwise on axes drawn with `y` up. On the displayed image, where
//! `y` runs down, the same ring appears counter-clockwise.

mod adjacency;
mod merge;
mod region;

pub use adjacency::{is_adjacent, DEFAULT_TOLERANCE};
pub use merge::{merge_regions, merge_regions_observed, MergeOutcome, MergeParams};
pub use region::{ConvexRegion, Facing};
