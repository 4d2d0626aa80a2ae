//! Region culling
//!
//! A [`FilterPipeline`] runs [`RegionFilter`] rules in order; each rule
//! removes the regions it discards before the next rule runs.

mod pipeline;
mod predicate;
mod zone;

pub use pipeline::{DiscardCounts, FilterPipeline};
pub use predicate::{Decision, RegionFilter};
pub use zone::ExclusionZone;
