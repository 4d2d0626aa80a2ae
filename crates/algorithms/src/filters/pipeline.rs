//! Ordered chain of discard predicates

use crate::geometry::ConvexRegion;
use crate::maybe_rayon::*;
use crate::observer::PipelineObserver;
use noisetag_core::Raster;
use serde::{Deserialize, Serialize};

use super::predicate::RegionFilter;

/// Number of regions each kind of rule discarded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscardCounts {
    pub exclusion: usize,
    pub min_area: usize,
    pub right_skew: usize,
    pub abs_skew: usize,
    pub flux_ratio: usize,
}

impl DiscardCounts {
    /// Count one discard by `filter`
    pub fn record(&mut self, filter: &RegionFilter) {
        let slot = match filter {
            RegionFilter::Exclusion(_) => &mut self.exclusion,
            RegionFilter::MinArea { .. } => &mut self.min_area,
            RegionFilter::RightSkew { .. } => &mut self.right_skew,
            RegionFilter::AbsSkew { .. } => &mut self.abs_skew,
            RegionFilter::FluxRatio { .. } => &mut self.flux_ratio,
        };
        *slot += 1;
    }

    pub fn total(&self) -> usize {
        self.exclusion + self.min_area + self.right_skew + self.abs_skew + self.flux_ratio
    }
}

/// Filters applied one after another.
///
/// Each filter sees only the regions that survived the filters before it.
/// Surviving regions keep their relative order and are never modified.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterPipeline {
    filters: Vec<RegionFilter>,
}

impl FilterPipeline {
    pub fn new(filters: Vec<RegionFilter>) -> Self {
        Self { filters }
    }

    /// Append a filter to the end of the chain
    pub fn push(&mut self, filter: RegionFilter) {
        self.filters.push(filter);
    }

    pub fn filters(&self) -> &[RegionFilter] {
        &self.filters
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Run every filter over `regions`, reporting each discard and each pass
    pub fn apply(
        &self,
        regions: Vec<ConvexRegion>,
        image: &Raster<f64>,
        observer: &mut dyn PipelineObserver,
        counts: &mut DiscardCounts,
    ) -> Vec<ConvexRegion> {
        self.filters.iter().fold(regions, |survivors, filter| {
            let before = survivors.len();
            let decisions: Vec<_> = survivors
                .as_slice()
                .into_par_iter()
                .map(|region| filter.decide(region, image))
                .collect();

            let kept: Vec<ConvexRegion> = survivors
                .into_iter()
                .zip(decisions)
                .filter_map(|(region, decision)| {
                    if decision.discard {
                        observer.region_discarded(filter, &region, decision.metric);
                        counts.record(filter);
                        None
                    } else {
                        Some(region)
                    }
                })
                .collect();
            observer.filter_applied(filter, before, kept.len());
            kept
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::ExclusionZone;
    use crate::observer::NoopObserver;

    fn tile(col: usize, row: usize) -> ConvexRegion {
        let (x, y) = (col as f64 * 10.0, row as f64 * 10.0);
        ConvexRegion::bounding_box(x, x + 10.0, y, y + 10.0, 1.0, format!("reg[{col},{row}]"))
            .unwrap()
    }

    fn labels(regions: &[ConvexRegion]) -> Vec<&str> {
        regions.iter().map(|r| r.label()).collect()
    }

    #[test]
    fn test_empty_pipeline_keeps_all() {
        let image = Raster::new(40, 40);
        let mut counts = DiscardCounts::default();
        let out = FilterPipeline::default().apply(
            vec![tile(0, 0), tile(1, 1)],
            &image,
            &mut NoopObserver,
            &mut counts,
        );
        assert_eq!(out.len(), 2);
        assert_eq!(counts.total(), 0);
    }

    #[test]
    fn test_filters_chain_in_order() {
        let image = Raster::new(40, 40);
        let pipeline = FilterPipeline::new(vec![
            RegionFilter::Exclusion(ExclusionZone::new(5.0, 5.0, 3.0)),
            RegionFilter::Exclusion(ExclusionZone::new(25.0, 25.0, 3.0)),
            RegionFilter::MinArea { min_area: 150.0 },
        ]);
        let mut counts = DiscardCounts::default();
        let out = pipeline.apply(
            vec![tile(0, 0), tile(1, 1), tile(2, 2)],
            &image,
            &mut NoopObserver,
            &mut counts,
        );

        assert!(out.is_empty());
        assert_eq!(counts.exclusion, 2);
        assert_eq!(counts.min_area, 1);
    }

    #[test]
    fn test_survivor_order_preserved() {
        let image = Raster::new(40, 40);
        let pipeline = FilterPipeline::new(vec![RegionFilter::Exclusion(ExclusionZone::new(
            15.0, 15.0, 1.0,
        ))]);
        let mut counts = DiscardCounts::default();
        let out = pipeline.apply(
            vec![tile(3, 0), tile(1, 1), tile(0, 3)],
            &image,
            &mut NoopObserver,
            &mut counts,
        );
        assert_eq!(labels(&out), vec!["reg[3,0]", "reg[0,3]"]);
    }

    #[derive(Default)]
    struct PassLog {
        passes: Vec<(&'static str, usize, usize)>,
        discards: usize,
    }

    impl PipelineObserver for PassLog {
        fn region_discarded(&mut self, _: &RegionFilter, _: &ConvexRegion, _: f64) {
            self.discards += 1;
        }

        fn filter_applied(&mut self, filter: &RegionFilter, before: usize, after: usize) {
            self.passes.push((filter.name(), before, after));
        }
    }

    #[test]
    fn test_every_pass_reported() {
        let image = Raster::new(40, 40);
        let pipeline = FilterPipeline::new(vec![
            RegionFilter::Exclusion(ExclusionZone::new(100.0, 100.0, 1.0)),
            RegionFilter::Exclusion(ExclusionZone::new(5.0, 5.0, 3.0)),
            RegionFilter::MinArea { min_area: 50.0 },
        ]);
        let mut log = PassLog::default();
        let mut counts = DiscardCounts::default();
        let out = pipeline.apply(vec![tile(0, 0), tile(2, 2)], &image, &mut log, &mut counts);

        assert_eq!(labels(&out), vec!["reg[2,2]"]);
        assert_eq!(
            log.passes,
            vec![
                ("exclusion zone", 2, 2),
                ("exclusion zone", 2, 1),
                ("minimum area", 1, 1),
            ]
        );
        assert_eq!(log.discards, 1);
    }

    #[test]
    fn test_predicates_are_monotonic() {
        let image = Raster::new(40, 40);
        let pipeline = FilterPipeline::new(vec![RegionFilter::Exclusion(ExclusionZone::new(
            5.0, 5.0, 3.0,
        ))]);
        let all = vec![tile(0, 0), tile(1, 0), tile(1, 1), tile(3, 3)];
        let subset = vec![tile(0, 0), tile(3, 3)];
        let subset_labels = ["reg[0,0]", "reg[3,3]"];

        let mut counts = DiscardCounts::default();
        let full = pipeline.apply(all, &image, &mut NoopObserver, &mut counts);
        let part = pipeline.apply(subset, &image, &mut NoopObserver, &mut counts);

        let restricted: Vec<&str> = labels(&full)
            .into_iter()
            .filter(|l| subset_labels.contains(l))
            .collect();
        assert_eq!(labels(&part), restricted);
        assert_eq!(labels(&part), vec!["reg[3,3]"]);
    }
}
