//! Merging adjacent regions to a fixed point
//!
//! Each round computes, for every region, the later regions it touches, then
//! walks the regions in order: a region not yet claimed claims every touching
//! region that is also unclaimed, and the group is replaced by the hull of its
//! members. Rounds repeat until one performs no merge, since a merged hull can
//! touch regions none of its members touched.
//!
//! Regions are sorted by `(min y, min x, label)` at the start of every round,
//! so the result does not depend on the input order of an already merged set
//! and a second run over the output is a no-op.

use crate::filters::RegionFilter;
use crate::maybe_rayon::*;
use crate::observer::{NoopObserver, PipelineObserver};
use noisetag_core::Result;
use std::cmp::Ordering;

use super::adjacency::{is_adjacent, DEFAULT_TOLERANCE};
use super::region::ConvexRegion;

/// Parameters for region merging
#[derive(Debug, Clone)]
pub struct MergeParams {
    /// Contact tolerance for the adjacency test, in pixels
    pub tolerance: f64,
    /// Merged regions with a smaller area are discarded
    pub min_area: f64,
}

impl Default for MergeParams {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            min_area: 0.0,
        }
    }
}

/// What a merge run produced
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// Surviving regions in `(min y, min x, label)` order
    pub regions: Vec<ConvexRegion>,
    /// Rounds run, including the final round without merges
    pub rounds: usize,
    /// Groups of two or more regions replaced by a hull
    pub merges: usize,
    /// Regions discarded by the area cutoff
    pub discarded: usize,
}

/// Merge adjacent regions until no two regions touch, then apply the area cutoff
pub fn merge_regions(
    regions: Vec<ConvexRegion>,
    params: &MergeParams,
) -> Result<Vec<ConvexRegion>> {
    merge_regions_observed(regions, params, &mut NoopObserver).map(|outcome| outcome.regions)
}

/// [`merge_regions`] reporting every merge, round and discard to `observer`
pub fn merge_regions_observed(
    regions: Vec<ConvexRegion>,
    params: &MergeParams,
    observer: &mut dyn PipelineObserver,
) -> Result<MergeOutcome> {
    let mut current = regions;
    let mut rounds = 0;
    let mut merges = 0;

    loop {
        rounds += 1;
        current.sort_by(region_order);
        let before = current.len();

        let groups = claim_groups(&current, params.tolerance);
        let round_merges = groups.iter().filter(|g| g.len() > 1).count();

        let mut slots: Vec<Option<ConvexRegion>> = current.into_iter().map(Some).collect();
        let mut next = Vec::with_capacity(groups.len());
        for group in groups {
            let members: Vec<ConvexRegion> =
                group.iter().filter_map(|&k| slots[k].take()).collect();
            if members.len() == 1 {
                next.extend(members);
                continue;
            }
            let merged = ConvexRegion::merge(&members)?;
            let refs: Vec<&ConvexRegion> = members.iter().collect();
            observer.regions_merged(&refs, &merged);
            next.push(merged);
        }

        observer.merge_round(rounds, before, next.len());
        current = next;
        merges += round_merges;
        if round_merges == 0 {
            break;
        }
    }

    let cutoff = RegionFilter::MinArea {
        min_area: params.min_area,
    };
    let before = current.len();
    current.retain(|region| {
        let area = region.area();
        let keep = area >= params.min_area;
        if !keep {
            observer.region_discarded(&cutoff, region, area);
        }
        keep
    });

    Ok(MergeOutcome {
        discarded: before - current.len(),
        regions: current,
        rounds,
        merges,
    })
}

/// Single-linkage grouping for one round.
///
/// A region already in a group is never claimed by a later one, so each
/// region lands in exactly one group.
fn claim_groups(regions: &[ConvexRegion], tolerance: f64) -> Vec<Vec<usize>> {
    let n = regions.len();
    let touching: Vec<Vec<usize>> = (0..n)
        .into_par_iter()
        .map(|i| {
            ((i + 1)..n)
                .filter(|&j| is_adjacent(&regions[i], &regions[j], tolerance))
                .collect()
        })
        .collect();

    let mut claimed = vec![false; n];
    let mut groups = Vec::new();
    for (i, later) in touching.iter().enumerate() {
        if claimed[i] {
            continue;
        }
        claimed[i] = true;
        let mut group = vec![i];
        for &j in later {
            if !claimed[j] {
                claimed[j] = true;
                group.push(j);
            }
        }
        groups.push(group);
    }
    groups
}

fn region_order(a: &ConvexRegion, b: &ConvexRegion) -> Ordering {
    let (lo_a, _) = a.extent();
    let (lo_b, _) = b.extent();
    lo_a.y
        .total_cmp(&lo_b.y)
        .then(lo_a.x.total_cmp(&lo_b.x))
        .then_with(|| a.label().cmp(b.label()))
}
