//! End-to-end behaviour of the tagging pipeline through the public API.
//!
//! Noise maps are synthetic: a ±1 checkerboard (tile standard deviation 1)
//! with selected areas scaled up.

use geo::Coord;
use noisetag_algorithms::prelude::*;
use noisetag_core::io::write_ds9_regions;
use noisetag_core::AffineFrame;
use std::sync::Arc;

fn checkerboard(size: usize, amp: impl Fn(usize, usize) -> f64) -> Raster<f64> {
    let mut r = Raster::new(size, size);
    for row in 0..size {
        for col in 0..size {
            let sign = if (row + col) % 2 == 0 { 1.0 } else { -1.0 };
            r.set(row, col, sign * amp(row, col)).unwrap();
        }
    }
    r
}

/// 160×160 map whose top-left 80×80 quadrant is 10x noisier
fn quadrant_map() -> Raster<f64> {
    checkerboard(160, |row, col| if row < 80 && col < 80 { 10.0 } else { 1.0 })
}

fn quadrant_config() -> TaggerConfig {
    TaggerConfig {
        tile_size: 80,
        sigma: 2.0,
        global_stat_percentile: 50.0,
        min_blocks_in_region: 1,
        ..Default::default()
    }
}

fn unit_box(col: usize, row: usize) -> ConvexRegion {
    let (x, y) = (col as f64, row as f64);
    ConvexRegion::bounding_box(x, x + 1.0, y, y + 1.0, 1.0, format!("reg[{col},{row}]")).unwrap()
}

fn outlines(regions: &[ConvexRegion]) -> Vec<Vec<Coord<f64>>> {
    regions.iter().map(|r| r.vertices().to_vec()).collect()
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

#[test]
fn box_area_is_exact() {
    let r = ConvexRegion::bounding_box(0.0, 10.0, 0.0, 10.0, 1.0, "b").unwrap();
    assert!((r.area() - 100.0).abs() < 1e-9);
}

#[test]
fn touching_boxes_adjacent_gapped_boxes_not() {
    let a = ConvexRegion::bounding_box(0.0, 10.0, 0.0, 10.0, 1.0, "a").unwrap();
    let b = ConvexRegion::bounding_box(10.0, 20.0, 0.0, 10.0, 1.0, "b").unwrap();
    let c = ConvexRegion::bounding_box(11.0, 21.0, 0.0, 10.0, 1.0, "c").unwrap();

    assert!(is_adjacent(&a, &b, 0.0));
    assert!(is_adjacent(&b, &a, 0.0));
    assert!(!is_adjacent(&a, &c, DEFAULT_TOLERANCE));
    assert!(!is_adjacent(&c, &a, DEFAULT_TOLERANCE));
}

// ---------------------------------------------------------------------------
// Merging
// ---------------------------------------------------------------------------

#[test]
fn chain_merges_to_one_region_in_any_order() {
    let n = 12;
    let forward: Vec<ConvexRegion> = (0..n).map(|i| unit_box(i, 0)).collect();
    // deterministic shuffle: stride through the chain
    let shuffled: Vec<ConvexRegion> = (0..n).map(|i| unit_box((i * 5) % n, 0)).collect();
    let reversed: Vec<ConvexRegion> = (0..n).rev().map(|i| unit_box(i, 0)).collect();

    for input in [forward, shuffled, reversed] {
        let out = merge_regions(input, &MergeParams::default()).unwrap();
        assert_eq!(out.len(), 1);
        assert!((out[0].area() - n as f64).abs() < 1e-9);
        assert_eq!(out[0].label().split('&').count(), n);
    }
}

#[test]
fn merge_is_idempotent() {
    let input: Vec<ConvexRegion> = [(0, 0), (1, 0), (5, 5), (6, 6), (9, 0), (9, 2), (3, 8)]
        .into_iter()
        .map(|(c, r)| unit_box(c, r))
        .collect();
    let params = MergeParams::default();

    let once = merge_regions(input, &params).unwrap();
    let twice = merge_regions(once.clone(), &params).unwrap();

    assert_eq!(outlines(&once), outlines(&twice));
    let labels: Vec<&str> = twice.iter().map(|r| r.label()).collect();
    let expected: Vec<&str> = once.iter().map(|r| r.label()).collect();
    assert_eq!(labels, expected);
}

#[test]
fn merged_regions_never_touch() {
    let input: Vec<ConvexRegion> = (0..10)
        .flat_map(|r| (0..10).map(move |c| (c, r)))
        .filter(|(c, r)| (c * 3 + r * 7) % 4 == 0)
        .map(|(c, r)| unit_box(c, r))
        .collect();
    let out = merge_regions(input, &MergeParams::default()).unwrap();

    for (i, a) in out.iter().enumerate() {
        for b in &out[i + 1..] {
            assert!(!is_adjacent(a, b, DEFAULT_TOLERANCE));
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

#[test]
fn noisy_quadrant_is_the_only_region() {
    let result = tag_regions(&quadrant_map(), &quadrant_config(), &mut NoopObserver).unwrap();

    assert!((result.threshold.reference - 1.0).abs() < 1e-9);
    assert!((result.threshold.cutoff - 2.0).abs() < 1e-9);
    assert_eq!(result.candidates, 1);
    assert_eq!(result.regions.len(), 1);

    let region = &result.regions[0];
    assert_eq!(region.label(), "reg[0,0]");
    assert!((region.area() - 6400.0).abs() < 1e-9);
    assert!((region.severity() - 10.0).abs() < 1e-9);
    let (lo, hi) = region.extent();
    assert_eq!((lo.x, lo.y, hi.x, hi.y), (0.0, 0.0, 80.0, 80.0));
    assert_eq!(result.discarded.total(), 0);
}

#[test]
fn exclusion_zone_removes_tagged_tile() {
    let config = TaggerConfig {
        // centroid (40, 40); half-diagonal is ~56.6
        exclusion_zones: vec!["40,40,60".parse().unwrap()],
        ..quadrant_config()
    };
    let result = tag_regions(&quadrant_map(), &config, &mut NoopObserver).unwrap();

    assert!(result.regions.is_empty());
    assert_eq!(result.discarded.exclusion, 1);
    assert_eq!(config.exclusion_zones.len(), 1);
}

#[test]
fn phase_centre_zone_uses_frame_reference() {
    let mut image = quadrant_map();
    // reference pixel (40.5, 40.5) in 1-based FITS convention → (40, 40)
    image.set_frame(AffineFrame::new((40.5, 40.5), (200.0, -45.0), (-0.002, 0.002)));
    let config = TaggerConfig {
        min_distance_from_centre: 10.0,
        ..quadrant_config()
    };

    let result = tag_regions(&image, &config, &mut NoopObserver).unwrap();
    assert!(result.regions.is_empty());
    assert_eq!(result.discarded.exclusion, 1);
}

#[test]
fn tracking_centre_defaults_to_image_centre() {
    // one noisy 40px tile at [40, 80)²; centroid (60, 60) is ~28.3 px from (80, 80)
    let image = checkerboard(160, |row, col| {
        if (40..80).contains(&row) && (40..80).contains(&col) {
            10.0
        } else {
            1.0
        }
    });
    assert_eq!(image.frame().reference_pixel(), (80.0, 80.0));

    let config = TaggerConfig {
        tile_size: 40,
        ..quadrant_config()
    };
    let kept = tag_regions(&image, &config, &mut NoopObserver).unwrap();
    assert_eq!(kept.regions.len(), 1);
    assert_eq!(kept.regions[0].label(), "reg[1,1]");

    let config = TaggerConfig {
        min_distance_from_centre: 30.0,
        ..config
    };
    let result = tag_regions(&image, &config, &mut NoopObserver).unwrap();
    assert!(result.regions.is_empty());
    assert_eq!(result.discarded.exclusion, 1);
}

#[test]
fn shape_limits_cull_merged_regions() {
    let config = TaggerConfig {
        // a checkerboard is symmetric: skewness 0, flux ratio 1
        max_abs_skewness: Some(0.5),
        max_positive_to_negative_flux: Some(0.9),
        ..quadrant_config()
    };
    let result = tag_regions(&quadrant_map(), &config, &mut NoopObserver).unwrap();

    assert!(result.regions.is_empty());
    assert_eq!(result.discarded.abs_skew, 0);
    assert_eq!(result.discarded.flux_ratio, 1);
}

#[test]
fn l_shaped_noisy_tiles_merge_into_one_hull() {
    // an L of three noisy tiles in a 4x4 tile grid
    let image = checkerboard(160, |row, col| {
        let (tr, tc) = (row / 40, col / 40);
        if (tr, tc) == (0, 0) || (tr, tc) == (0, 1) || (tr, tc) == (1, 1) {
            9.0
        } else {
            1.0
        }
    });
    let config = TaggerConfig {
        tile_size: 40,
        min_blocks_in_region: 3,
        ..quadrant_config()
    };

    let result = tag_regions(&image, &config, &mut NoopObserver).unwrap();
    assert_eq!(result.candidates, 3);
    assert_eq!(result.regions.len(), 1);
    // hull of the L: 80x80 square minus the lower-left triangle
    assert!((result.regions[0].area() - 5600.0).abs() < 1e-9);
    assert!(result.merge_rounds >= 2);
}

#[test]
fn blank_tiles_do_not_break_the_run() {
    let mut image = quadrant_map();
    for row in 80..160 {
        for col in 80..160 {
            image.set(row, col, f64::NAN).unwrap();
        }
    }
    let result = tag_regions(&image, &quadrant_config(), &mut NoopObserver).unwrap();
    assert_eq!(result.regions.len(), 1);
    assert!(result.grid.value(1, 1).unwrap().is_nan());
}

#[test]
fn non_square_map_rejected() {
    let image: Raster<f64> = Raster::new(160, 120);
    assert!(matches!(
        tag_regions(&image, &quadrant_config(), &mut NoopObserver),
        Err(Error::Shape { rows: 160, cols: 120 })
    ));
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

#[test]
fn regions_written_as_ds9_overlay() {
    let result = tag_regions(&quadrant_map(), &quadrant_config(), &mut NoopObserver).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dE.reg");

    write_ds9_regions(&path, &result.regions).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "# Region file format: DS9 version 4.0");
    assert_eq!(
        lines[2],
        "physical; polygon(0,0,0,80,80,80,80,0) #select=1 text={mean area deviation 10.00x}"
    );
}

#[test]
fn catalog_sources_in_region_tagged() {
    let frame = AffineFrame::new((80.5, 80.5), (10.0, -60.0), (-0.001, 0.001));
    let mut image = quadrant_map();
    image.set_frame(frame);
    let result = tag_regions(&image, &quadrant_config(), &mut NoopObserver).unwrap();

    let (ra_in, dec_in) = frame.pixel_to_world(20.0, 30.0);
    let (ra_out, dec_out) = frame.pixel_to_world(120.0, 30.0);
    let mut sources = vec![
        SkySource::new("in_region", ra_in, dec_in),
        SkySource::new("quiet_field", ra_out, dec_out),
    ];

    let tagged = tag_sources(&mut sources, &result.regions, &frame, "dE");
    assert_eq!(tagged, 1);
    assert_eq!(sources[0].tags, vec!["dE".to_string()]);
    assert!(sources[1].tags.is_empty());
    assert!(result.regions[0].frame().is_some());

    let shared: Arc<dyn CoordinateFrame> = Arc::new(frame);
    assert!(result.regions[0].contains_world(ra_in, dec_in, shared.as_ref()));
}
