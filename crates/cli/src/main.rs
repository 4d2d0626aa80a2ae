//! noisetag CLI - tag regions of excess noise in interferometric noise maps

mod catalog_csv;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use noisetag_algorithms::catalog::{tag_markers, tag_sources, SkySource};
use noisetag_algorithms::filters::ExclusionZone;
use noisetag_algorithms::geometry::ConvexRegion;
use noisetag_algorithms::observer::LogObserver;
use noisetag_algorithms::tagger::{tag_regions, TagResult, TaggerConfig};
use noisetag_core::io::{read_noise_map, write_ds9_circles, write_ds9_regions};
use noisetag_core::{CoordinateFrame, Raster};

/// Radius of the DS9 marker drawn on each tagged source, in pixels
const TAG_MARKER_RADIUS: f64 = 5.0;

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "noisetag")]
#[command(author, version, long_about = None)]
#[command(about = "Tag regions of excess noise in a residual noise map")]
struct Cli {
    /// Residual noise map (single-band float GeoTIFF, square)
    noise_map: PathBuf,

    /// Tile side length in pixels
    #[arg(long, default_value_t = 80)]
    tile_size: usize,

    /// Tiles above sigma times the global reference are tagged
    #[arg(short, long, default_value_t = 2.3)]
    sigma: f64,

    /// Percentile of tile statistics used as the global reference
    #[arg(long, default_value_t = 30.0)]
    global_rms_percentile: f64,

    /// Minimum number of tiles a tagged region must cover
    #[arg(long, default_value_t = 3)]
    min_tiles_region: usize,

    /// Ignore regions within this many pixels of the tracking centre (0 disables)
    #[arg(long, default_value_t = 0.0)]
    min_distance_from_tracking_centre: f64,

    /// Exclusion zone as "cx,cy,radius" in pixels (repeatable)
    #[arg(long = "add-custom-exclusion-zone", value_name = "CX,CY,R")]
    exclusion_zones: Vec<ExclusionZone>,

    /// Discard regions with skewness above this
    #[arg(long)]
    max_right_skewness: Option<f64>,

    /// Discard regions with absolute skewness above this
    #[arg(long)]
    max_abs_skewness: Option<f64>,

    /// Discard regions whose positive flux exceeds this multiple of the negative flux
    #[arg(long)]
    max_positive_to_negative_flux: Option<f64>,

    /// DS9 region file to write
    #[arg(long, default_value = "dE.reg")]
    ds9_reg_file: PathBuf,

    /// DS9 region file marking tagged catalog sources as circles
    #[arg(long, default_value = "dE.tags.reg")]
    ds9_tag_reg_file: PathBuf,

    /// Catalog to tag (CSV: name,ra_deg,dec_deg[,tags])
    #[arg(long)]
    input_catalog: Option<PathBuf>,

    /// Tag added to catalog sources inside tagged regions
    #[arg(long, default_value = "dE")]
    de_tag_name: String,

    /// Where to write the tagged catalog (defaults to <input>.tagged.csv)
    #[arg(long)]
    tagged_catalog: Option<PathBuf>,

    /// Also write the tagged regions as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> TaggerConfig {
        TaggerConfig {
            tile_size: self.tile_size,
            sigma: self.sigma,
            global_stat_percentile: self.global_rms_percentile,
            min_blocks_in_region: self.min_tiles_region,
            min_distance_from_centre: self.min_distance_from_tracking_centre,
            exclusion_zones: self.exclusion_zones.clone(),
            max_right_skewness: self.max_right_skewness,
            max_abs_skewness: self.max_abs_skewness,
            max_positive_to_negative_flux: self.max_positive_to_negative_flux,
            ..TaggerConfig::default()
        }
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to install logger")
}

fn spinner(msg: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .context("Invalid spinner template")?,
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

fn read_map(path: &Path) -> Result<Raster<f64>> {
    let pb = spinner("Reading noise map...")?;
    let raster = read_noise_map(path)
        .with_context(|| format!("Failed to read noise map {}", path.display()))?;
    pb.finish_and_clear();
    info!("Input: {} x {}", raster.cols(), raster.rows());

    let stats = raster.statistics();
    if let (Some(min), Some(max)) = (stats.min, stats.max) {
        info!(
            "Valid pixels: {} ({} blanked), range [{:.4e}, {:.4e}]",
            stats.valid_count, stats.nodata_count, min, max
        );
    }
    Ok(raster)
}

fn region_json(region: &ConvexRegion) -> serde_json::Value {
    let centroid = region.centroid();
    json!({
        "label": region.label(),
        "severity": region.severity(),
        "area": region.area(),
        "centroid": [centroid.x, centroid.y],
        "vertices": region.vertices().iter().map(|c| [c.x, c.y]).collect::<Vec<_>>(),
    })
}

fn write_json(path: &Path, result: &TagResult, config: &TaggerConfig) -> Result<()> {
    let doc = json!({
        "config": config,
        "threshold": result.threshold,
        "candidates": result.candidates,
        "discarded": result.discarded,
        "merge_rounds": result.merge_rounds,
        "regions": result.regions.iter().map(region_json).collect::<Vec<_>>(),
    });
    let text = serde_json::to_string_pretty(&doc).context("Failed to serialize regions")?;
    std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}

fn tag_catalog(cli: &Cli, input: &Path, image: &Raster<f64>, result: &TagResult) -> Result<()> {
    let mut sources = catalog_csv::read_catalog(input)?;
    let tagged = tag_sources(&mut sources, &result.regions, image.frame(), &cli.de_tag_name);
    info!(
        "Tagged {} of {} catalog sources with '{}'",
        tagged,
        sources.len(),
        cli.de_tag_name
    );

    let output = cli
        .tagged_catalog
        .clone()
        .unwrap_or_else(|| input.with_extension("tagged.csv"));
    catalog_csv::write_catalog(&output, &sources)?;
    println!("Tagged catalog saved to: {}", output.display());

    write_tag_regions(&cli.ds9_tag_reg_file, &sources, image.frame(), &cli.de_tag_name)?;
    println!("Tagged source regions saved to: {}", cli.ds9_tag_reg_file.display());
    Ok(())
}

fn write_tag_regions(
    path: &Path,
    sources: &[SkySource],
    frame: &dyn CoordinateFrame,
    tag: &str,
) -> Result<()> {
    let markers = tag_markers(sources, frame, tag, TAG_MARKER_RADIUS);
    write_ds9_circles(path, &markers)
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn minutes(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    let start = Instant::now();
    let config = cli.config();
    config.validate().context("Invalid arguments")?;

    let image = read_map(&cli.noise_map)?;
    let result = tag_regions(&image, &config, &mut LogObserver).context("Tagging failed")?;

    if result.regions.is_empty() {
        println!("No regions met cutoff criterion. No dE tags shall be raised.");
    } else {
        println!("The following regions will be tagged:");
        for region in &result.regions {
            println!("  {}", region);
        }
    }

    let pb = spinner("Writing outputs...")?;
    write_ds9_regions(&cli.ds9_reg_file, &result.regions)
        .with_context(|| format!("Failed to write {}", cli.ds9_reg_file.display()))?;
    if let Some(path) = &cli.json {
        write_json(path, &result, &config)?;
    }
    pb.finish_and_clear();
    println!("Region file saved to: {}", cli.ds9_reg_file.display());

    if let Some(input) = &cli.input_catalog {
        tag_catalog(&cli, input, &image, &result)?;
    }

    println!("  Processing time: {} minutes", minutes(start.elapsed()));
    Ok(())
}
