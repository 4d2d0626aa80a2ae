//! SAOImage DS9 region-overlay writer

use crate::error::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// A polygonal region that can be drawn as a DS9 overlay
pub trait RegionOutline {
    /// Polygon vertices in pixel coordinates
    fn outline(&self) -> Vec<(f64, f64)>;

    /// Score shown in the overlay label
    fn severity(&self) -> f64;
}

const HEADER: &str = "# Region file format: DS9 version 4.0";
const GLOBAL: &str = "global color=red font=\"helvetica 6 normal roman\" edit=1 move=1 \
                      delete=1 highlite=1 include=1 wcs=wcs";

/// A circular marker, e.g. a tagged catalog source
#[derive(Debug, Clone, PartialEq)]
pub struct Ds9Circle {
    /// Centre in pixel coordinates
    pub x: f64,
    pub y: f64,
    /// Radius in pixels
    pub radius: f64,
    /// Text shown next to the marker
    pub label: String,
}

/// Write regions as DS9 `physical` polygons to `path`
pub fn write_ds9_regions<P, R>(path: P, regions: &[R]) -> Result<()>
where
    P: AsRef<Path>,
    R: RegionOutline,
{
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    write_ds9_regions_to(&mut writer, regions)?;
    writer.flush()?;
    Ok(())
}

/// Write regions as DS9 `physical` polygons to any writer
pub fn write_ds9_regions_to<W, R>(writer: &mut W, regions: &[R]) -> Result<()>
where
    W: Write,
    R: RegionOutline,
{
    writeln!(writer, "{}", HEADER)?;
    writeln!(writer, "{}", GLOBAL)?;
    for region in regions {
        let coords = region
            .outline()
            .iter()
            .map(|(x, y)| format!("{},{}", x, y))
            .collect::<Vec<_>>()
            .join(",");
        writeln!(
            writer,
            "physical; polygon({}) #select=1 text={{mean area deviation {:.2}x}}",
            coords,
            region.severity()
        )?;
    }
    Ok(())
}

/// Write markers as DS9 `physical` circles to `path`
pub fn write_ds9_circles<P: AsRef<Path>>(path: P, circles: &[Ds9Circle]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    write_ds9_circles_to(&mut writer, circles)?;
    writer.flush()?;
    Ok(())
}

/// Write markers as DS9 `physical` circles to any writer
pub fn write_ds9_circles_to<W: Write>(writer: &mut W, circles: &[Ds9Circle]) -> Result<()> {
    writeln!(writer, "{}", HEADER)?;
    writeln!(writer, "{}", GLOBAL)?;
    for c in circles {
        writeln!(
            writer,
            "physical; circle({},{},{}) #select=1 text={{{}}}",
            c.x, c.y, c.radius, c.label
        )?;
    }
    Ok(())
}
