//! Noise-map reading from single-band float TIFF
//!
//! Uses the `tiff` crate. A linear coordinate frame is read from the GeoTIFF
//! ModelPixelScale/ModelTiepoint tags when present, and a blanking value from
//! the GDAL_NODATA tag.

use crate::error::{Error, Result};
use crate::frame::AffineFrame;
use crate::raster::Raster;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;
use tiff::ColorType;

const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const GDAL_NODATA: u16 = 42113;

/// Read a noise map into a `Raster<f64>`
pub fn read_noise_map<P: AsRef<Path>>(path: P) -> Result<Raster<f64>> {
    let file = File::open(path.as_ref())?;
    decode_noise_map(BufReader::new(file))
}

/// Read a noise map from an in-memory TIFF buffer
pub fn read_noise_map_from_buffer(data: &[u8]) -> Result<Raster<f64>> {
    decode_noise_map(Cursor::new(data))
}

fn decode_noise_map<R: Read + Seek>(reader: R) -> Result<Raster<f64>> {
    let mut decoder =
        Decoder::new(reader).map_err(|e| Error::Other(format!("TIFF decode error: {}", e)))?;

    match decoder.colortype() {
        Ok(ColorType::Gray(_)) => {}
        Ok(other) => {
            return Err(Error::UnsupportedDataType(format!(
                "noise map must be single-band, got {:?}",
                other
            )));
        }
        Err(e) => return Err(Error::Other(format!("Cannot read colour type: {}", e))),
    }

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Other(format!("Cannot read dimensions: {}", e)))?;
    let rows = height as usize;
    let cols = width as usize;

    let result = decoder
        .read_image()
        .map_err(|e| Error::Other(format!("Cannot read image data: {}", e)))?;

    let data: Vec<f64> = match result {
        DecodingResult::F32(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::F64(buf) => buf,
        DecodingResult::U8(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::U16(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::U32(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::I8(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::I16(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::I32(buf) => buf.into_iter().map(f64::from).collect(),
        _ => {
            return Err(Error::UnsupportedDataType(
                "Unsupported TIFF pixel format".to_string(),
            ));
        }
    };

    let mut raster = Raster::from_vec(data, rows, cols)?;

    if let Some(frame) = read_frame(&mut decoder)? {
        raster.set_frame(frame.recentred(cols, rows));
    }
    if let Some(nodata) = read_nodata(&mut decoder) {
        raster.set_nodata(Some(nodata));
    }

    Ok(raster)
}

/// Frame from ModelTiepoint `[I, J, K, X, Y, Z]` and ModelPixelScale `[sx, sy, sz]`.
///
/// The tiepoint ties raster corner `(I, J)` to world `(X, Y)`; rows run
/// towards decreasing world `y`. The returned frame is still anchored on that
/// corner. A file with neither tag has no frame; a file with only one of them,
/// or with short tag values, is missing an axis.
fn read_frame<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<Option<AffineFrame>> {
    let scale = decoder.get_tag_f64_vec(Tag::Unknown(MODEL_PIXEL_SCALE)).ok();
    let tiepoint = decoder.get_tag_f64_vec(Tag::Unknown(MODEL_TIEPOINT)).ok();

    let (scale, tiepoint) = match (scale, tiepoint) {
        (None, None) => return Ok(None),
        (Some(scale), Some(tiepoint)) => (scale, tiepoint),
        (None, Some(_)) => return Err(Error::MissingAxis("ModelPixelScale".into())),
        (Some(_), None) => return Err(Error::MissingAxis("ModelTiepoint".into())),
    };
    if scale.len() < 2 {
        return Err(Error::MissingAxis(format!(
            "ModelPixelScale has {} values, need x and y",
            scale.len()
        )));
    }
    if tiepoint.len() < 6 {
        return Err(Error::MissingAxis(format!(
            "ModelTiepoint has {} values, need 6",
            tiepoint.len()
        )));
    }

    Ok(Some(AffineFrame::new(
        (tiepoint[0] + 0.5, tiepoint[1] + 0.5),
        (tiepoint[3], tiepoint[4]),
        (scale[0], -scale[1]),
    )))
}

fn read_nodata<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<f64> {
    decoder
        .get_tag_ascii_string(Tag::Unknown(GDAL_NODATA))
        .ok()?
        .trim_matches(char::from(0))
        .trim()
        .parse()
        .ok()
}
