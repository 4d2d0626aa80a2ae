//! Raster element trait for pixel values

use num_traits::Float;
use std::fmt::Debug;

/// Trait for types that can be stored in a noise-map pixel.
///
/// Noise maps are floating point; blanked pixels are NaN or equal to an
/// explicit no-data value.
pub trait RasterElement: Float + Debug + Send + Sync + 'static {
    /// Check if this value represents no-data
    fn is_nodata(&self, nodata: Option<Self>) -> bool;
}

macro_rules! impl_raster_element_float {
    ($t:ty) => {
        impl RasterElement for $t {
            fn is_nodata(&self, nodata: Option<Self>) -> bool {
                if self.is_nan() {
                    return true;
                }
                match nodata {
                    Some(nd) => (self - nd).abs() < <$t>::EPSILON * 100.0,
                    None => false,
                }
            }
        }
    };
}

impl_raster_element_float!(f32);
impl_raster_element_float!(f64);
