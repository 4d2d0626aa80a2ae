//! Thin I/O collaborators: noise-map input and region-overlay output

mod ds9;
mod noise_map;

pub use ds9::{
    write_ds9_circles, write_ds9_circles_to, write_ds9_regions, write_ds9_regions_to, Ds9Circle,
    RegionOutline,
};
pub use noise_map::{read_noise_map, read_noise_map_from_buffer};
