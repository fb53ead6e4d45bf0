//! Raster basemap: picks the XYZ tiles covering the view, downloads them on
//! worker threads and shows them as sprites.

mod fetch;
mod tile_map;

pub use fetch::*;
pub use tile_map::*;
