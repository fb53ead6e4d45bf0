mod tile;

pub use tile::*;
