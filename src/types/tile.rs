use bevy::math::{DVec2, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Half the width of the spherical web mercator plane, in meters.
pub const MERCATOR_EXTENT: f64 = 20037508.342789244;

/// Deepest zoom level the map goes to. The tile grid is indexed with `u32`, so
/// levels past 31 cannot even be addressed.
pub const MAX_ZOOM: u32 = 19;

/// Web mercator stops being defined at the poles, tiles stop here.
pub const MAX_LATITUDE: f64 = 85.0511287798066;

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize, Copy)]
#[serde(rename_all = "camelCase")]
pub struct Coord {
    pub lat: f64,
    #[serde(rename = "lon")]
    pub long: f64,
}

impl Coord {
    pub const fn new(lat: f64, long: f64) -> Self {
        Self { lat, long }
    }

    pub fn to_mercator(&self) -> DVec2 {
        let lat = self.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        let x = self.long * MERCATOR_EXTENT / 180.0;
        let y = (PI / 4.0 + lat / 2.0).tan().ln() * MERCATOR_EXTENT / PI;
        DVec2::new(x, y)
    }

    pub fn from_mercator(point: DVec2) -> Self {
        let long = point.x / MERCATOR_EXTENT * 180.0;
        let lat = 2.0 * (point.y / MERCATOR_EXTENT * PI).exp().atan() - PI / 2.0;
        Coord::new(lat.to_degrees(), normalize_longitude(long))
    }

    /// The tile containing this coordinate, clamped to the tile grid.
    pub fn to_tile(&self, zoom: u32) -> TileId {
        TileId::containing(self.to_mercator(), zoom)
    }
}

impl From<Coord> for geo::Coord<f64> {
    fn from(coord: Coord) -> Self {
        geo::Coord {
            x: coord.long,
            y: coord.lat,
        }
    }
}

impl From<geo::Coord<f64>> for Coord {
    fn from(coord: geo::Coord<f64>) -> Self {
        Coord::new(coord.y, coord.x)
    }
}

impl From<geo::Point<f64>> for Coord {
    fn from(point: geo::Point<f64>) -> Self {
        Coord::new(point.y(), point.x())
    }
}

/// Index of a raster tile in the XYZ scheme, y growing southwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileId {
    pub x: u32,
    pub y: u32,
    pub zoom: u32,
}

impl TileId {
    pub const fn new(x: u32, y: u32, zoom: u32) -> Self {
        Self { x, y, zoom }
    }

    pub fn tiles_per_side(zoom: u32) -> u32 {
        1 << zoom
    }

    pub fn width_meters(zoom: u32) -> f64 {
        2.0 * MERCATOR_EXTENT / Self::tiles_per_side(zoom) as f64
    }

    pub fn containing(mercator: DVec2, zoom: u32) -> Self {
        let (x, y) = Self::grid_position(mercator, zoom);
        let max = Self::tiles_per_side(zoom) as i64 - 1;
        TileId::new(x.clamp(0, max) as u32, y.clamp(0, max) as u32, zoom)
    }

    /// Unclamped grid position of a mercator point, used for ranges that may leave the world.
    pub fn grid_position(mercator: DVec2, zoom: u32) -> (i64, i64) {
        let width = Self::width_meters(zoom);
        let x = ((mercator.x + MERCATOR_EXTENT) / width).floor() as i64;
        let y = ((MERCATOR_EXTENT - mercator.y) / width).floor() as i64;
        (x, y)
    }

    pub fn is_valid(&self) -> bool {
        let side = Self::tiles_per_side(self.zoom);
        self.x < side && self.y < side
    }

    /// Mercator position of the north west corner.
    pub fn top_left_mercator(&self) -> DVec2 {
        let width = Self::width_meters(self.zoom);
        DVec2::new(
            self.x as f64 * width - MERCATOR_EXTENT,
            MERCATOR_EXTENT - self.y as f64 * width,
        )
    }

    pub fn top_left(&self) -> Coord {
        Coord::from_mercator(self.top_left_mercator())
    }
}

/// Maps geographic coordinates onto the 2d world the camera looks at.
///
/// World units are screen pixels at the current zoom level, measured from the
/// reference point with y pointing north.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapProjection {
    pub reference: DVec2,
    pub zoom: u32,
    pub tile_size: f64,
}

impl MapProjection {
    pub fn new(reference: Coord, zoom: u32, tile_size: f64) -> Self {
        Self {
            reference: reference.to_mercator(),
            zoom,
            tile_size,
        }
    }

    pub fn meters_per_pixel(&self) -> f64 {
        TileId::width_meters(self.zoom) / self.tile_size
    }

    pub fn mercator_to_world(&self, mercator: DVec2) -> Vec2 {
        ((mercator - self.reference) / self.meters_per_pixel()).as_vec2()
    }

    pub fn world_to_mercator(&self, world: Vec2) -> DVec2 {
        self.reference + world.as_dvec2() * self.meters_per_pixel()
    }

    pub fn coord_to_world(&self, coord: Coord) -> Vec2 {
        self.mercator_to_world(coord.to_mercator())
    }

    pub fn world_to_coord(&self, world: Vec2) -> Coord {
        Coord::from_mercator(self.world_to_mercator(world))
    }

    pub fn tile_origin_world(&self, tile: TileId) -> Vec2 {
        self.mercator_to_world(tile.top_left_mercator())
    }

    /// Tiles covering the world rectangle, grown by `margin` tiles on each side.
    pub fn tiles_in_rect(&self, min: Vec2, max: Vec2, margin: i64) -> Vec<TileId> {
        let (left, top) = TileId::grid_position(self.world_to_mercator(Vec2::new(min.x, max.y)), self.zoom);
        let (right, bottom) = TileId::grid_position(self.world_to_mercator(Vec2::new(max.x, min.y)), self.zoom);
        let side = TileId::tiles_per_side(self.zoom) as i64;

        let mut tiles = Vec::new();
        for y in (top - margin).max(0)..=(bottom + margin).min(side - 1) {
            for x in (left - margin).max(0)..=(right + margin).min(side - 1) {
                tiles.push(TileId::new(x as u32, y as u32, self.zoom));
            }
        }
        tiles
    }
}

fn normalize_longitude(lon: f64) -> f64 {
    let mut lon = lon;
    while lon > 180.0 {
        lon -= 360.0;
    }
    while lon < -180.0 {
        lon += 360.0;
    }
    lon
}
