use std::fmt;

use geo::{Haversine, InteriorPoint, Length, LineString, Polygon, algorithm::geodesic_area::GeodesicArea};

use crate::types::Coord;

use super::GeometryType;

/// Lengths above this many meters are shown in kilometers.
pub const LENGTH_KM_THRESHOLD: f64 = 100.0;

/// Areas above this many square meters are shown in square kilometers.
pub const AREA_KM2_THRESHOLD: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measurement {
    /// Meters.
    Length(f64),
    /// Square meters.
    Area(f64),
}

impl Measurement {
    pub fn value(&self) -> f64 {
        match self {
            Measurement::Length(meters) => *meters,
            Measurement::Area(square_meters) => *square_meters,
        }
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Measurement::Length(meters) if meters > LENGTH_KM_THRESHOLD => {
                write!(f, "{} km", round_hundredths(meters / 1000.0))
            }
            Measurement::Length(meters) => write!(f, "{} m", round_hundredths(meters)),
            Measurement::Area(square_meters) if square_meters > AREA_KM2_THRESHOLD => {
                write!(f, "{} km²", round_hundredths(square_meters / 1_000_000.0))
            }
            Measurement::Area(square_meters) => write!(f, "{} m²", round_hundredths(square_meters)),
        }
    }
}

/// Rounds half up to two decimals after the unit conversion.
pub fn round_hundredths(value: f64) -> f64 {
    // `+ 0.0` folds a negative zero into zero so it never prints as "-0".
    (value * 100.0).round() / 100.0 + 0.0
}

pub fn format_length(meters: f64) -> String {
    Measurement::Length(meters).to_string()
}

pub fn format_area(square_meters: f64) -> String {
    Measurement::Area(square_meters).to_string()
}

/// The geometry of a sketch in progress. Only lines and polygons are measurable.
#[derive(Debug, Clone, PartialEq)]
pub enum SketchGeometry {
    Line(LineString<f64>),
    Polygon(Polygon<f64>),
}

impl SketchGeometry {
    pub fn line(coords: &[Coord]) -> Self {
        SketchGeometry::Line(to_line_string(coords))
    }

    pub fn polygon(ring: &[Coord]) -> Self {
        SketchGeometry::Polygon(Polygon::new(to_line_string(ring), vec![]))
    }

    pub fn geometry_type(&self) -> GeometryType {
        match self {
            SketchGeometry::Line(_) => GeometryType::LineString,
            SketchGeometry::Polygon(_) => GeometryType::Polygon,
        }
    }

    pub fn measure(&self) -> Measurement {
        match self {
            SketchGeometry::Line(line) => Measurement::Length(line_length(line)),
            SketchGeometry::Polygon(polygon) => Measurement::Area(polygon_area(polygon)),
        }
    }

    pub fn label(&self) -> String {
        self.measure().to_string()
    }

    /// Where the measurement tooltip sits: the last vertex of a line, inside a polygon.
    pub fn tooltip_anchor(&self) -> Option<Coord> {
        match self {
            SketchGeometry::Line(line) => line.0.last().copied().map(Coord::from),
            SketchGeometry::Polygon(polygon) => polygon
                .interior_point()
                .map(Coord::from)
                .or_else(|| polygon.exterior().0.first().copied().map(Coord::from)),
        }
    }
}

pub fn to_line_string(coords: &[Coord]) -> LineString<f64> {
    LineString::new(coords.iter().copied().map(geo::Coord::from).collect())
}

/// Great circle length of a line in meters, on a sphere of the GRS80 mean radius.
pub fn line_length(line: &LineString<f64>) -> f64 {
    Haversine.length(line)
}

/// Geodesic area of a polygon in square meters. Rings with fewer than three
/// distinct vertices enclose nothing.
pub fn polygon_area(polygon: &Polygon<f64>) -> f64 {
    let mut vertices: Vec<geo::Coord<f64>> = polygon.exterior().0.clone();
    vertices.dedup();
    if vertices.len() > 1 && vertices.first() == vertices.last() {
        vertices.pop();
    }
    if vertices.len() < 3 {
        return 0.0;
    }
    polygon.geodesic_area_unsigned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lengths_switch_to_kilometers_above_one_hundred_meters() {
        assert_eq!(format_length(150.0), "0.15 km");
        assert_eq!(format_length(50.0), "50 m");
        assert_eq!(format_length(100.0), "100 m");
        assert_eq!(format_length(100.004), "0.1 km");
        assert_eq!(format_length(12_346.0), "12.35 km");
    }

    #[test]
    fn areas_switch_to_square_kilometers_above_ten_thousand() {
        assert_eq!(format_area(5000.0), "5000 m²");
        assert_eq!(format_area(20_000.0), "0.02 km²");
        assert_eq!(format_area(10_000.0), "10000 m²");
        assert_eq!(format_area(2_500_000.0), "2.5 km²");
    }

    #[test]
    fn values_round_to_two_decimals() {
        assert_eq!(format_length(12.3456), "12.35 m");
        assert_eq!(format_area(0.004), "0 m²");
        assert_eq!(round_hundredths(0.005), 0.01);
    }

    #[test]
    fn degenerate_geometries_measure_zero() {
        let point = Coord::new(10.0, 10.0);
        assert_eq!(SketchGeometry::line(&[point, point]).label(), "0 m");
        assert_eq!(SketchGeometry::polygon(&[point, point, point]).label(), "0 m²");

        let flat = [Coord::new(0.0, 0.0), Coord::new(0.0, 0.001)];
        assert_eq!(SketchGeometry::polygon(&flat).label(), "0 m²");
    }

    #[test]
    fn line_length_follows_the_great_circle() {
        // Along the equator the arc is simply radius times angle.
        let line = SketchGeometry::line(&[Coord::new(0.0, 0.0), Coord::new(0.0, 0.0004)]);
        let expected = 6_371_008.8 * 0.0004_f64.to_radians();
        assert!((line.measure().value() - expected).abs() < 1e-6);
        assert_eq!(line.label(), "44.48 m");

        let longer = SketchGeometry::line(&[
            Coord::new(0.0, 0.0),
            Coord::new(0.0, 0.0005),
            Coord::new(0.0, 0.001),
        ]);
        assert_eq!(longer.label(), "0.11 km");
    }

    #[test]
    fn polygon_area_is_geodesic() {
        let square = SketchGeometry::polygon(&[
            Coord::new(0.0, 0.0),
            Coord::new(0.0, 0.001),
            Coord::new(0.001, 0.001),
            Coord::new(0.001, 0.0),
        ]);
        let area = square.measure().value();
        assert!(area > 12_000.0 && area < 12_600.0, "area was {area}");
        assert_eq!(square.label(), "0.01 km²");

        let small = SketchGeometry::polygon(&[
            Coord::new(0.0, 0.0),
            Coord::new(0.0, 0.0005),
            Coord::new(0.0005, 0.0005),
            Coord::new(0.0005, 0.0),
        ]);
        assert!(small.label().ends_with(" m²"));
    }

    #[test]
    fn anchors_follow_geometry_type() {
        let line = SketchGeometry::line(&[Coord::new(1.0, 2.0), Coord::new(3.0, 4.0)]);
        assert_eq!(line.tooltip_anchor(), Some(Coord::new(3.0, 4.0)));
        assert_eq!(line.geometry_type(), GeometryType::LineString);

        let square = SketchGeometry::polygon(&[
            Coord::new(0.0, 0.0),
            Coord::new(0.0, 2.0),
            Coord::new(2.0, 2.0),
            Coord::new(2.0, 0.0),
        ]);
        let anchor = square.tooltip_anchor().unwrap();
        assert!(anchor.lat > 0.0 && anchor.lat < 2.0);
        assert!(anchor.long > 0.0 && anchor.long < 2.0);
        assert_eq!(square.geometry_type(), GeometryType::Polygon);
    }
}
