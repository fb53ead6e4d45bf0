use bevy::prelude::*;
use geo::{BoundingRect, LineString, Polygon};
use rstar::{AABB, RTree, RTreeObject};
use uuid::Uuid;

use crate::{
    tools::{GeometryType, SketchGeometry},
    types::Coord,
};

/// Finished features, kept in an rtree so the renderer can cull them to the view.
#[derive(Resource, Clone, Default)]
pub struct VectorSource {
    features: RTree<DrawnFeature>,
    pub respawn: bool,
}

impl VectorSource {
    pub fn add_feature(&mut self, feature: DrawnFeature) {
        self.features.insert(feature);
        self.respawn = true;
    }

    pub fn len(&self) -> usize {
        self.features.size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &DrawnFeature> {
        self.features.iter()
    }

    /// Features whose bounding box touches the rectangle spanned by two corners.
    pub fn in_view(&self, a: Coord, b: Coord) -> impl Iterator<Item = &DrawnFeature> {
        let envelope = AABB::from_corners([a.long, a.lat], [b.long, b.lat]);
        self.features.locate_in_envelope_intersecting(&envelope)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawnFeature {
    pub id: Uuid,
    pub geometry: FeatureGeometry,
}

impl DrawnFeature {
    pub fn new(geometry: FeatureGeometry) -> Self {
        Self {
            id: Uuid::new_v4(),
            geometry,
        }
    }
}

/// Coordinates are stored as lon/lat in the geo types.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureGeometry {
    Point(Coord),
    LineString(LineString<f64>),
    Polygon(Polygon<f64>),
}

impl FeatureGeometry {
    pub fn line_string(coords: &[Coord]) -> Self {
        FeatureGeometry::LineString(crate::tools::to_line_string(coords))
    }

    /// The ring is closed by geo.
    pub fn polygon(ring: &[Coord]) -> Self {
        FeatureGeometry::Polygon(Polygon::new(crate::tools::to_line_string(ring), vec![]))
    }

    pub fn geometry_type(&self) -> GeometryType {
        match self {
            FeatureGeometry::Point(_) => GeometryType::Point,
            FeatureGeometry::LineString(_) => GeometryType::LineString,
            FeatureGeometry::Polygon(_) => GeometryType::Polygon,
        }
    }

    /// Lines and polygons carry a measurement, points do not.
    pub fn measurable(&self) -> Option<SketchGeometry> {
        match self {
            FeatureGeometry::Point(_) => None,
            FeatureGeometry::LineString(line) => Some(SketchGeometry::Line(line.clone())),
            FeatureGeometry::Polygon(polygon) => Some(SketchGeometry::Polygon(polygon.clone())),
        }
    }

    /// Lon/lat corners of the bounding box.
    pub fn bounds(&self) -> Option<([f64; 2], [f64; 2])> {
        let rect = match self {
            FeatureGeometry::Point(coord) => return Some(([coord.long, coord.lat], [coord.long, coord.lat])),
            FeatureGeometry::LineString(line) => line.bounding_rect(),
            FeatureGeometry::Polygon(polygon) => polygon.bounding_rect(),
        }?;
        Some(([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]))
    }
}

impl RTreeObject for DrawnFeature {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        match self.geometry.bounds() {
            Some((min, max)) => AABB::from_corners(min, max),
            None => AABB::from_point([0.0, 0.0]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn features_are_found_by_view() {
        let mut source = VectorSource::default();
        source.add_feature(DrawnFeature::new(FeatureGeometry::Point(Coord::new(10.0, 10.0))));
        source.add_feature(DrawnFeature::new(FeatureGeometry::line_string(&[
            Coord::new(50.0, 0.0),
            Coord::new(51.0, 1.0),
        ])));
        assert_eq!(source.len(), 2);
        assert!(source.respawn);

        let near_london: Vec<_> = source.in_view(Coord::new(49.0, -1.0), Coord::new(52.0, 2.0)).collect();
        assert_eq!(near_london.len(), 1);
        assert_eq!(near_london[0].geometry.geometry_type(), GeometryType::LineString);

        assert_eq!(source.in_view(Coord::new(-10.0, -10.0), Coord::new(-5.0, -5.0)).count(), 0);
    }

    #[test]
    fn polygon_bounds_cover_the_ring() {
        let polygon = FeatureGeometry::polygon(&[
            Coord::new(0.0, 0.0),
            Coord::new(0.0, 2.0),
            Coord::new(1.0, 2.0),
        ]);
        assert_eq!(polygon.bounds(), Some(([0.0, 0.0], [2.0, 1.0])));
        assert_eq!(polygon.geometry_type(), GeometryType::Polygon);
        assert!(matches!(polygon.measurable(), Some(SketchGeometry::Polygon(_))));
        assert_eq!(FeatureGeometry::Point(Coord::new(0.0, 0.0)).measurable(), None);
    }

    #[test]
    fn every_feature_gets_its_own_id() {
        let point = FeatureGeometry::Point(Coord::new(1.0, 1.0));
        assert_ne!(DrawnFeature::new(point.clone()).id, DrawnFeature::new(point).id);
    }
}
