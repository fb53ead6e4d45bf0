use crate::{
    types::Coord,
    vector::{DrawnFeature, FeatureGeometry},
};

use super::{GeometryType, InteractionHandle, SketchGeometry};

/// What a draw interaction reports back to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawEvent {
    DrawStart { coordinate: Coord },
    Change(SketchGeometry),
    DrawEnd(DrawnFeature),
    DrawAbort,
}

/// A temporary feature drawn while a sketch is under construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructionFeature {
    pub geometry_type: GeometryType,
    pub coordinates: Vec<Coord>,
}

/// Builds one feature at a time from clicks, restricted to a single geometry type.
#[derive(Debug, Clone)]
pub struct DrawInteraction {
    handle: InteractionHandle,
    geometry_type: GeometryType,
    vertices: Vec<Coord>,
    cursor: Option<Coord>,
}

impl DrawInteraction {
    pub fn new(handle: InteractionHandle, geometry_type: GeometryType) -> Self {
        Self {
            handle,
            geometry_type,
            vertices: Vec::new(),
            cursor: None,
        }
    }

    pub fn handle(&self) -> InteractionHandle {
        self.handle
    }

    pub fn geometry_type(&self) -> GeometryType {
        self.geometry_type
    }

    pub fn is_drawing(&self) -> bool {
        !self.vertices.is_empty()
    }

    pub fn vertices(&self) -> &[Coord] {
        &self.vertices
    }

    /// Style rule: only features of the drawn type and the cursor vertex are rendered.
    pub fn renders(&self, geometry_type: GeometryType) -> bool {
        geometry_type == self.geometry_type || geometry_type == GeometryType::Point
    }

    pub fn min_points(&self) -> usize {
        match self.geometry_type {
            GeometryType::Point => 1,
            GeometryType::LineString => 2,
            GeometryType::Polygon => 3,
        }
    }

    pub fn pointer_move(&mut self, at: Coord) -> Option<DrawEvent> {
        self.cursor = Some(at);
        if self.is_drawing() {
            self.sketch_geometry().map(DrawEvent::Change)
        } else {
            None
        }
    }

    /// `near` tells whether a vertex lies within snapping distance of the click.
    pub fn click(&mut self, at: Coord, near: impl Fn(Coord) -> bool) -> Vec<DrawEvent> {
        self.cursor = Some(at);
        if self.geometry_type == GeometryType::Point {
            let feature = DrawnFeature::new(FeatureGeometry::Point(at));
            return vec![DrawEvent::DrawStart { coordinate: at }, DrawEvent::DrawEnd(feature)];
        }

        if !self.is_drawing() {
            self.vertices.push(at);
            return vec![DrawEvent::DrawStart { coordinate: at }];
        }

        if self.at_finish(&near) {
            return self.finish().into_iter().collect();
        }

        self.vertices.push(at);
        self.sketch_geometry().map(DrawEvent::Change).into_iter().collect()
    }

    fn at_finish(&self, near: &impl Fn(Coord) -> bool) -> bool {
        if self.vertices.len() < self.min_points() {
            return false;
        }
        let first = self.vertices.first().copied();
        let last = self.vertices.last().copied();
        match self.geometry_type {
            GeometryType::Point => false,
            GeometryType::LineString => last.is_some_and(|v| near(v)),
            GeometryType::Polygon => first.is_some_and(|v| near(v)) || last.is_some_and(|v| near(v)),
        }
    }

    /// Ends the sketch with the committed vertices if there are enough of them.
    pub fn finish(&mut self) -> Option<DrawEvent> {
        if !self.is_drawing() || self.vertices.len() < self.min_points() {
            return None;
        }
        let vertices = std::mem::take(&mut self.vertices);
        let geometry = match self.geometry_type {
            GeometryType::Point => FeatureGeometry::Point(vertices[0]),
            GeometryType::LineString => FeatureGeometry::line_string(&vertices),
            GeometryType::Polygon => FeatureGeometry::polygon(&vertices),
        };
        Some(DrawEvent::DrawEnd(DrawnFeature::new(geometry)))
    }

    pub fn abort(&mut self) -> Option<DrawEvent> {
        if !self.is_drawing() {
            return None;
        }
        self.vertices.clear();
        Some(DrawEvent::DrawAbort)
    }

    pub fn remove_last_point(&mut self) -> Option<DrawEvent> {
        if !self.is_drawing() {
            return None;
        }
        self.vertices.pop();
        if self.vertices.is_empty() {
            return Some(DrawEvent::DrawAbort);
        }
        self.sketch_geometry().map(DrawEvent::Change)
    }

    /// Committed vertices followed by the cursor, the way the sketch is measured.
    pub fn sketch_geometry(&self) -> Option<SketchGeometry> {
        if !self.is_drawing() {
            return None;
        }
        let coords = self.sketch_coordinates();
        match self.geometry_type {
            GeometryType::Point => None,
            GeometryType::LineString => Some(SketchGeometry::line(&coords)),
            GeometryType::Polygon => Some(SketchGeometry::polygon(&coords)),
        }
    }

    fn sketch_coordinates(&self) -> Vec<Coord> {
        let mut coords = self.vertices.clone();
        if let Some(cursor) = self.cursor {
            coords.push(cursor);
        }
        coords
    }

    /// Everything the interaction would draw, before the style rule filters it.
    pub fn construction_features(&self) -> Vec<ConstructionFeature> {
        let mut features = Vec::new();
        if self.is_drawing() {
            let coords = self.sketch_coordinates();
            match self.geometry_type {
                GeometryType::Point => {}
                GeometryType::LineString => features.push(ConstructionFeature {
                    geometry_type: GeometryType::LineString,
                    coordinates: coords,
                }),
                GeometryType::Polygon => {
                    let mut ring = coords.clone();
                    ring.push(coords[0]);
                    features.push(ConstructionFeature {
                        geometry_type: GeometryType::Polygon,
                        coordinates: ring,
                    });
                    features.push(ConstructionFeature {
                        geometry_type: GeometryType::LineString,
                        coordinates: coords,
                    });
                }
            }
        }
        if let Some(cursor) = self.cursor {
            features.push(ConstructionFeature {
                geometry_type: GeometryType::Point,
                coordinates: vec![cursor],
            });
        }
        features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{DrawMode, InteractionController};

    fn interaction(mode: DrawMode) -> DrawInteraction {
        let mut controller = InteractionController::default();
        controller.select(mode);
        controller.interaction().cloned().unwrap()
    }

    fn never(_: Coord) -> bool {
        false
    }

    fn same(target: Coord) -> impl Fn(Coord) -> bool {
        move |vertex| vertex == target
    }

    #[test]
    fn point_mode_finishes_on_the_first_click() {
        let mut draw = interaction(DrawMode::Point);
        let events = draw.click(Coord::new(1.0, 2.0), never);

        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], DrawEvent::DrawStart { .. }));
        match &events[1] {
            DrawEvent::DrawEnd(feature) => {
                assert_eq!(feature.geometry, FeatureGeometry::Point(Coord::new(1.0, 2.0)));
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert!(!draw.is_drawing());
    }

    #[test]
    fn line_grows_with_clicks_and_follows_the_cursor() {
        let mut draw = interaction(DrawMode::LineString);
        let a = Coord::new(0.0, 0.0);
        let b = Coord::new(0.0, 0.001);

        assert_eq!(draw.click(a, never), vec![DrawEvent::DrawStart { coordinate: a }]);
        assert!(draw.is_drawing());

        match draw.pointer_move(b) {
            Some(DrawEvent::Change(SketchGeometry::Line(line))) => assert_eq!(line.0.len(), 2),
            other => panic!("unexpected event {other:?}"),
        }

        let events = draw.click(b, never);
        assert!(matches!(events.as_slice(), [DrawEvent::Change(SketchGeometry::Line(_))]));
        assert_eq!(draw.vertices(), &[a, b]);
    }

    #[test]
    fn clicking_the_last_vertex_finishes_a_line() {
        let mut draw = interaction(DrawMode::LineString);
        let a = Coord::new(0.0, 0.0);
        let b = Coord::new(0.0, 0.001);
        draw.click(a, never);
        draw.click(b, never);

        let events = draw.click(b, same(b));
        match events.as_slice() {
            [DrawEvent::DrawEnd(feature)] => {
                assert_eq!(feature.geometry, FeatureGeometry::line_string(&[a, b]));
            }
            other => panic!("unexpected events {other:?}"),
        }
        assert!(!draw.is_drawing());
    }

    #[test]
    fn a_single_vertex_line_cannot_finish() {
        let mut draw = interaction(DrawMode::LineString);
        let a = Coord::new(0.0, 0.0);
        draw.click(a, never);

        // Too few vertices, so the click on the same spot adds a vertex instead.
        let events = draw.click(a, same(a));
        assert!(matches!(events.as_slice(), [DrawEvent::Change(_)]));
        assert_eq!(draw.vertices().len(), 2);
    }

    #[test]
    fn polygon_finishes_on_its_first_vertex() {
        let mut draw = interaction(DrawMode::Polygon);
        let a = Coord::new(0.0, 0.0);
        let b = Coord::new(0.0, 0.001);
        let c = Coord::new(0.001, 0.001);
        draw.click(a, never);
        draw.click(b, never);

        // Only two vertices: the first one does not close the ring yet.
        assert!(matches!(draw.click(c, same(a)).as_slice(), [DrawEvent::Change(_)]));

        let events = draw.click(a, same(a));
        match events.as_slice() {
            [DrawEvent::DrawEnd(feature)] => {
                assert_eq!(feature.geometry, FeatureGeometry::polygon(&[a, b, c]));
            }
            other => panic!("unexpected events {other:?}"),
        }
    }

    #[test]
    fn finish_requires_enough_vertices() {
        let mut draw = interaction(DrawMode::Polygon);
        assert_eq!(draw.finish(), None);
        draw.click(Coord::new(0.0, 0.0), never);
        draw.click(Coord::new(0.0, 1.0), never);
        assert_eq!(draw.finish(), None);
        draw.click(Coord::new(1.0, 1.0), never);
        assert!(matches!(draw.finish(), Some(DrawEvent::DrawEnd(_))));
    }

    #[test]
    fn abort_and_remove_last_point() {
        let mut draw = interaction(DrawMode::LineString);
        assert_eq!(draw.abort(), None);

        draw.click(Coord::new(0.0, 0.0), never);
        draw.click(Coord::new(0.0, 1.0), never);
        assert!(matches!(draw.remove_last_point(), Some(DrawEvent::Change(_))));
        assert_eq!(draw.remove_last_point(), Some(DrawEvent::DrawAbort));
        assert!(!draw.is_drawing());

        draw.click(Coord::new(0.0, 0.0), never);
        assert_eq!(draw.abort(), Some(DrawEvent::DrawAbort));
        assert_eq!(draw.sketch_geometry(), None);
    }

    #[test]
    fn polygon_construction_respects_the_style_rule() {
        let mut draw = interaction(DrawMode::Polygon);
        draw.click(Coord::new(0.0, 0.0), never);
        draw.pointer_move(Coord::new(0.0, 1.0));

        let kinds: Vec<_> = draw.construction_features().iter().map(|f| f.geometry_type).collect();
        assert_eq!(
            kinds,
            [GeometryType::Polygon, GeometryType::LineString, GeometryType::Point]
        );

        let rendered: Vec<_> = kinds.into_iter().filter(|kind| draw.renders(*kind)).collect();
        assert_eq!(rendered, [GeometryType::Polygon, GeometryType::Point]);
    }

    #[test]
    fn idle_interaction_only_shows_the_cursor_vertex() {
        let mut draw = interaction(DrawMode::LineString);
        assert!(draw.construction_features().is_empty());
        assert_eq!(draw.pointer_move(Coord::new(5.0, 5.0)), None);

        let features = draw.construction_features();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].geometry_type, GeometryType::Point);
    }
}
