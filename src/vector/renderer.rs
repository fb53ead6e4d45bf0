use bevy::prelude::*;

use crate::{
    map::MapOwned,
    tiles::{TileMapResources, ZoomChangedEvent},
    tools::{DrawSession, GeometryType},
    types::Coord,
};

use super::{
    FEATURE_FILL, FEATURE_POINT_RADIUS, FEATURE_STROKE, FEATURE_Z, FeatureGeometry, SKETCH_DASH,
    SKETCH_FILL, SKETCH_STROKE, SKETCH_VERTEX_FILL, SKETCH_VERTEX_RADIUS, SKETCH_VERTEX_STROKE,
    SKETCH_Z, VectorSource, dash_segments, polygon_mesh,
};

pub struct VectorLayerPlugin;

impl Plugin for VectorLayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                respawn_feature_meshes.run_if(resource_exists::<VectorSource>),
                draw_feature_outlines.run_if(resource_exists::<VectorSource>),
                (update_sketch_mesh, draw_sketch).run_if(resource_exists::<DrawSession>),
            )
                .run_if(resource_exists::<TileMapResources>),
        );
    }
}

#[derive(Component)]
pub struct FeatureMesh;

#[derive(Component)]
pub struct SketchMesh;

fn ring_to_world(res_manager: &TileMapResources, ring: &geo::LineString<f64>) -> Vec<Vec2> {
    ring.0
        .iter()
        .map(|c| res_manager.coord_to_point(Coord::from(*c)))
        .collect()
}

/// The corners of the camera view as map coordinates.
fn view_coords(
    camera: &Query<(&Camera, &GlobalTransform), With<Camera2d>>,
    res_manager: &TileMapResources,
) -> Option<(Coord, Coord)> {
    let (camera, transform) = camera.single().ok()?;
    let half = camera.logical_viewport_size()? / 2.0;
    let center = transform.translation().truncate();
    Some((
        res_manager.point_to_coord(center - half),
        res_manager.point_to_coord(center + half),
    ))
}

/// Polygon fills are meshes in world pixels, so they are rebuilt when a
/// feature is added or the zoom level changes.
fn respawn_feature_meshes(
    mut commands: Commands,
    mut source: ResMut<VectorSource>,
    mut zoom_changed: EventReader<ZoomChangedEvent>,
    res_manager: Res<TileMapResources>,
    existing: Query<Entity, With<FeatureMesh>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    let zoomed = zoom_changed.read().count() > 0;
    if !source.respawn && !zoomed {
        return;
    }
    source.respawn = false;

    for entity in &existing {
        commands.entity(entity).despawn();
    }

    let material = materials.add(ColorMaterial::from_color(FEATURE_FILL));
    for feature in source.iter() {
        let FeatureGeometry::Polygon(polygon) = &feature.geometry else {
            continue;
        };
        let Some(mesh) = polygon_mesh(&ring_to_world(&res_manager, polygon.exterior())) else {
            continue;
        };
        commands.spawn((
            Mesh2d(meshes.add(mesh)),
            MeshMaterial2d(material.clone()),
            Transform::from_xyz(0.0, 0.0, FEATURE_Z),
            FeatureMesh,
            MapOwned,
        ));
    }
}

/// A finished feature in world space, the way the outline pass draws it.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureOutline {
    Point(Vec2),
    Path(Vec<Vec2>),
}

/// Outlines of the finished features touching the view. Finished features keep
/// the default style whatever the active interaction draws.
pub fn feature_outlines(source: &VectorSource, res_manager: &TileMapResources, a: Coord, b: Coord) -> Vec<FeatureOutline> {
    source
        .in_view(a, b)
        .map(|feature| match &feature.geometry {
            FeatureGeometry::Point(coord) => FeatureOutline::Point(res_manager.coord_to_point(*coord)),
            FeatureGeometry::LineString(line) => FeatureOutline::Path(ring_to_world(res_manager, line)),
            FeatureGeometry::Polygon(polygon) => FeatureOutline::Path(ring_to_world(res_manager, polygon.exterior())),
        })
        .collect()
}

fn draw_feature_outlines(
    mut gizmos: Gizmos,
    source: Res<VectorSource>,
    res_manager: Res<TileMapResources>,
    camera: Query<(&Camera, &GlobalTransform), With<Camera2d>>,
) {
    let Some((a, b)) = view_coords(&camera, &res_manager) else {
        return;
    };

    for outline in feature_outlines(&source, &res_manager, a, b) {
        match outline {
            FeatureOutline::Point(center) => {
                gizmos.circle_2d(Isometry2d::from_translation(center), FEATURE_POINT_RADIUS, FEATURE_STROKE);
                gizmos.circle_2d(Isometry2d::from_translation(center), FEATURE_POINT_RADIUS - 2.0, FEATURE_FILL);
            }
            FeatureOutline::Path(points) => gizmos.linestrip_2d(points, FEATURE_STROKE),
        }
    }
}

fn update_sketch_mesh(
    mut commands: Commands,
    session: Res<DrawSession>,
    res_manager: Res<TileMapResources>,
    existing: Query<Entity, With<SketchMesh>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    if !session.is_changed() && !res_manager.is_changed() {
        return;
    }
    for entity in &existing {
        commands.entity(entity).despawn();
    }

    let Some(interaction) = session.controller().interaction() else {
        return;
    };
    let fill = interaction
        .construction_features()
        .into_iter()
        .find(|feature| feature.geometry_type == GeometryType::Polygon && interaction.renders(feature.geometry_type));
    let Some(fill) = fill else {
        return;
    };

    let ring: Vec<Vec2> = fill.coordinates.iter().map(|c| res_manager.coord_to_point(*c)).collect();
    if let Some(mesh) = polygon_mesh(&ring) {
        commands.spawn((
            Mesh2d(meshes.add(mesh)),
            MeshMaterial2d(materials.add(ColorMaterial::from_color(SKETCH_FILL))),
            Transform::from_xyz(0.0, 0.0, SKETCH_Z),
            SketchMesh,
            MapOwned,
        ));
    }
}

fn draw_sketch(mut gizmos: Gizmos, session: Res<DrawSession>, res_manager: Res<TileMapResources>) {
    let Some(interaction) = session.controller().interaction() else {
        return;
    };

    for feature in interaction.construction_features() {
        if !interaction.renders(feature.geometry_type) {
            continue;
        }
        let points: Vec<Vec2> = feature.coordinates.iter().map(|c| res_manager.coord_to_point(*c)).collect();
        match feature.geometry_type {
            GeometryType::Point => {
                for point in points {
                    gizmos.circle_2d(Isometry2d::from_translation(point), SKETCH_VERTEX_RADIUS, SKETCH_VERTEX_STROKE);
                    gizmos.circle_2d(Isometry2d::from_translation(point), SKETCH_VERTEX_RADIUS - 2.0, SKETCH_VERTEX_FILL);
                }
            }
            GeometryType::LineString | GeometryType::Polygon => {
                for (start, end) in dash_segments(&points, SKETCH_DASH[0], SKETCH_DASH[1]) {
                    gizmos.line_2d(start, end, SKETCH_STROKE);
                }
            }
        }
    }
}
