use std::{collections::HashSet, thread};

use bevy::{input::mouse::MouseWheel, prelude::*, sprite::Anchor};
use crossbeam_channel::{Receiver, Sender, bounded};

use crate::{
    EguiBlockInputState,
    config::MapConfig,
    error::MapResult,
    map::MapOwned,
    types::{Coord, MapProjection, TileId},
};

use super::{TileSource, buffer_to_bevy_image, fetch_tile};

pub struct TileMapPlugin;

impl Plugin for TileMapPlugin {
    fn build(&self, app: &mut App) {
        let (tx, rx): (TileSenderType, TileReceiverType) = bounded(64);
        app.insert_resource(TileReceiver(rx))
            .insert_resource(TileSender(tx))
            .add_event::<ZoomChangedEvent>()
            .add_systems(
                Update,
                (
                    handle_zoom,
                    request_visible_tiles,
                    spawn_received_tiles,
                    despawn_outofrange_tiles,
                )
                    .chain()
                    .run_if(resource_exists::<TileMapResources>),
            )
            .add_systems(Update, discard_unmounted_tiles.run_if(not(resource_exists::<TileMapResources>)));
    }
}

/// Tile state of a mounted map. Inserted on mount, removed on unmount.
#[derive(Debug, Resource, Clone)]
pub struct TileMapResources {
    pub zoom_manager: ZoomManager,
    pub chunk_manager: ChunkManager,
    pub location_manager: Location,
}

impl TileMapResources {
    pub fn from_config(config: &MapConfig) -> Self {
        Self {
            zoom_manager: ZoomManager {
                zoom_level: config.zoom,
                min_zoom: config.min_zoom,
                max_zoom: config.max_zoom,
                tile_size: config.tile_size as f32,
            },
            chunk_manager: ChunkManager {
                source: TileSource::from_config(config),
                requested: HashSet::new(),
                spawned: HashSet::new(),
                failed: HashSet::new(),
                reference: config.center_coord(),
                margin: config.tile_margin.max(0),
            },
            location_manager: Location {
                location: config.center_coord(),
            },
        }
    }

    pub fn projection(&self) -> MapProjection {
        MapProjection::new(
            self.chunk_manager.reference,
            self.zoom_manager.zoom_level,
            self.zoom_manager.tile_size as f64,
        )
    }

    pub fn point_to_coord(&self, point: Vec2) -> Coord {
        self.projection().world_to_coord(point)
    }

    pub fn coord_to_point(&self, coord: Coord) -> Vec2 {
        self.projection().coord_to_world(coord)
    }

    /// Changes the zoom level, returning false when it is already at the limit.
    /// All tiles are forgotten since none of them fit the new level.
    pub fn set_zoom(&mut self, zoom: u32) -> bool {
        let zoom = zoom.clamp(self.zoom_manager.min_zoom, self.zoom_manager.max_zoom);
        if zoom == self.zoom_manager.zoom_level {
            return false;
        }
        self.zoom_manager.zoom_level = zoom;
        self.chunk_manager.clear();
        true
    }
}

#[derive(Debug, Clone)]
pub struct ZoomManager {
    pub zoom_level: u32,
    pub min_zoom: u32,
    pub max_zoom: u32,
    pub tile_size: f32,
}

#[derive(Debug, Clone)]
pub struct ChunkManager {
    pub source: TileSource,
    /// Tiles sent to a worker and not yet failed.
    pub requested: HashSet<TileId>,
    pub spawned: HashSet<TileId>,
    /// Not requested again until the zoom level changes.
    pub failed: HashSet<TileId>,
    /// Where world (0, 0) sits on the map.
    pub reference: Coord,
    pub margin: i64,
}

impl ChunkManager {
    pub fn clear(&mut self) {
        self.requested.clear();
        self.spawned.clear();
        self.failed.clear();
    }

    fn needs(&self, tile: &TileId) -> bool {
        !self.requested.contains(tile) && !self.failed.contains(tile)
    }
}

/// The map coordinate under the middle of the view.
#[derive(Debug, Clone)]
pub struct Location {
    pub location: Coord,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoomChangedEvent {
    pub zoom: u32,
}

pub type TileData = (TileId, MapResult<Vec<u8>>);
pub type TileSenderType = Sender<TileData>;
pub type TileReceiverType = Receiver<TileData>;

#[derive(Resource, Deref)]
pub struct TileReceiver(TileReceiverType);

#[derive(Resource, Deref)]
pub struct TileSender(TileSenderType);

#[derive(Component, Debug, Clone, Copy)]
pub struct TileMarker(pub TileId);

/// The world rectangle the camera shows, the camera never scales.
fn view_rect(camera: &Camera, transform: &GlobalTransform) -> Option<(Vec2, Vec2)> {
    let half = camera.logical_viewport_size()? / 2.0;
    let center = transform.translation().truncate();
    Some((center - half, center + half))
}

fn handle_zoom(
    mut commands: Commands,
    mut evr_scroll: EventReader<MouseWheel>,
    mut res_manager: ResMut<TileMapResources>,
    mut camera_query: Query<&mut Transform, With<Camera2d>>,
    tiles: Query<Entity, With<TileMarker>>,
    state: Res<EguiBlockInputState>,
    mut zoom_changed: EventWriter<ZoomChangedEvent>,
) {
    let scroll: f32 = evr_scroll.read().map(|ev| ev.y).sum();
    if scroll == 0.0 || state.block_input {
        return;
    }
    let Ok(mut camera) = camera_query.single_mut() else {
        return;
    };

    let center = res_manager.point_to_coord(camera.translation.truncate());
    let zoom = res_manager.zoom_manager.zoom_level;
    let target = if scroll > 0.0 { zoom + 1 } else { zoom.saturating_sub(1) };
    if !res_manager.set_zoom(target) {
        return;
    }

    let center_point = res_manager.coord_to_point(center);
    camera.translation = center_point.extend(camera.translation.z);
    res_manager.location_manager.location = center;

    for entity in &tiles {
        commands.entity(entity).despawn();
    }
    let zoom = res_manager.zoom_manager.zoom_level;
    debug!("Zoom level changed to {zoom}");
    zoom_changed.write(ZoomChangedEvent { zoom });
}

fn request_visible_tiles(
    camera_query: Query<(&Camera, &GlobalTransform), With<Camera2d>>,
    tile_sender: Res<TileSender>,
    mut res_manager: ResMut<TileMapResources>,
) {
    let Ok((camera, transform)) = camera_query.single() else {
        return;
    };
    let Some((min, max)) = view_rect(camera, transform) else {
        return;
    };

    let projection = res_manager.projection();
    res_manager.location_manager.location = projection.world_to_coord((min + max) / 2.0);

    let margin = res_manager.chunk_manager.margin;
    for tile in projection.tiles_in_rect(min, max, margin) {
        if !res_manager.chunk_manager.needs(&tile) {
            continue;
        }
        let tx = tile_sender.clone();
        let source = res_manager.chunk_manager.source.clone();
        thread::spawn(move || {
            let result = fetch_tile(&source, tile);
            if let Err(e) = tx.send((tile, result)) {
                error!("Failed to send tile data: {:?}", e.0.0);
            }
        });
        res_manager.chunk_manager.requested.insert(tile);
    }
}

fn spawn_received_tiles(
    mut commands: Commands,
    mut images: ResMut<Assets<Image>>,
    tile_receiver: Res<TileReceiver>,
    mut res_manager: ResMut<TileMapResources>,
) {
    let projection = res_manager.projection();
    let tile_size = res_manager.zoom_manager.tile_size;

    while let Ok((tile, result)) = tile_receiver.try_recv() {
        let chunk_manager = &mut res_manager.chunk_manager;
        // Answers for another zoom level or a previous mount.
        if tile.zoom != projection.zoom || !chunk_manager.requested.contains(&tile) || chunk_manager.spawned.contains(&tile) {
            continue;
        }
        match result {
            Ok(data) => {
                let image = images.add(buffer_to_bevy_image(data, tile_size as u32));
                commands.spawn((
                    Sprite {
                        image,
                        custom_size: Some(Vec2::splat(tile_size)),
                        anchor: Anchor::TopLeft,
                        ..default()
                    },
                    Transform::from_translation(projection.tile_origin_world(tile).extend(0.0)),
                    TileMarker(tile),
                    MapOwned,
                ));
                chunk_manager.spawned.insert(tile);
            }
            Err(e) => {
                warn!("Tile {}/{}/{} failed: {e}", tile.zoom, tile.x, tile.y);
                chunk_manager.requested.remove(&tile);
                chunk_manager.failed.insert(tile);
            }
        }
    }
}

/// Workers still finishing after an unmount block on a full channel unless
/// someone keeps reading it.
fn discard_unmounted_tiles(tile_receiver: Res<TileReceiver>) {
    let discarded = tile_receiver.try_iter().count();
    if discarded > 0 {
        debug!("Discarded {discarded} tiles that arrived after unmount");
    }
}

fn despawn_outofrange_tiles(
    mut commands: Commands,
    camera_query: Query<(&Camera, &GlobalTransform), With<Camera2d>>,
    tiles: Query<(Entity, &TileMarker)>,
    mut res_manager: ResMut<TileMapResources>,
) {
    let Ok((camera, transform)) = camera_query.single() else {
        return;
    };
    let Some((min, max)) = view_rect(camera, transform) else {
        return;
    };

    let keep: HashSet<TileId> = res_manager
        .projection()
        .tiles_in_rect(min, max, res_manager.chunk_manager.margin + 2)
        .into_iter()
        .collect();

    for (entity, TileMarker(tile)) in &tiles {
        if !keep.contains(tile) {
            res_manager.chunk_manager.spawned.remove(tile);
            res_manager.chunk_manager.requested.remove(tile);
            commands.entity(entity).despawn();
        }
    }
}
