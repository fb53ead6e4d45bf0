use bevy::prelude::*;

use crate::{
    config::MapConfig,
    tiles::TileMapResources,
    tools::{DrawSession, ToolbarState},
    vector::VectorSource,
};

pub struct MapLifecyclePlugin;

impl Plugin for MapLifecyclePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<MapLifecycle>()
            .add_systems(Startup, mount_on_startup)
            .add_systems(PreUpdate, handle_lifecycle)
            .add_systems(Last, unmount_on_exit);
    }
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapLifecycle {
    Mount,
    Unmount,
}

/// Everything spawned while the map is mounted. Unmounting despawns all of it.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct MapOwned;

fn mount_on_startup(mut lifecycle: EventWriter<MapLifecycle>) {
    lifecycle.write(MapLifecycle::Mount);
}

fn unmount_on_exit(mut exit: EventReader<AppExit>, mut commands: Commands) {
    if exit.read().next().is_some() {
        commands.queue(unmount);
    }
}

fn handle_lifecycle(world: &mut World) {
    let events: Vec<MapLifecycle> = world.resource_mut::<Events<MapLifecycle>>().drain().collect();
    for event in events {
        match event {
            MapLifecycle::Mount => mount(world),
            MapLifecycle::Unmount => unmount(world),
        }
    }
}

fn mount(world: &mut World) {
    if world.contains_resource::<DrawSession>() {
        debug!("Map already mounted");
        return;
    }
    let config = world.get_resource::<MapConfig>().cloned().unwrap_or_default();
    let mode = world.get_resource::<ToolbarState>().map(|toolbar| toolbar.mode).unwrap_or_default();

    let mut session = DrawSession::default();
    session.select_mode(mode);

    world.insert_resource(TileMapResources::from_config(&config));
    world.insert_resource(VectorSource::default());
    world.insert_resource(session);
    info!("Map mounted at zoom {} in {:?} mode", config.zoom, mode);
}

/// Runs at most once per mount, later calls find nothing to release.
fn unmount(world: &mut World) {
    let Some(mut session) = world.remove_resource::<DrawSession>() else {
        return;
    };
    let report = session.teardown();

    let owned: Vec<Entity> = world
        .query_filtered::<Entity, With<MapOwned>>()
        .iter(world)
        .collect();
    for entity in &owned {
        world.despawn(*entity);
    }

    world.remove_resource::<VectorSource>();
    world.remove_resource::<TileMapResources>();
    info!(
        "Map unmounted: {} interaction(s), {} tooltip(s), {} entities released",
        report.interactions,
        report.overlays,
        owned.len()
    );
}
