//! # Drawing Tools Module
//!
//! Draw-and-measure tooling layered on the map: the geometry type select, the
//! interaction controller that attaches one draw interaction at a time, the
//! measurement formatter and the tooltips that follow the pointer and the sketch.
//!
//! ## Sub-modules
//! - `controller`: Drawing modes and the attach / detach state machine
//! - `draw`: The draw interaction building one feature from clicks
//! - `measure`: Geodesic length and area, formatted with units
//! - `session`: The `DrawSession` resource tying the pieces together
//! - `tooltip`: Help and measurement tooltip lifecycle
//! - `ui`: The egui geometry type select

use bevy::prelude::*;

use crate::{
    config::MapConfig,
    interaction::{DrawKeyEvent, MapInputSet, MapPointerEvent},
    tiles::TileMapResources,
    vector::VectorSource,
};

mod controller;
mod draw;
mod measure;
mod session;
mod tooltip;
mod ui;

pub use controller::*;
pub use draw::*;
pub use measure::*;
pub use session::*;
pub use tooltip::*;
pub use ui::*;

pub struct ToolsPlugin;

impl Plugin for ToolsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((SessionPlugin, ToolbarUiPlugin));
    }
}

/// Feeds map input into the mounted `DrawSession`. Has no UI so it also runs headless.
pub struct SessionPlugin;

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ToolbarState>()
            .add_event::<ModeSelected>()
            .add_event::<MapPointerEvent>()
            .add_event::<DrawKeyEvent>()
            .add_systems(
                Update,
                (
                    apply_mode_selection,
                    (dispatch_pointer_events, dispatch_draw_keys).run_if(
                        resource_exists::<DrawSession>
                            .and(resource_exists::<VectorSource>)
                            .and(resource_exists::<TileMapResources>),
                    ),
                )
                    .chain()
                    .after(MapInputSet),
            );
    }
}

/// The select is the only thing that changes the mode.
fn apply_mode_selection(
    mut events: EventReader<ModeSelected>,
    mut toolbar: ResMut<ToolbarState>,
    session: Option<ResMut<DrawSession>>,
) {
    let Some(ModeSelected(mode)) = events.read().last().copied() else {
        return;
    };
    toolbar.mode = mode;
    if let Some(mut session) = session {
        session.select_mode(mode);
    }
}

fn dispatch_pointer_events(
    mut events: EventReader<MapPointerEvent>,
    mut session: ResMut<DrawSession>,
    mut source: ResMut<VectorSource>,
    tiles: Res<TileMapResources>,
    config: Res<MapConfig>,
) {
    let projection = tiles.projection();
    for event in events.read() {
        match *event {
            MapPointerEvent::Move { coord, dragging, .. } => session.on_pointer_move(coord, dragging),
            MapPointerEvent::Click { coord, world } => {
                let near = |vertex| projection.coord_to_world(vertex).distance(world) <= config.snap_tolerance;
                for feature in session.on_click(coord, near) {
                    source.add_feature(feature);
                }
            }
            MapPointerEvent::Leave => session.on_pointer_leave(),
        }
    }
}

fn dispatch_draw_keys(
    mut events: EventReader<DrawKeyEvent>,
    mut session: ResMut<DrawSession>,
    mut source: ResMut<VectorSource>,
) {
    for event in events.read() {
        match event {
            DrawKeyEvent::Finish => {
                if let Some(feature) = session.finish_sketch() {
                    source.add_feature(feature);
                }
            }
            DrawKeyEvent::Abort => session.abort_sketch(),
            DrawKeyEvent::RemoveLastPoint => session.remove_last_point(),
        }
    }
}
