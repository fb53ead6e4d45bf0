use bevy::{
    prelude::*,
    window::{CursorLeft, CursorMoved, PrimaryWindow},
};

use crate::{EguiBlockInputState, tiles::TileMapResources, types::Coord};

pub struct InteractionSystemPlugin;

impl Plugin for InteractionSystemPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<MapPointerEvent>()
            .add_event::<DrawKeyEvent>()
            .add_systems(
                Update,
                (handle_mouse, handle_keys)
                    .in_set(MapInputSet)
                    .run_if(resource_exists::<TileMapResources>),
            );
    }
}

/// Runs before anything consuming map input.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct MapInputSet;

/// Pointer input over the map viewport, already projected to map coordinates.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum MapPointerEvent {
    Move { coord: Coord, world: Vec2, dragging: bool },
    Click { coord: Coord, world: Vec2 },
    Leave,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawKeyEvent {
    Finish,
    Abort,
    RemoveLastPoint,
}

/// Pointer input of one frame, before it is projected onto the map.
#[derive(Debug, Clone, Copy, Default)]
struct PointerFrame {
    moved: bool,
    left: bool,
    over_ui: bool,
    clicked: bool,
    dragging: bool,
}

/// `at` is the cursor on the map, `over_ui` remembers whether the pointer was
/// already on a panel last frame.
fn pointer_events(frame: PointerFrame, at: Option<(Coord, Vec2)>, over_ui: &mut bool) -> Vec<MapPointerEvent> {
    if frame.over_ui {
        // Leaving the map for a panel counts as leaving the viewport.
        if !*over_ui {
            *over_ui = true;
            return vec![MapPointerEvent::Leave];
        }
        return Vec::new();
    }
    *over_ui = false;

    if frame.left {
        return vec![MapPointerEvent::Leave];
    }
    let Some((coord, world)) = at else {
        return Vec::new();
    };

    let mut events = Vec::new();
    if frame.moved {
        events.push(MapPointerEvent::Move {
            coord,
            world,
            dragging: frame.dragging,
        });
    }
    if frame.clicked {
        events.push(MapPointerEvent::Click { coord, world });
    }
    events
}

fn cursor_on_map(
    q_windows: &Query<&Window, With<PrimaryWindow>>,
    camera: &Query<(&Camera, &GlobalTransform), With<Camera2d>>,
    res_manager: &TileMapResources,
) -> Option<(Coord, Vec2)> {
    let (camera, camera_transform) = camera.single().ok()?;
    let position = q_windows.single().ok()?.cursor_position()?;
    let world = camera.viewport_to_world_2d(camera_transform, position).ok()?;
    Some((res_manager.point_to_coord(world), world))
}

fn handle_mouse(
    buttons: Res<ButtonInput<MouseButton>>,
    mut cursor_moved: EventReader<CursorMoved>,
    mut cursor_left: EventReader<CursorLeft>,
    q_windows: Query<&Window, With<PrimaryWindow>>,
    camera: Query<(&Camera, &GlobalTransform), With<Camera2d>>,
    res_manager: Res<TileMapResources>,
    egui: Res<EguiBlockInputState>,
    mut pointer: EventWriter<MapPointerEvent>,
    mut over_ui: Local<bool>,
) {
    let frame = PointerFrame {
        moved: cursor_moved.read().count() > 0,
        left: cursor_left.read().count() > 0,
        over_ui: egui.block_input,
        clicked: buttons.just_pressed(MouseButton::Left),
        dragging: buttons.pressed(MouseButton::Middle),
    };
    let at = cursor_on_map(&q_windows, &camera, &res_manager);
    pointer.write_batch(pointer_events(frame, at, &mut over_ui));
}

fn handle_keys(keys: Res<ButtonInput<KeyCode>>, egui: Res<EguiBlockInputState>, mut draw_keys: EventWriter<DrawKeyEvent>) {
    if egui.block_input {
        return;
    }
    if keys.just_pressed(KeyCode::Enter) {
        draw_keys.write(DrawKeyEvent::Finish);
    }
    if keys.just_pressed(KeyCode::Escape) {
        draw_keys.write(DrawKeyEvent::Abort);
    }
    if keys.just_pressed(KeyCode::Backspace) {
        draw_keys.write(DrawKeyEvent::RemoveLastPoint);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfig;

    const AT: (Coord, Vec2) = (Coord::new(1.0, 2.0), Vec2::new(3.0, 4.0));

    fn moved(dragging: bool) -> PointerFrame {
        PointerFrame {
            moved: true,
            dragging,
            ..default()
        }
    }

    #[test]
    fn moves_carry_the_drag_state() {
        let mut over_ui = false;
        let (coord, world) = AT;
        assert_eq!(
            pointer_events(moved(false), Some(AT), &mut over_ui),
            [MapPointerEvent::Move { coord, world, dragging: false }]
        );
        assert_eq!(
            pointer_events(moved(true), Some(AT), &mut over_ui),
            [MapPointerEvent::Move { coord, world, dragging: true }]
        );
    }

    #[test]
    fn click_follows_the_move() {
        let mut over_ui = false;
        let frame = PointerFrame {
            clicked: true,
            ..moved(false)
        };
        let events = pointer_events(frame, Some(AT), &mut over_ui);
        assert!(matches!(
            events.as_slice(),
            [MapPointerEvent::Move { .. }, MapPointerEvent::Click { .. }]
        ));
        // Without a cursor on the map there is nothing to report.
        assert!(pointer_events(frame, None, &mut over_ui).is_empty());
    }

    #[test]
    fn entering_a_panel_leaves_the_map_once() {
        let mut over_ui = false;
        let on_panel = PointerFrame {
            over_ui: true,
            ..moved(false)
        };
        assert_eq!(pointer_events(on_panel, Some(AT), &mut over_ui), [MapPointerEvent::Leave]);
        assert!(over_ui);
        assert!(pointer_events(on_panel, Some(AT), &mut over_ui).is_empty());

        // Back on the map, moves are reported again.
        assert_eq!(pointer_events(moved(false), Some(AT), &mut over_ui).len(), 1);
        assert!(!over_ui);
    }

    #[test]
    fn cursor_left_becomes_leave() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_event::<CursorMoved>()
            .add_event::<CursorLeft>()
            .init_resource::<ButtonInput<MouseButton>>()
            .init_resource::<ButtonInput<KeyCode>>()
            .insert_resource(EguiBlockInputState::default())
            .insert_resource(TileMapResources::from_config(&MapConfig::default()))
            .add_plugins(InteractionSystemPlugin);

        app.world_mut().send_event(CursorLeft {
            window: Entity::PLACEHOLDER,
        });
        app.update();

        let events = app.world().resource::<Events<MapPointerEvent>>();
        let sent: Vec<_> = events.iter_current_update_events().copied().collect();
        assert_eq!(sent, [MapPointerEvent::Leave]);
    }
}
